use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::DocumentStore;

/// File name of the config document inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".teamworkrc";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TEAMWORK_CONFIG";

/// `$TEAMWORK_CONFIG` when set, otherwise `~/.teamworkrc`.
pub fn default_path() -> Result<PathBuf, Error> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(Error::NoHomeDirectory { env: CONFIG_ENV })
}

/// A JSON document kept in a single file.
///
/// A missing or empty file reads as "nothing saved". Writes are
/// pretty-printed with two-space indentation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at [`default_path`].
    pub fn open_default() -> Result<Self, Error> {
        default_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Option<JsonValue>, Error> {
        log::debug!("Reading {}...", self.path.display());

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| Error::Corrupted {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&mut self, document: &JsonValue) -> Result<(), Error> {
        log::debug!("Writing {}...", self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut text = serde_json::to_string_pretty(document)?;
        text.push('\n');
        fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }

    fn delete(&mut self) -> Result<bool, Error> {
        log::debug!("Removing {}...", self.path.display());

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(self.io_error(error)),
        }
    }
}
