use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not access config file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Corrupted config file {}: {source}", .path.display())]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not encode config document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Could not determine the home directory; set {env} to choose a config file.")]
    NoHomeDirectory { env: &'static str },
}
