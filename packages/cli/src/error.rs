use teamwork_config::ConfigError;
use teamwork_model::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Bad input; the message ends with a pointer to `--help`.
    #[error("{message} Please see --help for more information.")]
    Usage { message: String },

    #[error("Not logged in. Run `tw login` first.")]
    NotLoggedIn,

    #[error("No {what} selected. Run `tw {what}s --select <id>` first.")]
    NoSelection { what: &'static str },

    #[error("No {what} with id {id}.")]
    UnknownId { what: &'static str, id: i64 },

    #[error("Task #{id} not found in {installation}.")]
    TaskNotFound { id: i64, installation: String },

    #[error("Nothing to undo.")]
    NothingToUndo,

    #[error("Nothing to redo.")]
    NothingToRedo,

    #[error(transparent)]
    Api(#[from] teamwork_api::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] teamwork_json_store::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// A usage error. The reason always ends with a period.
    pub fn usage(reason: impl Into<String>) -> Self {
        let mut message = reason.into();
        if !message.ends_with('.') {
            message.push('.');
        }
        CliError::Usage { message }
    }
}
