use teamwork_model::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP {status} {reason} for {url}")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },

    #[error("{resource} not found.")]
    NotFound { resource: String },

    #[error("Login failed: Invalid credentials. ({email})")]
    Login { email: String },

    #[error("Not logged in.")]
    Unauthenticated,

    #[error("Unexpected response: missing \"{field}\".")]
    MissingField { field: &'static str },

    #[error("Invalid {model} in response: {source}")]
    Model {
        model: &'static str,
        source: ValidationError,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Parse(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
