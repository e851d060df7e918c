use thiserror::Error;

#[derive(Error, Debug)]
pub enum KstudyError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Not a recognizable YouTube video link: {url}")]
    InvalidVideoUrl { url: String },

    #[error("Missing API key: set {env_var}")]
    MissingApiKey { env_var: String },

    #[error("All {attempts} API keys have reached their usage quota")]
    QuotaExhausted { attempts: usize },

    #[error("API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Translation failed: {reason}")]
    TranslationFailed { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl KstudyError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        KstudyError::InvalidInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KstudyError>;
