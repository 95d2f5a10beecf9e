use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CONFIG_INVALID: {0}")]
    Config(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("HTTP_FAILURE: {0}")]
    Http(String),
    #[error("STORE_FAILURE: {0}")]
    Store(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Why an iteration label did not yield a sprint ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SprintNameError {
    #[error("iteration name is missing")]
    MissingName,
    #[error("iteration name does not contain a sprint number")]
    NoMatch,
    #[error("could not parse sprint number '{0}'")]
    MalformedNumber(String),
}
