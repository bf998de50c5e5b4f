use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorylineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Story not found: {0}")]
    NotFound(String),

    #[error("Not authorized: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl StorylineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorylineError::NotFound(_))
    }
}

impl From<reqwest::Error> for StorylineError {
    fn from(err: reqwest::Error) -> Self {
        StorylineError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorylineError>;
