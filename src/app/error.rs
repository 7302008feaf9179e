use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagpieError {
    #[error("Not logged in — run `magpie login` first")]
    NotAuthenticated,

    #[error("Session expired mid-operation — run `magpie login` and retry")]
    AuthenticationLost,

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid profile URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Not a profile handle or URL: {0}")]
    InvalidProfile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another scan or scrape is already running")]
    Busy,
}

pub type Result<T> = std::result::Result<T, MagpieError>;
