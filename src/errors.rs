use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChanRankError {
    /// The user session is not logged in; an external login step is required.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Remote access failed: {0}")]
    RemoteAccess(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl ChanRankError {
    /// Terminal for the current run until the session is logged in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Channel resolution, network and rate-limit failures.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteAccess(_) | Self::ChannelNotFound(_) | Self::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChanRankError>;
