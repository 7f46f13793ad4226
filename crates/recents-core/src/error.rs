use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error("unknown setting: {0}")]
    UnknownSetting(String),
    #[error("host: {0}")]
    Host(String),
    #[error("settings file: {0}")]
    Toml(String),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(value: toml::ser::Error) -> Self {
        Self::Toml(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
