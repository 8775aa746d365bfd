use dirlens_protocol::{ErrorCode, ErrorEnvelope};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ListingError>;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error(
        "Could not get the listing lock after {}ms. Is another client issuing listings at the same time?",
        .timeout.as_millis()
    )]
    Contention { timeout: Duration },

    #[error("No such directory: {0}")]
    NotFound(PathBuf),

    #[error("Cannot open {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Listing worker failed: {0}")]
    Worker(String),
}

impl ListingError {
    pub(crate) fn from_open(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Access { path, source }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Contention { .. } => ErrorCode::Contention,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Access { .. } => ErrorCode::AccessDenied,
            Self::Worker(_) => ErrorCode::Internal,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code(), self.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{field} must not be negative (got {value})")]
    InvalidCapacity { field: &'static str, value: i64 },
}
