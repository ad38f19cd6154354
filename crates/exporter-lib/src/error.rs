//! Error taxonomy for the scrape pipeline
//!
//! Every failure aborts the whole scrape. The kinds only exist so that
//! operators can tell from the logs where a scrape broke.

use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised while acquiring or rendering container metrics
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// The engine socket could not be dialed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The HTTP exchange with the engine failed or returned unusable data
    #[error("fetch error: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A field of an inspection record did not have the expected format
    #[error("parse error: {message}")]
    Parse { message: String },
}

impl ExporterError {
    pub fn connection(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }

    pub fn fetch_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Short label for the error kind, used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExporterError::Connection { .. } => "connection",
            ExporterError::Fetch { .. } => "fetch",
            ExporterError::Parse { .. } => "parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
