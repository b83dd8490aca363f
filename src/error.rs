use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract PDF text: {0}")]
    PdfExtract(String),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("invalid CSV output: {0}")]
    InvalidOutput(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned status {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("response from {0} has an empty body")]
    EmptyBody(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.to_string(),
            source,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard command is available on this system")]
    Unavailable,

    #[error("clipboard command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
