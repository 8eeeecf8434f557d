use thiserror::Error;

/// Errors that abort a clip or a picker session.
///
/// The `Display` text of each variant is the message shown to the user.
/// Per-image download failures are not represented here: they are recovered
/// inside the image pipeline and reported through
/// [`LocalizationReport`](crate::images::LocalizationReport).
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("The current note is not saved to a file, so images cannot be attached. Save it first.")]
    UnsavedDestination,

    #[error("Request failed: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("No content region found. Use CSS or XPath mode to select the content explicitly.")]
    NoContentFound,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to store attachment: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipError {
    /// Whether the error came from fetching the page itself
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, ClipError::HttpStatus { .. } | ClipError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;
