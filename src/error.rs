use thiserror::Error;

/// Result type for schedule chart operations
pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors that can occur while building a chart or loading schedule data
#[derive(Error, Debug)]
pub enum ChartError {
    /// The hosting surface cannot hold a chart (zero, negative or non-finite size)
    #[error("Invalid chart surface: {0}")]
    InvalidSurface(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The document parsed but is unusable as a whole
    #[error("Invalid schedule data: {0}")]
    InvalidData(String),

    /// A drop could not be committed; the schedule is unchanged
    #[error("Drop rejected: {0}")]
    DropRejected(String),

    /// A notification sink rejected an event
    #[error("Notification failed: {0}")]
    Notify(String),
}
