use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubcardsError {
    #[error("Invalid timestamp: {0}")]
    Format(String),

    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Download failed: {0}")]
    Fetch(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SubcardsError>;
