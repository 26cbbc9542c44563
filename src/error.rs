use std::path::PathBuf;

/// Errors surfaced by the card scanning core.
#[derive(thiserror::Error, Debug)]
pub enum CardScanError {
    #[error("failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write collection to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read collection from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection table {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error("failed to read config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to list input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine unavailable: {0}")]
    OcrInit(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("debug output {}: {reason}", path.display())]
    Debug { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, CardScanError>;
