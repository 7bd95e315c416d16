use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid frame data for '{frame}': expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        frame: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid sheet dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(
        "Frame '{frame}' ({width}x{height}) does not fit within the sheet bounds {max_width}x{max_height}"
    )]
    PackingOverflow {
        frame: String,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("Atlas consistency violated: {0}")]
    Consistency(String),
    #[error("Atlas build cancelled")]
    Cancelled,
    #[error("Encoding error: {0}")]
    Encode(String),
    #[error("Decoding error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
