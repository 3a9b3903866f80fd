use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Unsupported image format")]
    UnsupportedImage,

    #[error("Failed to encode page content: {0}")]
    Encode(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Failed to write PDF: {0}")]
    Save(String),
}
