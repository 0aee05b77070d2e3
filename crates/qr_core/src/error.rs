use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("invalid {role} color '{value}': expected a hex string such as #1a2b3c")]
    InvalidColor { role: &'static str, value: String },
    #[error("data too long for error correction level {level}")]
    DataTooLong { level: String },
    #[error("QR symbol could not be built: {0}")]
    Symbol(String),
    #[error("PNG encoding failed: {0}")]
    Png(String),
    #[error("encoder worker failed: {0}")]
    Worker(String),
}
