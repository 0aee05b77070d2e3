//! Domain types shared by the QR controller, the desktop form and the CLI.

pub mod domain;
pub mod error;

pub use domain::{
    ErrorCorrectionLevel, FormState, GenerationId, RenderOptions, StatusMessage, StatusSeverity,
};
pub use error::FormError;
