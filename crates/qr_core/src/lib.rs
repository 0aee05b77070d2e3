//! QR form core: the controller that validates form input, drives an
//! encoder, and owns the last rendered image.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::RenderOptions;

pub mod controller;
pub mod debounce;
pub mod download;
pub mod encoder;
pub mod error;

pub use controller::{
    Completion, ControllerPhase, FormController, GenerateTicket, PreviewImage, RenderResult,
};
pub use debounce::{Debouncer, AUTO_GENERATE_DELAY};
pub use download::{DirectorySink, DownloadSink, SaveOutcome};
pub use encoder::QrcodeEncoder;
pub use error::EncodeError;

/// Rendered QR image as returned by an encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub png: Vec<u8>,
    /// Edge length of the square image in pixels.
    pub width: u32,
    /// Symbol size in modules, margin excluded.
    pub modules: usize,
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

pub(crate) fn shared_bytes(png: Vec<u8>) -> Arc<[u8]> {
    Arc::from(png.into_boxed_slice())
}

/// Turns text plus render options into a QR image. Implementations may fail
/// for any reason; the controller treats every failure the same way.
#[async_trait]
pub trait QrEncoder: Send + Sync {
    async fn encode(&self, text: &str, options: &RenderOptions)
        -> Result<EncodedImage, EncodeError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
