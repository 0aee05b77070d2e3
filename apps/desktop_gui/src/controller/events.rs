//! Backend-to-UI events and error modeling for the desktop form.

use qr_core::{EncodeError, EncodedImage};
use shared::GenerationId;

pub enum UiEvent {
    Info(String),
    Encoded {
        id: GenerationId,
        outcome: Result<EncodedImage, EncodeError>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Capacity,
    InvalidOption,
    Runtime,
    Io,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Generate,
    Download,
}

/// Developer-facing hint attached to a failed generation.
pub fn classify_generation_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("data too long") {
        "Text does not fit a QR symbol at this error correction level; \
         try a lower level or shorter text."
            .to_string()
    } else if lower.contains("color") {
        "One of the colors is not a valid hex value.".to_string()
    } else if lower.contains("worker")
        || lower.contains("queue")
        || lower.contains("disconnected")
    {
        "Encoder worker is unavailable; restart the app.".to_string()
    } else {
        format!("Encoder error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("too long")
            || message_lower.contains("capacity")
        {
            UiErrorCategory::Capacity
        } else if message_lower.contains("invalid")
            || message_lower.contains("color")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::InvalidOption
        } else if message_lower.contains("failed to write")
            || message_lower.contains("failed to create")
            || message_lower.contains("permission denied")
            || message_lower.contains("disk")
        {
            UiErrorCategory::Io
        } else if message_lower.contains("runtime")
            || message_lower.contains("worker")
            || message_lower.contains("queue")
            || message_lower.contains("disconnected")
            || message_lower.contains("panicked")
        {
            UiErrorCategory::Runtime
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> String {
        classify_generation_failure(&self.message)
    }
}
