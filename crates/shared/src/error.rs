use thiserror::Error;

use crate::domain::StatusMessage;

/// Everything a form action can refuse with. None of these escape the
/// controller as a crash; each maps to a status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("text is empty")]
    EmptyInput,
    #[error("text is {length} characters long, limit is {max}")]
    InputTooLong { length: usize, max: usize },
    #[error("encoding failed: {0}")]
    EncodingFailure(String),
    #[error("nothing has been generated yet")]
    NoResultToDownload,
    #[error("failed to save image: {0}")]
    SaveFailed(String),
}

impl FormError {
    pub fn status_message(&self) -> StatusMessage {
        match self {
            Self::EmptyInput => StatusMessage::error("Enter some text to generate a QR code."),
            Self::InputTooLong { max, .. } => {
                StatusMessage::error(format!("The text is too long (max. {max} characters)."))
            }
            Self::EncodingFailure(_) => {
                StatusMessage::error("Error generating the QR code. Check the logs.")
            }
            Self::NoResultToDownload => {
                StatusMessage::error("Generate a QR code before downloading.")
            }
            Self::SaveFailed(reason) => {
                StatusMessage::error(format!("Failed to save image: {reason}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusSeverity;

    #[test]
    fn every_form_error_maps_to_an_error_status() {
        let errors = [
            FormError::EmptyInput,
            FormError::InputTooLong {
                length: 2001,
                max: 2000,
            },
            FormError::EncodingFailure("boom".to_string()),
            FormError::NoResultToDownload,
            FormError::SaveFailed("disk full".to_string()),
        ];
        for err in errors {
            assert_eq!(err.status_message().severity, StatusSeverity::Error);
        }
    }

    #[test]
    fn too_long_status_names_the_limit() {
        let err = FormError::InputTooLong {
            length: 2001,
            max: 2000,
        };
        assert!(err.status_message().text.contains("2000"));
    }
}
