//! Error taxonomy shared by loading, planning and delivery.
//!
//! CHANGELOG:
//! - 10/18/2026 - Split send failures into address/delivery/format kinds
//! - 10/14/2026 - Initial implementation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere between reading the contacts file and the last send.
#[derive(Error, Debug)]
pub enum SenderError {
    /// Contacts file is unreadable or lacks the `phone` column.
    #[error("Contacts file format error: {0}")]
    FileFormat(String),

    /// A phone entry failed validation (1-based data row).
    #[error("Invalid phone number on row {row}: {phone:?}")]
    InvalidContact { row: usize, phone: String },

    #[error("Images folder not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("No .jpg or .png images found in {0:?}")]
    EmptyCatalog(PathBuf),

    #[error("Caption list is empty; at least one caption is required for image sends")]
    EmptyCaptionSet,

    /// The transport refused the recipient address.
    #[error("Invalid address {0:?}")]
    InvalidAddress(String),

    /// The transport failed to hand the message over.
    #[error("Failed to send message to {contact}: {reason}")]
    Delivery { contact: String, reason: String },

    #[error("Invalid message format: {0}")]
    MessageFormat(String),

    /// The browser session could not be started or driven outside a send.
    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SenderError {
    /// True for the failure kinds a transport reports for a single send.
    pub fn is_send_failure(&self) -> bool {
        matches!(
            self,
            SenderError::InvalidAddress(_)
                | SenderError::Delivery { .. }
                | SenderError::MessageFormat(_)
        )
    }

    pub(crate) fn delivery(contact: &str, reason: impl Into<String>) -> Self {
        SenderError::Delivery {
            contact: contact.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_failure_kinds() {
        assert!(SenderError::InvalidAddress("+1".into()).is_send_failure());
        assert!(SenderError::delivery("+14155551234", "boom").is_send_failure());
        assert!(SenderError::MessageFormat("empty".into()).is_send_failure());
        assert!(!SenderError::EmptyCaptionSet.is_send_failure());
        assert!(!SenderError::UnsupportedTransport("fax".into()).is_send_failure());
    }

    #[test]
    fn test_invalid_contact_message() {
        let err = SenderError::InvalidContact {
            row: 3,
            phone: "12345".into(),
        };
        assert_eq!(err.to_string(), r#"Invalid phone number on row 3: "12345""#);
    }
}
