//! Transports: the pluggable mechanisms that deliver a single message.
//!
//! Two implementations share the same failure classification:
//! - `direct`: hand the message to an external automation program
//! - `session`: drive a logged-in WhatsApp Web session over WebDriver
//!
//! CHANGELOG:
//! - 10/17/2026 - Shared address/message checks for both transports
//! - 10/15/2026 - Initial module structure

pub mod direct;
pub mod session;
pub mod webdriver;

use crate::contacts::{phone, Contact};
use crate::error::{Result, SenderError};
use crate::images::ImageCatalog;
use crate::plan::Message;
use std::str::FromStr;
use tracing::error;

/// Delivers one message to one contact.
pub trait Transport {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Deliver `message` to `contact`.
    ///
    /// Failures are reported as `InvalidAddress`, `Delivery` or `MessageFormat`.
    fn send(&mut self, contact: &Contact, message: &Message) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&mut self, contact: &Contact, message: &Message) -> Result<()> {
        (**self).send(contact, message)
    }
}

/// Which transport to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Direct,
    Session,
}

impl FromStr for TransportKind {
    type Err = SenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(TransportKind::Direct),
            "session" => Ok(TransportKind::Session),
            other => {
                error!("Unsupported transport: {}", other);
                Err(SenderError::UnsupportedTransport(format!(
                    "'{}' (choose 'direct' or 'session')",
                    other
                )))
            }
        }
    }
}

/// Reduce a contact to a dialable `+<digits>` address or fail with `InvalidAddress`.
pub fn dialable_address(contact: &Contact) -> Result<String> {
    phone::dialable(contact.phone()).ok_or_else(|| {
        error!("Invalid address: {}", contact);
        SenderError::InvalidAddress(contact.phone().to_string())
    })
}

/// Reject messages no transport can deliver.
///
/// Text must be non-empty; images must be existing `.jpg`/`.png` files.
pub fn check_message(message: &Message) -> Result<()> {
    let checked = match message {
        Message::Text { text } if text.trim().is_empty() => {
            Err(SenderError::MessageFormat("text message is empty".to_string()))
        }
        Message::Text { .. } => Ok(()),
        Message::Image { path, .. } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !ImageCatalog::new(true).is_image_name(&name) {
                Err(SenderError::MessageFormat(format!(
                    "{} is not a .jpg or .png image",
                    path.display()
                )))
            } else if !path.is_file() {
                Err(SenderError::MessageFormat(format!(
                    "image {} does not exist",
                    path.display()
                )))
            } else {
                Ok(())
            }
        }
    };
    checked.inspect_err(|e| error!("{}", e))
}
