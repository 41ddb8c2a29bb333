//! Session transport: type messages into a logged-in WhatsApp Web tab.
//!
//! Every UI lookup lives here, behind `BrowserSession`, so a changed page
//! layout surfaces as a `Delivery` error naming the step that broke.
//!
//! CHANGELOG:
//! - 10/17/2026 - Image sends reuse the contact search step
//! - 10/16/2026 - Initial implementation

use super::webdriver::{WebDriverError, ENTER};
use super::{check_message, dialable_address, Transport};
use crate::contacts::Contact;
use crate::error::{Result, SenderError};
use crate::plan::Message;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default messaging web endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://web.whatsapp.com";

// =============================================================================
// UI SELECTORS
// =============================================================================

pub const SEARCH_BOX: &str = "//div[@title='Search or start new chat']";
pub const MESSAGE_BOX: &str = "//div[@title='Type a message']";
pub const ATTACH_BUTTON: &str = "//div[@title='Attach']";
pub const FILE_INPUT: &str = "//input[@type='file']";

/// Opaque handle to a located element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(pub String);

/// The browser operations the session transport needs.
pub trait BrowserSession {
    fn navigate(&mut self, url: &str) -> std::result::Result<(), WebDriverError>;
    fn find(&mut self, xpath: &str) -> std::result::Result<ElementRef, WebDriverError>;
    fn click(&mut self, element: &ElementRef) -> std::result::Result<(), WebDriverError>;
    fn send_keys(&mut self, element: &ElementRef, text: &str) -> std::result::Result<(), WebDriverError>;
    fn close(&mut self) -> std::result::Result<(), WebDriverError>;
}

/// Pauses that let the page catch up between interactions.
#[derive(Debug, Clone, Copy)]
pub struct SettleTimings {
    /// After clicking the search box or the attach button.
    pub short: Duration,
    /// After opening a chat or attaching a file.
    pub long: Duration,
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(1),
            long: Duration::from_secs(2),
        }
    }
}

impl SettleTimings {
    pub fn none() -> Self {
        Self {
            short: Duration::ZERO,
            long: Duration::ZERO,
        }
    }
}

fn settle(d: Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}

/// Transport that drives the web UI.
pub struct SessionTransport<B: BrowserSession> {
    browser: B,
    timings: SettleTimings,
}

impl<B: BrowserSession> SessionTransport<B> {
    /// Point the browser at the messaging endpoint.
    ///
    /// The caller must wait for the operator to finish the QR login before sending.
    pub fn connect(mut browser: B, endpoint: &str, timings: SettleTimings) -> Result<Self> {
        browser.navigate(endpoint).map_err(|e| {
            error!("Error loading {}: {}", endpoint, e);
            SenderError::from(e)
        })?;
        info!("WhatsApp Web loaded.");
        Ok(Self { browser, timings })
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// End the browser session.
    pub fn close(mut self) -> Result<()> {
        self.browser.close().map_err(SenderError::from)
    }

    fn open_chat(&mut self, address: &str) -> std::result::Result<(), (&'static str, WebDriverError)> {
        let search = self.browser.find(SEARCH_BOX).map_err(|e| ("find search box", e))?;
        self.browser.click(&search).map_err(|e| ("click search box", e))?;
        settle(self.timings.short);
        self.browser
            .send_keys(&search, &format!("{}{}", address, ENTER))
            .map_err(|e| ("search contact", e))?;
        settle(self.timings.long);
        Ok(())
    }

    fn attach(&mut self, image: &Path) -> std::result::Result<(), (&'static str, WebDriverError)> {
        let attach = self.browser.find(ATTACH_BUTTON).map_err(|e| ("find attach button", e))?;
        self.browser.click(&attach).map_err(|e| ("click attach button", e))?;
        settle(self.timings.short);

        // The file input wants an absolute path.
        let absolute = std::fs::canonicalize(image).unwrap_or_else(|_| image.to_path_buf());
        let input = self.browser.find(FILE_INPUT).map_err(|e| ("find file input", e))?;
        self.browser
            .send_keys(&input, &absolute.to_string_lossy())
            .map_err(|e| ("choose image file", e))?;
        settle(self.timings.long);
        Ok(())
    }

    fn type_and_submit(&mut self, text: &str) -> std::result::Result<(), (&'static str, WebDriverError)> {
        let message_box = self.browser.find(MESSAGE_BOX).map_err(|e| ("find message box", e))?;
        self.browser
            .send_keys(&message_box, &format!("{}{}", text, ENTER))
            .map_err(|e| ("type message", e))?;
        Ok(())
    }
}

impl<B: BrowserSession> Transport for SessionTransport<B> {
    fn name(&self) -> &str {
        "session"
    }

    fn send(&mut self, contact: &Contact, message: &Message) -> Result<()> {
        info!("Sending message to {}.", contact);
        let address = dialable_address(contact)?;
        check_message(message)?;

        let outcome = self.open_chat(&address).and_then(|()| match message {
            Message::Text { text } => self.type_and_submit(text),
            Message::Image { path, caption } => {
                debug!("Attaching {}", path.display());
                self.attach(path)?;
                self.type_and_submit(caption)
            }
        });

        match outcome {
            Ok(()) => {
                info!("Message sent to {}", contact);
                Ok(())
            }
            Err((step, e)) => {
                error!("Error sending message to {} ({}): {}", contact, step, e);
                Err(SenderError::delivery(contact.phone(), format!("{}: {}", step, e)))
            }
        }
    }
}
