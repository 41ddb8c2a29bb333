//! Direct transport: delegate each send to an external messaging automation program.
//!
//! Text messages are scheduled a couple of minutes ahead (the automation tool
//! needs time to open the chat); images go out immediately.
//!
//! CHANGELOG:
//! - 10/17/2026 - Schedule wraps past the hour and midnight
//! - 10/15/2026 - Initial implementation

use super::{check_message, dialable_address, Transport};
use crate::contacts::Contact;
use crate::error::{Result, SenderError};
use crate::plan::Message;
use chrono::{Local, NaiveTime, Timelike};
use std::path::Path;
use std::process::Command;
use tracing::{debug, error, info};

/// Default program invoked by `CommandService`.
pub const DEFAULT_PROGRAM: &str = "whatsapp-send";

/// Default scheduling lead for text messages.
pub const DEFAULT_LEAD_MINUTES: u32 = 2;

/// The external service call contract.
pub trait MessagingService {
    /// Schedule `text` for delivery to `address` at `hour:minute` local time.
    fn send_text(&mut self, address: &str, text: &str, hour: u32, minute: u32) -> Result<()>;

    /// Send `image` with `caption` to `address` now.
    fn send_image(&mut self, address: &str, image: &Path, caption: &str) -> Result<()>;
}

/// Runs an external program for each send.
///
/// Invocations:
/// - `PROGRAM text <address> <text> <hour> <minute>`
/// - `PROGRAM image <address> <image_path> <caption>`
pub struct CommandService {
    program: String,
}

impl CommandService {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, address: &str, args: &[&str]) -> Result<()> {
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| SenderError::delivery(address, format!("cannot run {}: {}", self.program, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SenderError::delivery(
                address,
                format!("{} failed ({}): {}", self.program, output.status, stderr.trim()),
            ))
        }
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl MessagingService for CommandService {
    fn send_text(&mut self, address: &str, text: &str, hour: u32, minute: u32) -> Result<()> {
        let hour = hour.to_string();
        let minute = minute.to_string();
        self.run(address, &["text", address, text, &hour, &minute])
    }

    fn send_image(&mut self, address: &str, image: &Path, caption: &str) -> Result<()> {
        let image = image.to_string_lossy();
        self.run(address, &["image", address, &image, caption])
    }
}

/// Wall-clock hour and minute `lead_minutes` after `now`, wrapping at midnight.
pub fn schedule_at(now: NaiveTime, lead_minutes: u32) -> (u32, u32) {
    let (at, _) = now.overflowing_add_signed(chrono::Duration::minutes(i64::from(lead_minutes)));
    (at.hour(), at.minute())
}

/// Transport that hands messages to a `MessagingService`.
pub struct DirectTransport<S> {
    service: S,
    lead_minutes: u32,
    clock: fn() -> NaiveTime,
}

fn local_time() -> NaiveTime {
    Local::now().time()
}

impl<S: MessagingService> DirectTransport<S> {
    pub fn new(service: S, lead_minutes: u32) -> Self {
        Self {
            service,
            lead_minutes,
            clock: local_time,
        }
    }

    /// Replace the wall clock (tests).
    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: MessagingService> Transport for DirectTransport<S> {
    fn name(&self) -> &str {
        "direct"
    }

    fn send(&mut self, contact: &Contact, message: &Message) -> Result<()> {
        info!("Preparing to send message to {}", contact);
        let address = dialable_address(contact)?;
        check_message(message)?;

        let sent = match message {
            Message::Text { text } => {
                let (hour, minute) = schedule_at((self.clock)(), self.lead_minutes);
                debug!("Scheduling text to {} at {:02}:{:02}", address, hour, minute);
                self.service.send_text(&address, text, hour, minute)
            }
            Message::Image { path, caption } => self.service.send_image(&address, path, caption),
        };

        match sent {
            Ok(()) => {
                info!("Message sent to {}", contact);
                Ok(())
            }
            Err(e) => {
                error!("Error sending message to {}: {}", contact, e);
                Err(match e {
                    e if e.is_send_failure() => e,
                    other => SenderError::delivery(contact.phone(), other.to_string()),
                })
            }
        }
    }
}
