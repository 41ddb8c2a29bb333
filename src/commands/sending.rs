//! Sending commands: text, images, all.
//!
//! CHANGELOG:
//! - 10/17/2026 - `all` reuses one transport (one QR login per run)
//! - 10/15/2026 - Initial implementation

use crate::config::Config;
use crate::contacts::{Contact, ContactStore};
use crate::dispatch::{Dispatcher, RunReport};
use crate::images::ImageCatalog;
use crate::output::OutputControls;
use crate::plan::{self, Message};
use crate::transport::direct::{CommandService, DirectTransport};
use crate::transport::session::{SessionTransport, SettleTimings};
use crate::transport::webdriver::{Browser, WebDriverOptions, WebDriverSession};
use crate::transport::{Transport, TransportKind};
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::info;

/// Send every text message to every contact.
pub fn text(config: &Config, output: &OutputControls) -> Result<()> {
    info!("Starting text message sending process.");
    let contacts = ContactStore::load(config.contacts_path())?;
    let messages = plan::text_messages(&config.messages);

    let mut transport = open_transport(config)?;
    let report = dispatcher(config).run(&contacts, &messages, &mut transport)?;
    finish(&report, output)
}

/// Send every image (with its wrapped caption) to every contact.
pub fn images(config: &Config, output: &OutputControls) -> Result<()> {
    info!("Starting image message sending process.");
    let contacts = ContactStore::load(config.contacts_path())?;
    let messages = image_messages(config)?;

    let mut transport = open_transport(config)?;
    let report = dispatcher(config).run(&contacts, &messages, &mut transport)?;
    finish(&report, output)
}

/// Text run followed by image run over a single transport.
pub fn all(config: &Config, output: &OutputControls) -> Result<()> {
    let contacts = ContactStore::load(config.contacts_path())?;
    let texts = plan::text_messages(&config.messages);
    // Plan images before opening the transport so folder problems fail fast.
    let images = image_messages(config)?;

    let mut transport = open_transport(config)?;
    let dispatcher = dispatcher(config);

    info!("Starting text message sending process.");
    let text_report = dispatcher.run(&contacts, &texts, &mut transport)?;
    info!("Starting image message sending process.");
    let image_report = dispatcher.run(&contacts, &images, &mut transport)?;

    let combined = merge(text_report, image_report);
    finish(&combined, output)
}

/// Images from the configured folder paired with the configured captions.
pub fn image_messages(config: &Config) -> Result<Vec<Message>> {
    let catalog = ImageCatalog::new(config.case_insensitive_extensions);
    let images = catalog.list(config.images_path())?;
    Ok(plan::pair_captions(&images, &config.messages)?)
}

fn dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::new(config.send_delay(), config.on_failure)
}

/// Build the configured transport.
///
/// The session transport blocks until the operator confirms the QR login.
pub fn open_transport(config: &Config) -> Result<Box<dyn Transport>> {
    match config.transport {
        TransportKind::Direct => {
            info!("Using direct transport via '{}'.", config.direct.program);
            let service = CommandService::new(config.direct.program.clone());
            Ok(Box::new(DirectTransport::new(service, config.direct.lead_minutes)))
        }
        TransportKind::Session => {
            let session = &config.session;
            let browser: Browser = session.browser.parse()?;
            let options = WebDriverOptions {
                url: session.webdriver_url.clone(),
                browser,
                driver_path: session.driver_path(),
                request_timeout: Duration::from_secs(session.request_timeout_secs),
            };
            let driver = WebDriverSession::start(&options)
                .with_context(|| format!("Failed to start WebDriver at {}", options.url))?;

            let timings = SettleTimings {
                short: Duration::from_millis(session.settle_short_ms),
                long: Duration::from_millis(session.settle_long_ms),
            };
            let transport = SessionTransport::connect(driver, &session.endpoint, timings)?;
            wait_for_login()?;
            Ok(Box::new(transport))
        }
    }
}

fn wait_for_login() -> Result<()> {
    eprint!("Scan the QR code and then press Enter...");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read login confirmation")?;
    info!("QR code scanned, session started.");
    Ok(())
}

fn merge(first: RunReport, second: RunReport) -> RunReport {
    let mut failures = first.failures;
    failures.extend(second.failures);
    RunReport {
        transport: first.transport,
        attempted: first.attempted + second.attempted,
        succeeded: first.succeeded + second.succeeded,
        failures,
    }
}

fn finish(report: &RunReport, output: &OutputControls) -> Result<()> {
    if output.json {
        output.print(report);
    } else {
        println!(
            "Sent {} of {} messages via {}.",
            report.succeeded, report.attempted, report.transport
        );
        for failure in &report.failures {
            println!(
                "  FAILED {} [{}]: {}",
                failure.contact,
                failure.message,
                output.clip(&failure.error)
            );
        }
    }

    if !report.is_success() {
        bail!(
            "{} of {} sends failed",
            report.failures.len(),
            report.attempted
        );
    }
    Ok(())
}

/// Contacts as plain phone strings (used by `check`).
pub fn phones(contacts: &[Contact]) -> Vec<&str> {
    contacts.iter().map(Contact::phone).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SendFailure;

    fn report(attempted: usize, succeeded: usize, failed: usize) -> RunReport {
        RunReport {
            transport: "direct".into(),
            attempted,
            succeeded,
            failures: (0..failed)
                .map(|i| SendFailure {
                    contact: format!("+1415555000{}", i),
                    message: "text (2 chars)".into(),
                    error: "boom".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_merge_reports() {
        let merged = merge(report(4, 4, 0), report(2, 1, 1));
        assert_eq!(merged.attempted, 6);
        assert_eq!(merged.succeeded, 5);
        assert_eq!(merged.failures.len(), 1);
        assert_eq!(merged.transport, "direct");
    }

    #[test]
    fn test_finish_fails_on_failures() {
        let output = OutputControls::default();
        assert!(finish(&report(2, 2, 0), &output).is_ok());
        assert!(finish(&report(2, 1, 1), &output).is_err());
    }

    #[test]
    fn test_image_messages_empty_captions_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let config = Config {
            images_folder: dir.path().to_string_lossy().into_owned(),
            messages: Vec::new(),
            ..Default::default()
        };

        let err = image_messages(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::SenderError>(),
            Some(crate::error::SenderError::EmptyCaptionSet)
        ));
    }

    #[test]
    fn test_unknown_browser_rejected_before_connecting() {
        let mut config = Config {
            transport: TransportKind::Session,
            ..Default::default()
        };
        config.session.browser = "lynx".into();

        let err = open_transport(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<crate::error::SenderError>(),
            Some(crate::error::SenderError::UnsupportedTransport(_))
        ));
    }

    #[test]
    fn test_text_run_end_to_end_with_failing_program() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = dir.path().join("contacts.csv");
        std::fs::write(&contacts, "phone\n+14155551234\n").unwrap();

        let config = Config {
            contacts_file: contacts.to_string_lossy().into_owned(),
            messages: vec!["hi".into()],
            send_delay_secs: 0,
            direct: crate::config::DirectConfig {
                program: "/nonexistent/whatsapp-send".into(),
                lead_minutes: 2,
            },
            ..Default::default()
        };

        let err = text(&config, &OutputControls::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::SenderError>(),
            Some(crate::error::SenderError::Delivery { .. })
        ));
    }
}
