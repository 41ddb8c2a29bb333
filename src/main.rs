//! wolfies-whatsapp - Bulk WhatsApp sender
//!
//! Loads contacts from CSV, pairs images with captions, and sends through
//! an external automation program or a WhatsApp Web browser session.
//!
//! CHANGELOG:
//! - 10/18/2026 - Missing --config file is fatal; check takes --images DIR
//! - 10/17/2026 - Non-zero exit status on any failure
//! - 10/14/2026 - Initial scaffold with CLI skeleton

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use wolfies_whatsapp::commands;
use wolfies_whatsapp::config::Config;
use wolfies_whatsapp::dispatch::FailurePolicy;
use wolfies_whatsapp::logging;
use wolfies_whatsapp::output::OutputControls;
use wolfies_whatsapp::transport::TransportKind;

/// Bulk WhatsApp sender - CSV contacts, text and image messages.
#[derive(Parser, Debug)]
#[command(name = "wolfies-whatsapp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Delivery mechanism: direct or session
    #[arg(short, long, global = true)]
    transport: Option<String>,

    /// Browser for the session transport: chrome or firefox
    #[arg(long, global = true)]
    browser: Option<String>,

    /// Record failed sends and keep going instead of aborting
    #[arg(long, global = true)]
    continue_on_error: bool,

    /// Seconds to pause after each send
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Log file (truncated each run)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Truncate text fields to this length
    #[arg(long, global = true)]
    max_text_chars: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send text messages to every contact
    Text {
        /// Contacts CSV (needs a 'phone' column)
        #[arg(short, long)]
        contacts: Option<PathBuf>,

        /// Messages to send (defaults to the configured list)
        messages: Vec<String>,
    },

    /// Send every image in a folder, with captions, to every contact
    Images {
        /// Contacts CSV (needs a 'phone' column)
        #[arg(short, long)]
        contacts: Option<PathBuf>,

        /// Folder holding .jpg/.png images
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// Match image extensions case-insensitively (.JPG, .Png)
        #[arg(long)]
        any_case: bool,

        /// Captions, reused cyclically (defaults to the configured messages)
        captions: Vec<String>,
    },

    /// Text run followed by image run
    All {
        /// Contacts CSV (needs a 'phone' column)
        #[arg(short, long)]
        contacts: Option<PathBuf>,

        /// Folder holding .jpg/.png images
        #[arg(short, long)]
        images: Option<PathBuf>,
    },

    /// Validate inputs and show the send plan without sending
    Check {
        /// Contacts CSV (needs a 'phone' column)
        #[arg(short, long)]
        contacts: Option<PathBuf>,

        /// Also plan image sends from the configured images folder
        #[arg(long)]
        with_images: bool,

        /// Folder holding .jpg/.png images (implies --with-images)
        #[arg(short, long)]
        images: Option<PathBuf>,
    },
}

/// Apply global CLI overrides on top of the file config.
fn apply_overrides(cli: &Cli, config: &mut Config) -> anyhow::Result<()> {
    if let Some(ref transport) = cli.transport {
        config.transport = transport.parse::<TransportKind>()?;
    }
    if let Some(ref browser) = cli.browser {
        config.session.browser = browser.clone();
    }
    if cli.continue_on_error {
        config.on_failure = FailurePolicy::Continue;
    }
    if let Some(delay) = cli.delay {
        config.send_delay_secs = delay;
    }
    if let Some(ref log_file) = cli.log_file {
        config.log_file = log_file.to_string_lossy().into_owned();
    }
    Ok(())
}

fn set_contacts(config: &mut Config, contacts: &Option<PathBuf>) {
    if let Some(path) = contacts {
        config.contacts_file = path.to_string_lossy().into_owned();
    }
}

fn set_images(config: &mut Config, images: &Option<PathBuf>) {
    if let Some(path) = images {
        config.images_folder = path.to_string_lossy().into_owned();
    }
}

fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    let output = OutputControls {
        json: cli.json,
        compact: cli.compact,
        max_text_chars: cli.max_text_chars,
    };

    match cli.command {
        Command::Text { contacts, messages } => {
            set_contacts(&mut config, &contacts);
            if !messages.is_empty() {
                config.messages = messages;
            }
            commands::sending::text(&config, &output)
        }
        Command::Images {
            contacts,
            images,
            any_case,
            captions,
        } => {
            set_contacts(&mut config, &contacts);
            set_images(&mut config, &images);
            config.case_insensitive_extensions |= any_case;
            if !captions.is_empty() {
                config.messages = captions;
            }
            commands::sending::images(&config, &output)
        }
        Command::All { contacts, images } => {
            set_contacts(&mut config, &contacts);
            set_images(&mut config, &images);
            commands::sending::all(&config, &output)
        }
        Command::Check {
            contacts,
            with_images,
            images,
        } => {
            set_contacts(&mut config, &contacts);
            let with_images = with_images || images.is_some();
            set_images(&mut config, &images);
            commands::check::run(&config, with_images, &output)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = Config::locate(cli.config.as_deref());
    let config = match Config::load(source.as_ref())
        .map_err(anyhow::Error::from)
        .and_then(|mut config| apply_overrides(&cli, &mut config).map(|()| config))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    // Held until exit so the log file gets flushed.
    let _guard = match logging::init(&config.log_path()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(ref path) = config.source {
        info!("Using config {}", path.display());
    }

    match run(cli, config) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            // The console layer echoes this to stderr.
            error!("An error occurred: {:#}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wolfies-whatsapp",
            "images",
            "--images",
            "promo",
            "--transport",
            "session",
            "--browser",
            "firefox",
            "--continue-on-error",
            "first caption",
        ])
        .unwrap();

        let mut config = Config::default();
        apply_overrides(&cli, &mut config).unwrap();
        assert_eq!(config.transport, TransportKind::Session);
        assert_eq!(config.session.browser, "firefox");
        assert_eq!(config.on_failure, FailurePolicy::Continue);

        match cli.command {
            Command::Images { images, captions, .. } => {
                assert_eq!(images, Some(PathBuf::from("promo")));
                assert_eq!(captions, vec!["first caption".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_check_images_folder() {
        let cli = Cli::try_parse_from(["wolfies-whatsapp", "check", "-i", "promo"]).unwrap();
        match cli.command {
            Command::Check {
                with_images,
                images,
                ..
            } => {
                assert!(!with_images);
                assert_eq!(images, Some(PathBuf::from("promo")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = Cli::try_parse_from([
            "wolfies-whatsapp",
            "--config",
            "/nonexistent/mine.toml",
            "check",
        ])
        .unwrap();
        let source = Config::locate(cli.config.as_deref());
        assert!(Config::load(source.as_ref()).is_err());
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let cli = Cli::try_parse_from(["wolfies-whatsapp", "--transport", "fax", "check"]).unwrap();
        let mut config = Config::default();
        assert!(apply_overrides(&cli, &mut config).is_err());
    }
}
