//! Check command: validate inputs and preview the send plan without sending.
//!
//! CHANGELOG:
//! - 10/16/2026 - Initial implementation

use super::sending::{image_messages, phones};
use crate::config::Config;
use crate::contacts::ContactStore;
use crate::output::OutputControls;
use crate::plan::{self, Message, SendPlan};
use anyhow::Result;
use serde_json::json;
use tracing::info;

/// Load contacts (and images when asked), then print what a run would send.
pub fn run(config: &Config, with_images: bool, output: &OutputControls) -> Result<()> {
    let contacts = ContactStore::load(config.contacts_path())?;

    let mut messages = plan::text_messages(&config.messages);
    if with_images {
        messages.extend(image_messages(config)?);
    }
    let plan = SendPlan::cross(&contacts, &messages);
    info!("Check passed: {} contacts, {} sends planned.", contacts.len(), plan.len());

    if output.json {
        output.print(&json!({
            "success": true,
            "contacts": phones(&contacts),
            "messages": messages,
            "total_sends": plan.len(),
            "transport": config.transport,
        }));
        return Ok(());
    }

    println!("Contacts ({}):", contacts.len());
    println!("{}", "-".repeat(50));
    for phone in phones(&contacts) {
        println!("{}", phone);
    }
    println!();
    println!("Messages ({}):", messages.len());
    println!("{}", "-".repeat(50));
    for (i, message) in messages.iter().enumerate() {
        match message {
            Message::Text { text } => println!("{:>3}. {}", i + 1, output.clip(text)),
            Message::Image { path, caption } => println!(
                "{:>3}. [{}] {}",
                i + 1,
                path.display(),
                output.clip(caption)
            ),
        }
    }
    println!();
    println!(
        "{} sends planned ({} contacts x {} messages).",
        plan.len(),
        contacts.len(),
        messages.len()
    );

    Ok(())
}
