//! wolfies-whatsapp library
//!
//! Bulk WhatsApp sending: CSV contacts, image catalog, caption planning,
//! and a paced dispatcher over pluggable transports.
//!
//! CHANGELOG:
//! - 10/16/2026 - Added session transport and check command
//! - 10/14/2026 - Initial library structure

// Core modules
pub mod commands;
pub mod config;
pub mod contacts;
pub mod dispatch;
pub mod error;
pub mod images;
pub mod logging;
pub mod output;
pub mod plan;
pub mod transport;

pub use error::{Result, SenderError};
