//! Contacts: CSV loading, validation and address helpers.
//!
//! CHANGELOG:
//! - 10/14/2026 - Initial module structure

pub mod phone;
pub mod store;

pub use store::{Contact, ContactStore};
