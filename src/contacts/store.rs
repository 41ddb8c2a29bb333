//! Contact store - load and validate phone numbers from a CSV file.
//!
//! CHANGELOG:
//! - 10/16/2026 - Report the failing row in InvalidContact
//! - 10/14/2026 - Initial implementation

use crate::error::{Result, SenderError};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

/// Name of the CSV column holding phone numbers.
pub const PHONE_COLUMN: &str = "phone";

/// Minimum length (in characters, `+` included) of a valid phone entry.
pub const MIN_PHONE_LEN: usize = 10;

/// A recipient phone number, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Contact(String);

impl Contact {
    /// Validate a raw phone entry.
    ///
    /// Only the leading `+` and the length are checked; country codes and
    /// digit content are left to the transport.
    pub fn parse(phone: &str) -> Option<Self> {
        if phone.starts_with('+') && phone.chars().count() >= MIN_PHONE_LEN {
            Some(Self(phone.to_string()))
        } else {
            None
        }
    }

    pub fn phone(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loads contacts from tabular files.
pub struct ContactStore;

impl ContactStore {
    /// Load contacts from a CSV file with a `phone` header.
    ///
    /// Returns phones in file order. Stops at the first invalid entry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Contact>> {
        let path = path.as_ref();
        info!("Loading contacts from file: {}", path.display());

        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            error!("Error loading contacts: {}", e);
            SenderError::FileFormat(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::read(&mut reader)
    }

    /// Load contacts from any CSV source (used by `load` and tests).
    pub fn from_reader<R: std::io::Read>(source: R) -> Result<Vec<Contact>> {
        let mut reader = csv::Reader::from_reader(source);
        Self::read(&mut reader)
    }

    fn read<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Contact>> {
        let headers = reader.headers().map_err(|e| {
            error!("Error reading contacts header: {}", e);
            SenderError::FileFormat(e.to_string())
        })?;

        let column = headers
            .iter()
            .position(|h| h == PHONE_COLUMN)
            .ok_or_else(|| {
                error!("CSV file must have a '{}' column.", PHONE_COLUMN);
                SenderError::FileFormat(format!("CSV file must have a '{}' column", PHONE_COLUMN))
            })?;

        info!("Validating phone numbers.");
        let mut contacts = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let row = index + 1;
            let record = record.map_err(|e| {
                error!("Error reading contacts row {}: {}", row, e);
                SenderError::FileFormat(format!("row {}: {}", row, e))
            })?;
            let phone = record.get(column).unwrap_or_default();

            match Contact::parse(phone) {
                Some(contact) => contacts.push(contact),
                None => {
                    error!("Invalid phone number on row {}: {}", row, phone);
                    return Err(SenderError::InvalidContact {
                        row,
                        phone: phone.to_string(),
                    });
                }
            }
        }

        info!("Loaded {} contacts successfully.", contacts.len());
        Ok(contacts)
    }
}
