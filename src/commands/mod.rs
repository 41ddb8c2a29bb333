//! Command implementations.
//!
//! CHANGELOG:
//! - 10/16/2026 - Added check (dry run)
//! - 10/15/2026 - Initial module structure

pub mod check;
pub mod sending;
