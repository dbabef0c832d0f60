//! # CSV Storage Module
//!
//! Flat-file storage for accounts and children. Every file is headerless,
//! comma-separated text with one record per `\n`-terminated line, and every
//! sync rewrites a file in full from memory.
//!
//! ## File Layout
//!
//! ```text
//! data/
//! ├── accounts.dat
//! ├── extrafields.dat
//! └── {owner}/
//!     ├── children.dat
//!     └── {child_name}/
//!         ├── dr.dat
//!         ├── fr.dat
//!         ├── gr.dat
//!         ├── mr.dat
//!         └── sr.dat
//! ```

pub mod account_database;
pub mod child_database;
pub mod connection;
pub mod record_codec;

#[cfg(test)]
pub mod test_utils;

pub use account_database::AccountDatabase;
pub use child_database::ChildDatabase;
pub use connection::{validate_path_segment, CsvConnection, RecordFile};
pub use record_codec::LoadReport;
