//! # Child-Care Tracker Backend
//!
//! Storage engine for per-account child-care records: feedings, sleep,
//! medication, diaper changes and growth.
//!
//! ## Architecture
//!
//! ```text
//! UI / report generators
//!     ↓
//! AccountDatabase, ChildDatabase   (storage::csv)
//!     ↓
//! CsvConnection                    (paths under the data root)
//!     ↓
//! flat .dat files
//! ```
//!
//! The record and entity types live in the `shared` crate and are re-exported
//! here. Mutations happen in memory; `sync` writes them out.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use config::StoreConfig;
pub use domain::{hash, HashAlgorithm};
pub use error::{Result, StoreError};
pub use storage::{AccountDatabase, ChildDatabase, CsvConnection, LoadReport, RecordFile};

pub use shared::{
    format_timestamp, parse_timestamp, Account, Child, DiaperChangeRecord, FeedingRecord, GrowthData,
    MedicationRecord, SleepSession,
};
