//! # Storage Module
//!
//! Persistence for the child-care tracker. The stores keep the whole object
//! graph in memory and mirror it to flat files under the data root; there is
//! no background I/O and no locking, so a data root belongs to one process at
//! a time.

pub mod csv;

pub use self::csv::{AccountDatabase, ChildDatabase, CsvConnection, LoadReport, RecordFile};
