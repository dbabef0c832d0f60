//! # Domain Module
//!
//! Stateless helpers the stores depend on:
//!
//! - **hashing**: one-way credential digests
//! - **data_directory_service**: where the data root lives on this machine

pub mod data_directory_service;
pub mod hashing;

pub use data_directory_service::resolve_data_directory;
pub use hashing::{hash, HashAlgorithm};
