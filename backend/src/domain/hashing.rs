//! # Password Hashing
//!
//! One-way credential digests. A digest is the base64 text of a SHA-2 hash of
//! the UTF-8 password bytes; the base64 alphabet has no `,`, so a digest is
//! always a single field in the comma-separated account files.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha512,
    Sha256,
}

impl HashAlgorithm {
    /// Resolve an algorithm by name, ignoring case and dashes ("SHA-512", "sha512")
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha256" => Ok(HashAlgorithm::Sha256),
            _ => Err(StoreError::HashUnavailable(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    pub fn digest(&self, password: &str) -> String {
        match self {
            HashAlgorithm::Sha512 => STANDARD.encode(Sha512::digest(password.as_bytes())),
            HashAlgorithm::Sha256 => STANDARD.encode(Sha256::digest(password.as_bytes())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest a password with the default algorithm (SHA-512)
pub fn hash(password: &str) -> String {
    HashAlgorithm::default().digest(password)
}
