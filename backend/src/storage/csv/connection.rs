use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

const ACCOUNTS_FILE: &str = "accounts.dat";
const EXTRA_FIELDS_FILE: &str = "extrafields.dat";
const CHILDREN_FILE: &str = "children.dat";

/// Characters that are path separators or reserved on at least one platform
const RESERVED_CHARACTERS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// The five per-child record files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFile {
    DiaperChange,
    Feeding,
    Growth,
    Medication,
    Sleep,
}

impl RecordFile {
    pub const ALL: [RecordFile; 5] = [
        RecordFile::DiaperChange,
        RecordFile::Feeding,
        RecordFile::Growth,
        RecordFile::Medication,
        RecordFile::Sleep,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            RecordFile::DiaperChange => "dr.dat",
            RecordFile::Feeding => "fr.dat",
            RecordFile::Growth => "gr.dat",
            RecordFile::Medication => "mr.dat",
            RecordFile::Sleep => "sr.dat",
        }
    }
}

/// Reject names that would escape or collide inside the data directory
///
/// Usernames and child names become directory names verbatim, so anything that
/// is not a plain single path segment is refused before a path is built.
pub fn validate_path_segment(name: &str) -> Result<&str> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| c.is_control() || RESERVED_CHARACTERS.contains(&c));

    if invalid {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// CsvConnection owns the data root and builds every path the stores touch
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| StoreError::configuration(&base_path, e))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.data_directory)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn accounts_file_path(&self) -> PathBuf {
        self.base_directory.join(ACCOUNTS_FILE)
    }

    pub fn extra_fields_file_path(&self) -> PathBuf {
        self.base_directory.join(EXTRA_FIELDS_FILE)
    }

    pub fn owner_directory(&self, owner: &str) -> Result<PathBuf> {
        Ok(self.base_directory.join(validate_path_segment(owner)?))
    }

    pub fn children_file_path(&self, owner: &str) -> Result<PathBuf> {
        Ok(self.owner_directory(owner)?.join(CHILDREN_FILE))
    }

    pub fn child_directory(&self, owner: &str, child_name: &str) -> Result<PathBuf> {
        Ok(self.owner_directory(owner)?.join(validate_path_segment(child_name)?))
    }

    pub fn record_file_path(&self, owner: &str, child_name: &str, record_file: RecordFile) -> Result<PathBuf> {
        Ok(self.child_directory(owner, child_name)?.join(record_file.file_name()))
    }

    /// Create an empty file (and its parent directories) unless it already exists
    pub fn ensure_file_exists(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_directory_exists(parent)?;
        }
        if !path.exists() {
            OpenOptions::new().create(true).append(true).open(path)?;
            debug!("Created empty data file: {}", path.display());
        }
        Ok(())
    }

    pub fn ensure_directory_exists(path: &Path) -> io::Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
            debug!("Created directory: {}", path.display());
        }
        Ok(())
    }
}
