/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// Every test gets its own temporary data root, removed when the
/// `TestEnvironment` is dropped, even if the test panics.
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::account_database::AccountDatabase;
use super::child_database::ChildDatabase;
use super::connection::CsvConnection;
use crate::domain::hashing::HashAlgorithm;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("childcare-test-")?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// A freshly initialised account store over this environment's data root
    pub fn account_database(&self) -> crate::error::Result<AccountDatabase> {
        AccountDatabase::initialize(self.connection.clone(), HashAlgorithm::default())
    }

    pub fn child_database(&self, owner: &str) -> crate::error::Result<ChildDatabase> {
        ChildDatabase::initialize(self.connection.clone(), owner)
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("CHILDCARE_TRACKER_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
