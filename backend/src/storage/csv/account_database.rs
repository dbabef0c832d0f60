//! # Account Database
//!
//! Owns every account in memory and the two files at the root of the data
//! directory that back them:
//!
//! ```text
//! data/
//! ├── accounts.dat       username,fullname,passwordhash
//! └── extrafields.dat    username,email,phone
//! ```
//!
//! Every mutation rewrites both files in full from the in-memory order, so
//! the files always mirror memory after a successful call. Deleting an account
//! leaves its `data/<username>/` child directory on disk.

use log::{debug, info, warn};

use shared::Account;

use super::connection::CsvConnection;
use super::record_codec::{read_records, write_records, LoadReport};
use crate::config::StoreConfig;
use crate::domain::hashing::HashAlgorithm;
use crate::error::{Result, StoreError};

pub struct AccountDatabase {
    connection: CsvConnection,
    algorithm: HashAlgorithm,
    accounts: Vec<Account>,
    load_report: LoadReport,
}

impl AccountDatabase {
    /// Resolve the configured hash algorithm, then open the data directory and load it
    ///
    /// The algorithm is resolved first so a store that could not hash never
    /// touches the files.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let algorithm = config.hash_algorithm()?;
        let connection = CsvConnection::from_config(config)?;
        Self::initialize(connection, algorithm)
    }

    /// Create missing backing files, load both of them and normalise them with one sync
    pub fn initialize(connection: CsvConnection, algorithm: HashAlgorithm) -> Result<Self> {
        let accounts_path = connection.accounts_file_path();
        let extra_fields_path = connection.extra_fields_file_path();

        CsvConnection::ensure_file_exists(&accounts_path)
            .map_err(|e| StoreError::configuration(&accounts_path, e))?;
        CsvConnection::ensure_file_exists(&extra_fields_path)
            .map_err(|e| StoreError::configuration(&extra_fields_path, e))?;

        let mut database = Self {
            connection,
            algorithm,
            accounts: Vec::new(),
            load_report: LoadReport::default(),
        };
        database.load_accounts()?;
        database.load_extra_fields()?;

        info!(
            "Loaded {} accounts ({} lines skipped)",
            database.accounts.len(),
            database.load_report.skipped
        );

        database.sync()?;
        Ok(database)
    }

    fn load_accounts(&mut self) -> Result<()> {
        let path = self.connection.accounts_file_path();
        for record in read_records(&path, &mut self.load_report)? {
            if record.len() != 3 {
                warn!("Skipping malformed account line in {}", path.display());
                self.load_report.skipped += 1;
                continue;
            }
            if self.lookup(&record[0]).is_some() {
                warn!("Skipping duplicate account '{}'", &record[0]);
                self.load_report.skipped += 1;
                continue;
            }
            self.accounts.push(Account::new(&record[0], &record[1], &record[2]));
            self.load_report.loaded += 1;
        }
        Ok(())
    }

    fn load_extra_fields(&mut self) -> Result<()> {
        let path = self.connection.extra_fields_file_path();
        for record in read_records(&path, &mut self.load_report)? {
            if record.len() != 3 {
                warn!("Skipping malformed extra fields line in {}", path.display());
                self.load_report.skipped += 1;
                continue;
            }
            match self.lookup_mut(&record[0]) {
                Some(account) => {
                    account.set_email(&record[1]);
                    account.set_phone(&record[2]);
                    self.load_report.loaded += 1;
                }
                None => {
                    warn!("Skipping extra fields for unknown account '{}'", &record[0]);
                    self.load_report.skipped += 1;
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// All accounts in file order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// True only if the account exists and the password digests to its stored hash
    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.lookup(username)
            .map(|account| account.password_hash() == self.algorithm.digest(password))
            .unwrap_or(false)
    }

    pub fn lookup(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username() == username)
    }

    fn lookup_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.username() == username)
    }

    /// Append a new account and persist
    ///
    /// No validation happens here: the caller has already checked that the
    /// username is free and the fields are acceptable.
    pub fn create_account(&mut self, username: &str, fullname: &str, password: &str) -> Result<()> {
        let password_hash = self.algorithm.digest(password);
        self.accounts.push(Account::new(username, fullname, password_hash));
        info!("Created account '{}'", username);
        self.sync()
    }

    /// Like [`create_account`](Self::create_account) but refuses a taken username
    pub fn try_create_account(&mut self, username: &str, fullname: &str, password: &str) -> Result<()> {
        if self.lookup(username).is_some() {
            return Err(StoreError::DuplicateEntity {
                kind: "Account",
                key: username.to_string(),
            });
        }
        self.create_account(username, fullname, password)
    }

    /// Apply `change` to the named account and persist; `Ok(false)` if there is no such account
    fn update_with<F>(&mut self, username: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Account),
    {
        match self.lookup_mut(username) {
            Some(account) => {
                change(account);
                debug!("Updated account '{}'", username);
                self.sync()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_fullname(&mut self, username: &str, fullname: &str) -> Result<bool> {
        self.update_with(username, |account| account.set_fullname(fullname))
    }

    pub fn update_password(&mut self, username: &str, password: &str) -> Result<bool> {
        let password_hash = self.algorithm.digest(password);
        self.update_with(username, |account| account.set_password_hash(password_hash))
    }

    pub fn update_email(&mut self, username: &str, email: &str) -> Result<bool> {
        self.update_with(username, |account| account.set_email(email))
    }

    pub fn update_phone(&mut self, username: &str, phone: &str) -> Result<bool> {
        self.update_with(username, |account| account.set_phone(phone))
    }

    /// Remove the account record and persist
    ///
    /// The account's child directory is left on disk.
    pub fn delete_account(&mut self, username: &str) -> Result<bool> {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.username() != username);
        if self.accounts.len() == before {
            return Ok(false);
        }
        info!("Deleted account '{}'", username);
        self.sync()?;
        Ok(true)
    }

    /// Rewrite both backing files in full from the in-memory order
    pub fn sync(&self) -> Result<()> {
        write_records(
            &self.connection.accounts_file_path(),
            self.accounts
                .iter()
                .map(|a| [a.username(), a.fullname(), a.password_hash()]),
        )?;
        write_records(
            &self.connection.extra_fields_file_path(),
            self.accounts.iter().map(|a| [a.username(), a.email(), a.phone()]),
        )?;
        debug!("Synced {} accounts", self.accounts.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hashing::hash;
    use crate::storage::csv::test_utils::TestEnvironment;
    use std::fs;

    #[test]
    fn test_fresh_store_then_create_account() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        assert!(accounts.is_empty());

        accounts.create_account("alice", "Alice A", "secret").unwrap();
        assert!(!accounts.is_empty());
        assert!(accounts.verify_credentials("alice", "secret"));
        assert!(!accounts.verify_credentials("alice", "wrong"));
        assert!(!accounts.verify_credentials("bob", "secret"));
    }

    #[test]
    fn test_initialize_creates_both_files() {
        let env = TestEnvironment::new().unwrap();
        env.account_database().unwrap();

        assert_eq!(fs::read_to_string(env.base_path.join("accounts.dat")).unwrap(), "");
        assert_eq!(fs::read_to_string(env.base_path.join("extrafields.dat")).unwrap(), "");
    }

    #[test]
    fn test_sync_writes_both_files() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();
        accounts.update_email("alice", "alice@example.com").unwrap();

        assert_eq!(
            fs::read_to_string(env.base_path.join("accounts.dat")).unwrap(),
            format!("alice,Alice A,{}\n", hash("secret"))
        );
        assert_eq!(
            fs::read_to_string(env.base_path.join("extrafields.dat")).unwrap(),
            "alice,alice@example.com,\n"
        );
    }

    #[test]
    fn test_accounts_round_trip_through_disk() {
        let env = TestEnvironment::new().unwrap();
        {
            let mut accounts = env.account_database().unwrap();
            accounts.create_account("alice", "Alice A", "secret").unwrap();
            accounts.create_account("bob", "Bob B", "hunter2").unwrap();
            accounts.update_phone("bob", "07700 900123").unwrap();
        }

        let reloaded = env.account_database().unwrap();
        let usernames: Vec<_> = reloaded.accounts().iter().map(|a| a.username()).collect();
        assert_eq!(usernames, vec!["alice", "bob"]);

        let bob = reloaded.lookup("bob").unwrap();
        assert_eq!(bob.fullname(), "Bob B");
        assert_eq!(bob.email(), "");
        assert_eq!(bob.phone(), "07700 900123");
        assert!(reloaded.verify_credentials("bob", "hunter2"));
    }

    #[test]
    fn test_updates_are_noops_for_unknown_user() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();

        assert!(!accounts.update_fullname("nobody", "X").unwrap());
        assert!(!accounts.update_password("nobody", "x").unwrap());
        assert!(!accounts.update_email("nobody", "x@y").unwrap());
        assert!(!accounts.update_phone("nobody", "1").unwrap());
        assert!(!accounts.delete_account("nobody").unwrap());
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_update_password_changes_credentials() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();

        assert!(accounts.update_password("alice", "new-secret").unwrap());
        assert!(!accounts.verify_credentials("alice", "secret"));
        assert!(accounts.verify_credentials("alice", "new-secret"));
    }

    #[test]
    fn test_update_fullname_persists() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();
        accounts.update_fullname("alice", "Alice Anderson").unwrap();

        let reloaded = env.account_database().unwrap();
        assert_eq!(reloaded.lookup("alice").unwrap().fullname(), "Alice Anderson");
    }

    #[test]
    fn test_delete_account_leaves_child_directory() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();
        env.child_database("alice").unwrap().add_child("Sam").unwrap();

        assert!(accounts.delete_account("alice").unwrap());
        assert!(accounts.lookup("alice").is_none());
        assert!(env.base_path.join("alice").join("Sam").join("fr.dat").exists());
    }

    #[test]
    fn test_try_create_account_rejects_duplicate() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();

        let result = accounts.try_create_account("alice", "Other Alice", "pw");
        assert!(matches!(result, Err(StoreError::DuplicateEntity { .. })));
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts.lookup("alice").unwrap().fullname(), "Alice A");
    }

    #[test]
    fn test_malformed_lines_are_dropped_and_normalised() {
        let env = TestEnvironment::new().unwrap();
        let digest = hash("secret");
        fs::write(
            env.base_path.join("accounts.dat"),
            format!("alice,Alice A,{digest}\nbroken line\n\ncarol,Carol C,{digest},extra\n"),
        )
        .unwrap();
        fs::write(
            env.base_path.join("extrafields.dat"),
            "alice,,555\nghost,ghost@example.com,\nalice,only-two\n",
        )
        .unwrap();

        let accounts = env.account_database().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts.lookup("alice").unwrap().phone(), "555");
        assert_eq!(accounts.load_report(), LoadReport { loaded: 2, skipped: 4 });

        assert_eq!(
            fs::read_to_string(env.base_path.join("accounts.dat")).unwrap(),
            format!("alice,Alice A,{digest}\n")
        );
        assert_eq!(
            fs::read_to_string(env.base_path.join("extrafields.dat")).unwrap(),
            "alice,,555\n"
        );
    }

    #[test]
    fn test_unterminated_quote_keeps_later_accounts_on_disk() {
        let env = TestEnvironment::new().unwrap();
        fs::write(
            env.base_path.join("accounts.dat"),
            "alice,\"Alice,x\nbob,Bob B,h\ncarol,Carol C,h\n",
        )
        .unwrap();

        let accounts = env.account_database().unwrap();
        let usernames: Vec<&str> = accounts.accounts().iter().map(|a| a.username()).collect();
        assert_eq!(usernames, vec!["bob", "carol"]);
        assert_eq!(accounts.load_report(), LoadReport { loaded: 2, skipped: 1 });

        // the initial sync rewrites the file without the undecodable line only
        assert_eq!(
            fs::read_to_string(env.base_path.join("accounts.dat")).unwrap(),
            "bob,Bob B,h\ncarol,Carol C,h\n"
        );
        assert!(env.account_database().unwrap().lookup("carol").is_some());
    }

    #[test]
    fn test_sync_is_idempotent() {
        let env = TestEnvironment::new().unwrap();
        let mut accounts = env.account_database().unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();
        accounts.create_account("bob", "Bob B", "pw").unwrap();

        accounts.sync().unwrap();
        let first = fs::read(env.base_path.join("accounts.dat")).unwrap();
        let first_extra = fs::read(env.base_path.join("extrafields.dat")).unwrap();
        accounts.sync().unwrap();
        assert_eq!(fs::read(env.base_path.join("accounts.dat")).unwrap(), first);
        assert_eq!(fs::read(env.base_path.join("extrafields.dat")).unwrap(), first_extra);
    }

    #[test]
    fn test_unknown_algorithm_prevents_initialisation() {
        let env = TestEnvironment::new().unwrap();
        let config = StoreConfig::default()
            .with_data_directory(&env.base_path)
            .with_hash_algorithm("md5");

        let result = AccountDatabase::from_config(&config);
        assert!(matches!(result, Err(StoreError::HashUnavailable(_))));
        assert!(!env.base_path.join("accounts.dat").exists());
    }

    #[test]
    fn test_from_config_uses_configured_algorithm() {
        let env = TestEnvironment::new().unwrap();
        let config = StoreConfig::default()
            .with_data_directory(&env.base_path)
            .with_hash_algorithm("sha256");

        let mut accounts = AccountDatabase::from_config(&config).unwrap();
        accounts.create_account("alice", "Alice A", "secret").unwrap();
        assert_eq!(
            accounts.lookup("alice").unwrap().password_hash(),
            HashAlgorithm::Sha256.digest("secret")
        );
        assert!(accounts.verify_credentials("alice", "secret"));
    }
}
