//! # Child Database
//!
//! One owner's children and their records, mirrored to disk as:
//!
//! ```text
//! data/
//! └── {owner}/
//!     ├── children.dat        one child name per line
//!     └── {child_name}/
//!         ├── dr.dat          timestamp,type
//!         ├── fr.dat          timestamp,type,amount
//!         ├── gr.dat          timestamp,weight,height
//!         ├── mr.dat          timestamp,name,dosage
//!         └── sr.dat          recordTimestamp,startTimestamp,endTimestamp
//! ```
//!
//! Callers mutate children through [`ChildDatabase::lookup_mut`] and then call
//! [`ChildDatabase::sync`]; only adding, renaming and deleting children persist
//! on their own.

use log::{debug, info, warn};
use std::fs;
use std::path::Path;

use shared::{Child, DiaperChangeRecord, FeedingRecord, GrowthData, MedicationRecord, SleepSession};

use super::connection::{validate_path_segment, CsvConnection, RecordFile};
use super::record_codec::{load_lines, read_records, store_lines, write_records, CsvLine, LoadReport};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

pub struct ChildDatabase {
    connection: CsvConnection,
    owner: String,
    children: Vec<Child>,
    load_report: LoadReport,
}

impl ChildDatabase {
    pub fn from_config(config: &StoreConfig, owner: &str) -> Result<Self> {
        let connection = CsvConnection::from_config(config)?;
        Self::initialize(connection, owner)
    }

    /// Load every child of `owner`, creating the owner directory, the name list
    /// and any missing record files on the way
    pub fn initialize(connection: CsvConnection, owner: &str) -> Result<Self> {
        let children_path = connection.children_file_path(owner)?;
        CsvConnection::ensure_file_exists(&children_path)
            .map_err(|e| StoreError::configuration(&children_path, e))?;

        let mut database = Self {
            connection,
            owner: owner.to_string(),
            children: Vec::new(),
            load_report: LoadReport::default(),
        };
        database.load_children(&children_path)?;

        for index in 0..database.children.len() {
            database.load_child_records(index)?;
        }

        info!(
            "Loaded {} children for '{}' ({} lines skipped)",
            database.children.len(),
            database.owner,
            database.load_report.skipped
        );
        Ok(database)
    }

    fn load_children(&mut self, children_path: &Path) -> Result<()> {
        for record in read_records(children_path, &mut self.load_report)? {
            let name = record.get(0).unwrap_or_default();
            if record.len() != 1 || name.trim().is_empty() {
                if record.len() != 1 {
                    warn!("Skipping malformed child name line in {}", children_path.display());
                    self.load_report.skipped += 1;
                }
                continue;
            }
            if validate_path_segment(name).is_err() {
                warn!("Skipping child name unusable as a directory: {:?}", name);
                self.load_report.skipped += 1;
                continue;
            }
            if self.lookup(name).is_some() {
                warn!("Skipping duplicate child '{}'", name);
                self.load_report.skipped += 1;
                continue;
            }
            self.children.push(Child::new(name));
            self.load_report.loaded += 1;
        }
        Ok(())
    }

    fn load_child_records(&mut self, index: usize) -> Result<()> {
        let name = self.children[index].name().to_string();
        for record_file in RecordFile::ALL {
            let path = self.connection.record_file_path(&self.owner, &name, record_file)?;
            CsvConnection::ensure_file_exists(&path).map_err(|e| StoreError::configuration(&path, e))?;
        }

        let mut report = LoadReport::default();
        let diaper_changes: Vec<DiaperChangeRecord> =
            self.load_record_file(&name, RecordFile::DiaperChange, &mut report)?;
        let feedings: Vec<FeedingRecord> = self.load_record_file(&name, RecordFile::Feeding, &mut report)?;
        let growth: Vec<GrowthData> = self.load_record_file(&name, RecordFile::Growth, &mut report)?;
        let medications: Vec<MedicationRecord> =
            self.load_record_file(&name, RecordFile::Medication, &mut report)?;
        let sleeps: Vec<SleepSession> = self.load_record_file(&name, RecordFile::Sleep, &mut report)?;

        let child = &mut self.children[index];
        diaper_changes.into_iter().for_each(|r| child.add_diaper_change_record(r));
        feedings.into_iter().for_each(|r| child.add_feeding_record(r));
        growth.into_iter().for_each(|r| child.add_growth_record(r));
        medications.into_iter().for_each(|r| child.add_medication_record(r));
        sleeps.into_iter().for_each(|r| child.add_sleep_record(r));

        debug!("Loaded {} records for child '{}'", report.loaded, name);
        self.load_report.merge(report);
        Ok(())
    }

    fn load_record_file<T: CsvLine>(
        &self,
        child_name: &str,
        record_file: RecordFile,
        report: &mut LoadReport,
    ) -> Result<Vec<T>> {
        let path = self.connection.record_file_path(&self.owner, child_name, record_file)?;
        load_lines(&path, report)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    /// All children in load/insertion order
    pub fn get_all(&self) -> &[Child] {
        &self.children
    }

    pub fn lookup(&self, name: &str) -> Option<&Child> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Mutable access for adding or deleting records; call [`sync`](Self::sync) afterwards
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Child> {
        self.children.iter_mut().find(|c| c.name() == name)
    }

    /// Append a new child and persist
    pub fn add_child(&mut self, name: &str) -> Result<()> {
        if self.lookup(name).is_some() {
            return Err(StoreError::DuplicateEntity {
                kind: "Child",
                key: name.to_string(),
            });
        }
        validate_path_segment(name)?;

        self.children.push(Child::new(name));
        info!("Added child '{}' for '{}'", name, self.owner);
        self.sync()
    }

    /// Remove a child, persist the name list, then remove its files
    ///
    /// Removing the record files and directory is best effort: failures are
    /// logged and the call still succeeds.
    pub fn delete_child(&mut self, name: &str) -> Result<bool> {
        let position = match self.children.iter().position(|c| c.name() == name) {
            Some(position) => position,
            None => return Ok(false),
        };
        self.children.remove(position);
        self.sync()?;

        self.remove_child_files(name);
        info!("Deleted child '{}' for '{}'", name, self.owner);
        Ok(true)
    }

    /// Rename a child, keeping its position and every record
    pub fn rename_child(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let position = self
            .children
            .iter()
            .position(|c| c.name() == old_name)
            .ok_or_else(|| StoreError::NotFound {
                kind: "Child",
                key: old_name.to_string(),
            })?;
        if self.lookup(new_name).is_some() {
            return Err(StoreError::DuplicateEntity {
                kind: "Child",
                key: new_name.to_string(),
            });
        }
        validate_path_segment(new_name)?;

        let child = self.children.remove(position);
        self.children.insert(position, child.renamed(new_name));
        self.sync()?;

        self.remove_child_files(old_name);
        info!("Renamed child '{}' to '{}' for '{}'", old_name, new_name, self.owner);
        Ok(())
    }

    fn remove_child_files(&self, name: &str) {
        let child_dir = match self.connection.child_directory(&self.owner, name) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Not removing files for child '{}': {}", name, e);
                return;
            }
        };

        for record_file in RecordFile::ALL {
            let path = child_dir.join(record_file.file_name());
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
        // Only succeeds once the directory is empty
        if let Err(e) = fs::remove_dir(&child_dir) {
            warn!("Failed to remove child directory {}: {}", child_dir.display(), e);
        }
    }

    /// Rewrite the name list and all five record files of every child
    pub fn sync(&self) -> Result<()> {
        let children_path = self.connection.children_file_path(&self.owner)?;
        if let Some(owner_dir) = children_path.parent() {
            CsvConnection::ensure_directory_exists(owner_dir).map_err(|e| StoreError::io(owner_dir, e))?;
        }
        write_records(&children_path, self.children.iter().map(|c| [c.name()]))?;

        for child in &self.children {
            self.sync_child(child)?;
        }
        debug!("Synced {} children for '{}'", self.children.len(), self.owner);
        Ok(())
    }

    fn sync_child(&self, child: &Child) -> Result<()> {
        let child_dir = self.connection.child_directory(&self.owner, child.name())?;
        CsvConnection::ensure_directory_exists(&child_dir).map_err(|e| StoreError::io(&child_dir, e))?;

        let path_for = |record_file: RecordFile| child_dir.join(record_file.file_name());
        store_lines(&path_for(RecordFile::DiaperChange), child.diaper_change_records())?;
        store_lines(&path_for(RecordFile::Feeding), child.feeding_records())?;
        store_lines(&path_for(RecordFile::Growth), child.growth_records())?;
        store_lines(&path_for(RecordFile::Medication), child.medication_records())?;
        store_lines(&path_for(RecordFile::Sleep), child.sleep_records())?;
        Ok(())
    }
}
