//! # Record Codec
//!
//! Reading and writing the headerless, comma-separated `.dat` files.
//!
//! Every file is one logical record per `\n`-terminated line. Each line is
//! decoded with its own flexible `csv` reader, so a line with the wrong number
//! of fields or broken quoting is seen (and skipped) without touching the
//! lines around it. Writing goes through a `csv` writer, which quotes a field
//! only when it contains `,` or `"`; ordinary data is written as plain `a,b,c`
//! lines. Line breaks inside a field are written as spaces so a row never
//! spans two lines.

use csv::{Position, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use shared::{
    format_timestamp, parse_timestamp, DiaperChangeRecord, FeedingRecord, GrowthData, MedicationRecord,
    SleepSession,
};

use crate::error::{Result, StoreError};

/// How many lines a store accepted and dropped while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
    }
}

/// Read every line of `path` as a raw record
///
/// The file is split on `\n` before any csv decoding, so each line is decoded
/// on its own: a quoted field left open runs to the end of its line and no
/// further. Lines that cannot be decoded (invalid UTF-8, an unterminated quote)
/// are dropped and counted in `report`; only a failure to read the file itself
/// is an error. Blank lines are ignored.
pub fn read_records(path: &Path, report: &mut LoadReport) -> Result<Vec<StringRecord>> {
    let contents = fs::read(path).map_err(|e| StoreError::io(path, e))?;

    let mut records = Vec::new();
    for (index, line) in contents.split(|&byte| byte == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        match decode_line(line) {
            Ok(mut record) => {
                let mut position = Position::new();
                position.set_line(index as u64 + 1);
                record.set_position(Some(position));
                records.push(record);
            }
            Err(reason) => {
                warn!("Skipping undecodable line {} in {}: {}", index + 1, path.display(), reason);
                report.skipped += 1;
            }
        }
    }
    Ok(records)
}

fn decode_line(line: &[u8]) -> std::result::Result<StringRecord, String> {
    let text = std::str::from_utf8(line).map_err(|e| e.to_string())?;
    if has_unterminated_quote(text) {
        return Err("unterminated quoted field".to_string());
    }

    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(line);
    match reader.records().next() {
        Some(record) => record.map_err(|e| e.to_string()),
        None => Err("no fields".to_string()),
    }
}

/// Whether a field opened with `"` is still open at the end of `line`
///
/// Follows the csv reader's rules: a quote only opens a quoted field at the
/// start of a field, and `""` inside one is an escaped quote. A stray quote in
/// the middle of an unquoted field is plain text.
fn has_unterminated_quote(line: &str) -> bool {
    let mut chars = line.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' => at_field_start = true,
            _ => at_field_start = false,
        }
    }
    in_quotes
}

/// Replace the contents of `path` with one line per row
pub fn write_records<I, R>(path: &Path, rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| StoreError::io(path, e.into()))?;

    let mut count = 0usize;
    for row in rows {
        let row: Vec<Vec<u8>> = row.into_iter().map(|field| single_line(field.as_ref())).collect();
        writer.write_record(&row).map_err(|e| StoreError::io(path, e.into()))?;
        count += 1;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;

    debug!("Wrote {} lines to {}", count, path.display());
    Ok(())
}

fn single_line(field: &[u8]) -> Vec<u8> {
    field
        .iter()
        .map(|&byte| if byte == b'\n' || byte == b'\r' { b' ' } else { byte })
        .collect()
}

/// A record kind that maps to exactly one line of a record file
pub trait CsvLine: Sized {
    /// Number of fields a well-formed line carries
    const FIELDS: usize;

    /// Decode a line whose field count is already known to be `FIELDS`
    fn from_fields(fields: &StringRecord) -> Option<Self>;

    fn to_fields(&self) -> Vec<String>;
}

/// Load every well-formed line of a record file
///
/// A line with the wrong field count, or a field that does not parse, is
/// skipped on its own; the rest of the file still loads.
pub fn load_lines<T: CsvLine>(path: &Path, report: &mut LoadReport) -> Result<Vec<T>> {
    let mut lines = Vec::new();
    for record in read_records(path, report)? {
        let parsed = if record.len() == T::FIELDS {
            T::from_fields(&record)
        } else {
            None
        };

        match parsed {
            Some(line) => {
                lines.push(line);
                report.loaded += 1;
            }
            None => {
                warn!(
                    "Skipping malformed line {} in {}",
                    record.position().map(|p| p.line()).unwrap_or_default(),
                    path.display()
                );
                report.skipped += 1;
            }
        }
    }
    Ok(lines)
}

pub fn store_lines<T: CsvLine>(path: &Path, lines: &[T]) -> Result<()> {
    write_records(path, lines.iter().map(|line| line.to_fields()))
}

fn timestamp_field(fields: &StringRecord, index: usize) -> Option<NaiveDateTime> {
    fields.get(index).and_then(parse_timestamp)
}

fn number_field(fields: &StringRecord, index: usize) -> Option<f64> {
    fields.get(index)?.trim().parse().ok()
}

fn text_field(fields: &StringRecord, index: usize) -> Option<String> {
    fields.get(index).map(str::to_string)
}

impl CsvLine for DiaperChangeRecord {
    const FIELDS: usize = 2;

    fn from_fields(fields: &StringRecord) -> Option<Self> {
        Some(DiaperChangeRecord::new(timestamp_field(fields, 0)?, text_field(fields, 1)?))
    }

    fn to_fields(&self) -> Vec<String> {
        vec![format_timestamp(&self.time()), self.change_type().to_string()]
    }
}

impl CsvLine for FeedingRecord {
    const FIELDS: usize = 3;

    fn from_fields(fields: &StringRecord) -> Option<Self> {
        Some(FeedingRecord::new(
            timestamp_field(fields, 0)?,
            text_field(fields, 1)?,
            number_field(fields, 2)?,
        ))
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.time()),
            self.feeding_type().to_string(),
            self.amount().to_string(),
        ]
    }
}

impl CsvLine for GrowthData {
    const FIELDS: usize = 3;

    fn from_fields(fields: &StringRecord) -> Option<Self> {
        Some(GrowthData::new(
            timestamp_field(fields, 0)?,
            number_field(fields, 1)?,
            number_field(fields, 2)?,
        ))
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.time()),
            self.weight().to_string(),
            self.height().to_string(),
        ]
    }
}

impl CsvLine for MedicationRecord {
    const FIELDS: usize = 3;

    fn from_fields(fields: &StringRecord) -> Option<Self> {
        Some(MedicationRecord::new(
            timestamp_field(fields, 0)?,
            text_field(fields, 1)?,
            number_field(fields, 2)?,
        ))
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.time()),
            self.name().to_string(),
            self.dosage().to_string(),
        ]
    }
}

impl CsvLine for SleepSession {
    const FIELDS: usize = 3;

    fn from_fields(fields: &StringRecord) -> Option<Self> {
        Some(SleepSession::new(
            timestamp_field(fields, 0)?,
            timestamp_field(fields, 1)?,
            timestamp_field(fields, 2)?,
        ))
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.record_time()),
            format_timestamp(&self.start_time()),
            format_timestamp(&self.end_time()),
        ]
    }
}
