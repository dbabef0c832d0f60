use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical on-disk timestamp grammar: ISO local date-time, no zone.
/// `%.f` only emits a fractional part when the nanoseconds are non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Minute-precision form written by older data files when seconds were zero.
const TIMESTAMP_FORMAT_MINUTES: &str = "%Y-%m-%dT%H:%M";

/// Render a timestamp in the canonical grammar
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by [`format_timestamp`]
///
/// Returns `None` when the text matches neither the canonical grammar nor its
/// minute-precision form.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT_MINUTES))
        .ok()
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A login identity with profile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    username: String,
    fullname: String,
    password_hash: String,
    email: String,
    phone: String,
}

impl Account {
    /// Email and phone start out empty
    pub fn new(username: impl Into<String>, fullname: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            fullname: fullname.into(),
            password_hash: password_hash.into(),
            email: String::new(),
            phone: String::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn set_fullname(&mut self, fullname: impl Into<String>) {
        self.fullname = fullname.into();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }
}

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// A single feeding (bottle, breast, solids, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingRecord {
    time: NaiveDateTime,
    feeding_type: String,
    /// Amount in millilitres
    amount: f64,
}

impl FeedingRecord {
    pub fn new(time: NaiveDateTime, feeding_type: impl Into<String>, amount: f64) -> Self {
        Self {
            time,
            feeding_type: feeding_type.into(),
            amount,
        }
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn feeding_type(&self) -> &str {
        &self.feeding_type
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl fmt::Display for FeedingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Feeding: {} at {}, Amount: {} ml",
            self.feeding_type,
            format_timestamp(&self.time),
            self.amount
        )
    }
}

/// A sleep session, with the time it was logged and the time span slept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSession {
    record_time: NaiveDateTime,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

impl SleepSession {
    pub fn new(record_time: NaiveDateTime, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            record_time,
            start_time,
            end_time,
        }
    }

    pub fn record_time(&self) -> NaiveDateTime {
        self.record_time
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    /// Whole hours between start and end, truncated toward zero
    pub fn duration_hours(&self) -> i64 {
        (self.end_time - self.start_time).num_hours()
    }
}

impl fmt::Display for SleepSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Slept from {} to {}, Duration: {} hours",
            format_timestamp(&self.start_time),
            format_timestamp(&self.end_time),
            self.duration_hours()
        )
    }
}

/// A dose of medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    time: NaiveDateTime,
    name: String,
    /// Dosage in milligrams
    dosage: f64,
}

impl MedicationRecord {
    pub fn new(time: NaiveDateTime, name: impl Into<String>, dosage: f64) -> Self {
        Self {
            time,
            name: name.into(),
            dosage,
        }
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dosage(&self) -> f64 {
        self.dosage
    }
}

impl fmt::Display for MedicationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Medication: {} at {}, Dosage: {} mg",
            self.name,
            format_timestamp(&self.time),
            self.dosage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaperChangeRecord {
    time: NaiveDateTime,
    change_type: String,
}

impl DiaperChangeRecord {
    pub fn new(time: NaiveDateTime, change_type: impl Into<String>) -> Self {
        Self {
            time,
            change_type: change_type.into(),
        }
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn change_type(&self) -> &str {
        &self.change_type
    }
}

impl fmt::Display for DiaperChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Diaper Change: {} at {}", self.change_type, format_timestamp(&self.time))
    }
}

/// A growth measurement: weight in kilograms, height in centimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthData {
    time: NaiveDateTime,
    weight: f64,
    height: f64,
}

impl GrowthData {
    pub fn new(time: NaiveDateTime, weight: f64, height: f64) -> Self {
        Self { time, weight, height }
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl fmt::Display for GrowthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Growth Data: Weight: {} kg, Height: {} cm at {}",
            self.weight,
            self.height,
            format_timestamp(&self.time)
        )
    }
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// A tracked child and its five record collections
///
/// Records are addressed by position: index `i` of a collection is the row a
/// caller displayed, and deleting it shifts every later record down by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    name: String,
    sleep_records: Vec<SleepSession>,
    feeding_records: Vec<FeedingRecord>,
    medication_records: Vec<MedicationRecord>,
    diaper_change_records: Vec<DiaperChangeRecord>,
    growth_records: Vec<GrowthData>,
}

/// `Vec::remove` that reports an out-of-range index instead of panicking
fn remove_at<T>(records: &mut Vec<T>, index: usize) -> Option<T> {
    if index < records.len() {
        Some(records.remove(index))
    } else {
        None
    }
}

impl Child {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sleep_records: Vec::new(),
            feeding_records: Vec::new(),
            medication_records: Vec::new(),
            diaper_change_records: Vec::new(),
            growth_records: Vec::new(),
        }
    }

    /// The same child, records untouched, under a different name
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sleep_records(&self) -> &[SleepSession] {
        &self.sleep_records
    }

    pub fn feeding_records(&self) -> &[FeedingRecord] {
        &self.feeding_records
    }

    pub fn medication_records(&self) -> &[MedicationRecord] {
        &self.medication_records
    }

    pub fn diaper_change_records(&self) -> &[DiaperChangeRecord] {
        &self.diaper_change_records
    }

    pub fn growth_records(&self) -> &[GrowthData] {
        &self.growth_records
    }

    pub fn add_sleep_record(&mut self, session: SleepSession) {
        self.sleep_records.push(session);
    }

    pub fn add_feeding_record(&mut self, record: FeedingRecord) {
        self.feeding_records.push(record);
    }

    pub fn add_medication_record(&mut self, record: MedicationRecord) {
        self.medication_records.push(record);
    }

    pub fn add_diaper_change_record(&mut self, record: DiaperChangeRecord) {
        self.diaper_change_records.push(record);
    }

    pub fn add_growth_record(&mut self, record: GrowthData) {
        self.growth_records.push(record);
    }

    pub fn delete_sleep_record(&mut self, index: usize) -> Option<SleepSession> {
        remove_at(&mut self.sleep_records, index)
    }

    pub fn delete_feeding_record(&mut self, index: usize) -> Option<FeedingRecord> {
        remove_at(&mut self.feeding_records, index)
    }

    pub fn delete_medication_record(&mut self, index: usize) -> Option<MedicationRecord> {
        remove_at(&mut self.medication_records, index)
    }

    pub fn delete_diaper_change_record(&mut self, index: usize) -> Option<DiaperChangeRecord> {
        remove_at(&mut self.diaper_change_records, index)
    }

    pub fn delete_growth_record(&mut self, index: usize) -> Option<GrowthData> {
        remove_at(&mut self.growth_records, index)
    }
}
