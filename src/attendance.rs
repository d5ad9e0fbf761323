//! Subject attendance tracking.
//!
//! Every edit goes through the pure functions below, which keep
//! `1 <= total_classes` and `attended_classes <= total_classes` and recompute
//! the derived percentage. Out-of-range requests leave the record unchanged
//! instead of failing.

use crate::ids::IdGen;
use crate::kv::{KvStore, Slot};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

pub const SLOT_KEY: &str = "attendanceSubjects";

/// Attendance at or above this is considered on track.
pub const TARGET_PERCENT: Percent = Percent(7_500);

/// A percentage held as an exact count of hundredths (`80.00` is `8000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent(u32);

impl Percent {
    /// `attended / total * 100`, rounded half-up to two decimals.
    pub fn of(attended: u32, total: u32) -> Self {
        if total == 0 {
            return Percent(0);
        }
        let num = u64::from(attended) * 10_000;
        let den = u64::from(total);
        let hundredths = (2 * num + den) / (2 * den);
        Percent(u32::try_from(hundredths).unwrap_or(u32::MAX))
    }

    fn try_from_f64(v: f64) -> Option<Self> {
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        let hundredths = (v * 100.0).round();
        if hundredths > f64::from(u32::MAX) {
            return None;
        }
        Some(Percent(hundredths as u32))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Percent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("not a percentage: {s:?}"))?;
        Percent::try_from_f64(v).ok_or_else(|| format!("percentage out of range: {s:?}"))
    }
}

// Persisted as a fixed two-decimal string ("88.89"); numbers are accepted on read.
impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(v) => Percent::try_from_f64(v)
                .ok_or_else(|| serde::de::Error::custom(format!("percentage out of range: {v}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: i64,
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
    pub attendance: Percent,
}

impl SubjectRecord {
    pub fn on_track(&self) -> bool {
        self.attendance >= TARGET_PERCENT
    }

    fn with_counts(&self, total: u32, attended: u32) -> SubjectRecord {
        SubjectRecord {
            total_classes: total,
            attended_classes: attended,
            attendance: Percent::of(attended, total),
            ..self.clone()
        }
    }

    /// Re-establishes the record invariants on data read back from storage.
    /// Returns `None` for records with a blank name.
    fn normalized(self) -> Option<SubjectRecord> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let total = self.total_classes.max(1);
        let attended = self.attended_classes.min(total);
        Some(SubjectRecord {
            name,
            ..self.with_counts(total, attended)
        })
    }
}

/// Why a new subject was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRejected {
    BlankName,
    TotalNotPositive,
    AttendedOutOfRange,
}

impl fmt::Display for SubjectRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SubjectRejected::BlankName => "subject name must not be empty",
            SubjectRejected::TotalNotPositive => "total classes must be greater than 0",
            SubjectRejected::AttendedOutOfRange => {
                "classes attended must be between 0 and total classes"
            }
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SubjectRejected {}

/// One edit to an existing subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    SetAttended(i64),
    SetTotal(i64),
    IncrementAttended,
    DecrementAttended,
    IncrementTotal,
    DecrementTotal,
}

pub fn apply(record: &SubjectRecord, edit: Edit) -> SubjectRecord {
    match edit {
        Edit::SetAttended(n) => set_attended(record, n),
        Edit::SetTotal(n) => set_total(record, n),
        Edit::IncrementAttended => increment_attended(record),
        Edit::DecrementAttended => decrement_attended(record),
        Edit::IncrementTotal => increment_total(record),
        Edit::DecrementTotal => decrement_total(record),
    }
}

pub fn set_attended(record: &SubjectRecord, n: i64) -> SubjectRecord {
    match u32::try_from(n) {
        Ok(n) if n <= record.total_classes => record.with_counts(record.total_classes, n),
        _ => record.clone(),
    }
}

pub fn set_total(record: &SubjectRecord, n: i64) -> SubjectRecord {
    match u32::try_from(n) {
        Ok(n) if n >= 1 => record.with_counts(n, record.attended_classes.min(n)),
        _ => record.clone(),
    }
}

pub fn increment_attended(record: &SubjectRecord) -> SubjectRecord {
    let attended = record
        .attended_classes
        .saturating_add(1)
        .min(record.total_classes);
    record.with_counts(record.total_classes, attended)
}

pub fn decrement_attended(record: &SubjectRecord) -> SubjectRecord {
    record.with_counts(record.total_classes, record.attended_classes.saturating_sub(1))
}

pub fn increment_total(record: &SubjectRecord) -> SubjectRecord {
    record.with_counts(record.total_classes.saturating_add(1), record.attended_classes)
}

pub fn decrement_total(record: &SubjectRecord) -> SubjectRecord {
    let total = record.total_classes.saturating_sub(1).max(1);
    record.with_counts(total, record.attended_classes.min(total))
}

/// Ordered, persisted collection of subjects.
pub struct SubjectStore {
    subjects: Vec<SubjectRecord>,
    ids: IdGen,
    slot: Slot,
}

impl SubjectStore {
    pub fn load(kv: Rc<dyn KvStore>) -> Self {
        let slot = Slot::new(kv, SLOT_KEY);
        let subjects: Vec<SubjectRecord> = slot
            .load::<Vec<SubjectRecord>>()
            .unwrap_or_default()
            .into_iter()
            .filter_map(SubjectRecord::normalized)
            .collect();
        tracing::info!(count = subjects.len(), "attendance subjects loaded");
        let ids = IdGen::above(subjects.iter().map(|s| s.id));
        Self {
            subjects,
            ids,
            slot,
        }
    }

    pub fn subjects(&self) -> &[SubjectRecord] {
        &self.subjects
    }

    pub fn add(
        &mut self,
        name: &str,
        total: i64,
        attended: i64,
    ) -> Result<&SubjectRecord, SubjectRejected> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubjectRejected::BlankName);
        }
        let total = match u32::try_from(total) {
            Ok(t) if t >= 1 => t,
            _ => return Err(SubjectRejected::TotalNotPositive),
        };
        let attended = match u32::try_from(attended) {
            Ok(a) if a <= total => a,
            _ => return Err(SubjectRejected::AttendedOutOfRange),
        };

        let record = SubjectRecord {
            id: self.ids.next_id(),
            name: name.to_string(),
            total_classes: total,
            attended_classes: attended,
            attendance: Percent::of(attended, total),
        };
        tracing::debug!(id = record.id, name = %record.name, "subject added");
        self.subjects.push(record);
        self.persist();
        Ok(&self.subjects[self.subjects.len() - 1])
    }

    /// Returns whether a subject was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.subjects.len();
        self.subjects.retain(|s| s.id != id);
        if self.subjects.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Applies `edit` in place. Returns the resulting record and whether it
    /// changed, or `None` when no subject has `id`.
    pub fn mutate(&mut self, id: i64, edit: Edit) -> Option<(&SubjectRecord, bool)> {
        let idx = self.subjects.iter().position(|s| s.id == id)?;
        let next = apply(&self.subjects[idx], edit);
        let changed = next != self.subjects[idx];
        if changed {
            self.subjects[idx] = next;
            self.persist();
        }
        Some((&self.subjects[idx], changed))
    }

    pub fn clear(&mut self) {
        self.subjects.clear();
        self.slot.clear();
    }

    fn persist(&self) {
        self.slot.save(&self.subjects);
    }
}
