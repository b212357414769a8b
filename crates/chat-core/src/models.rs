use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::time_utils::{month_name, weekday_name};

/// Sender value used for system and group notifications (membership changes,
/// subject edits, encryption notices).
pub const GROUP_NOTIFICATION: &str = "group_notification";

/// Participant selector that disables sender filtering.
pub const OVERALL: &str = "Overall";

/// A single message parsed from a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Local wall-clock time printed in the message header.
    pub timestamp: NaiveDateTime,
    /// Display name of the sender, or [`GROUP_NOTIFICATION`].
    pub sender: String,
    /// Message text; continuation lines are joined with `\n`.
    pub body: String,
    /// Calendar fields derived from `timestamp` once at parse time.
    #[serde(flatten)]
    pub calendar: CalendarFields,
}

impl MessageRecord {
    /// Build a record and derive its calendar fields.
    pub fn new(timestamp: NaiveDateTime, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            body: body.into(),
            calendar: CalendarFields::from_timestamp(&timestamp),
        }
    }

    /// Whether this record is a system notification rather than a human message.
    pub fn is_notification(&self) -> bool {
        self.sender == GROUP_NOTIFICATION
    }
}

/// Calendar breakdown of a record's timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    /// English month name, e.g. `"January"`.
    pub month: String,
    /// Month number, 1–12.
    pub month_num: u32,
    pub day: u32,
    /// English weekday name, e.g. `"Monday"`.
    pub day_name: String,
    /// Hour of day, 0–23.
    pub hour: u32,
    pub minute: u32,
}

impl CalendarFields {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: month_name(ts.month()).to_string(),
            month_num: ts.month(),
            day: ts.day(),
            day_name: weekday_name(ts.weekday()).to_string(),
            hour: ts.hour(),
            minute: ts.minute(),
        }
    }
}

// ── Participant ───────────────────────────────────────────────────────────────

/// Which sender a statistic is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Participant {
    /// Every record, notifications included.
    #[default]
    Overall,
    /// Only records whose sender equals this name exactly.
    Named(String),
}

impl Participant {
    /// `true` when `record` belongs to this selection.
    pub fn matches(&self, record: &MessageRecord) -> bool {
        match self {
            Participant::Overall => true,
            Participant::Named(name) => record.sender == *name,
        }
    }

    /// Borrow the records belonging to this selection, in transcript order.
    pub fn filter<'a>(&self, records: &'a [MessageRecord]) -> Vec<&'a MessageRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

impl From<&str> for Participant {
    fn from(s: &str) -> Self {
        if s == OVERALL {
            Participant::Overall
        } else {
            Participant::Named(s.to_string())
        }
    }
}

impl From<String> for Participant {
    fn from(s: String) -> Self {
        if s == OVERALL {
            Participant::Overall
        } else {
            Participant::Named(s)
        }
    }
}

impl From<Participant> for String {
    fn from(p: Participant) -> Self {
        match p {
            Participant::Overall => OVERALL.to_string(),
            Participant::Named(name) => name,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Overall => f.write_str(OVERALL),
            Participant::Named(name) => f.write_str(name),
        }
    }
}

// ── ChatSession ───────────────────────────────────────────────────────────────

/// The parsed records of one transcript, held immutably for an analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatSession {
    records: Vec<MessageRecord>,
}

impl ChatSession {
    pub fn new(records: Vec<MessageRecord>) -> Self {
        Self { records }
    }

    /// All records in transcript order.
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct human senders, sorted, without [`GROUP_NOTIFICATION`].
    pub fn senders(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.is_notification())
            .map(|r| r.sender.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Resolve a selector typed by the user against this transcript.
    pub fn resolve_participant(&self, name: &str) -> Result<Participant> {
        let participant = Participant::from(name);
        match &participant {
            Participant::Overall => Ok(participant),
            Participant::Named(n) if self.records.iter().any(|r| r.sender == *n) => {
                Ok(participant)
            }
            Participant::Named(n) => Err(AnalyzerError::UnknownParticipant(n.clone())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
