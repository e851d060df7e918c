use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{KstudyError, Result};

/// A single timed caption line, in the transcript service's layout.
///
/// Offsets are finite and non-negative; deserialized entries go through the
/// same check as [`CaptionEntry::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCaptionEntry")]
pub struct CaptionEntry {
    text: String,
    start: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct RawCaptionEntry {
    text: String,
    start: f64,
    duration: f64,
}

impl TryFrom<RawCaptionEntry> for CaptionEntry {
    type Error = KstudyError;

    fn try_from(raw: RawCaptionEntry) -> Result<Self> {
        Self::new(raw.text, raw.start, raw.duration)
    }
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Result<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(KstudyError::invalid_input(format!(
                "caption start must be a non-negative number, got {start}"
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(KstudyError::invalid_input(format!(
                "caption duration must be a non-negative number, got {duration}"
            )));
        }
        Ok(Self {
            text: text.into(),
            start,
            duration,
        })
    }

    /// Entry from millisecond offsets, which are always in range.
    pub(crate) fn from_millis(text: String, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            text,
            start: start_ms as f64 / 1000.0,
            duration: duration_ms as f64 / 1000.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionMatch {
    /// Position of the matched entry in the searched sequence
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankableItem {
    pub id: String,
    pub metric: u64,
}

/// An arbitrary record paired with its resolved popularity metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    pub item: T,
    pub metric: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tutor,
    Learner,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Tutor => "tutor",
            Role::Learner => "learner",
        }
    }
}

/// One participant's availability on a date. Built through
/// `AvailabilityInterval::new`, `parse` or an `AvailabilityRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityInterval {
    pub(crate) role: Role,
    pub(crate) date: NaiveDate,
    pub(crate) start: NaiveTime,
    pub(crate) end: NaiveTime,
}

impl AvailabilityInterval {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

/// Video metadata as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMatches {
    pub video: VideoSummary,
    pub view_count: u64,
    pub matches: Vec<CaptionMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_entry_rejects_negative_offsets() {
        assert!(CaptionEntry::new("안녕", -1.0, 2.0).is_err());
        assert!(CaptionEntry::new("안녕", 1.0, -2.0).is_err());
        assert!(CaptionEntry::new("안녕", f64::NAN, 2.0).is_err());
    }

    #[test]
    fn caption_entry_end_adds_duration() {
        let entry = CaptionEntry::new("안녕하세요", 12.5, 3.0).unwrap();
        assert_eq!(entry.end(), 15.5);
    }

    #[test]
    fn deserialized_entries_are_validated() {
        let entry: CaptionEntry =
            serde_json::from_str(r#"{"text": "네", "start": 1.5, "duration": 2.0}"#).unwrap();
        assert_eq!(entry.start(), 1.5);
        assert_eq!(entry.text(), "네");

        let negative = serde_json::from_str::<CaptionEntry>(
            r#"{"text": "네", "start": -4.0, "duration": 2.0}"#,
        );
        assert!(negative.is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Tutor).unwrap(), "\"tutor\"");
        let role: Role = serde_json::from_str("\"learner\"").unwrap();
        assert_eq!(role, Role::Learner);
    }
}
