//! Same-day overlap checks between tutor and learner availability.
//!
//! Times of day are laid on one synthetic reference date. An interval whose
//! end is not after its start runs past midnight, so its end moves to the
//! following day before comparing.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::{KstudyError, Result},
    types::{AvailabilityInterval, Role},
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Availability as submitted in a form or file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub role: Role,
    pub date: String,
    pub start: String,
    pub end: String,
}

/// A tutor/learner pair that share time on the same date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub tutor_index: usize,
    pub learner_index: usize,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl AvailabilityInterval {
    pub fn new(role: Role, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            role,
            date,
            start,
            end,
        }
    }

    pub fn parse(role: Role, date: &str, start: &str, end: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|e| {
            KstudyError::invalid_input(format!("date {date:?} is not YYYY-MM-DD: {e}"))
        })?;
        Ok(Self::new(role, date, parse_time(start)?, parse_time(end)?))
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }

    fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        let day = reference_date();
        let start = day.and_time(self.start);
        let end = if self.crosses_midnight() {
            next_day(day).and_time(self.end)
        } else {
            day.and_time(self.end)
        };
        (start, end)
    }
}

impl TryFrom<AvailabilityRecord> for AvailabilityInterval {
    type Error = KstudyError;

    fn try_from(record: AvailabilityRecord) -> Result<Self> {
        Self::parse(record.role, &record.date, &record.start, &record.end)
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| KstudyError::invalid_input(format!("time {raw:?} is not HH:MM or HH:MM:SS")))
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(day)
}

fn shift(span: (NaiveDateTime, NaiveDateTime)) -> (NaiveDateTime, NaiveDateTime) {
    let day = chrono::Duration::days(1);
    (span.0 + day, span.1 + day)
}

fn intersect(
    a: (NaiveDateTime, NaiveDateTime),
    b: (NaiveDateTime, NaiveDateTime),
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    (start < end).then_some((start, end))
}

/// Returns the shared window of two intervals, if they overlap on the same date.
pub fn shared_window(
    a: &AvailabilityInterval,
    b: &AvailabilityInterval,
) -> Option<(NaiveTime, NaiveTime)> {
    if a.date != b.date {
        return None;
    }
    let (sa, sb) = (a.span(), b.span());
    // The tail of an interval that runs past midnight can meet the other
    // interval's early-morning hours, so also compare with either side a day later.
    intersect(sa, sb)
        .or_else(|| intersect(sa, shift(sb)))
        .or_else(|| intersect(shift(sa), sb))
        .map(|(start, end)| (start.time(), end.time()))
}

pub fn overlaps(a: &AvailabilityInterval, b: &AvailabilityInterval) -> bool {
    shared_window(a, b).is_some()
}

/// Every tutor/learner pair with shared time, tutor order first, then learner order.
pub fn find_overlaps(
    tutors: &[AvailabilityInterval],
    learners: &[AvailabilityInterval],
) -> Result<Vec<Overlap>> {
    check_roles(tutors, Role::Tutor)?;
    check_roles(learners, Role::Learner)?;

    let mut found = Vec::new();
    for (tutor_index, tutor) in tutors.iter().enumerate() {
        for (learner_index, learner) in learners.iter().enumerate() {
            if let Some((start, end)) = shared_window(tutor, learner) {
                found.push(Overlap {
                    tutor_index,
                    learner_index,
                    date: tutor.date,
                    start,
                    end,
                });
            }
        }
    }
    Ok(found)
}

fn check_roles(intervals: &[AvailabilityInterval], expected: Role) -> Result<()> {
    match intervals.iter().position(|i| i.role != expected) {
        Some(index) => Err(KstudyError::invalid_input(format!(
            "interval {index} belongs to a {} but was given as {} availability",
            intervals[index].role.name(),
            expected.name()
        ))),
        None => Ok(()),
    }
}

/// Splits a mixed list into (tutors, learners), keeping input order.
pub fn split_by_role(
    intervals: Vec<AvailabilityInterval>,
) -> (Vec<AvailabilityInterval>, Vec<AvailabilityInterval>) {
    intervals.into_iter().partition(|i| i.role == Role::Tutor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tutor(date: &str, start: &str, end: &str) -> AvailabilityInterval {
        AvailabilityInterval::parse(Role::Tutor, date, start, end).unwrap()
    }

    fn learner(date: &str, start: &str, end: &str) -> AvailabilityInterval {
        AvailabilityInterval::parse(Role::Learner, date, start, end).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn evening_ranges_overlap() {
        let found = find_overlaps(
            &[tutor("2024-10-08", "17:00", "18:30")],
            &[learner("2024-10-08", "18:00", "19:00")],
        )
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!((found[0].start, found[0].end), (hm(18, 0), hm(18, 30)));
    }

    #[test]
    fn midnight_crossing_meets_early_morning() {
        let a = tutor("2024-10-08", "23:00", "01:00");
        let b = learner("2024-10-08", "00:30", "02:00");

        assert!(a.crosses_midnight());
        assert_eq!(shared_window(&a, &b), Some((hm(0, 30), hm(1, 0))));
        assert_eq!(shared_window(&b, &a), Some((hm(0, 30), hm(1, 0))));
    }

    #[test]
    fn both_crossing_midnight_overlap() {
        let a = tutor("2024-10-08", "22:00", "02:00");
        let b = learner("2024-10-08", "23:30", "00:30");
        assert_eq!(shared_window(&a, &b), Some((hm(23, 30), hm(0, 30))));
    }

    #[test]
    fn different_dates_never_overlap() {
        let found = find_overlaps(
            &[tutor("2024-10-08", "17:00", "19:00")],
            &[learner("2024-10-29", "17:00", "19:00")],
        )
        .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = tutor("2024-11-14", "17:15", "18:00");
        let b = learner("2024-11-14", "18:00", "18:45");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn verdict_is_symmetric() {
        let cases = [
            ("09:00", "10:00", "09:30", "11:00"),
            ("23:00", "01:00", "00:30", "02:00"),
            ("08:00", "09:00", "10:00", "11:00"),
            ("20:00", "20:00", "12:00", "13:00"),
        ];
        for (s1, e1, s2, e2) in cases {
            let a = tutor("2024-09-23", s1, e1);
            let b = learner("2024-09-23", s2, e2);
            let a_swapped = AvailabilityInterval::new(Role::Tutor, b.date(), b.start(), b.end());
            let b_swapped = AvailabilityInterval::new(Role::Learner, a.date(), a.start(), a.end());
            assert_eq!(
                find_overlaps(&[a], &[b]).unwrap().is_empty(),
                find_overlaps(&[a_swapped], &[b_swapped]).unwrap().is_empty(),
                "{s1}-{e1} vs {s2}-{e2}"
            );
        }
    }

    #[test]
    fn pairs_follow_nested_input_order() {
        let tutors = [
            tutor("2024-10-08", "17:00", "19:00"),
            tutor("2024-10-08", "18:00", "20:00"),
        ];
        let learners = [
            learner("2024-10-08", "18:30", "19:30"),
            learner("2024-10-08", "17:30", "18:15"),
        ];

        let found = find_overlaps(&tutors, &learners).unwrap();
        let pairs: Vec<_> = found.iter().map(|o| (o.tutor_index, o.learner_index)).collect();

        assert_eq!(pairs, [(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(found, find_overlaps(&tutors, &learners).unwrap());
    }

    #[test]
    fn mismatched_roles_are_rejected() {
        let wrong = learner("2024-10-08", "17:00", "18:00");
        assert!(find_overlaps(&[wrong.clone()], &[wrong]).is_err());
    }

    #[test]
    fn unparseable_fields_are_invalid_input() {
        assert!(AvailabilityInterval::parse(Role::Tutor, "10/08/2024", "17:00", "18:00").is_err());
        assert!(AvailabilityInterval::parse(Role::Tutor, "2024-10-08", "5pm", "18:00").is_err());
        assert!(AvailabilityInterval::parse(Role::Tutor, "2024-10-08", "17:00:30", "18:00").is_ok());
    }

    #[test]
    fn split_keeps_order() {
        let mixed = vec![
            learner("2024-10-08", "10:00", "11:00"),
            tutor("2024-10-08", "12:00", "13:00"),
            learner("2024-10-09", "10:00", "11:00"),
        ];
        let (tutors, learners) = split_by_role(mixed);
        assert_eq!(tutors.len(), 1);
        assert_eq!(learners[1].date(), NaiveDate::from_ymd_opt(2024, 10, 9).unwrap());
    }
}
