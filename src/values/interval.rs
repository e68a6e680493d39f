// Intervals
//
// Two flavours: `DateRange` is a closed `[start, end]` range of calendar days
// (membership periods, coupon validity), `TimeSlot` is a half-open
// `[start, end)` range of wall-clock instants (bookings). Half-open slots let
// back-to-back bookings touch without overlapping.

use crate::error::{DomainError, DomainResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(NaiveDate, NaiveDate)", into = "(NaiveDate, NaiveDate)")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Range covering a single day
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Closed ranges sharing a boundary day overlap
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when one range ends the day before the other begins
    pub fn is_adjacent_to(&self, other: &DateRange) -> bool {
        self.end.succ_opt() == Some(other.start) || other.end.succ_opt() == Some(self.start)
    }

    /// Same start, end pushed back by `days` (grace periods)
    pub fn extended_by_days(&self, days: u32) -> Self {
        let end = self
            .end
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { start: self.start, end }
    }
}

impl TryFrom<(NaiveDate, NaiveDate)> for DateRange {
    type Error = DomainError;

    fn try_from((start, end): (NaiveDate, NaiveDate)) -> Result<Self, Self::Error> {
        DateRange::new(start, end)
    }
}

impl From<DateRange> for (NaiveDate, NaiveDate) {
    fn from(range: DateRange) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Half-open range of wall-clock instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(NaiveDateTime, NaiveDateTime)", into = "(NaiveDateTime, NaiveDateTime)")]
pub struct TimeSlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeSlot {
    /// Create a slot; `start` must be strictly before `end`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Slot of `minutes` length starting at `start`
    pub fn starting_at(start: NaiveDateTime, minutes: i64) -> DomainResult<Self> {
        let end = Duration::try_minutes(minutes)
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| DomainError::InvalidInterval {
                start: start.to_string(),
                end: format!("{} minutes later", minutes),
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `start <= instant < end`
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn contains_slot(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Back-to-back slots do not overlap
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_adjacent_to(&self, other: &TimeSlot) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// True when start and end fall on the same calendar day
    /// (an end of exactly midnight the next day counts as the same day)
    pub fn is_within_single_day(&self) -> bool {
        let last_instant = self.end - Duration::nanoseconds(1);
        self.start.date() == last_instant.date()
    }
}

impl TryFrom<(NaiveDateTime, NaiveDateTime)> for TimeSlot {
    type Error = DomainError;

    fn try_from((start, end): (NaiveDateTime, NaiveDateTime)) -> Result<Self, Self::Error> {
        TimeSlot::new(start, end)
    }
}

impl From<TimeSlot> for (NaiveDateTime, NaiveDateTime) {
    fn from(slot: TimeSlot) -> Self {
        (slot.start, slot.end)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day(10).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(day(5), day(1)).is_err());
        assert!(DateRange::new(day(1), day(1)).is_ok());
    }

    #[test]
    fn test_closed_ranges_sharing_a_day_overlap() {
        let first = DateRange::new(day(1), day(3)).unwrap();
        let second = DateRange::new(day(3), day(5)).unwrap();
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
        assert!(!first.is_adjacent_to(&second));
    }

    #[test]
    fn test_date_range_adjacency() {
        let first = DateRange::new(day(1), day(3)).unwrap();
        let second = DateRange::new(day(4), day(6)).unwrap();
        assert!(!first.overlaps(&second));
        assert!(first.is_adjacent_to(&second));
        assert!(second.is_adjacent_to(&first));
    }

    #[test]
    fn test_date_range_contains_and_days() {
        let range = DateRange::new(day(1), day(10)).unwrap();
        assert!(range.contains(day(1)));
        assert!(range.contains(day(10)));
        assert!(!range.contains(day(11)));
        assert_eq!(range.days(), 10);
        assert!(range.contains_range(&DateRange::new(day(2), day(4)).unwrap()));
    }

    #[test]
    fn test_extended_by_days() {
        let range = DateRange::new(day(1), day(10)).unwrap();
        let extended = range.extended_by_days(7);
        assert_eq!(extended.end(), day(17));
        assert_eq!(extended.start(), day(1));
    }

    #[test]
    fn test_back_to_back_slots_do_not_overlap() {
        let morning = TimeSlot::new(at(9, 0), at(10, 0)).unwrap();
        let next = TimeSlot::new(at(10, 0), at(11, 0)).unwrap();
        assert!(!morning.overlaps(&next));
        assert!(morning.is_adjacent_to(&next));
    }

    #[test]
    fn test_slot_overlap_and_contains() {
        let slot = TimeSlot::new(at(9, 0), at(10, 0)).unwrap();
        let partial = TimeSlot::new(at(9, 30), at(10, 30)).unwrap();
        assert!(slot.overlaps(&partial));
        assert!(slot.contains(at(9, 0)));
        assert!(!slot.contains(at(10, 0)));
        assert_eq!(slot.duration(), Duration::hours(1));
    }

    #[test]
    fn test_slot_rejects_empty_or_inverted() {
        assert!(TimeSlot::new(at(10, 0), at(10, 0)).is_err());
        assert!(TimeSlot::new(at(11, 0), at(10, 0)).is_err());
        assert!(TimeSlot::starting_at(at(10, 0), 0).is_err());
        assert!(TimeSlot::starting_at(at(10, 0), i64::MAX).is_err());
        assert_eq!(TimeSlot::starting_at(at(10, 0), 90).unwrap().end(), at(11, 30));
    }

    #[test]
    fn test_slot_within_single_day() {
        let evening = TimeSlot::new(at(22, 0), day(11).and_hms_opt(0, 0, 0).unwrap()).unwrap();
        assert!(evening.is_within_single_day());

        let overnight = TimeSlot::new(at(23, 0), day(11).and_hms_opt(1, 0, 0).unwrap()).unwrap();
        assert!(!overnight.is_within_single_day());
    }

    #[test]
    fn test_date_range_serde_validates() {
        let parsed: DateRange = serde_json::from_str(r#"["2026-03-01","2026-03-05"]"#).unwrap();
        assert_eq!(parsed.days(), 5);

        let inverted: Result<DateRange, _> =
            serde_json::from_str(r#"["2026-03-05","2026-03-01"]"#);
        assert!(inverted.is_err());
    }
}
