// Time-based eligibility rules
//
// Lead time, booking horizon, operating hours and weekday/time-window restrictions.
// All checks measure against the snapshot's `evaluated_at`, never the wall clock.

use super::{ReservationContext, Specification};
use crate::error::{DomainError, DomainResult};
use crate::values::TimeSlot;
use chrono::{Datelike, Duration, NaiveTime, Weekday};

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

fn hour_window(from: NaiveTime, to: NaiveTime) -> DomainResult<(NaiveTime, NaiveTime)> {
    if from >= to {
        return Err(DomainError::InvalidInterval {
            start: from.to_string(),
            end: to.to_string(),
        });
    }
    Ok((from, to))
}

/// Request must respect lead time, horizon and opening hours
#[derive(Debug, Clone)]
pub struct ValidReservationTimeSpecification {
    max_horizon_days: u32,
    min_lead_minutes: u32,
    business_hours: Option<(NaiveTime, NaiveTime)>,
    weekdays_only: bool,
}

impl Default for ValidReservationTimeSpecification {
    fn default() -> Self {
        Self {
            max_horizon_days: 365,
            min_lead_minutes: 0,
            business_hours: None,
            weekdays_only: false,
        }
    }
}

impl ValidReservationTimeSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.max_horizon_days = days;
        self
    }

    pub fn with_lead_minutes(mut self, minutes: u32) -> Self {
        self.min_lead_minutes = minutes;
        self
    }

    /// Slot must also fit inside `[from, to]` on its start day
    pub fn with_business_hours(mut self, from: NaiveTime, to: NaiveTime) -> DomainResult<Self> {
        self.business_hours = Some(hour_window(from, to)?);
        Ok(self)
    }

    pub fn weekdays_only(mut self) -> Self {
        self.weekdays_only = true;
        self
    }

    /// First failing check, in evaluation order
    fn violation(&self, context: &ReservationContext) -> Option<String> {
        let slot = context.requested();
        let now = context.evaluated_at();

        // An unrepresentable earliest start is never reached
        let earliest =
            now.checked_add_signed(Duration::minutes(i64::from(self.min_lead_minutes)));
        if earliest.map_or(true, |earliest| slot.start() < earliest) {
            return Some(if self.min_lead_minutes == 0 {
                "Reservation start is in the past".to_string()
            } else {
                format!(
                    "Reservations must be made at least {} minutes in advance",
                    self.min_lead_minutes
                )
            });
        }

        // An unrepresentable horizon is no horizon at all
        let latest =
            now.checked_add_signed(Duration::days(i64::from(self.max_horizon_days)));
        if latest.is_some_and(|latest| slot.start() > latest) {
            return Some(format!(
                "Reservations cannot be made more than {} days ahead",
                self.max_horizon_days
            ));
        }

        let day = slot.start().weekday();
        if self.weekdays_only && is_weekend(day) {
            return Some(format!("Reservations are not accepted on {}", day));
        }

        if let Some((from, to)) = self.business_hours {
            if !Self::within_hours(slot, from, to) {
                return Some(format!(
                    "Reservation must fall within business hours {} to {}",
                    from.format("%H:%M"),
                    to.format("%H:%M")
                ));
            }
        }

        let resource = context.resource();
        if !resource.operating_hours.covers(slot) {
            return Some(format!(
                "Resource '{}' is closed during the requested time",
                resource.name
            ));
        }

        None
    }

    fn within_hours(slot: &TimeSlot, from: NaiveTime, to: NaiveTime) -> bool {
        let day = slot.start().date();
        day.and_time(from) <= slot.start() && slot.end() <= day.and_time(to)
    }
}

impl Specification<ReservationContext> for ValidReservationTimeSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        self.violation(context).is_none()
    }

    fn description(&self) -> String {
        let mut text = format!(
            "Reservation time is valid ({} min lead, {} day horizon",
            self.min_lead_minutes, self.max_horizon_days
        );
        if self.weekdays_only {
            text.push_str(", weekdays only");
        }
        if let Some((from, to)) = self.business_hours {
            text.push_str(&format!(
                ", {}-{}",
                from.format("%H:%M"),
                to.format("%H:%M")
            ));
        }
        text.push(')');
        text
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        self.violation(context)
    }
}

/// Whether matching requests are the only ones allowed or the ones refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionMode {
    Allow,
    Deny,
}

/// Restrict requests by start weekday and start hour
///
/// A request matches when its start day is in `days` (any day when empty) and
/// its start time is in `[from, to)` (any time when no window is set).
#[derive(Debug, Clone)]
pub struct TimeSlotRestrictionSpecification {
    mode: RestrictionMode,
    days: Vec<Weekday>,
    hours: Option<(NaiveTime, NaiveTime)>,
}

impl TimeSlotRestrictionSpecification {
    pub fn new(
        mode: RestrictionMode,
        days: impl IntoIterator<Item = Weekday>,
        hours: Option<(NaiveTime, NaiveTime)>,
    ) -> DomainResult<Self> {
        let hours = match hours {
            Some((from, to)) => Some(hour_window(from, to)?),
            None => None,
        };
        Ok(Self {
            mode,
            days: days.into_iter().collect(),
            hours,
        })
    }

    /// Monday to Friday, any hour
    pub fn allow_weekdays() -> Self {
        Self {
            mode: RestrictionMode::Allow,
            days: WEEKDAYS.to_vec(),
            hours: None,
        }
    }

    /// Saturday and Sunday refused
    pub fn deny_weekends() -> Self {
        Self {
            mode: RestrictionMode::Deny,
            days: vec![Weekday::Sat, Weekday::Sun],
            hours: None,
        }
    }

    /// Any day, start time in `[from, to)`
    pub fn allow_hours(from: NaiveTime, to: NaiveTime) -> DomainResult<Self> {
        Self::new(RestrictionMode::Allow, [], Some((from, to)))
    }

    fn matches(&self, slot: &TimeSlot) -> bool {
        let start = slot.start();
        let day_ok = self.days.is_empty() || self.days.contains(&start.weekday());
        let hour_ok = self
            .hours
            .map_or(true, |(from, to)| from <= start.time() && start.time() < to);
        day_ok && hour_ok
    }

    fn window_text(&self) -> String {
        let days = if self.days.is_empty() {
            "any day".to_string()
        } else {
            self.days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("/")
        };
        match self.hours {
            Some((from, to)) => format!(
                "{} {}-{}",
                days,
                from.format("%H:%M"),
                to.format("%H:%M")
            ),
            None => days,
        }
    }
}

impl Specification<ReservationContext> for TimeSlotRestrictionSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        let matched = self.matches(context.requested());
        match self.mode {
            RestrictionMode::Allow => matched,
            RestrictionMode::Deny => !matched,
        }
    }

    fn description(&self) -> String {
        match self.mode {
            RestrictionMode::Allow => format!("Reservation starts within {}", self.window_text()),
            RestrictionMode::Deny => format!("Reservation does not start on {}", self.window_text()),
        }
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        if self.is_satisfied_by(context) {
            return None;
        }
        let start = context.requested().start();
        Some(match self.mode {
            RestrictionMode::Allow => format!(
                "Reservations are only accepted {}; requested {} {}",
                self.window_text(),
                start.weekday(),
                start.format("%H:%M")
            ),
            RestrictionMode::Deny => format!(
                "Reservations are not accepted {}; requested {} {}",
                self.window_text(),
                start.weekday(),
                start.format("%H:%M")
            ),
        })
    }
}
