//! The public query surface over the expansion driver.
//!
//! Every operation resolves its timezone with the same priority (explicit
//! argument, then the rule's TZID, then UTC), interprets `dtstart` and the
//! window bounds as wall-clock values in that zone, and returns occurrences
//! as zone-attached instants in ascending wall-clock order.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::RecurrenceError;
use crate::occurrence_iterator::OccurrenceIterator;
use crate::rule::Rule;
use crate::timezone::{add_years, resolve_timezone};

/// Width of the default query window, measured from dtstart.
pub const DEFAULT_WINDOW_YEARS: i32 = 10;

/// Default ceiling on emissions per query, scaled by the safety limiter's
/// per-frequency multipliers into a candidate-evaluation budget.
pub const DEFAULT_MAX_EMISSIONS: usize = 1000;

impl Rule {
    /// Every occurrence in the standard window `[dtstart, dtstart + 10
    /// years]`, capped at 1000 emissions unless COUNT is smaller.
    pub fn all(&self, dtstart: NaiveDateTime, timezone: Option<&str>) -> Result<Vec<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;
        let maxdate = default_window_end(dtstart);

        let occurrences = OccurrenceIterator::new(self, dtstart, None, maxdate, DEFAULT_MAX_EMISSIONS, tz)?;

        Ok(occurrences.take(DEFAULT_MAX_EMISSIONS).collect())
    }

    /// Occurrences within `[start, end]`, inclusive on both sides; the first
    /// hit at or after `start` is included even when earlier occurrences
    /// exist.
    pub fn between(
        &self,
        dtstart: NaiveDateTime,
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: Option<&str>,
    ) -> Result<Vec<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;

        let occurrences = OccurrenceIterator::new(self, dtstart, Some(start), end, DEFAULT_MAX_EMISSIONS, tz)?;

        Ok(occurrences.take(DEFAULT_MAX_EMISSIONS).collect())
    }

    /// Up to `limit` occurrences strictly after `pivot`.
    pub fn after(
        &self,
        dtstart: NaiveDateTime,
        pivot: NaiveDateTime,
        limit: usize,
        timezone: Option<&str>,
    ) -> Result<Vec<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;
        let maxdate = default_window_end(dtstart.max(pivot));

        let occurrences = OccurrenceIterator::new(self, dtstart, Some(pivot), maxdate, DEFAULT_MAX_EMISSIONS, tz)?;

        Ok(occurrences
            .filter(|occurrence| occurrence.naive_local() > pivot)
            .take(limit)
            .collect())
    }

    /// The last `limit` occurrences strictly before `pivot`, obtained by
    /// materialising everything up to the pivot and keeping the tail.
    pub fn before(
        &self,
        dtstart: NaiveDateTime,
        pivot: NaiveDateTime,
        limit: usize,
        timezone: Option<&str>,
    ) -> Result<Vec<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;

        let occurrences = OccurrenceIterator::new(self, dtstart, None, pivot, DEFAULT_MAX_EMISSIONS, tz)?;

        let mut preceding: Vec<DateTime<Tz>> = occurrences
            .filter(|occurrence| occurrence.naive_local() < pivot)
            .take(DEFAULT_MAX_EMISSIONS)
            .collect();

        if preceding.len() > limit {
            preceding.drain(..preceding.len() - limit);
        }

        Ok(preceding)
    }

    /// Total number of occurrences across the standard window.
    pub fn count_occurrences(&self, dtstart: NaiveDateTime, timezone: Option<&str>) -> Result<usize, RecurrenceError> {
        Ok(self.all(dtstart, timezone)?.len())
    }

    /// The first occurrence strictly after the current instant.
    pub fn next_occurrence(&self, dtstart: NaiveDateTime, timezone: Option<&str>) -> Result<Option<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;
        let now = Utc::now().with_timezone(&tz).naive_local();

        Ok(self.after(dtstart, now, 1, timezone)?.into_iter().next())
    }

    /// The most recent occurrence strictly before the current instant.
    pub fn most_recent(&self, dtstart: NaiveDateTime, timezone: Option<&str>) -> Result<Option<DateTime<Tz>>, RecurrenceError> {
        let tz = resolve_timezone(timezone, self)?;
        let now = Utc::now().with_timezone(&tz).naive_local();

        Ok(self.before(dtstart, now, 1, timezone)?.into_iter().next())
    }
}

/// Whether any occurrence interval `[occurrence, occurrence + (dtend -
/// dtstart)]` intersects `[mindate, maxdate]`. Without a rule the event is a
/// single interval starting at dtstart.
pub fn overlaps(
    dtstart: NaiveDateTime,
    dtend: NaiveDateTime,
    rule: Option<&Rule>,
    mindate: NaiveDateTime,
    maxdate: NaiveDateTime,
    timezone: Option<&str>,
) -> Result<bool, RecurrenceError> {
    let duration = dtend - dtstart;

    let Some(rule) = rule else {
        return Ok(dtstart <= maxdate && dtend >= mindate);
    };

    let tz = resolve_timezone(timezone, rule)?;

    // An occurrence can begin before the window and still reach into it, so
    // the expansion lower bound backs off by the event duration.
    let lower_bound = mindate - duration;

    let mut occurrences = OccurrenceIterator::new(rule, dtstart, Some(lower_bound), maxdate, DEFAULT_MAX_EMISSIONS, tz)?;

    Ok(occurrences.any(|occurrence| {
        let start = occurrence.naive_local();

        start <= maxdate && start + duration >= mindate
    }))
}

fn default_window_end(dtstart: NaiveDateTime) -> NaiveDateTime {
    add_years(dtstart, DEFAULT_WINDOW_YEARS).unwrap_or(NaiveDateTime::MAX)
}
