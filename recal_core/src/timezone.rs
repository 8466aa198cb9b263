//! Conversion between absolute instants and wall-clock fields in a named
//! zone, plus the wall-clock calendar arithmetic the expansion driver needs
//! between periods. Elapsed (sub-day) stepping needs no adapter: the driver
//! adds durations to its instant-carrying anchor directly.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::calendar_math::last_day_of_month;
use crate::error::RecurrenceError;
use crate::rule::Rule;

/// Wall-clock fields of `instant` as observed in `tz`.
pub fn to_local(instant: DateTime<Tz>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// The absolute instant a wall-clock value denotes in `tz`.
///
/// Non-existent local times (the spring-forward gap) map as if the jump had
/// already happened: the wall clock is pushed forward past the gap and the
/// earliest valid reading is taken. Ambiguous local times (the fall-back
/// overlap) resolve to the first of the two possible instants.
pub fn to_instant(local: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant,

        LocalResult::Ambiguous(earliest, _latest) => earliest,

        LocalResult::None => {
            // Spring-forward gap: read the wall clock with the offset in
            // force just before the jump, which lands the instant past the
            // gap by exactly the jumped distance (02:30 in a one-hour gap
            // becomes 03:30). Three hours of lookback clears any IANA gap.
            let before_gap = tz.from_local_datetime(&(local - Duration::hours(3))).earliest();

            if let Some(before_gap) = before_gap {
                let offset_seconds = before_gap.offset().fix().local_minus_utc();

                return tz.from_utc_datetime(&(local - Duration::seconds(i64::from(offset_seconds))));
            }

            // Unreachable for IANA data.
            tz.from_utc_datetime(&local)
        }
    }
}

/// Adds `months` in wall-clock space, clamping the day-of-month into the
/// target month (January 31st plus one month is February 28th/29th).
pub fn add_months(local: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let zero_based = local.year() * 12 + local.month() as i32 - 1 + months;

    let year = zero_based.div_euclid(12);
    let month = (zero_based.rem_euclid(12) + 1) as u32;
    let day = local.day().min(last_day_of_month(year, month));

    chrono::NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(local.time()))
}

/// Adds `years` in wall-clock space, clamping February 29th to the 28th in
/// common years.
pub fn add_years(local: NaiveDateTime, years: i32) -> Option<NaiveDateTime> {
    let year = local.year() + years;
    let day = local.day().min(last_day_of_month(year, local.month()));

    chrono::NaiveDate::from_ymd_opt(year, local.month(), day).map(|date| date.and_time(local.time()))
}

/// Timezone selection priority: explicit argument, then the rule's TZID,
/// then UTC.
pub fn resolve_timezone(explicit: Option<&str>, rule: &Rule) -> Result<Tz, RecurrenceError> {
    if let Some(name) = explicit {
        return name
            .parse::<Tz>()
            .map_err(|_error| RecurrenceError::InvalidTimezone(name.to_string()));
    }

    Ok(rule.tz.unwrap_or(Tz::UTC))
}
