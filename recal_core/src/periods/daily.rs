use chrono::{NaiveDateTime, Timelike};

use itertools::iproduct;

use crate::periods::{
    apply_set_positions, matches_by_day_weekday, matches_by_month, matches_by_month_day,
    matches_by_week_no, matches_by_year_day,
};
use crate::rule::Rule;

/// DAILY candidate set: the anchor's day, dropped when a date-level BYxxx
/// filter excludes it. When a time-axis filter or BYSETPOS is present the
/// candidates are the BYHOUR x BYMINUTE x BYSECOND cross-product within the
/// day (a missing axis falls back to the anchor's own field); otherwise the
/// anchor is the single candidate.
///
/// BYWEEKNO and BYYEARDAY are rejected for DAILY rules at parse time, but
/// the checks run here anyway so an inconsistent rule can only ever shrink
/// the set; both use the same WKST-aware week numbering as the YEARLY
/// generator.
pub(crate) fn candidates(rule: &Rule, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
    let date = anchor.date();

    let date_survives = matches_by_month(rule, date)
        && matches_by_week_no(rule, date)
        && matches_by_year_day(rule, date)
        && matches_by_month_day(rule, date)
        && matches_by_day_weekday(rule, date);

    if !date_survives {
        return Vec::new();
    }

    let expands_time = !rule.by_hour.is_empty()
        || !rule.by_minute.is_empty()
        || !rule.by_second.is_empty()
        || !rule.by_set_pos.is_empty();

    if !expands_time {
        return vec![anchor];
    }

    let hours = axis_values(&rule.by_hour, anchor.hour());
    let minutes = axis_values(&rule.by_minute, anchor.minute());
    let seconds = axis_values(&rule.by_second, anchor.second());

    let mut times: Vec<NaiveDateTime> = iproduct!(hours.iter(), minutes.iter(), seconds.iter())
        .filter_map(|(&hour, &minute, &second)| {
            // A leap-second entry (BYSECOND=60) clamps into the civil range.
            date.and_hms_opt(hour, minute, second.min(59))
        })
        .collect();

    times.sort();
    times.dedup();

    apply_set_positions(times, &rule.by_set_pos)
}

fn axis_values(listed: &[u32], fallback: u32) -> Vec<u32> {
    let mut values = if listed.is_empty() {
        vec![fallback]
    } else {
        listed.to_vec()
    };

    values.sort_unstable();
    values.dedup();

    values
}
