//! Per-frequency period generators.
//!
//! Each generator takes the wall-clock anchor of the current period and
//! returns the ordered, deduplicated candidate set for that period.
//! Candidates earlier than dtstart are the expansion driver's concern; the
//! generators only have to produce the correct set.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::calendar_math::{day_of_week, month_day_ordinal, week_number, year_day_date};
use crate::rule::Rule;

use recal_ical::values::recur::Frequency;

pub(crate) mod daily;
pub(crate) mod monthly;
pub(crate) mod subday;
pub(crate) mod weekly;
pub(crate) mod yearly;

/// Dispatches to the generator for the rule's frequency.
pub(crate) fn period_candidates(rule: &Rule, anchor: NaiveDateTime, dtstart: NaiveDateTime) -> Vec<NaiveDateTime> {
    match rule.freq {
        Frequency::Yearly => yearly::candidates(rule, anchor, dtstart),
        Frequency::Monthly => monthly::candidates(rule, anchor, dtstart, false),
        Frequency::Weekly => weekly::candidates(rule, anchor, dtstart),
        Frequency::Daily => daily::candidates(rule, anchor),
        Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => subday::candidates(rule, anchor),
    }
}

/// Selects BYSETPOS positions from one period's ordered candidate set:
/// positive n is the n-th candidate from the start, negative n the n-th from
/// the end, out-of-range positions silently drop. The selection is returned
/// sorted ascending.
pub(crate) fn apply_set_positions<T: Ord + Clone>(candidates: Vec<T>, positions: &[i32]) -> Vec<T> {
    if positions.is_empty() {
        return candidates;
    }

    let mut selected: Vec<T> = positions
        .iter()
        .filter_map(|&position| {
            if position > 0 {
                candidates.get(position as usize - 1)
            } else {
                let index = candidates.len() as i64 + position as i64;

                if index < 0 {
                    None
                } else {
                    candidates.get(index as usize)
                }
            }
        })
        .cloned()
        .collect();

    selected.sort();
    selected.dedup();

    selected
}

pub(crate) fn matches_by_month(rule: &Rule, date: NaiveDate) -> bool {
    rule.by_month.is_empty() || rule.by_month.contains(&date.month())
}

pub(crate) fn matches_by_month_day(rule: &Rule, date: NaiveDate) -> bool {
    rule.by_month_day.is_empty()
        || rule
            .by_month_day
            .iter()
            .any(|&month_day| month_day_ordinal(date.year(), date.month(), month_day) == date.day() as i32)
}

/// Weekday-only BYDAY check; ordinals are resolved by the month/year
/// generators instead.
pub(crate) fn matches_by_day_weekday(rule: &Rule, date: NaiveDate) -> bool {
    rule.by_day.is_empty()
        || rule
            .by_day
            .iter()
            .any(|entry| entry.weekday.num_days_from_sunday() == day_of_week(date))
}

pub(crate) fn matches_by_year_day(rule: &Rule, date: NaiveDate) -> bool {
    rule.by_year_day.is_empty()
        || rule
            .by_year_day
            .iter()
            .any(|&year_day| year_day_date(date.year(), year_day) == Some(date))
}

/// BYWEEKNO membership using the WKST-aware week numbering; negative week
/// ordinals resolve against the week count of the week's own year.
pub(crate) fn matches_by_week_no(rule: &Rule, date: NaiveDate) -> bool {
    if rule.by_week_no.is_empty() {
        return true;
    }

    let Some((week_year, week)) = week_number(date, rule.wkst) else {
        return false;
    };

    let Some(total_weeks) = crate::calendar_math::weeks_in_year(week_year, rule.wkst) else {
        return false;
    };

    rule.by_week_no.iter().any(|&week_no| {
        let resolved = if week_no > 0 {
            week_no
        } else {
            total_weeks as i32 + week_no + 1
        };

        resolved == week as i32
    })
}
