use chrono::{NaiveDateTime, Timelike};

use crate::periods::{matches_by_day_weekday, matches_by_month, matches_by_month_day};
use crate::rule::Rule;

/// HOURLY / MINUTELY / SECONDLY candidate set: the anchor itself, kept only
/// when every BYxxx part that is set includes the anchor's corresponding
/// field. Sub-day ticks never expand; the anchor cadence is the driver's
/// absolute-time stepping.
pub(crate) fn candidates(rule: &Rule, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
    let date = anchor.date();

    let keep = matches_by_month(rule, date)
        && matches_by_month_day(rule, date)
        && matches_by_day_weekday(rule, date)
        && (rule.by_hour.is_empty() || rule.by_hour.contains(&anchor.hour()))
        && (rule.by_minute.is_empty() || rule.by_minute.contains(&anchor.minute()))
        && (rule.by_second.is_empty() || rule.by_second.contains(&anchor.second()));

    if keep {
        vec![anchor]
    } else {
        Vec::new()
    }
}
