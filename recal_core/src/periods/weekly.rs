use chrono::{Datelike, Duration, NaiveDateTime};

use recal_ical::values::recur::WeekDay;

use crate::calendar_math::week_start;
use crate::periods::{apply_set_positions, matches_by_month};
use crate::rule::Rule;

/// WEEKLY candidate set: one candidate per listed BYDAY weekday within the
/// week containing the anchor (weeks start on WKST), carrying the anchor's
/// time of day. Without BYDAY the week contributes dtstart's weekday alone.
pub(crate) fn candidates(rule: &Rule, anchor: NaiveDateTime, dtstart: NaiveDateTime) -> Vec<NaiveDateTime> {
    let start_of_week = week_start(anchor.date(), rule.wkst);

    let weekdays: Vec<WeekDay> = if rule.by_day.is_empty() {
        vec![WeekDay::from(dtstart.weekday())]
    } else {
        rule.by_day.iter().map(|entry| entry.weekday).collect()
    };

    let mut days: Vec<NaiveDateTime> = weekdays
        .into_iter()
        .map(|weekday| {
            let offset = (7 + weekday.num_days_from_sunday() - rule.wkst.num_days_from_sunday()) % 7;

            (start_of_week + Duration::days(i64::from(offset))).and_time(anchor.time())
        })
        .filter(|candidate| matches_by_month(rule, candidate.date()))
        .collect();

    days.sort();
    days.dedup();

    apply_set_positions(days, &rule.by_set_pos)
}
