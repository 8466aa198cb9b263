use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use recal_ical::values::recur::Skip;

use crate::calendar_math::{last_day_of_month, month_day_ordinal, nth_weekday_of_month, weekdays_in_month};
use crate::periods::apply_set_positions;
use crate::rule::Rule;

/// MONTHLY candidate set for the anchor's month: dates from BYDAY and/or
/// BYMONTHDAY (their intersection when both are present), carrying the
/// anchor's time of day. With neither present the month contributes
/// dtstart's day-of-month, subject to the same SKIP handling as an explicit
/// BYMONTHDAY entry.
///
/// The YEARLY generator reuses this per listed BYMONTH month with
/// `suppress_set_pos`, re-applying BYSETPOS itself over the whole year.
pub(crate) fn candidates(
    rule: &Rule,
    anchor: NaiveDateTime,
    dtstart: NaiveDateTime,
    suppress_set_pos: bool,
) -> Vec<NaiveDateTime> {
    let year = anchor.date().year();
    let month = anchor.date().month();

    let by_day_dates: Option<BTreeSet<NaiveDate>> = if rule.by_day.is_empty() {
        None
    } else {
        Some(expand_by_day(rule, year, month))
    };

    let by_month_day_dates: Option<BTreeSet<NaiveDate>> = if !rule.by_month_day.is_empty() {
        Some(expand_by_month_day(&rule.by_month_day, rule.skip, year, month))
    } else if rule.by_day.is_empty() {
        Some(expand_by_month_day(&[dtstart.day() as i32], rule.skip, year, month))
    } else {
        None
    };

    let dates: BTreeSet<NaiveDate> = match (by_day_dates, by_month_day_dates) {
        (Some(by_day), Some(by_month_day)) => by_day.intersection(&by_month_day).copied().collect(),
        (Some(by_day), None) => by_day,
        (None, Some(by_month_day)) => by_month_day,
        (None, None) => BTreeSet::new(),
    };

    let candidates: Vec<NaiveDateTime> = dates
        .into_iter()
        .map(|date| date.and_time(anchor.time()))
        .collect();

    if suppress_set_pos {
        candidates
    } else {
        apply_set_positions(candidates, &rule.by_set_pos)
    }
}

fn expand_by_day(rule: &Rule, year: i32, month: u32) -> BTreeSet<NaiveDate> {
    rule.by_day
        .iter()
        .flat_map(|entry| {
            match entry.ordinal {
                // Plain weekday: every match in the month.
                None => weekdays_in_month(year, month, entry.weekday),

                // Ordinal weekday: the n-th match, skipped when the month
                // has no such occurrence (e.g. 5WE in February).
                Some(ordinal) => nth_weekday_of_month(year, month, entry.weekday, ordinal)
                    .into_iter()
                    .collect(),
            }
        })
        .collect()
}

/// Resolves BYMONTHDAY ordinals against a concrete month, applying the RFC
/// 7529 SKIP behaviour for positive days that exceed the month length:
/// OMIT drops the entry, BACKWARD substitutes the month's last day, FORWARD
/// substitutes the first day of the following month. The set result
/// collapses duplicates (BACKWARD of 30 and 31 in February both become the
/// 28th/29th). Negative ordinals reaching before the first of the month
/// always drop.
pub(crate) fn expand_by_month_day(month_days: &[i32], skip: Skip, year: i32, month: u32) -> BTreeSet<NaiveDate> {
    let last_day = last_day_of_month(year, month) as i32;

    month_days
        .iter()
        .filter_map(|&month_day| {
            let day = month_day_ordinal(year, month, month_day);

            if (1..=last_day).contains(&day) {
                return NaiveDate::from_ymd_opt(year, month, day as u32);
            }

            if day > last_day {
                return match skip {
                    Skip::Omit => None,
                    Skip::Backward => NaiveDate::from_ymd_opt(year, month, last_day as u32),
                    Skip::Forward => first_day_of_following_month(year, month),
                };
            }

            None
        })
        .collect()
}

fn first_day_of_following_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use pretty_assertions_sorted::assert_eq;

    fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .unwrap()
    }

    #[test]
    fn implicit_month_day_comes_from_dtstart() {
        let rule = Rule::from_str("FREQ=MONTHLY").unwrap();
        let dtstart = local(2025, 1, 15, 10, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 3, 15, 10, 0, 0), dtstart, false),
            vec![local(2025, 3, 15, 10, 0, 0)],
        );
    }

    #[test]
    fn implicit_month_day_omits_short_months() {
        let rule = Rule::from_str("FREQ=MONTHLY").unwrap();
        let dtstart = local(2025, 1, 31, 10, 0, 0);

        // The February anchor is clamped by wall-clock month arithmetic; the
        // implicit day 31 does not exist there and OMIT drops the month.
        assert_eq!(candidates(&rule, local(2025, 2, 28, 10, 0, 0), dtstart, false), vec![]);
        assert_eq!(
            candidates(&rule, local(2025, 3, 28, 10, 0, 0), dtstart, false),
            vec![local(2025, 3, 31, 10, 0, 0)],
        );
    }

    #[test]
    fn by_day_plain_expands_every_match() {
        let rule = Rule::from_str("FREQ=MONTHLY;BYDAY=MO").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![
                local(2025, 1, 6, 9, 0, 0),
                local(2025, 1, 13, 9, 0, 0),
                local(2025, 1, 20, 9, 0, 0),
                local(2025, 1, 27, 9, 0, 0),
            ],
        );
    }

    #[test]
    fn by_day_ordinals_select_and_skip() {
        let rule = Rule::from_str("FREQ=MONTHLY;BYDAY=2TU,-1FR").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![
                local(2025, 1, 14, 9, 0, 0),
                local(2025, 1, 31, 9, 0, 0),
            ],
        );

        // February 2025 has no fifth Wednesday; the entry contributes nothing.
        let rule = Rule::from_str("FREQ=MONTHLY;BYDAY=5WE").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 2, 1, 9, 0, 0), local(2025, 2, 1, 9, 0, 0), false),
            vec![],
        );
    }

    #[test]
    fn by_month_day_negative_counts_from_month_end() {
        let rule = Rule::from_str("FREQ=MONTHLY;BYMONTHDAY=-1,15").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 2, 1, 10, 0, 0), local(2025, 1, 1, 10, 0, 0), false),
            vec![
                local(2025, 2, 15, 10, 0, 0),
                local(2025, 2, 28, 10, 0, 0),
            ],
        );
    }

    #[test]
    fn by_day_and_by_month_day_intersect() {
        // Fridays that fall on the 13th.
        let rule = Rule::from_str("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 6, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![local(2025, 6, 13, 9, 0, 0)],
        );

        assert_eq!(
            candidates(&rule, local(2025, 7, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![],
        );
    }

    #[test]
    fn skip_omit_drops_missing_days() {
        let set = expand_by_month_day(&[31], Skip::Omit, 2025, 2);

        assert!(set.is_empty());
    }

    #[test]
    fn skip_backward_collapses_to_last_valid_day() {
        let set = expand_by_month_day(&[30, 31], Skip::Backward, 2025, 2);

        assert_eq!(
            set.into_iter().collect::<Vec<NaiveDate>>(),
            vec![NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()],
        );

        let set = expand_by_month_day(&[30, 31], Skip::Backward, 2024, 2);

        assert_eq!(
            set.into_iter().collect::<Vec<NaiveDate>>(),
            vec![NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()],
        );
    }

    #[test]
    fn skip_forward_rolls_into_next_month() {
        let set = expand_by_month_day(&[31], Skip::Forward, 2025, 4);

        assert_eq!(
            set.into_iter().collect::<Vec<NaiveDate>>(),
            vec![NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()],
        );
    }

    #[test]
    fn negative_underflow_always_drops() {
        let set = expand_by_month_day(&[-30], Skip::Backward, 2025, 2);

        assert!(set.is_empty());
    }

    #[test]
    fn set_positions_select_last_workday() {
        let rule = Rule::from_str("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1").unwrap();

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![local(2025, 1, 31, 9, 0, 0)],
        );

        assert_eq!(
            candidates(&rule, local(2025, 2, 1, 9, 0, 0), local(2025, 1, 1, 9, 0, 0), false),
            vec![local(2025, 2, 28, 9, 0, 0)],
        );
    }
}
