use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use recal_ical::values::recur::{Skip, WeekDay};

use crate::calendar_math::{first_week_start, last_day_of_month, weeks_in_year, year_day_date};
use crate::periods::{apply_set_positions, matches_by_day_weekday, matches_by_week_no, monthly};
use crate::rule::Rule;

/// YEARLY candidate set for the anchor's year.
///
/// A single primary generator is chosen, in order: BYMONTH (one MONTHLY
/// expansion per listed month with BYSETPOS suppressed, re-applied here over
/// the union), BYYEARDAY, BYWEEKNO, a bare BYDAY weekday match on the
/// anchor, and finally the dtstart anniversary. BYWEEKNO filters the first
/// two; plain BYDAY weekdays filter BYYEARDAY. The dispatch is flat; the
/// only cross-generator reuse is the direct call into the MONTHLY set.
pub(crate) fn candidates(rule: &Rule, anchor: NaiveDateTime, dtstart: NaiveDateTime) -> Vec<NaiveDateTime> {
    let year = anchor.date().year();

    if !rule.by_month.is_empty() {
        let mut union: Vec<NaiveDateTime> = Vec::new();

        for &month in rule.by_month.iter() {
            let Some(month_anchor) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };

            union.extend(monthly::candidates(rule, month_anchor.and_time(anchor.time()), dtstart, true));
        }

        union.retain(|candidate| matches_by_week_no(rule, candidate.date()));
        union.sort();
        union.dedup();

        return apply_set_positions(union, &rule.by_set_pos);
    }

    if !rule.by_year_day.is_empty() {
        let mut days: Vec<NaiveDateTime> = rule
            .by_year_day
            .iter()
            .filter_map(|&year_day| year_day_date(year, year_day))
            .filter(|date| matches_by_week_no(rule, *date))
            .filter(|date| matches_by_day_weekday(rule, *date))
            .map(|date| date.and_time(anchor.time()))
            .collect();

        days.sort();
        days.dedup();

        return apply_set_positions(days, &rule.by_set_pos);
    }

    if !rule.by_week_no.is_empty() {
        return week_no_candidates(rule, anchor, dtstart, year);
    }

    if !rule.by_day.is_empty() {
        if matches_by_day_weekday(rule, anchor.date()) {
            return apply_set_positions(vec![anchor], &rule.by_set_pos);
        }

        return Vec::new();
    }

    anniversary_candidates(rule, anchor, dtstart, year)
}

/// One candidate per (listed week, weekday) pair; the weekdays come from
/// BYDAY or default to dtstart's weekday. Week 53 of a 52-week year drops,
/// as do days that spill past the year boundary.
fn week_no_candidates(rule: &Rule, anchor: NaiveDateTime, dtstart: NaiveDateTime, year: i32) -> Vec<NaiveDateTime> {
    let (Some(total_weeks), Some(week_one)) = (weeks_in_year(year, rule.wkst), first_week_start(year, rule.wkst)) else {
        return Vec::new();
    };

    let weekdays: Vec<WeekDay> = if rule.by_day.is_empty() {
        vec![WeekDay::from(dtstart.weekday())]
    } else {
        rule.by_day.iter().map(|entry| entry.weekday).collect()
    };

    let mut days: Vec<NaiveDateTime> = Vec::new();

    for &week_no in rule.by_week_no.iter() {
        let resolved = if week_no > 0 {
            week_no
        } else {
            total_weeks as i32 + week_no + 1
        };

        if resolved < 1 || resolved > total_weeks as i32 {
            continue;
        }

        let start_of_week = week_one + Duration::weeks(i64::from(resolved - 1));

        for weekday in weekdays.iter() {
            let offset = (7 + weekday.num_days_from_sunday() - rule.wkst.num_days_from_sunday()) % 7;
            let date = start_of_week + Duration::days(i64::from(offset));

            if date.year() == year {
                days.push(date.and_time(anchor.time()));
            }
        }
    }

    days.sort();
    days.dedup();

    apply_set_positions(days, &rule.by_set_pos)
}

/// The dtstart anniversary within the anchor year. A February 29th dtstart
/// follows the rule's SKIP behaviour in common years: OMIT contributes
/// nothing, BACKWARD the 28th, FORWARD March 1st.
fn anniversary_candidates(rule: &Rule, anchor: NaiveDateTime, dtstart: NaiveDateTime, year: i32) -> Vec<NaiveDateTime> {
    let month = dtstart.date().month();
    let day = dtstart.date().day();
    let last_day = last_day_of_month(year, month);

    let date = if day <= last_day {
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        match rule.skip {
            Skip::Omit => None,
            Skip::Backward => NaiveDate::from_ymd_opt(year, month, last_day),
            Skip::Forward => {
                if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                }
            }
        }
    };

    date.map(|date| date.and_time(anchor.time())).into_iter().collect()
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
    fn anniversary_without_by_rule_parts() {
        let rule = Rule::from_str("FREQ=YEARLY").unwrap();
        let dtstart = local(2025, 7, 4, 12, 0, 0);

        assert_eq!(
            candidates(&rule, local(2027, 7, 4, 12, 0, 0), dtstart),
            vec![local(2027, 7, 4, 12, 0, 0)],
        );
    }

    #[test]
    fn leap_day_anniversary_follows_skip() {
        let dtstart = local(2024, 2, 29, 10, 0, 0);

        let omit = Rule::from_str("FREQ=YEARLY").unwrap();
        assert_eq!(candidates(&omit, local(2025, 2, 28, 10, 0, 0), dtstart), vec![]);

        let backward = Rule::from_str("FREQ=YEARLY;SKIP=BACKWARD").unwrap();
        assert_eq!(
            candidates(&backward, local(2025, 2, 28, 10, 0, 0), dtstart),
            vec![local(2025, 2, 28, 10, 0, 0)],
        );

        let forward = Rule::from_str("FREQ=YEARLY;SKIP=FORWARD").unwrap();
        assert_eq!(
            candidates(&forward, local(2025, 2, 28, 10, 0, 0), dtstart),
            vec![local(2025, 3, 1, 10, 0, 0)],
        );
    }

    #[test]
    fn by_month_delegates_to_the_monthly_set() {
        let rule = Rule::from_str("FREQ=YEARLY;BYMONTH=1,6").unwrap();
        let dtstart = local(2025, 1, 15, 10, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 15, 10, 0, 0), dtstart),
            vec![
                local(2025, 1, 15, 10, 0, 0),
                local(2025, 6, 15, 10, 0, 0),
            ],
        );
    }

    #[test]
    fn by_month_with_by_day_ordinals() {
        // Thanksgiving: fourth Thursday of November.
        let rule = Rule::from_str("FREQ=YEARLY;BYMONTH=11;BYDAY=4TH").unwrap();
        let dtstart = local(2025, 1, 1, 0, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 0, 0, 0), dtstart),
            vec![local(2025, 11, 27, 0, 0, 0)],
        );
    }

    #[test]
    fn year_level_set_positions_span_months() {
        // Last weekday of the year drawn from every month's workdays.
        let rule = Rule::from_str("FREQ=YEARLY;BYMONTH=1,2,3,4,5,6,7,8,9,10,11,12;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1").unwrap();
        let dtstart = local(2025, 1, 1, 9, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 9, 0, 0), dtstart),
            vec![local(2025, 12, 31, 9, 0, 0)],
        );
    }

    #[test]
    fn by_year_day_signed_ordinals() {
        let rule = Rule::from_str("FREQ=YEARLY;BYYEARDAY=1,-1").unwrap();
        let dtstart = local(2025, 1, 1, 10, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 10, 0, 0), dtstart),
            vec![
                local(2025, 1, 1, 10, 0, 0),
                local(2025, 12, 31, 10, 0, 0),
            ],
        );
    }

    #[test]
    fn by_year_day_366_only_in_leap_years() {
        let rule = Rule::from_str("FREQ=YEARLY;BYYEARDAY=366").unwrap();
        let dtstart = local(2024, 1, 1, 0, 0, 0);

        assert_eq!(
            candidates(&rule, local(2024, 1, 1, 0, 0, 0), dtstart),
            vec![local(2024, 12, 31, 0, 0, 0)],
        );

        assert_eq!(candidates(&rule, local(2025, 1, 1, 0, 0, 0), dtstart), vec![]);
    }

    #[test]
    fn by_week_no_emits_listed_weeks() {
        // Week 1 of 2025 (WKST=MO) starts on Monday 2025-01-06.
        let rule = Rule::from_str("FREQ=YEARLY;BYWEEKNO=1;BYDAY=MO,FR").unwrap();
        let dtstart = local(2025, 1, 1, 8, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 8, 0, 0), dtstart),
            vec![
                local(2025, 1, 6, 8, 0, 0),
                local(2025, 1, 10, 8, 0, 0),
            ],
        );
    }

    #[test]
    fn by_week_no_negative_resolves_from_year_end() {
        let rule = Rule::from_str("FREQ=YEARLY;BYWEEKNO=-1;BYDAY=MO").unwrap();
        let dtstart = local(2025, 1, 1, 8, 0, 0);

        // The last Monday-started week of 2025 begins on 2025-12-29.
        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 8, 0, 0), dtstart),
            vec![local(2025, 12, 29, 8, 0, 0)],
        );
    }

    #[test]
    fn by_week_no_drops_days_outside_the_year() {
        // Week 52 of 2025 starts Monday 2025-12-29; its Friday is already
        // 2026-01-02 and must not leak into 2025's candidate set.
        let rule = Rule::from_str("FREQ=YEARLY;BYWEEKNO=52;BYDAY=MO,FR").unwrap();
        let dtstart = local(2025, 1, 1, 8, 0, 0);

        assert_eq!(
            candidates(&rule, local(2025, 1, 1, 8, 0, 0), dtstart),
            vec![local(2025, 12, 29, 8, 0, 0)],
        );
    }

    #[test]
    fn bare_by_day_keeps_matching_anchor_only() {
        let rule = Rule::from_str("FREQ=YEARLY;BYDAY=MO").unwrap();
        let dtstart = local(2025, 1, 6, 10, 0, 0);

        // 2025-01-06 is a Monday; the 2026 anniversary falls on a Tuesday.
        assert_eq!(
            candidates(&rule, local(2025, 1, 6, 10, 0, 0), dtstart),
            vec![local(2025, 1, 6, 10, 0, 0)],
        );
        assert_eq!(candidates(&rule, local(2026, 1, 6, 10, 0, 0), dtstart), vec![]);
    }
}
