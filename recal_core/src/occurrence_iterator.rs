use std::collections::VecDeque;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use recal_ical::values::recur::Frequency;

use crate::error::RecurrenceError;
use crate::limiter::iteration_cap;
use crate::periods::{period_candidates, subday};
use crate::rule::Rule;
use crate::timezone::{add_months, add_years, to_instant, to_local};

/// Lazily expands a rule into its occurrences, in ascending target-zone
/// wall-clock order.
///
/// The driver owns a single period's candidate buffer (at most 366 entries,
/// for a YEARLY rule) plus the anchor and the evaluation counter; dropping
/// the iterator releases everything. Candidates before dtstart are skipped
/// without consuming evaluation budget; every later candidate counts
/// against the safety cap whether or not it clears the query lower bound,
/// so COUNT retains its RFC meaning of "occurrences from dtstart".
///
/// The anchor is carried as an instant. Calendar-grained frequencies
/// (DAILY..YEARLY) advance it through wall-clock arithmetic so the local
/// time of day survives DST transitions; sub-day frequencies add elapsed
/// time directly, which keeps their absolute spacing exact even through the
/// repeated wall-clock hour of a fall-back transition.
#[derive(Debug)]
pub struct OccurrenceIterator {
    rule: Rule,
    tz: Tz,
    dtstart: NaiveDateTime,
    anchor: DateTime<Tz>,
    until: Option<NaiveDateTime>,
    mindate: NaiveDateTime,
    maxdate: NaiveDateTime,
    buffer: VecDeque<DateTime<Tz>>,
    previous: Option<DateTime<Tz>>,
    emitted: usize,
    cap: usize,
    is_ended: bool,
}

impl OccurrenceIterator {
    pub fn new(
        rule: &Rule,
        dtstart: NaiveDateTime,
        mindate: Option<NaiveDateTime>,
        maxdate: NaiveDateTime,
        requested_max: usize,
        tz: Tz,
    ) -> Result<OccurrenceIterator, RecurrenceError> {
        if rule.freq.is_sub_day() && !cfg!(feature = "allow_subday") {
            return Err(RecurrenceError::UnsupportedFrequency(rule.freq));
        }

        let until = rule.until.as_ref().map(|until| {
            if until.is_utc {
                // A Z-suffixed UNTIL is an absolute bound; compare it in the
                // target zone's wall-clock space like everything else.
                to_local(chrono::Utc.from_utc_datetime(&until.date_time).with_timezone(&tz), tz)
            } else {
                until.date_time
            }
        });

        let cap = iteration_cap(rule.freq, rule.count, requested_max);

        Ok(OccurrenceIterator {
            rule: rule.clone(),
            tz,
            dtstart,
            anchor: to_instant(dtstart, tz),
            until,
            mindate: mindate.unwrap_or(dtstart),
            maxdate,
            buffer: VecDeque::new(),
            previous: None,
            emitted: 0,
            cap,
            is_ended: false,
        })
    }

    fn fill_buffer(&mut self) {
        if self.rule.freq.is_sub_day() {
            // The sub-day candidate is the anchor instant itself, so the two
            // readings of a repeated fall-back hour stay distinct.
            let keep = !subday::candidates(&self.rule, self.anchor.naive_local()).is_empty();

            self.buffer = if keep {
                VecDeque::from([self.anchor])
            } else {
                VecDeque::new()
            };

            return;
        }

        let tz = self.tz;

        self.buffer = period_candidates(&self.rule, self.anchor.naive_local(), self.dtstart)
            .into_iter()
            .map(|candidate| to_instant(candidate, tz))
            .collect();
    }

    /// Advances the anchor by INTERVAL frequency units: wall-clock adds for
    /// the calendar-grained frequencies, elapsed-time adds for the sub-day
    /// ones.
    fn advance_anchor(&mut self) {
        let interval = self.rule.interval as i64;
        let anchor_local = self.anchor.naive_local();

        let next_anchor = match self.rule.freq {
            Frequency::Yearly => {
                add_years(anchor_local, self.rule.interval as i32).map(|local| to_instant(local, self.tz))
            }

            Frequency::Monthly => {
                add_months(anchor_local, self.rule.interval as i32).map(|local| to_instant(local, self.tz))
            }

            Frequency::Weekly => anchor_local
                .checked_add_signed(Duration::weeks(interval))
                .map(|local| to_instant(local, self.tz)),

            Frequency::Daily => anchor_local
                .checked_add_signed(Duration::days(interval))
                .map(|local| to_instant(local, self.tz)),

            Frequency::Hourly => Some(self.anchor + Duration::hours(interval)),
            Frequency::Minutely => Some(self.anchor + Duration::minutes(interval)),
            Frequency::Secondly => Some(self.anchor + Duration::seconds(interval)),
        };

        match next_anchor {
            Some(anchor) => self.anchor = anchor,
            // Date arithmetic ran off the end of the representable range.
            None => self.is_ended = true,
        }
    }
}

impl Iterator for OccurrenceIterator {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_ended {
            return None;
        }

        loop {
            while let Some(candidate) = self.buffer.pop_front() {
                let wall_clock = candidate.naive_local();

                if wall_clock < self.dtstart {
                    continue;
                }

                // SKIP=FORWARD can push a candidate into the next period,
                // where the following period may generate the same instant
                // again; duplicates across periods are collapsed here.
                if self.previous.is_some_and(|previous| candidate <= previous) {
                    continue;
                }

                if let Some(until) = self.until {
                    if wall_clock > until {
                        self.is_ended = true;

                        return None;
                    }
                }

                if wall_clock > self.maxdate {
                    self.is_ended = true;

                    return None;
                }

                self.emitted += 1;

                if self.emitted >= self.cap {
                    self.is_ended = true;
                }

                self.previous = Some(candidate);

                if wall_clock >= self.mindate {
                    return Some(candidate);
                }

                if self.is_ended {
                    return None;
                }
            }

            if self.is_ended || self.emitted >= self.cap || self.anchor.naive_local() > self.maxdate {
                self.is_ended = true;

                return None;
            }

            self.fill_buffer();

            self.advance_anchor();
        }
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

    fn iterator(rule: &Rule, dtstart: NaiveDateTime) -> OccurrenceIterator {
        OccurrenceIterator::new(
            rule,
            dtstart,
            None,
            local(2100, 1, 1, 0, 0, 0),
            1000,
            Tz::UTC,
        )
        .unwrap()
    }

    #[test]
    fn test_count_terminates_the_stream() {
        let rule = Rule::from_str("FREQ=DAILY;COUNT=3").unwrap();
        let mut occurrences = iterator(&rule, local(2025, 1, 6, 10, 0, 0));

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 7, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 8, 10, 0, 0)));
        assert_eq!(occurrences.next(), None);
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_until_is_inclusive() {
        let rule = Rule::from_str("FREQ=DAILY;UNTIL=20250108T100000Z").unwrap();
        let mut occurrences = iterator(&rule, local(2025, 1, 6, 10, 0, 0));

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 7, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 8, 10, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_interval_stepping() {
        let rule = Rule::from_str("FREQ=WEEKLY;INTERVAL=2;COUNT=3").unwrap();
        let mut occurrences = iterator(&rule, local(2025, 1, 6, 9, 0, 0));

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 9, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 20, 9, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 2, 3, 9, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_candidates_before_dtstart_are_discarded() {
        // dtstart falls mid-week: the Monday and Wednesday of that first
        // week precede it and must not surface.
        let rule = Rule::from_str("FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=2").unwrap();
        let mut occurrences = iterator(&rule, local(2025, 1, 9, 10, 0, 0));

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 10, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 13, 10, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_mindate_yields_from_the_window_base() {
        let rule = Rule::from_str("FREQ=DAILY").unwrap();

        let mut occurrences = OccurrenceIterator::new(
            &rule,
            local(2025, 1, 1, 10, 0, 0),
            Some(local(2025, 1, 10, 0, 0, 0)),
            local(2025, 1, 12, 23, 59, 59),
            1000,
            Tz::UTC,
        )
        .unwrap();

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 10, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 11, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 12, 10, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_count_is_consumed_by_pre_window_occurrences() {
        // COUNT counts occurrences from dtstart, so a later window sees
        // only the tail.
        let rule = Rule::from_str("FREQ=DAILY;COUNT=5").unwrap();

        let mut occurrences = OccurrenceIterator::new(
            &rule,
            local(2025, 1, 1, 10, 0, 0),
            Some(local(2025, 1, 4, 0, 0, 0)),
            local(2025, 2, 1, 0, 0, 0),
            1000,
            Tz::UTC,
        )
        .unwrap();

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 4, 10, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 5, 10, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[test]
    fn test_safety_cap_truncates_sparse_rules() {
        let rule = Rule::from_str("FREQ=DAILY;BYDAY=MO;BYSETPOS=-1").unwrap();

        let occurrences = OccurrenceIterator::new(
            &rule,
            local(2025, 1, 6, 10, 0, 0),
            None,
            local(2100, 1, 1, 0, 0, 0),
            2,
            Tz::UTC,
        )
        .unwrap();

        // The DAILY budget is requested_max x 20 candidate evaluations, and
        // only Mondays produce a candidate at all.
        assert_eq!(occurrences.count(), 40);
    }

    #[test]
    fn test_unsatisfiable_rule_yields_empty_not_error() {
        let rule = Rule::from_str("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=31").unwrap();

        let occurrences = OccurrenceIterator::new(
            &rule,
            local(2025, 1, 1, 10, 0, 0),
            None,
            local(2030, 1, 1, 0, 0, 0),
            1000,
            Tz::UTC,
        )
        .unwrap();

        assert_eq!(occurrences.count(), 0);
    }

    #[test]
    fn test_ascending_order_is_strict() {
        let rule = Rule::from_str("FREQ=MONTHLY;BYMONTHDAY=1,15,-1;COUNT=12").unwrap();
        let occurrences: Vec<NaiveDateTime> = iterator(&rule, local(2025, 1, 1, 9, 0, 0))
            .map(|occurrence| occurrence.naive_local())
            .collect();

        assert_eq!(occurrences.len(), 12);

        for window in occurrences.windows(2) {
            assert!(window[0] < window[1], "not strictly ascending: {window:?}");
        }
    }

    #[cfg(not(feature = "allow_subday"))]
    #[test]
    fn test_sub_day_frequencies_are_gated() {
        let rule = Rule::from_str("FREQ=HOURLY").unwrap();

        assert_eq!(
            OccurrenceIterator::new(
                &rule,
                local(2025, 1, 6, 10, 0, 0),
                None,
                local(2026, 1, 1, 0, 0, 0),
                1000,
                Tz::UTC,
            )
            .err(),
            Some(RecurrenceError::UnsupportedFrequency(Frequency::Hourly)),
        );
    }

    #[cfg(feature = "allow_subday")]
    #[test]
    fn test_hourly_expansion() {
        let rule = Rule::from_str("FREQ=HOURLY;INTERVAL=6;COUNT=4").unwrap();
        let mut occurrences = iterator(&rule, local(2025, 1, 6, 0, 0, 0));

        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 0, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 6, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 12, 0, 0)));
        assert_eq!(occurrences.next().map(|occurrence| occurrence.naive_local()), Some(local(2025, 1, 6, 18, 0, 0)));
        assert_eq!(occurrences.next(), None);
    }

    #[cfg(feature = "allow_subday")]
    #[test]
    fn test_hourly_absolute_spacing_across_spring_forward() {
        // Across the 2025-03-09 spring-forward jump in New York the wall
        // clock skips 02:00 -> 03:00 but the absolute spacing stays 1 hour.
        let rule = Rule::from_str("FREQ=HOURLY;COUNT=4").unwrap();

        let occurrences: Vec<DateTime<Tz>> = OccurrenceIterator::new(
            &rule,
            local(2025, 3, 9, 0, 0, 0),
            None,
            local(2025, 3, 10, 0, 0, 0),
            1000,
            Tz::America__New_York,
        )
        .unwrap()
        .collect();

        assert_eq!(occurrences.len(), 4);

        for window in occurrences.windows(2) {
            assert_eq!(window[1].timestamp() - window[0].timestamp(), 3600);
        }

        let wall_clock: Vec<NaiveDateTime> = occurrences
            .iter()
            .map(|occurrence| occurrence.naive_local())
            .collect();

        assert_eq!(
            wall_clock,
            vec![
                local(2025, 3, 9, 0, 0, 0),
                local(2025, 3, 9, 1, 0, 0),
                local(2025, 3, 9, 3, 0, 0),
                local(2025, 3, 9, 4, 0, 0),
            ],
        );
    }

    #[cfg(feature = "allow_subday")]
    #[test]
    fn test_hourly_absolute_spacing_across_fall_back() {
        // The fall-back transition repeats the 01:00 wall-clock hour; both
        // readings are distinct instants one absolute hour apart.
        let rule = Rule::from_str("FREQ=HOURLY;COUNT=4").unwrap();

        let occurrences: Vec<DateTime<Tz>> = OccurrenceIterator::new(
            &rule,
            local(2025, 11, 2, 0, 0, 0),
            None,
            local(2025, 11, 3, 0, 0, 0),
            1000,
            Tz::America__New_York,
        )
        .unwrap()
        .collect();

        assert_eq!(occurrences.len(), 4);

        for window in occurrences.windows(2) {
            assert_eq!(window[1].timestamp() - window[0].timestamp(), 3600);
        }

        let wall_clock: Vec<NaiveDateTime> = occurrences
            .iter()
            .map(|occurrence| occurrence.naive_local())
            .collect();

        assert_eq!(
            wall_clock,
            vec![
                local(2025, 11, 2, 0, 0, 0),
                local(2025, 11, 2, 1, 0, 0),
                local(2025, 11, 2, 1, 0, 0),
                local(2025, 11, 2, 2, 0, 0),
            ],
        );
    }
}
