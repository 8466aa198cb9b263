use std::str::FromStr;

use chrono::NaiveDateTime;
use chrono_tz::Tz;

use recal_ical::ICalendarEntity;
use recal_ical::values::recur::{Frequency, Recur, Skip, WeekDay, WeekDayNum};

use crate::error::RecurrenceError;

/// One BYDAY entry: a weekday with an optional ordinal (`2TU` is the second
/// Tuesday of the period, `-1FR` the last Friday).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i32>,
    pub weekday: WeekDay,
}

/// The UNTIL bound in the form it was written: wall-clock fields plus
/// whether they carried the UTC `Z` suffix or were date-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Until {
    pub date_time: NaiveDateTime,
    pub is_utc: bool,
    pub has_time: bool,
}

/// The compiled, immutable form of a validated recurrence rule.
///
/// Built from a [`Recur`] that already passed the RFC 5545 section 3.3.10
/// constraint checks, so construction only has to reject the semantic cases
/// the grammar cannot see: an unsupported RSCALE and (per RFC 7529) the
/// GREGORIAN inference when SKIP is present without RSCALE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub freq: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Until>,
    pub wkst: WeekDay,
    pub tz: Option<Tz>,
    pub rscale: Option<String>,
    pub skip: Skip,
    pub by_month: Vec<u32>,
    pub by_week_no: Vec<i32>,
    pub by_year_day: Vec<i32>,
    pub by_month_day: Vec<i32>,
    pub by_day: Vec<ByDay>,
    pub by_hour: Vec<u32>,
    pub by_minute: Vec<u32>,
    pub by_second: Vec<u32>,
    pub by_set_pos: Vec<i32>,
}

impl Rule {
    pub fn from_recur(recur: &Recur) -> Result<Self, RecurrenceError> {
        let Some(freq_param) = recur.freq.as_ref() else {
            return Err(RecurrenceError::InvalidRule(String::from(
                "FREQ is required (RFC 5545 section 3.3.10)",
            )));
        };

        if let Some(rscale_param) = recur.rscale.as_ref() {
            if !rscale_param.0.is_gregorian() {
                return Err(RecurrenceError::UnsupportedRScale(rscale_param.0.0.clone()));
            }
        }

        let skip = recur.skip.as_ref().map(|param| param.0).unwrap_or(Skip::Omit);

        // RFC 7529 section 4.3: SKIP is only valid alongside RSCALE; a rule
        // carrying SKIP without RSCALE implies RSCALE=GREGORIAN.
        let rscale = match (recur.rscale.as_ref(), skip) {
            (Some(rscale_param), _) => Some(rscale_param.0.0.to_uppercase()),
            (None, Skip::Backward | Skip::Forward) => Some(String::from("GREGORIAN")),
            (None, Skip::Omit) => None,
        };

        let until = match recur.until.as_ref() {
            Some(until_param) => {
                let date_time = until_param.0.to_naive_date_time().ok_or_else(|| {
                    RecurrenceError::InvalidRule(format!(
                        "UNTIL={} does not name a valid date",
                        until_param.0.render_ical(),
                    ))
                })?;

                Some(Until {
                    date_time,
                    is_utc: until_param.0.is_utc(),
                    has_time: until_param.0.time.is_some(),
                })
            }

            None => None,
        };

        Ok(Rule {
            freq: freq_param.0,
            interval: recur.interval.as_ref().map(|param| param.0.0 as u32).unwrap_or(1),
            count: recur.count.as_ref().map(|param| param.0.0 as u32),
            until,
            wkst: recur.wkst.as_ref().map(|param| param.0).unwrap_or(WeekDay::Monday),
            tz: recur.tzid.as_ref().map(|param| param.0.0),
            rscale,
            skip,
            by_month: integer_list(&recur.bymonth.as_ref().map(|param| param.0.clone()), |value| value as u32),
            by_week_no: integer_list(&recur.byweekno.as_ref().map(|param| param.0.clone()), |value| value as i32),
            by_year_day: integer_list(&recur.byyearday.as_ref().map(|param| param.0.clone()), |value| value as i32),
            by_month_day: integer_list(&recur.bymonthday.as_ref().map(|param| param.0.clone()), |value| value as i32),
            by_day: recur
                .byday
                .as_ref()
                .map(|param| {
                    param
                        .0
                        .iter()
                        .map(|WeekDayNum(ordinal, weekday)| ByDay {
                            ordinal: ordinal.as_ref().map(|value| value.0 as i32),
                            weekday: *weekday,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            by_hour: integer_list(&recur.byhour.as_ref().map(|param| param.0.clone()), |value| value as u32),
            by_minute: integer_list(&recur.byminute.as_ref().map(|param| param.0.clone()), |value| value as u32),
            by_second: integer_list(&recur.bysecond.as_ref().map(|param| param.0.clone()), |value| value as u32),
            by_set_pos: integer_list(&recur.bysetpos.as_ref().map(|param| param.0.clone()), |value| value as i32),
        })
    }

    /// Whether any BYxxx rule part constrains the candidate set.
    pub fn has_by_rule_part(&self) -> bool {
        !self.by_month.is_empty()
            || !self.by_week_no.is_empty()
            || !self.by_year_day.is_empty()
            || !self.by_month_day.is_empty()
            || !self.by_day.is_empty()
            || !self.by_hour.is_empty()
            || !self.by_minute.is_empty()
            || !self.by_second.is_empty()
    }

    /// Renders the canonical RRULE text for this rule. Defaulted parts
    /// (INTERVAL=1, WKST=MO, SKIP=OMIT) are left implicit.
    pub fn to_rrule_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(rscale) = self.rscale.as_ref() {
            parts.push(format!("RSCALE={rscale}"));
        }

        parts.push(format!("FREQ={}", self.freq.render_ical()));

        if let Some(until) = self.until.as_ref() {
            let date = until.date_time.format("%Y%m%d");

            if until.has_time {
                let time = until.date_time.format("%H%M%S");
                let suffix = if until.is_utc { "Z" } else { "" };

                parts.push(format!("UNTIL={date}T{time}{suffix}"));
            } else {
                parts.push(format!("UNTIL={date}"));
            }
        }

        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }

        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        push_joined_if_present("BYSECOND", &self.by_second, &mut parts);
        push_joined_if_present("BYMINUTE", &self.by_minute, &mut parts);
        push_joined_if_present("BYHOUR", &self.by_hour, &mut parts);

        if !self.by_day.is_empty() {
            let rendered = self
                .by_day
                .iter()
                .map(|entry| {
                    match entry.ordinal {
                        Some(ordinal) => format!("{}{}", ordinal, entry.weekday.render_ical()),
                        None => entry.weekday.render_ical(),
                    }
                })
                .collect::<Vec<String>>()
                .join(",");

            parts.push(format!("BYDAY={rendered}"));
        }

        push_joined_if_present("BYMONTHDAY", &self.by_month_day, &mut parts);
        push_joined_if_present("BYYEARDAY", &self.by_year_day, &mut parts);
        push_joined_if_present("BYWEEKNO", &self.by_week_no, &mut parts);
        push_joined_if_present("BYMONTH", &self.by_month, &mut parts);
        push_joined_if_present("BYSETPOS", &self.by_set_pos, &mut parts);

        if self.wkst != WeekDay::Monday {
            parts.push(format!("WKST={}", self.wkst.render_ical()));
        }

        if self.skip != Skip::Omit {
            parts.push(format!("SKIP={}", self.skip.render_ical()));
        }

        if let Some(tz) = self.tz.as_ref() {
            parts.push(format!("TZID={tz}"));
        }

        parts.join(";")
    }
}

fn integer_list<T>(list: &Option<recal_ical::values::list::List<recal_ical::values::integer::Integer>>, convert: fn(i64) -> T) -> Vec<T> {
    list.as_ref()
        .map(|list| list.iter().map(|value| convert(value.0)).collect())
        .unwrap_or_default()
}

fn push_joined_if_present<T: std::fmt::Display>(key: &str, values: &[T], parts: &mut Vec<String>) {
    if !values.is_empty() {
        let rendered = values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>()
            .join(",");

        parts.push(format!("{key}={rendered}"));
    }
}

impl FromStr for Rule {
    type Err = RecurrenceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let recur = Recur::from_str(input).map_err(RecurrenceError::InvalidRule)?;

        Self::from_recur(&recur)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rrule_string())
    }
}
