use nom::combinator::{cut, map, opt};
use nom::error::context;
use nom::sequence::{pair, preceded};

use crate::grammar::latin_capital_letter_t;

use crate::values::date::Date;
use crate::values::time::Time;

use crate::{ICalendarEntity, ParserInput, ParserResult, impl_icalendar_entity_traits};

// Value Name:  DATE-TIME
//
// Purpose:  This value type is used to identify values that specify a
//    precise calendar date and time of day.
//
// Format Definition:  This value type is defined by the following
//    notation:
//
//     date-time  = date "T" time ;As specified in the DATE and TIME
//                                ;value definitions
//
// The time part is optional here so that the same value covers the RRULE
// UNTIL forms `YYYYMMDD` and `YYYYMMDD"T"HHMMSS["Z"]`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DateTime {
    pub date: Date,
    pub time: Option<Time>,
}

impl ICalendarEntity for DateTime {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "DATE-TIME",
            map(
                pair(
                    Date::parse_ical,
                    opt(
                        preceded(
                            latin_capital_letter_t,
                            cut(Time::parse_ical),
                        )
                    ),
                ),
                |(date, time)| {
                    Self { date, time }
                },
            )
        )(input)
    }

    fn render_ical(&self) -> String {
        if let Some(time) = self.time.as_ref() {
            format!("{}T{}", self.date.render_ical(), time.render_ical())
        } else {
            self.date.render_ical()
        }
    }

    fn validate(&self) -> Result<(), String> {
        self.date.validate()
    }
}

impl DateTime {
    /// Whether the time component carries the UTC `Z` suffix.
    pub fn is_utc(&self) -> bool {
        self.time.as_ref().is_some_and(|time| time.is_utc)
    }

    /// The naive wall-clock value; midnight when no time part is present.
    /// Leap second values (second 60) clamp to 59.
    pub fn to_naive_date_time(&self) -> Option<chrono::NaiveDateTime> {
        let date = self.date.to_naive_date()?;

        match self.time.as_ref() {
            Some(time) => date.and_hms_opt(time.hour, time.minute, time.second.min(59)),
            None => date.and_hms_opt(0, 0, 0),
        }
    }
}

impl_icalendar_entity_traits!(DateTime);

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::assert_parser_output;

    #[test]
    fn parse_ical() {
        assert_parser_output!(
            DateTime::parse_ical("20250106 TESTING".into()),
            (
                " TESTING",
                DateTime {
                    date: Date {
                        year: 2025_i32,
                        month: 1_u32,
                        day: 6_u32,
                    },
                    time: None,
                },
            ),
        );

        assert_parser_output!(
            DateTime::parse_ical("20250106T100000Z TESTING".into()),
            (
                " TESTING",
                DateTime {
                    date: Date {
                        year: 2025_i32,
                        month: 1_u32,
                        day: 6_u32,
                    },
                    time: Some(
                        Time {
                            hour: 10_u32,
                            minute: 0_u32,
                            second: 0_u32,
                            is_utc: true,
                        }
                    ),
                },
            ),
        );

        assert!(DateTime::parse_ical("2025010".into()).is_err());
        assert!(DateTime::parse_ical("20250106T".into()).is_err());
        assert!(DateTime::parse_ical("20250106T1000".into()).is_err());
        assert!(DateTime::parse_ical(":".into()).is_err());
    }

    #[test]
    fn render_ical() {
        assert_eq!(
            DateTime {
                date: Date {
                    year: 2025_i32,
                    month: 1_u32,
                    day: 6_u32,
                },
                time: None,
            }.render_ical(),
            String::from("20250106"),
        );

        assert_eq!(
            DateTime {
                date: Date {
                    year: 2025_i32,
                    month: 1_u32,
                    day: 6_u32,
                },
                time: Some(
                    Time {
                        hour: 10_u32,
                        minute: 0_u32,
                        second: 0_u32,
                        is_utc: true,
                    }
                ),
            }.render_ical(),
            String::from("20250106T100000Z"),
        );
    }

    #[test]
    fn to_naive_date_time() {
        assert_eq!(
            DateTime {
                date: Date {
                    year: 2025_i32,
                    month: 1_u32,
                    day: 6_u32,
                },
                time: Some(
                    Time {
                        hour: 10_u32,
                        minute: 30_u32,
                        second: 0_u32,
                        is_utc: false,
                    }
                ),
            }.to_naive_date_time(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 6)
                .and_then(|date| date.and_hms_opt(10, 30, 0)),
        );

        assert_eq!(
            DateTime {
                date: Date {
                    year: 2025_i32,
                    month: 2_u32,
                    day: 29_u32,
                },
                time: None,
            }.to_naive_date_time(),
            None,
        );
    }
}
