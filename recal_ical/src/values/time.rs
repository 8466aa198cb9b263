use nom::combinator::{map, opt};
use nom::error::context;
use nom::sequence::tuple;

use nom::bytes::complete::take_while_m_n;

use crate::grammar::latin_capital_letter_z;

use crate::{ICalendarEntity, ParserError, ParserInput, ParserResult, impl_icalendar_entity_traits, map_err_message};

/// Parse time-hour chars.
///
/// time-hour    = 2DIGIT        ;00-23
pub fn time_hour(input: ParserInput) -> ParserResult<u32> {
    parse_time_component(input, 23, "expected hour between 00-23")
}

/// Parse time-minute chars.
///
/// time-minute  = 2DIGIT        ;00-59
pub fn time_minute(input: ParserInput) -> ParserResult<u32> {
    parse_time_component(input, 59, "expected minute between 00-59")
}

/// Parse time-second chars.
///
/// time-second  = 2DIGIT        ;00-60
/// ;The "60" value is used to account for positive "leap" seconds.
pub fn time_second(input: ParserInput) -> ParserResult<u32> {
    parse_time_component(input, 60, "expected second between 00-60")
}

fn parse_time_component<'a>(input: ParserInput<'a>, max_value: u32, expectation: &str) -> ParserResult<'a, u32> {
    let (remaining, digits) = take_while_m_n(2, 2, |value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_value) = digits.to_string().parse::<u32>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid time"), input)
            )
        );
    };

    if parsed_value > max_value {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from(expectation), input)
            )
        );
    }

    Ok((remaining, parsed_value))
}

// Value Name:  TIME
//
// Purpose:  This value type is used to identify values that contain a
//    time of day.
//
// Format Definition:  This value type is defined by the following
//    notation:
//
//     time         = time-hour time-minute time-second [time-utc]
//
//     time-utc     = "Z"
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Time {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub is_utc: bool,
}

impl ICalendarEntity for Time {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "TIME",
            map(
                map_err_message!(
                    tuple((time_hour, time_minute, time_second, opt(latin_capital_letter_z))),
                    "expected iCalendar RFC-5545 TIME (HHMMSS with optional Z suffix)",
                ),
                |(hour, minute, second, utc_suffix)| {
                    Self {
                        hour,
                        minute,
                        second,
                        is_utc: utc_suffix.is_some(),
                    }
                },
            )
        )(input)
    }

    fn render_ical(&self) -> String {
        if self.is_utc {
            format!("{:02}{:02}{:02}Z", self.hour, self.minute, self.second)
        } else {
            format!("{:02}{:02}{:02}", self.hour, self.minute, self.second)
        }
    }
}

impl_icalendar_entity_traits!(Time);
