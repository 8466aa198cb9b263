use chrono_tz::Tz;

use nom::bytes::complete::take_while1;
use nom::combinator::{map_res, opt, recognize};
use nom::error::context;
use nom::sequence::pair;

use crate::grammar::{is_safe_char, solidus};

use crate::{ICalendarEntity, ParserInput, ParserResult, impl_icalendar_entity_traits, map_err_message};

// Property Parameter Name:  TZID
//
// Purpose:  To specify the identifier for the time zone definition for
//    a time component in the property value.
//
// Format Definition:  This property parameter is defined by the
//    following notation:
//
//     tzidparam  = "TZID" "=" [tzidprefix] paramtext
//
//     tzidprefix = "/"
//
// The identifier is resolved against the embedded IANA database at parse
// time, so an unrecognised zone name is rejected before any expansion work.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Tzid(pub Tz);

impl ICalendarEntity for Tzid {
    fn parse_ical(input: ParserInput) -> ParserResult<Self> {
        context(
            "TZID",
            map_res(
                recognize(
                    pair(
                        opt(solidus),
                        // Permits paramtext chars except whitespace.
                        map_err_message!(
                            take_while1(|input: char| {
                                is_safe_char(input) && !input.is_ascii_whitespace()
                            }),
                            "expected iCalendar RFC-5545 TZID",
                        ),
                    )
                ),
                |tzid: ParserInput| {
                    match tzid.trim_start_matches('/').parse::<Tz>() {
                        Ok(tz) => Ok(Self(tz)),
                        Err(_error) => Err(format!("unknown timezone: {}", *tzid)),
                    }
                }
            )
        )(input)
    }

    fn render_ical(&self) -> String {
        self.0.to_string()
    }
}

impl From<Tzid> for Tz {
    fn from(tzid: Tzid) -> Self {
        tzid.0
    }
}

impl From<&Tzid> for Tz {
    fn from(tzid: &Tzid) -> Self {
        tzid.0
    }
}

impl_icalendar_entity_traits!(Tzid);
