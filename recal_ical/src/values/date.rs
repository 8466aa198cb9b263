use nom::combinator::map;
use nom::error::context;
use nom::sequence::tuple;

use nom::bytes::complete::take_while_m_n;

use crate::{ICalendarEntity, ParserError, ParserInput, ParserResult, impl_icalendar_entity_traits, map_err_message};

/// Parse date-fullyear chars.
///
/// # Examples
///
/// ```rust
/// use recal_ical::values::date::date_fullyear;
///
/// assert!(date_fullyear("2025".into()).is_ok());
/// assert!(date_fullyear("0000".into()).is_ok());
///
/// assert!(date_fullyear("202".into()).is_err());
/// assert!(date_fullyear(":".into()).is_err());
/// ```
///
/// date-fullyear      = 4DIGIT
pub fn date_fullyear(input: ParserInput) -> ParserResult<i32> {
    let (remaining, year) = take_while_m_n(4, 4, |value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_year) = year.to_string().parse::<i32>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid year"), input)
            )
        );
    };

    Ok((remaining, parsed_year))
}

/// Parse date-month chars.
///
/// # Examples
///
/// ```rust
/// use recal_ical::values::date::date_month;
///
/// assert!(date_month("01".into()).is_ok());
/// assert!(date_month("12".into()).is_ok());
///
/// assert!(date_month("00".into()).is_err());
/// assert!(date_month("13".into()).is_err());
/// ```
///
/// date-month         = 2DIGIT        ;01-12
pub fn date_month(input: ParserInput) -> ParserResult<u32> {
    let (remaining, month) = take_while_m_n(2, 2, |value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_month) = month.to_string().parse::<u32>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid month"), input)
            )
        );
    };

    if !(1..=12).contains(&parsed_month) {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("expected month between 01-12"), input)
            )
        );
    }

    Ok((remaining, parsed_month))
}

/// Parse date-mday chars.
///
/// # Examples
///
/// ```rust
/// use recal_ical::values::date::date_mday;
///
/// assert!(date_mday("01".into()).is_ok());
/// assert!(date_mday("31".into()).is_ok());
///
/// assert!(date_mday("00".into()).is_err());
/// assert!(date_mday("32".into()).is_err());
/// ```
///
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
pub fn date_mday(input: ParserInput) -> ParserResult<u32> {
    let (remaining, mday) = take_while_m_n(2, 2, |value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_mday) = mday.to_string().parse::<u32>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid month day"), input)
            )
        );
    };

    if !(1..=31).contains(&parsed_mday) {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("expected month day between 01-31"), input)
            )
        );
    }

    Ok((remaining, parsed_mday))
}

// Value Name:  DATE
//
// Purpose:  This value type is used to identify values that contain a
//    calendar date.
//
// Format Definition:  This value type is defined by the following
//    notation:
//
//     date               = date-value
//
//     date-value         = date-fullyear date-month date-mday
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ICalendarEntity for Date {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "DATE",
            map(
                map_err_message!(
                    tuple((date_fullyear, date_month, date_mday)),
                    "expected iCalendar RFC-5545 DATE (YYYYMMDD)",
                ),
                |(year, month, day)| {
                    Self { year, month, day }
                },
            )
        )(input)
    }

    fn render_ical(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    fn validate(&self) -> Result<(), String> {
        if chrono::NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(format!("invalid date: {}", self.render_ical()));
        }

        Ok(())
    }
}

impl Date {
    pub fn to_naive_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl_icalendar_entity_traits!(Date);
