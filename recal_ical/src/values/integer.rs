use std::ops::{Deref, DerefMut};

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{digit1, one_of};
use nom::combinator::{map, map_res, opt, recognize};
use nom::sequence::pair;

use crate::grammar::PositiveNegative;
use crate::{ICalendarEntity, ParserError, ParserInput, ParserResult, impl_icalendar_entity_traits};

// integer      = (["+"] / "-") 1*DIGIT
pub fn integer(input: ParserInput) -> ParserResult<i64> {
    map_res(
        recognize(
            pair(opt(one_of("+-")), digit1)
        ),
        |value: ParserInput| value.parse::<i64>(),
    )(input)
}

// Value Name:  INTEGER
//
//    Purpose:  This value type is used to identify properties that contain
//       a signed integer value.
//
//    Format Definition:  This value type is defined by the following
//       notation:
//
//        integer      = (["+"] / "-") 1*DIGIT
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Integer(pub i64);

impl ICalendarEntity for Integer {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        map(integer, Self)(input)
    }

    fn render_ical(&self) -> String {
        self.0.to_string()
    }
}

impl Integer {
    /// Parses digits bounded both in character count and in magnitude, with
    /// an optional leading sign.
    ///
    /// The magnitude bounds apply before the sign, so a parser built with
    /// `min_value` of 1 rejects zero for both `+` and `-` inputs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recal_ical::values::integer::Integer;
    ///
    /// // 1-2 digits, magnitude 1-53 (e.g. a BYWEEKNO entry).
    /// let mut parser = Integer::parse_signed_m_n(1, 2, 1, 53);
    ///
    /// let (remaining, parsed_value) = parser("-3,20".into()).unwrap();
    ///
    /// assert_eq!(remaining.to_string(), String::from(",20"));
    /// assert_eq!(parsed_value, Integer(-3_i64));
    ///
    /// assert!(parser("0".into()).is_err());
    /// assert!(parser("-0".into()).is_err());
    /// assert!(parser("54".into()).is_err());
    /// ```
    /// [plus / minus] 1*digit
    pub fn parse_signed_m_n(min_chars: usize, max_chars: usize, min_value: i64, max_value: i64) -> impl FnMut(ParserInput) -> ParserResult<Integer> {
        move |input: ParserInput| {
            let (remaining, parsed_positive_negative) = opt(PositiveNegative::parse_ical)(input)?;
            let (remaining, mut parsed_integer) = Self::parse_unsigned_m_n(min_chars, max_chars, min_value, max_value)(remaining)?;

            if let Some(PositiveNegative::Negative) = parsed_positive_negative {
                parsed_integer.0 = -parsed_integer.0;
            }

            Ok((remaining, parsed_integer))
        }
    }

    /// Parses unsigned digits bounded both in character count and in value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recal_ical::values::integer::Integer;
    ///
    /// // 1-2 digits, value 0-23 (e.g. a BYHOUR entry).
    /// let mut parser = Integer::parse_unsigned_m_n(1, 2, 0, 23);
    ///
    /// let (remaining, parsed_value) = parser("9,17".into()).unwrap();
    ///
    /// assert_eq!(remaining.to_string(), String::from(",17"));
    /// assert_eq!(parsed_value, Integer(9_i64));
    ///
    /// assert!(parser("-9".into()).is_err());
    /// assert!(parser("24".into()).is_err());
    /// ```
    pub fn parse_unsigned_m_n(min_chars: usize, max_chars: usize, min_value: i64, max_value: i64) -> impl FnMut(ParserInput) -> ParserResult<Integer> {
        move |input: ParserInput| {
            let (remaining, parsed_value) = take_while_m_n(min_chars, max_chars, |value: char| value.is_ascii_digit())(input)?;

            let Ok(value) = parsed_value.to_string().parse::<i64>() else {
                return Err(
                    nom::Err::Error(
                        ParserError::new(String::from("invalid number"), input)
                    )
                );
            };

            if value < min_value || value > max_value {
                return Err(
                    nom::Err::Error(
                        ParserError::new(format!("expected number between {min_value}-{max_value}"), input)
                    )
                );
            }

            Ok((remaining, Integer::from(value)))
        }
    }
}

impl Deref for Integer {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Integer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Integer(value as i64)
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer(value as i64)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer(value)
    }
}

impl_icalendar_entity_traits!(Integer);
