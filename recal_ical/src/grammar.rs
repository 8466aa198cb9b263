use nom::branch::alt;
use nom::bytes::complete::{take_while1, take_while_m_n};
use nom::character::is_alphabetic;
use nom::combinator::{map, opt, recognize};
use nom::sequence::pair;

use crate::{ICalendarEntity, ParserError, ParserInput, ParserResult, impl_icalendar_entity_traits};

/// Recognizes a pattern
///
/// Wrapped nom::bytes::complete::tag to provide better error messages e.g. "expected '<tag text>'"
/// over the unhelpful nom base tag parser.
///
/// # Example
/// ```rust
/// # use nom::{Err, error::{Error, ErrorKind}, Needed, IResult};
/// use recal_ical::{ParserError, ParserInput, ParserResult};
/// use recal_ical::grammar::tag;
///
/// fn parser(input: ParserInput) -> ParserResult<ParserInput> {
///   tag("FREQ")(input)
/// }
///
/// assert!(parser("FREQ=DAILY".into()).is_ok());
///
/// let input: ParserInput = "COUNT=10".into();
///
/// assert_eq!(
///     parser(input),
///     Err(
///         nom::Err::Error(
///             ParserError::new(String::from("expected 'FREQ'"), input)
///         )
///     ),
/// );
/// ```
pub fn tag<'a>(tag: &'a str) -> impl Fn(ParserInput) -> ParserResult<ParserInput> + 'a {
    move |input: ParserInput| {
        match nom::bytes::complete::tag::<&'a str, ParserInput, ParserError>(tag)(input) {
            Ok(result) => Ok(result),

            Err(nom::Err::Error(_error)) => {
                Err(
                    nom::Err::Error(
                        ParserError::new(format!("expected '{}'", tag), input)
                    )
                )
            },

            Err(nom::Err::Failure(_error)) => {
                Err(
                    nom::Err::Failure(
                        ParserError::new(format!("expected '{}'", tag), input)
                    )
                )
            },

            Err(nom::Err::Incomplete(error)) => {
                Err(
                    nom::Err::Incomplete(error)
                )
            },
        }
    }
}

/// Returns if comma char.
pub fn is_comma_char(input: char) -> bool {
    input == ','
}

/// Parses comma char.
///
/// # Examples
///
/// ```rust
/// use recal_ical::grammar::comma;
///
/// assert!(comma(",test".into()).is_ok());
/// assert!(comma("test".into()).is_err());
/// ```
pub fn comma(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_comma_char)(input)
}

/// Returns if semicolon char.
pub fn is_semicolon_char(input: char) -> bool {
    input == ';'
}

/// Parses semicolon char.
///
/// # Examples
///
/// ```rust
/// use recal_ical::grammar::semicolon;
///
/// assert!(semicolon(";test".into()).is_ok());
/// assert!(semicolon("test".into()).is_err());
/// ```
pub fn semicolon(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_semicolon_char)(input)
}

/// Returns if equals sign char.
pub fn is_equals_char(input: char) -> bool {
    input == '='
}

/// Parses equals sign char.
pub fn equals(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_equals_char)(input)
}

/// Returns if plus sign char.
pub fn is_plus_sign_char(input: char) -> bool {
    input == '+'
}

/// Parses plus sign char.
pub fn plus_sign(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_plus_sign_char)(input)
}

/// Returns if hyphen-minus char.
pub fn is_hyphen_minus_char(input: char) -> bool {
    input == '-'
}

/// Parses hyphen-minus char.
pub fn hyphen_minus(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_hyphen_minus_char)(input)
}

/// Returns if solidus char.
pub fn is_solidus_char(input: char) -> bool {
    input == '/'
}

/// Parses solidus char.
pub fn solidus(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_solidus_char)(input)
}

/// Returns if LATIN CAPITAL LETTER T char.
pub fn is_latin_capital_letter_t_char(input: char) -> bool {
    input == 'T'
}

/// Parses LATIN CAPITAL LETTER T char.
pub fn latin_capital_letter_t(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_latin_capital_letter_t_char)(input)
}

/// Returns if LATIN CAPITAL LETTER Z char.
pub fn is_latin_capital_letter_z_char(input: char) -> bool {
    input == 'Z'
}

/// Parses LATIN CAPITAL LETTER Z char.
pub fn latin_capital_letter_z(input: ParserInput) -> ParserResult<ParserInput> {
    take_while_m_n(1, 1, is_latin_capital_letter_z_char)(input)
}

/// Returns if iana-token char.
///
/// iana-token    = 1*(ALPHA / DIGIT / "-")
pub fn is_iana_token_char(input: char) -> bool {
    is_alphabetic(input as u8) || input.is_ascii_digit() || is_hyphen_minus_char(input)
}

/// Parses iana-token chars.
///
/// # Examples
///
/// ```rust
/// use recal_ical::grammar::iana_token;
///
/// assert!(iana_token("X-EXTENSION=VALUE".into()).is_ok());
/// assert!(iana_token(";".into()).is_err());
/// ```
///
/// iana-token    = 1*(ALPHA / DIGIT / "-")
/// ; iCalendar identifier registered with IANA
pub fn iana_token(input: ParserInput) -> ParserResult<ParserInput> {
    take_while1(is_iana_token_char)(input)
}

/// Returns if a char is permitted inside an unquoted param value.
///
/// SAFE-CHAR     = WSP / %x21 / %x23-2B / %x2D-39 / %x3C-7E / NON-US-ASCII
/// ; Any character except CONTROL, DQUOTE, ";", ":", ","
pub fn is_safe_char(input: char) -> bool {
    !matches!(input, '\u{0}'..='\u{8}' | '\u{A}'..='\u{1F}' | '\u{7F}' | '"' | ';' | ':' | ',')
}

/// Parses a run of SAFE-CHAR chars (at least one).
pub fn safe_chars(input: ParserInput) -> ParserResult<ParserInput> {
    take_while1(is_safe_char)(input)
}

/// Positive/negative sign preceding a digit sequence.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PositiveNegative {
    Positive,
    Negative,
}

impl ICalendarEntity for PositiveNegative {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        alt((
            map(plus_sign, |_| Self::Positive),
            map(hyphen_minus, |_| Self::Negative),
        ))(input)
    }

    fn render_ical(&self) -> String {
        match self {
            Self::Positive => String::from("+"),
            Self::Negative => String::from("-"),
        }
    }
}

impl_icalendar_entity_traits!(PositiveNegative);

/// Parses (and discards) a `KEY=VALUE` rule part with an unrecognised key,
/// e.g. a vendor extension. The value runs to the next ";" part delimiter.
pub fn ignored_key_value_pair(input: ParserInput) -> ParserResult<ParserInput> {
    recognize(
        pair(
            pair(iana_token, equals),
            opt(safe_chars),
        )
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::assert_parser_output;

    #[test]
    fn parse_single_chars() {
        assert!(comma(",MO".into()).is_ok());
        assert!(comma("MO".into()).is_err());

        assert!(semicolon(";COUNT=3".into()).is_ok());
        assert!(semicolon("COUNT=3".into()).is_err());

        assert!(equals("=DAILY".into()).is_ok());
        assert!(equals("DAILY".into()).is_err());

        assert!(latin_capital_letter_t("T120000".into()).is_ok());
        assert!(latin_capital_letter_t("120000".into()).is_err());

        assert!(latin_capital_letter_z("Z".into()).is_ok());
        assert!(latin_capital_letter_z("".into()).is_err());
    }

    #[test]
    fn parse_positive_negative() {
        assert_parser_output!(
            PositiveNegative::parse_ical("+1".into()),
            (
                "1",
                PositiveNegative::Positive,
            ),
        );

        assert_parser_output!(
            PositiveNegative::parse_ical("-1".into()),
            (
                "1",
                PositiveNegative::Negative,
            ),
        );

        assert!(PositiveNegative::parse_ical("1".into()).is_err());
    }

    #[test]
    fn parse_ignored_key_value_pair() {
        assert_parser_output!(
            ignored_key_value_pair("X-CUSTOM=SOME VALUE;FREQ=DAILY".into()),
            (
                ";FREQ=DAILY",
                "X-CUSTOM=SOME VALUE".into(),
            ),
        );

        assert_parser_output!(
            ignored_key_value_pair("EMPTYKEY=".into()),
            (
                "",
                "EMPTYKEY=".into(),
            ),
        );

        assert!(ignored_key_value_pair("=VALUE".into()).is_err());
    }
}
