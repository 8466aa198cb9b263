pub mod grammar;
pub mod values;

#[derive(Clone, Debug, PartialEq)]
pub struct ParserError<'a> {
    span: ParserInput<'a>,
    message: Option<String>,
    context: Vec<String>,
}

impl<'a> std::fmt::Display for ParserError<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self.message.clone().unwrap_or(String::from("-"));

        if self.context.is_empty() {
            write!(f, "Error: {message}")
        } else {
            let context = self.context.join(" <- ");

            write!(f, "Error: {message} in {context}")
        }
    }
}

impl<'a> ParserError<'a> {
    pub fn new(message: String, span: ParserInput<'a>) -> Self {
        Self {
            span,
            message: Some(message),
            context: Vec::new(),
        }
    }

    pub fn span(&self) -> &ParserInput {
        &self.span
    }

    pub fn message(&self) -> Option<&String> {
        self.message.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.span().location_offset()
    }
}

impl<'a> nom::error::ParseError<ParserInput<'a>> for ParserError<'a> {
    fn from_error_kind(input: ParserInput<'a>, kind: nom::error::ErrorKind) -> Self {
        Self::new(
            format!("parse error {:?}", kind),
            input,
        )
    }

    fn append(_input: ParserInput<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: ParserInput<'a>, unexpected: char) -> Self {
        Self::new(
            format!("unexpected character '{}'", unexpected),
            input,
        )
    }
}

impl<'a> nom::error::ContextError<ParserInput<'a>> for ParserError<'a> {
    fn add_context(_input: ParserInput, context: &'static str, mut other: Self) -> Self {
        other.context.push(String::from(context));
        other
    }
}

impl<'a, E> nom::error::FromExternalError<ParserInput<'a>, E> for ParserError<'a>
where
    E: ToString,
{
    /// Create a new error from an input position and an external error
    fn from_external_error(input: ParserInput<'a>, _kind: nom::error::ErrorKind, error: E) -> Self {
        Self::new(error.to_string(), input)
    }
}

/// Flattens a `ParserError` into a single-line message with input offset
/// information, suitable for surfacing verbatim to an API caller.
pub fn convert_error<I: core::ops::Deref<Target = str>>(_input: I, error: ParserError) -> std::string::String {
    error.to_string()
}

pub type ParserInput<'a> = nom_locate::LocatedSpan<&'a str>;
pub type ParserResult<'a, O> = nom::IResult<ParserInput<'a>, O, ParserError<'a>>;

pub trait ICalendarEntity {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized;

    fn render_ical(&self) -> String;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<T> ICalendarEntity for Option<T>
where
    T: ICalendarEntity,
{
    fn parse_ical(input: ParserInput) -> ParserResult<Self> {
        T::parse_ical(input).map(|(remaining, parsed)| (remaining, Some(parsed)))
    }

    fn render_ical(&self) -> String {
        if let Some(entity) = self {
            entity.render_ical()
        } else {
            String::new()
        }
    }
}

#[macro_export]
macro_rules! impl_icalendar_entity_traits {
    ($entity:ident) => {
        impl std::str::FromStr for $entity {
            type Err = String;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                let parser_result = nom::combinator::all_consuming(Self::parse_ical)(input.into());

                match parser_result {
                    Ok((_remaining, value)) => Ok(value),

                    Err(error) => {
                        match error {
                            nom::Err::Error(error) | nom::Err::Failure(error) => {
                                Err($crate::convert_error(input, error))
                            }

                            _ => Err(error.to_string()),
                        }
                    }
                }
            }
        }

        impl std::fmt::Display for $entity {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.render_ical())
            }
        }
    }
}

/// Overrides the error message of the wrapped parser, keeping the original
/// input position.
#[macro_export]
macro_rules! map_err_message {
    ($parser:expr, $message:expr $(,)*) => {
        $crate::map_err_message_helper($parser, $message)
    }
}

/// Helper invoked by [`map_err_message!`]. Pulled out into a generic
/// function (rather than an inline closure) so the input and output
/// lifetimes are tied together by a single named lifetime parameter
/// instead of being inferred separately by the compiler.
pub fn map_err_message_helper<'a, O>(
    mut parser: impl FnMut(ParserInput<'a>) -> ParserResult<'a, O>,
    message: impl Into<String>,
) -> impl FnMut(ParserInput<'a>) -> ParserResult<'a, O> {
    let message = message.into();

    move |input: ParserInput<'a>| {
        match parser(input) {
            Err(nom::Err::Error(_error)) => {
                Err(
                    nom::Err::Error(
                        ParserError::new(message.clone(), input)
                    )
                )
            }

            Err(nom::Err::Failure(_error)) => {
                Err(
                    nom::Err::Failure(
                        ParserError::new(message.clone(), input)
                    )
                )
            }

            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    #[macro_export]
    macro_rules! assert_parser_output {
        ($subject:expr, ($remaining:expr, $expected:expr $(,)*) $(,)*) => {
            let result = $subject;

            let Ok((remaining, parsed_value)) = result else {
                panic!("Expected to be Ok, Actual: {:#?}", result);
            };

            pretty_assertions_sorted::assert_eq!(remaining.to_string(), String::from($remaining));
            pretty_assertions_sorted::assert_eq_sorted!(parsed_value, $expected);
        }
    }

    #[macro_export]
    macro_rules! assert_parser_error {
        ($subject:expr, $expected_message:expr $(,)*) => {
            let result = $subject;

            let Err(nom::Err::Error(error) | nom::Err::Failure(error)) = result else {
                panic!("Expected to be Err, Actual: {:#?}", result);
            };

            pretty_assertions_sorted::assert_eq!(error.to_string(), String::from($expected_message));
        }
    }

    pub use assert_parser_output;
    pub use assert_parser_error;
}
