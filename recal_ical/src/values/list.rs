use std::ops::Deref;

use itertools::Itertools;

use nom::combinator::map;
use nom::multi::separated_list1;

use crate::grammar::comma;

use crate::{ICalendarEntity, ParserInput, ParserResult};

/// Parses and serializes a comma separated list of values.
///
/// Element order is preserved exactly as parsed so that a parse -> render ->
/// parse round trip yields an identical value.
///
/// # Examples
///
/// ```rust
/// use recal_ical::values::list::List;
/// use recal_ical::values::integer::Integer;
/// use recal_ical::ICalendarEntity;
///
/// let (remaining, parsed_list) = List::<Integer>::parse_ical("10,2,30;X".into()).unwrap();
///
/// assert_eq!(remaining.to_string(), String::from(";X"));
/// assert_eq!(parsed_list, List(vec![Integer(10), Integer(2), Integer(30)]));
///
/// assert_eq!(parsed_list.render_ical(), String::from("10,2,30"));
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct List<T>(pub Vec<T>)
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
;

impl<T> Deref for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> ICalendarEntity for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        map(
            separated_list1(comma, T::parse_ical),
            List,
        )(input)
    }

    fn render_ical(&self) -> String {
        self.0
            .iter()
            .map(|value| value.render_ical())
            .join(",")
    }
}

impl<T> std::str::FromStr for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parser_result = nom::combinator::all_consuming(Self::parse_ical)(input.into());

        match parser_result {
            Ok((_remaining, value)) => Ok(value),

            Err(error) => {
                match error {
                    nom::Err::Error(error) | nom::Err::Failure(error) => {
                        Err(crate::convert_error(input, error))
                    }

                    _ => Err(error.to_string()),
                }
            }
        }
    }
}

impl<T> std::fmt::Display for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_ical())
    }
}

impl<T> From<Vec<T>> for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    fn from(value: Vec<T>) -> Self {
        List(value)
    }
}

impl<T> IntoIterator for List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a List<T>
where
    T: std::fmt::Debug + Clone + ICalendarEntity + Eq + PartialEq + std::hash::Hash,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
