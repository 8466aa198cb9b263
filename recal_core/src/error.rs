use recal_ical::values::recur::Frequency;

/// Everything that can go wrong before expansion starts.
///
/// Expansion itself cannot fail: validation is exhaustive at parse time, and
/// the safety limiter truncates silently rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Parse or constraint failure in the rule string. The message names the
    /// offending rule part, its value, and the violated constraint.
    InvalidRule(String),

    /// A timezone argument that is not a known IANA zone name.
    InvalidTimezone(String),

    /// A sub-day frequency encountered without the `allow_subday` feature.
    UnsupportedFrequency(Frequency),

    /// An RSCALE value naming a calendar scale other than GREGORIAN.
    UnsupportedRScale(String),
}

impl std::fmt::Display for RecurrenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRule(detail) => {
                write!(f, "invalid recurrence rule: {detail}")
            }

            Self::InvalidTimezone(name) => {
                write!(f, "unknown timezone: '{name}' is not an IANA zone name")
            }

            Self::UnsupportedFrequency(frequency) => {
                write!(
                    f,
                    "FREQ={frequency} requires the allow_subday feature; supported frequencies are DAILY, WEEKLY, MONTHLY and YEARLY",
                )
            }

            Self::UnsupportedRScale(rscale) => {
                write!(f, "RSCALE={rscale} is not supported; the only supported calendar scale is GREGORIAN")
            }
        }
    }
}

impl std::error::Error for RecurrenceError {}
