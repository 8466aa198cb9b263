mod calendar_math;
mod error;
mod limiter;
mod occurrence_iterator;
mod periods;
mod queries;
mod rule;
mod timezone;

pub use calendar_math::*;
pub use error::*;
pub use limiter::*;
pub use occurrence_iterator::*;
pub use queries::*;
pub use rule::*;
pub use timezone::*;

pub use recal_ical::values::recur::{Frequency, Recur, Skip, WeekDay};
