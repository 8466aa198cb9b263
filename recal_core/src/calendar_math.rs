//! Gregorian calendar arithmetic shared by the period generators.

use chrono::{Datelike, Duration, NaiveDate};

use recal_ical::values::recur::WeekDay;

/// Day-of-week index with 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// 1-based ordinal day within the year (1..=366).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in the given month (28/29/30/31).
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

/// The most recent date less than or equal to `date` whose weekday is `wkst`.
pub fn week_start(date: NaiveDate, wkst: WeekDay) -> NaiveDate {
    let days_back = (7 + day_of_week(date) - wkst.num_days_from_sunday()) % 7;

    date - Duration::days(i64::from(days_back))
}

/// The first `wkst` weekday falling on or after January 1st of `year`.
///
/// This date starts week 1 under the week numbering scheme used throughout
/// this crate: weeks are the consecutive 7-day spans counted from that date.
/// This deliberately differs from ISO 8601 (which additionally requires week
/// 1 to contain January 4th); days before the first `wkst` weekday belong to
/// the final week of the previous year.
pub fn first_week_start(year: i32, wkst: WeekDay) -> Option<NaiveDate> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let days_forward = (7 + wkst.num_days_from_sunday() - day_of_week(jan_first)) % 7;

    Some(jan_first + Duration::days(i64::from(days_forward)))
}

/// The week containing `date`, as `(week_year, week_number)`.
///
/// `week_number` is the 1-based ordinal of the 7-day span counted from
/// `first_week_start(week_year, wkst)`; `week_year` is the year before
/// `date.year()` for the leading days that precede the year's first `wkst`
/// weekday. Not ISO 8601 -- see [`first_week_start`].
pub fn week_number(date: NaiveDate, wkst: WeekDay) -> Option<(i32, u32)> {
    let week_one = first_week_start(date.year(), wkst)?;

    if date < week_one {
        let previous_week_one = first_week_start(date.year() - 1, wkst)?;
        let weeks = (date - previous_week_one).num_days() / 7;

        return Some((date.year() - 1, (weeks + 1) as u32));
    }

    let weeks = (date - week_one).num_days() / 7;

    Some((date.year(), (weeks + 1) as u32))
}

/// Number of week spans starting within `year` under the scheme above.
pub fn weeks_in_year(year: i32, wkst: WeekDay) -> Option<u32> {
    let week_one = first_week_start(year, wkst)?;
    let last_day = NaiveDate::from_ymd_opt(year, 12, 31)?;

    let weeks = (last_day - week_one).num_days() / 7;

    Some((weeks + 1) as u32)
}

/// Resolves a signed day-of-year ordinal: positive counts from January 1st,
/// negative counts back from December 31st. Out-of-range ordinals (e.g. 366
/// in a common year) resolve to `None`.
pub fn year_day_date(year: i32, year_day: i32) -> Option<NaiveDate> {
    let total_days = days_in_year(year);

    let ordinal = if year_day > 0 {
        year_day as u32
    } else {
        let from_end = total_days as i32 + year_day + 1;

        if from_end < 1 {
            return None;
        }

        from_end as u32
    };

    NaiveDate::from_yo_opt(year, ordinal)
}

/// Resolves a signed day-of-month ordinal against a concrete month: positive
/// is the day itself, negative counts back from the month's last day. The
/// result may name a nonexistent day (e.g. 31 in February); the caller
/// decides how to skip or substitute it.
pub fn month_day_ordinal(year: i32, month: u32, month_day: i32) -> i32 {
    if month_day > 0 {
        month_day
    } else {
        last_day_of_month(year, month) as i32 + month_day + 1
    }
}

/// All dates in the month falling on `weekday`, in ascending order.
pub fn weekdays_in_month(year: i32, month: u32, weekday: WeekDay) -> Vec<NaiveDate> {
    (1..=last_day_of_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| day_of_week(*date) == weekday.num_days_from_sunday())
        .collect()
}

/// The n-th `weekday` of the month; positive ordinals count from the first
/// of the month, negative ordinals from its last day. `None` when the month
/// has no such occurrence (e.g. the fifth Wednesday of a 28-day February).
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: WeekDay, ordinal: i32) -> Option<NaiveDate> {
    let matches = weekdays_in_month(year, month, weekday);

    if ordinal > 0 {
        matches.get((ordinal - 1) as usize).copied()
    } else {
        let index = matches.len() as i32 + ordinal;

        if index < 0 {
            None
        } else {
            matches.get(index as usize).copied()
        }
    }
}
