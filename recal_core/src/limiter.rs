use recal_ical::values::recur::Frequency;

/// Hard ceiling on MINUTELY candidate evaluations per expansion call.
pub const MINUTELY_HARD_CAP: usize = 1440;

/// Hard ceiling on SECONDLY candidate evaluations per expansion call.
pub const SECONDLY_HARD_CAP: usize = 3600;

/// The maximum number of candidate evaluations one expansion call may spend.
///
/// An explicit COUNT is the rule author's stated intent and is used as-is.
/// Otherwise the caller's requested maximum is scaled per frequency: sparse
/// BYxxx filters can make a frequency evaluate many candidates per match
/// (e.g. `FREQ=DAILY;BYDAY=MO;BYSETPOS=-1` matches roughly one candidate in
/// four weeks), so the day-grained frequencies get headroom, while the
/// sub-day frequencies are clamped to hard caps that a caller request can
/// lower but never raise.
pub fn iteration_cap(freq: Frequency, count: Option<u32>, requested_max: usize) -> usize {
    if let Some(count) = count {
        return count as usize;
    }

    match freq {
        Frequency::Daily => requested_max.saturating_mul(20),
        Frequency::Weekly => requested_max.saturating_mul(10),
        Frequency::Hourly => requested_max.saturating_mul(2),
        Frequency::Minutely => requested_max.min(MINUTELY_HARD_CAP),
        Frequency::Secondly => requested_max.min(SECONDLY_HARD_CAP),
        Frequency::Monthly | Frequency::Yearly => requested_max,
    }
}
