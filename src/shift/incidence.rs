use chrono::{Duration, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::window;
use super::{RecordKind, ShiftInstance};

/// Expected duration of a full-day shift, measured from the entry time.
pub const FULL_SHIFT_HOURS: i64 = 6;

/// Deviation of a completed attendance pair from the shift's on-time bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Incidence {
    pub late_minutes: i64,
    pub early_departure_minutes: i64,
}

/// Compute lateness and early departure for an attendance pair.
///
/// Morning/afternoon measure lateness against the end of the entry window
/// (the latest on-time arrival) and early departure against the start of the
/// exit window, so an on-time-accepted pair always scores zero. Full shifts
/// only track early departure, relative to entry + [`FULL_SHIFT_HOURS`].
pub fn incidence(shift: ShiftInstance, entry: Option<NaiveTime>, exit: Option<NaiveTime>) -> Incidence {
    match shift {
        ShiftInstance::Full => {
            let (Some(entry), Some(exit)) = (entry, exit) else {
                return Incidence::default();
            };
            // Entry windows close by mid-afternoon, so no midnight wrap here.
            let (expected_exit, _) = entry.overflowing_add_signed(Duration::hours(FULL_SHIFT_HOURS));
            Incidence {
                late_minutes: 0,
                early_departure_minutes: minutes_before(exit, expected_exit),
            }
        }
        ShiftInstance::Morning | ShiftInstance::Afternoon => {
            let latest_on_time_entry = window(shift, RecordKind::Entry).end;
            let earliest_exit = window(shift, RecordKind::Exit).start;
            Incidence {
                late_minutes: entry.map_or(0, |t| minutes_after(t, latest_on_time_entry)),
                early_departure_minutes: exit.map_or(0, |t| minutes_before(t, earliest_exit)),
            }
        }
    }
}

/// Worked duration in minutes; zero while the pair is incomplete.
pub fn worked_minutes(entry: Option<NaiveTime>, exit: Option<NaiveTime>) -> i64 {
    match (entry, exit) {
        (Some(entry), Some(exit)) => exit.signed_duration_since(entry).num_minutes().max(0),
        _ => 0,
    }
}

fn minutes_after(at: NaiveTime, boundary: NaiveTime) -> i64 {
    at.signed_duration_since(boundary).num_minutes().max(0)
}

fn minutes_before(at: NaiveTime, boundary: NaiveTime) -> i64 {
    boundary.signed_duration_since(at).num_minutes().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::catalog::hm;

    #[test]
    fn on_time_pair_scores_zero() {
        let inc = incidence(ShiftInstance::Morning, Some(hm(7, 10)), Some(hm(12, 45)));
        assert_eq!(inc, Incidence { late_minutes: 0, early_departure_minutes: 0 });
    }

    #[test]
    fn late_morning_entry_counts_from_the_window_end() {
        let inc = incidence(ShiftInstance::Morning, Some(hm(9, 15)), Some(hm(13, 0)));
        assert_eq!(inc.late_minutes, 45);
        assert_eq!(inc.early_departure_minutes, 0);
    }

    #[test]
    fn afternoon_boundaries() {
        // Latest on-time entry 14:30, earliest exit 17:30.
        let inc = incidence(ShiftInstance::Afternoon, Some(hm(15, 0)), Some(hm(17, 0)));
        assert_eq!(inc.late_minutes, 30);
        assert_eq!(inc.early_departure_minutes, 30);
    }

    #[test]
    fn full_shift_tracks_early_departure_only() {
        // Expected exit = 08:00 + 6h = 14:00.
        let inc = incidence(ShiftInstance::Full, Some(hm(8, 0)), Some(hm(13, 30)));
        assert_eq!(inc, Incidence { late_minutes: 0, early_departure_minutes: 30 });

        let inc = incidence(ShiftInstance::Full, Some(hm(8, 0)), Some(hm(15, 0)));
        assert_eq!(inc.early_departure_minutes, 0);
    }

    #[test]
    fn full_shift_without_a_pair_scores_zero() {
        assert_eq!(incidence(ShiftInstance::Full, Some(hm(8, 0)), None), Incidence::default());
        assert_eq!(incidence(ShiftInstance::Full, None, Some(hm(14, 0))), Incidence::default());
    }

    #[test]
    fn missing_times_count_as_zero() {
        let inc = incidence(ShiftInstance::Morning, None, None);
        assert_eq!(inc, Incidence::default());
    }

    #[test]
    fn worked_minutes_needs_both_times() {
        assert_eq!(worked_minutes(Some(hm(7, 30)), Some(hm(12, 30))), 300);
        assert_eq!(worked_minutes(Some(hm(7, 30)), None), 0);
        assert_eq!(worked_minutes(None, Some(hm(12, 30))), 0);
    }
}
