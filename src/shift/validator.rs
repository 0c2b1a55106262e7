use chrono::NaiveTime;

use super::catalog::window;
use super::{RecordKind, ShiftInstance};

/// Decision on a single check-in/out time against a resolved shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { late: bool, message: String },
    Rejected { message: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }

    pub fn is_late(&self) -> bool {
        matches!(self, Verdict::Accepted { late: true, .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Verdict::Accepted { message, .. } | Verdict::Rejected { message } => message,
        }
    }
}

/// Check a clock time against the catalog window for (shift, kind).
///
/// Boundary instants are inclusive: `start` and `end` accept on time,
/// `late_ceiling` accepts as late.
pub fn validate(shift: ShiftInstance, at: NaiveTime, kind: RecordKind) -> Verdict {
    let w = window(shift, kind);

    if w.contains(at) {
        return Verdict::Accepted {
            late: false,
            message: format!("{kind} within the {} window", w.span()),
        };
    }

    if w.end < at && at <= w.late_ceiling {
        return Verdict::Accepted {
            late: true,
            message: format!("late {kind}, normal window is {}", w.span()),
        };
    }

    // Full-shift staff arriving for an afternoon-starting day clock in on
    // the afternoon entry window.
    if shift == ShiftInstance::Full && kind == RecordKind::Entry {
        let alt = window(ShiftInstance::Afternoon, RecordKind::Entry);
        if alt.contains(at) {
            return Verdict::Accepted {
                late: false,
                message: format!("{kind} within the afternoon {} window", alt.span()),
            };
        }
    }

    Verdict::Rejected {
        message: format!("{kind} outside the allowed window ({})", w.span()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::catalog::hm;

    #[test]
    fn inside_the_window_is_on_time() {
        for shift in [ShiftInstance::Morning, ShiftInstance::Afternoon, ShiftInstance::Full] {
            for kind in [RecordKind::Entry, RecordKind::Exit] {
                let w = window(shift, kind);
                for at in [w.start, w.end] {
                    let v = validate(shift, at, kind);
                    assert!(v.is_accepted() && !v.is_late(), "{shift}/{kind} at {at}");
                }
            }
        }
    }

    #[test]
    fn between_end_and_ceiling_is_late() {
        for shift in [ShiftInstance::Morning, ShiftInstance::Afternoon, ShiftInstance::Full] {
            for kind in [RecordKind::Entry, RecordKind::Exit] {
                let w = window(shift, kind);
                let v = validate(shift, w.late_ceiling, kind);
                assert!(v.is_accepted() && v.is_late(), "{shift}/{kind} at ceiling");
            }
        }
    }

    #[test]
    fn past_the_ceiling_is_rejected() {
        let v = validate(ShiftInstance::Morning, hm(12, 1), RecordKind::Entry);
        assert!(!v.is_accepted());
        assert_eq!(v.message(), "entry outside the allowed window (07:00-08:30)");

        let v = validate(ShiftInstance::Afternoon, hm(19, 1), RecordKind::Exit);
        assert!(!v.is_accepted());
    }

    #[test]
    fn before_the_window_is_rejected() {
        let v = validate(ShiftInstance::Morning, hm(6, 50), RecordKind::Entry);
        assert!(!v.is_accepted());

        let v = validate(ShiftInstance::Afternoon, hm(17, 0), RecordKind::Exit);
        assert!(!v.is_accepted());
    }

    #[test]
    fn full_entry_accepts_the_afternoon_slot() {
        let v = validate(ShiftInstance::Full, hm(13, 5), RecordKind::Entry);
        assert!(v.is_accepted() && !v.is_late());

        // The exception is entry-only.
        let v = validate(ShiftInstance::Full, hm(13, 5), RecordKind::Exit);
        assert!(!v.is_accepted());

        // And does not extend past the afternoon entry window.
        let v = validate(ShiftInstance::Full, hm(14, 31), RecordKind::Entry);
        assert!(!v.is_accepted());
    }

    #[test]
    fn morning_exit_in_window_is_not_late() {
        let v = validate(ShiftInstance::Morning, hm(12, 45), RecordKind::Exit);
        assert!(v.is_accepted() && !v.is_late());
    }

    #[test]
    fn late_message_names_the_normal_window() {
        let v = validate(ShiftInstance::Morning, hm(9, 0), RecordKind::Entry);
        assert!(v.is_late());
        assert_eq!(v.message(), "late entry, normal window is 07:00-08:30");
    }
}
