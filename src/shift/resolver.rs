use chrono::NaiveTime;

use super::catalog::hm;
use super::{ShiftInstance, ShiftType};

/// Outcome of deciding which shift instance an event clocks against.
///
/// Rejections are ordinary values here, not errors; the caller picks the
/// transport representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Shift(ShiftInstance),
    /// Time of day falls in no working bucket (double-shift staff only).
    OutsideHours,
    /// Time of day disagrees with the staff member's single assigned shift.
    NotAssigned { assigned: ShiftType },
}

impl Resolution {
    pub fn shift(&self) -> Option<ShiftInstance> {
        match self {
            Resolution::Shift(shift) => Some(*shift),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Resolution::Shift(shift) => format!("resolved to the {shift} shift"),
            Resolution::OutsideHours => "time is outside working hours".to_string(),
            Resolution::NotAssigned { assigned } => {
                format!("staff is assigned to the {assigned} shift only")
            }
        }
    }
}

/// Time-of-day bucket: [07:00,13:00) is morning, [13:00,18:00) is afternoon.
///
/// Exposed on its own because the device-sync path buckets the timestamp
/// regardless of the configured shift.
pub fn bucket(at: NaiveTime) -> Option<ShiftInstance> {
    if hm(7, 0) <= at && at < hm(13, 0) {
        Some(ShiftInstance::Morning)
    } else if hm(13, 0) <= at && at < hm(18, 0) {
        Some(ShiftInstance::Afternoon)
    } else {
        None
    }
}

/// Decide the shift instance for an event given the staff member's assigned
/// shift type. Window gating is a separate, finer check in the validator.
pub fn resolve(assigned: ShiftType, at: NaiveTime) -> Resolution {
    match assigned {
        // Full-day staff always clock against the full shift.
        ShiftType::Full => Resolution::Shift(ShiftInstance::Full),

        // Double-shift staff clock against whichever bucket the time falls in.
        ShiftType::Double => match bucket(at) {
            Some(shift) => Resolution::Shift(shift),
            None => Resolution::OutsideHours,
        },

        // Single-shift staff must be clocking inside their own bucket.
        ShiftType::Morning | ShiftType::Afternoon => {
            let own = match assigned {
                ShiftType::Morning => ShiftInstance::Morning,
                _ => ShiftInstance::Afternoon,
            };
            match bucket(at) {
                Some(found) if found == own => Resolution::Shift(own),
                _ => Resolution::NotAssigned { assigned },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_shift_always_resolves() {
        for at in [hm(3, 0), hm(7, 15), hm(13, 30), hm(21, 0)] {
            assert_eq!(resolve(ShiftType::Full, at), Resolution::Shift(ShiftInstance::Full));
        }
    }

    #[test]
    fn double_shift_follows_the_bucket() {
        assert_eq!(
            resolve(ShiftType::Double, hm(7, 0)),
            Resolution::Shift(ShiftInstance::Morning)
        );
        assert_eq!(
            resolve(ShiftType::Double, hm(12, 59)),
            Resolution::Shift(ShiftInstance::Morning)
        );
        assert_eq!(
            resolve(ShiftType::Double, hm(13, 0)),
            Resolution::Shift(ShiftInstance::Afternoon)
        );
        assert_eq!(
            resolve(ShiftType::Double, hm(17, 59)),
            Resolution::Shift(ShiftInstance::Afternoon)
        );
    }

    #[test]
    fn double_shift_outside_buckets_is_rejected() {
        assert_eq!(resolve(ShiftType::Double, hm(6, 59)), Resolution::OutsideHours);
        assert_eq!(resolve(ShiftType::Double, hm(18, 0)), Resolution::OutsideHours);
        assert_eq!(resolve(ShiftType::Double, hm(23, 30)), Resolution::OutsideHours);
    }

    #[test]
    fn single_shift_accepts_its_own_bucket() {
        assert_eq!(
            resolve(ShiftType::Morning, hm(7, 15)),
            Resolution::Shift(ShiftInstance::Morning)
        );
        assert_eq!(
            resolve(ShiftType::Afternoon, hm(14, 0)),
            Resolution::Shift(ShiftInstance::Afternoon)
        );
    }

    #[test]
    fn single_shift_rejects_the_other_bucket() {
        let res = resolve(ShiftType::Morning, hm(14, 0));
        assert_eq!(res, Resolution::NotAssigned { assigned: ShiftType::Morning });
        assert_eq!(res.message(), "staff is assigned to the morning shift only");
    }

    #[test]
    fn single_shift_rejects_times_outside_any_bucket() {
        assert_eq!(
            resolve(ShiftType::Afternoon, hm(5, 0)),
            Resolution::NotAssigned { assigned: ShiftType::Afternoon }
        );
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(bucket(hm(6, 59)), None);
        assert_eq!(bucket(hm(7, 0)), Some(ShiftInstance::Morning));
        assert_eq!(bucket(hm(13, 0)), Some(ShiftInstance::Afternoon));
        assert_eq!(bucket(hm(18, 0)), None);
    }
}
