use chrono::NaiveTime;

use super::{RecordKind, ShiftInstance};

/// Clock-time range in which a registration is accepted without penalty,
/// plus the latest time still tolerated as a tardy registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub late_ceiling: NaiveTime,
}

impl ShiftWindow {
    /// Inclusive on both bounds.
    pub fn contains(&self, at: NaiveTime) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn span(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

pub(crate) fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).expect("valid clock time")
}

/// Registration windows per (shift, record kind). `double` never reaches the
/// catalog; the resolver maps it to morning or afternoon first.
pub fn window(shift: ShiftInstance, kind: RecordKind) -> ShiftWindow {
    use RecordKind::*;
    use ShiftInstance::*;

    let ((sh, sm), (eh, em), (lh, lm)) = match (shift, kind) {
        (Morning, Entry) => ((7, 0), (8, 30), (12, 0)),
        (Morning, Exit) => ((12, 30), (13, 30), (14, 0)),
        (Afternoon, Entry) => ((13, 0), (14, 30), (17, 0)),
        (Afternoon, Exit) => ((17, 30), (18, 30), (19, 0)),
        (Full, Entry) => ((7, 0), (8, 30), (12, 0)),
        (Full, Exit) => ((15, 0), (16, 0), (17, 0)),
    };

    ShiftWindow {
        start: hm(sh, sm),
        end: hm(eh, em),
        late_ceiling: hm(lh, lm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_window_is_ordered() {
        for shift in [ShiftInstance::Morning, ShiftInstance::Afternoon, ShiftInstance::Full] {
            for kind in [RecordKind::Entry, RecordKind::Exit] {
                let w = window(shift, kind);
                assert!(w.start < w.end, "{shift}/{kind} start before end");
                assert!(w.end < w.late_ceiling, "{shift}/{kind} ceiling after end");
            }
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = window(ShiftInstance::Morning, RecordKind::Entry);
        assert!(w.contains(hm(7, 0)));
        assert!(w.contains(hm(8, 30)));
        assert!(!w.contains(hm(8, 31)));
    }

    #[test]
    fn span_is_human_readable() {
        let w = window(ShiftInstance::Afternoon, RecordKind::Exit);
        assert_eq!(w.span(), "17:30-18:30");
    }
}
