#[cfg(test)]
mod tests {
    use crate::shift::*;
    use chrono::NaiveTime;

    fn at(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).expect("valid clock time")
    }

    // Morning staff scanning in at 07:10: resolves to morning, entry on time.
    #[test]
    fn morning_entry_scan() {
        let resolution = resolve(ShiftType::Morning, at(7, 10));
        assert_eq!(resolution, Resolution::Shift(ShiftInstance::Morning));

        let verdict = validate(ShiftInstance::Morning, at(7, 10), RecordKind::Entry);
        assert!(verdict.is_accepted() && !verdict.is_late());
    }

    // The same staff member scanning out at 12:45: inside the 12:30-13:30
    // exit window, so neither late nor an early departure.
    #[test]
    fn morning_exit_scan_inside_window() {
        let resolution = resolve(ShiftType::Morning, at(12, 45));
        assert_eq!(resolution, Resolution::Shift(ShiftInstance::Morning));

        let verdict = validate(ShiftInstance::Morning, at(12, 45), RecordKind::Exit);
        assert!(verdict.is_accepted() && !verdict.is_late());

        let inc = incidence(ShiftInstance::Morning, Some(at(7, 10)), Some(at(12, 45)));
        assert_eq!(inc.late_minutes, 0);
        assert_eq!(inc.early_departure_minutes, 0);
    }

    // Full-day staff entering at 08:00 and leaving at 13:30 through the
    // ungated device path: the expected exit is 14:00, 30 minutes short.
    #[test]
    fn full_day_early_departure() {
        let resolution = resolve(ShiftType::Full, at(8, 0));
        assert_eq!(resolution, Resolution::Shift(ShiftInstance::Full));

        let verdict = validate(ShiftInstance::Full, at(8, 0), RecordKind::Entry);
        assert!(verdict.is_accepted() && !verdict.is_late());

        let inc = incidence(ShiftInstance::Full, Some(at(8, 0)), Some(at(13, 30)));
        assert_eq!(inc.late_minutes, 0);
        assert_eq!(inc.early_departure_minutes, 30);
    }

    // Double-shift staff at 13:05: buckets to afternoon and lands inside the
    // 13:00-14:30 entry window.
    #[test]
    fn double_shift_afternoon_entry() {
        let resolution = resolve(ShiftType::Double, at(13, 5));
        assert_eq!(resolution, Resolution::Shift(ShiftInstance::Afternoon));

        let verdict = validate(ShiftInstance::Afternoon, at(13, 5), RecordKind::Entry);
        assert!(verdict.is_accepted() && !verdict.is_late());
    }

    // A tolerated late entry is accepted by the validator and shows up in
    // the calculator as lateness past the on-time boundary.
    #[test]
    fn late_entry_flows_into_the_incidence_report() {
        let verdict = validate(ShiftInstance::Morning, at(9, 30), RecordKind::Entry);
        assert!(verdict.is_accepted() && verdict.is_late());

        let inc = incidence(ShiftInstance::Morning, Some(at(9, 30)), None);
        assert_eq!(inc.late_minutes, 60);
    }
}
