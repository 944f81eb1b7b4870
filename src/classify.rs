use crate::models::{AttendanceRecord, Priority};

pub fn missed_classes(attendance: &[bool]) -> usize {
    attendance.iter().filter(|present| !**present).count()
}

/// Tier lookup for the four-week window. Counts outside 1..=4 have no tier.
pub fn priority_for_missed(missed: usize) -> Priority {
    match missed {
        4 => Priority::P0,
        3 => Priority::P1,
        2 => Priority::P2,
        1 => Priority::P3,
        _ => Priority::Unassigned,
    }
}

pub fn classify(record: &AttendanceRecord) -> AttendanceRecord {
    let mut classified = record.clone();
    classified.rederive();
    classified
}

pub fn classify_all(records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
    records.iter().map(classify).collect()
}
