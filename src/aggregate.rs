use crate::models::{
    AttendanceRecord, MenteeStatus, Priority, PriorityCount, StatusCount, WeeklyRate,
    TRACKING_WINDOW,
};

pub fn count_by_priority(records: &[AttendanceRecord], tier: Priority) -> usize {
    records.iter().filter(|r| r.priority() == tier).count()
}

pub fn count_by_status(records: &[AttendanceRecord], status: MenteeStatus) -> usize {
    records.iter().filter(|r| r.status == status).count()
}

/// Percentage of mentees present in the given week, rounded half away from zero.
///
/// Returns 0 for an index outside the tracking window or an empty collection.
/// A record with no entry for the week counts as absent.
pub fn attendance_rate(records: &[AttendanceRecord], week_index: usize) -> u32 {
    if week_index >= TRACKING_WINDOW || records.is_empty() {
        return 0;
    }

    let present = records
        .iter()
        .filter(|r| r.attendance_status().get(week_index).copied().unwrap_or(false))
        .count();

    (100.0 * present as f64 / records.len() as f64).round() as u32
}

pub fn priority_distribution(records: &[AttendanceRecord]) -> Vec<PriorityCount> {
    Priority::ALL
        .iter()
        .map(|&priority| PriorityCount {
            priority,
            count: count_by_priority(records, priority),
        })
        .collect()
}

pub fn status_distribution(records: &[AttendanceRecord]) -> Vec<StatusCount> {
    MenteeStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: count_by_status(records, status),
        })
        .collect()
}

pub fn weekly_rates(records: &[AttendanceRecord]) -> Vec<WeeklyRate> {
    (0..TRACKING_WINDOW)
        .map(|week_index| WeeklyRate {
            week_index,
            rate: attendance_rate(records, week_index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::seed_records;
    use proptest::prelude::*;

    fn record(attendance: Vec<bool>, status: MenteeStatus) -> AttendanceRecord {
        AttendanceRecord::new("x", "Test", "test@example.com", "", attendance, status)
    }

    #[test]
    fn counts_seed_roster_by_tier() {
        let records = seed_records();
        assert_eq!(count_by_priority(&records, Priority::P0), 1);
        assert_eq!(count_by_priority(&records, Priority::P3), 1);
        assert_eq!(count_by_priority(&records, Priority::Unassigned), 1);
        assert_eq!(count_by_status(&records, MenteeStatus::InProgress), 2);
        assert_eq!(count_by_status(&records, MenteeStatus::Dnr), 0);
    }

    #[test]
    fn empty_collections_count_zero() {
        let records: Vec<AttendanceRecord> = Vec::new();
        for tier in Priority::ALL {
            assert_eq!(count_by_priority(&records, tier), 0);
        }
        for status in MenteeStatus::ALL {
            assert_eq!(count_by_status(&records, status), 0);
        }
        assert_eq!(attendance_rate(&records, 0), 0);
    }

    #[test]
    fn rate_rounds_to_whole_percent() {
        let records = vec![
            record(vec![true, false, false, false], MenteeStatus::InProgress),
            record(vec![true, true, false, false], MenteeStatus::InProgress),
            record(vec![false, true, false, true], MenteeStatus::InProgress),
        ];
        assert_eq!(attendance_rate(&records, 0), 67);
        assert_eq!(attendance_rate(&records, 1), 67);
        assert_eq!(attendance_rate(&records, 2), 0);
        assert_eq!(attendance_rate(&records, 3), 33);
    }

    #[test]
    fn out_of_range_week_is_zero() {
        let records = seed_records();
        assert_eq!(attendance_rate(&records, 10), 0);
        assert_eq!(attendance_rate(&records, TRACKING_WINDOW), 0);
    }

    #[test]
    fn missing_week_entries_count_as_absent() {
        let records = vec![
            record(vec![true], MenteeStatus::InProgress),
            record(vec![true, true], MenteeStatus::InProgress),
        ];
        assert_eq!(attendance_rate(&records, 1), 50);
    }

    #[test]
    fn seed_weekly_rates() {
        let rates: Vec<u32> = weekly_rates(&seed_records()).iter().map(|w| w.rate).collect();
        assert_eq!(rates, vec![20, 40, 60, 80]);
    }

    #[test]
    fn distributions_cover_every_label_in_order() {
        let records = seed_records();
        let priorities = priority_distribution(&records);
        assert_eq!(priorities.len(), Priority::ALL.len());
        assert_eq!(priorities[0].priority, Priority::P0);
        let statuses = status_distribution(&records);
        assert_eq!(statuses.iter().map(|s| s.count).sum::<usize>(), records.len());
    }

    proptest! {
        #[test]
        fn tier_counts_sum_to_total(
            rows in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..6), 0..30)
        ) {
            let records: Vec<AttendanceRecord> = rows
                .into_iter()
                .map(|attendance| record(attendance, MenteeStatus::InProgress))
                .collect();
            let total: usize = Priority::ALL
                .iter()
                .map(|&tier| count_by_priority(&records, tier))
                .sum();
            prop_assert_eq!(total, records.len());
        }
    }
}
