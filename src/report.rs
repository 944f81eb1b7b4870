use std::fmt::Write;
use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::aggregate;
use crate::models::{AttendanceRecord, CheckInNote, MenteeStatus, Priority, TRACKING_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWeek {
    Current,
    /// One-based week number within the tracking window.
    Week(usize),
}

impl ReportWeek {
    /// Zero-based week index. `Current` is the furthest `current_week` any
    /// mentee has reached, or the last week of the window if none is set.
    pub fn resolve(self, records: &[AttendanceRecord]) -> usize {
        match self {
            ReportWeek::Week(number) => number.saturating_sub(1),
            ReportWeek::Current => records
                .iter()
                .filter_map(|r| r.current_week)
                .max()
                .map(|week| (week as usize).clamp(1, TRACKING_WINDOW) - 1)
                .unwrap_or(TRACKING_WINDOW - 1),
        }
    }
}

impl FromStr for ReportWeek {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        if lowered == "current" {
            return Ok(ReportWeek::Current);
        }

        let digits = lowered.strip_prefix("week").unwrap_or(&lowered);
        match digits.parse::<usize>() {
            Ok(number) if (1..=TRACKING_WINDOW).contains(&number) => Ok(ReportWeek::Week(number)),
            _ => Err(format!(
                "expected current or week1..week{TRACKING_WINDOW}, got {value:?}"
            )),
        }
    }
}

/// Start of the reporting period: `since_days` back from now, at least one day.
pub fn cutoff(since_days: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_days(since_days.max(1))
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .context("--since-days is out of range")
}

pub fn build_report(
    records: &[AttendanceRecord],
    notes: &[CheckInNote],
    week: ReportWeek,
    generated_on: NaiveDate,
) -> String {
    let week_index = week.resolve(records);
    let mut output = String::new();

    let _ = writeln!(output, "# Weekly Attendance Summary");
    let _ = writeln!(
        output,
        "Week {} of {} (generated {})",
        week_index + 1,
        TRACKING_WINDOW,
        generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total mentees: {}", records.len());
    let _ = writeln!(
        output,
        "- Attendance rate: {}%",
        aggregate::attendance_rate(records, week_index)
    );
    let _ = writeln!(
        output,
        "- Need immediate support (P0): {}",
        aggregate::count_by_priority(records, Priority::P0)
    );
    let _ = writeln!(
        output,
        "- Completed all requirements: {}",
        aggregate::count_by_status(records, MenteeStatus::Completed)
    );
    let _ = writeln!(output, "- Check-ins logged: {}", notes.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Priority Mix");
    for entry in aggregate::priority_distribution(records) {
        let _ = writeln!(output, "- {}: {} mentees", entry.priority, entry.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");
    for entry in aggregate::status_distribution(records) {
        let _ = writeln!(output, "- {}: {} mentees", entry.status, entry.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance Trend");
    for entry in aggregate::weekly_rates(records) {
        let _ = writeln!(
            output,
            "- Week {}: {}% present",
            entry.week_index + 1,
            entry.rate
        );
    }

    let mut recent_notes = notes.to_vec();
    recent_notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Check-in Notes");

    if recent_notes.is_empty() {
        let _ = writeln!(output, "No check-in notes recorded for this period.");
    } else {
        for note in recent_notes.iter().take(5) {
            let mentee = records
                .iter()
                .find(|r| r.id == note.mentee_id)
                .map_or(note.mentee_id.as_str(), |r| r.name.as_str());
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}",
                mentee,
                note.executive_name,
                note.timestamp.date_naive(),
                note.note
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{seed_notes, seed_records};

    fn generated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 16).unwrap()
    }

    #[test]
    fn cutoff_reaches_back_requested_days() {
        let before = Utc::now();
        let start = cutoff(7).unwrap();
        assert!(start <= before - Duration::days(7));
        assert!(start > before - Duration::days(8));
    }

    #[test]
    fn cutoff_clamps_to_at_least_one_day() {
        let before = Utc::now();
        assert!(cutoff(0).unwrap() <= before - Duration::days(1));
        assert!(cutoff(-30).unwrap() > before - Duration::days(2));
    }

    #[test]
    fn cutoff_rejects_spans_past_the_calendar() {
        assert!(cutoff(999_999_999_999_999).is_err());
        assert!(cutoff(i64::MAX).is_err());
    }

    #[test]
    fn parses_week_selectors() {
        assert_eq!("current".parse::<ReportWeek>().unwrap(), ReportWeek::Current);
        assert_eq!("week2".parse::<ReportWeek>().unwrap(), ReportWeek::Week(2));
        assert_eq!("3".parse::<ReportWeek>().unwrap(), ReportWeek::Week(3));
        assert!("week5".parse::<ReportWeek>().is_err());
        assert!("week0".parse::<ReportWeek>().is_err());
    }

    #[test]
    fn current_week_follows_roster() {
        let records = seed_records();
        assert_eq!(ReportWeek::Current.resolve(&records), 3);
        assert_eq!(ReportWeek::Week(1).resolve(&records), 0);

        let early: Vec<AttendanceRecord> = records
            .into_iter()
            .map(|r| r.with_current_week(Some(2)))
            .collect();
        assert_eq!(ReportWeek::Current.resolve(&early), 1);
        assert_eq!(ReportWeek::Current.resolve(&[]), TRACKING_WINDOW - 1);
    }

    #[test]
    fn report_includes_rates_and_mixes() {
        let report = build_report(&seed_records(), &seed_notes(), ReportWeek::Week(2), generated_on());
        assert!(report.contains("Week 2 of 4 (generated 2025-05-16)"));
        assert!(report.contains("- Total mentees: 5"));
        assert!(report.contains("- Attendance rate: 40%"));
        assert!(report.contains("- Need immediate support (P0): 1"));
        assert!(report.contains("- None: 1 mentees"));
        assert!(report.contains("- Support Needed: 1 mentees"));
        assert!(report.contains("- Week 4: 80% present"));
    }

    #[test]
    fn recent_notes_are_newest_first_with_names() {
        let report = build_report(&seed_records(), &seed_notes(), ReportWeek::Current, generated_on());
        let follow_up = report
            .find("John Doe (Sarah Manager) on 2025-05-14")
            .unwrap();
        let voicemail = report
            .find("Jane Smith (Mike Coordinator) on 2025-05-13")
            .unwrap();
        assert!(follow_up < voicemail);
    }

    #[test]
    fn empty_inputs_still_render() {
        let report = build_report(&[], &[], ReportWeek::Current, generated_on());
        assert!(report.contains("- Attendance rate: 0%"));
        assert!(report.contains("No check-in notes recorded for this period."));
    }
}
