use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate;
use crate::error::ImportError;
use crate::models::{AttendanceRecord, CheckInNote, MenteeStatus, PriorityCount};
use crate::notes::NoteRepository;
use crate::store::MenteeStore;

#[derive(Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    attendance: String,
    last_attendance: Option<NaiveDate>,
    #[serde(default)]
    status: String,
    current_week: Option<u32>,
}

#[derive(Serialize)]
struct CsvOutRow<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    attendance: String,
    last_attendance: Option<NaiveDate>,
    status: &'static str,
    current_week: Option<u32>,
}

/// What an import would load, without touching the live roster.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub records: Vec<AttendanceRecord>,
    pub priorities: Vec<PriorityCount>,
}

pub fn parse_records<R: Read>(source: R) -> Result<Vec<AttendanceRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_number = index + 1;
        let row = result.map_err(|source| ImportError::Csv {
            row: row_number,
            source,
        })?;

        if row.id.is_empty() {
            return Err(ImportError::MissingId { row: row_number });
        }
        if !seen.insert(row.id.clone()) {
            return Err(ImportError::DuplicateId {
                row: row_number,
                id: row.id,
            });
        }

        let attendance = parse_attendance(&row.attendance, row_number)?;
        let status = if row.status.is_empty() {
            MenteeStatus::InProgress
        } else {
            row.status.parse().map_err(|source| ImportError::Label {
                row: row_number,
                source,
            })?
        };

        records.push(
            AttendanceRecord::new(row.id, row.name, row.email, row.phone, attendance, status)
                .with_last_attendance(row.last_attendance)
                .with_current_week(row.current_week),
        );
    }

    debug!(count = records.len(), "parsed attendance rows");
    Ok(records)
}

fn parse_attendance(cell: &str, row: usize) -> Result<Vec<bool>, ImportError> {
    cell.split(';')
        .map(str::trim)
        .filter(|mark| !mark.is_empty())
        .map(|mark| match mark.to_ascii_lowercase().as_str() {
            "1" | "true" | "y" | "yes" | "present" => Ok(true),
            "0" | "false" | "n" | "no" | "absent" => Ok(false),
            _ => Err(ImportError::AttendanceMark {
                row,
                mark: mark.to_string(),
            }),
        })
        .collect()
}

pub fn read_records(path: &Path) -> anyhow::Result<Vec<AttendanceRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let records =
        parse_records(file).with_context(|| format!("failed to import {}", path.display()))?;
    info!(count = records.len(), path = %path.display(), "imported attendance records");
    Ok(records)
}

pub fn write_records(path: &Path, records: &[AttendanceRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for record in records {
        let attendance = record
            .attendance_status()
            .iter()
            .map(|present| if *present { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(";");
        writer.serialize(CsvOutRow {
            id: &record.id,
            name: &record.name,
            email: &record.email,
            phone: &record.phone,
            attendance,
            last_attendance: record.last_attendance,
            status: record.status.label(),
            current_week: record.current_week,
        })?;
    }

    writer.flush()?;
    info!(count = records.len(), path = %path.display(), "exported attendance records");
    Ok(())
}

pub fn preview(path: &Path) -> anyhow::Result<ImportPreview> {
    let records = read_records(path)?;
    let priorities = aggregate::priority_distribution(&records);
    Ok(ImportPreview {
        records,
        priorities,
    })
}

/// Loads a CSV into the live roster, replacing what was there.
pub fn confirm_import(store: &mut MenteeStore, path: &Path) -> anyhow::Result<usize> {
    let records = read_records(path)?;
    store.replace_all(records);
    Ok(store.len())
}

/// Writes notes created at or after `since` (all notes when `None`) to an
/// archive file, most recent first. The repository is left untouched.
pub fn archive_notes(
    repo: &NoteRepository,
    path: &Path,
    since: Option<DateTime<Utc>>,
) -> anyhow::Result<usize> {
    let notes = repo.notes_since(since.unwrap_or(DateTime::<Utc>::MIN_UTC));
    write_notes(path, &notes)?;
    info!(count = notes.len(), path = %path.display(), "archived check-in notes");
    Ok(notes.len())
}

pub fn read_notes(path: &Path) -> anyhow::Result<Vec<CheckInNote>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read notes from {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("invalid notes file {}", path.display()))
}

pub fn write_notes(path: &Path, notes: &[CheckInNote]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(notes)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write notes to {}", path.display()))?;
    debug!(count = notes.len(), path = %path.display(), "saved check-in notes");
    Ok(())
}

pub fn seed_records() -> Vec<AttendanceRecord> {
    let mentees = [
        (
            "1",
            "John Doe",
            "john.doe@example.com",
            "123-456-7890",
            [false, false, false, false],
            (2025, 4, 16),
            MenteeStatus::SupportNeeded,
        ),
        (
            "2",
            "Jane Smith",
            "jane.smith@example.com",
            "234-567-8901",
            [false, false, false, true],
            (2025, 5, 7),
            MenteeStatus::CallLater,
        ),
        (
            "3",
            "Alice Johnson",
            "alice.johnson@example.com",
            "345-678-9012",
            [false, false, true, true],
            (2025, 5, 1),
            MenteeStatus::InProgress,
        ),
        (
            "4",
            "Bob Brown",
            "bob.brown@example.com",
            "456-789-0123",
            [false, true, true, true],
            (2025, 5, 7),
            MenteeStatus::InProgress,
        ),
        (
            "5",
            "Charlie Davis",
            "charlie.davis@example.com",
            "567-890-1234",
            [true, true, true, true],
            (2025, 5, 14),
            MenteeStatus::Completed,
        ),
    ];

    mentees
        .into_iter()
        .map(|(id, name, email, phone, attendance, (y, m, d), status)| {
            AttendanceRecord::new(id, name, email, phone, attendance.to_vec(), status)
                .with_last_attendance(NaiveDate::from_ymd_opt(y, m, d))
                .with_current_week(Some(4))
        })
        .collect()
}

pub fn seed_notes() -> Vec<CheckInNote> {
    let notes = [
        (
            "101",
            "1",
            "2025-05-12T14:22:00Z",
            "Called to check on absence. Student reported technical issues.",
            "Sarah Manager",
        ),
        (
            "102",
            "1",
            "2025-05-14T10:15:00Z",
            "Follow-up call. Student will attend next session.",
            "Sarah Manager",
        ),
        (
            "103",
            "2",
            "2025-05-13T09:30:00Z",
            "Left voicemail requesting callback.",
            "Mike Coordinator",
        ),
    ];

    notes
        .into_iter()
        .filter_map(|(id, mentee_id, timestamp, note, executive_name)| {
            let timestamp = DateTime::parse_from_rfc3339(timestamp).ok()?.with_timezone(&Utc);
            Some(CheckInNote {
                id: id.to_string(),
                mentee_id: mentee_id.to_string(),
                timestamp,
                edited_at: None,
                note: note.to_string(),
                executive_name: executive_name.to_string(),
            })
        })
        .collect()
}
