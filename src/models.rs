use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::classify;
use crate::error::ParseLabelError;

/// Number of weeks tracked per mentee.
pub const TRACKING_WINDOW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
    #[serde(rename = "None")]
    Unassigned,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::P0,
        Priority::P1,
        Priority::P2,
        Priority::P3,
        Priority::Unassigned,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::Unassigned => "None",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "p0" => Ok(Priority::P0),
            "p1" => Ok(Priority::P1),
            "p2" => Ok(Priority::P2),
            "p3" => Ok(Priority::P3),
            "none" | "unassigned" => Ok(Priority::Unassigned),
            _ => Err(ParseLabelError::Priority(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenteeStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Call Later")]
    CallLater,
    #[serde(rename = "Support Needed")]
    SupportNeeded,
    Completed,
    #[serde(rename = "DNR")]
    Dnr,
}

impl MenteeStatus {
    pub const ALL: [MenteeStatus; 5] = [
        MenteeStatus::InProgress,
        MenteeStatus::CallLater,
        MenteeStatus::SupportNeeded,
        MenteeStatus::Completed,
        MenteeStatus::Dnr,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenteeStatus::InProgress => "In Progress",
            MenteeStatus::CallLater => "Call Later",
            MenteeStatus::SupportNeeded => "Support Needed",
            MenteeStatus::Completed => "Completed",
            MenteeStatus::Dnr => "DNR",
        }
    }
}

impl fmt::Display for MenteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MenteeStatus {
    type Err = ParseLabelError;

    /// Accepts the display labels and their kebab/snake forms ("call-later").
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "inprogress" => Ok(MenteeStatus::InProgress),
            "calllater" => Ok(MenteeStatus::CallLater),
            "supportneeded" => Ok(MenteeStatus::SupportNeeded),
            "completed" => Ok(MenteeStatus::Completed),
            "dnr" => Ok(MenteeStatus::Dnr),
            _ => Err(ParseLabelError::Status(value.to_string())),
        }
    }
}

/// A mentee and their week-by-week attendance.
///
/// `missed_classes` and `priority` are derived from `attendance_status` and
/// can only change through the methods that replace the attendance sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    attendance_status: Vec<bool>,
    missed_classes: usize,
    priority: Priority,
    pub last_attendance: Option<NaiveDate>,
    pub status: MenteeStatus,
    pub current_week: Option<u32>,
}

impl AttendanceRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        attendance_status: Vec<bool>,
        status: MenteeStatus,
    ) -> Self {
        let mut record = Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            attendance_status: Vec::new(),
            missed_classes: 0,
            priority: Priority::Unassigned,
            last_attendance: None,
            status,
            current_week: None,
        };
        record.set_attendance(attendance_status);
        record
    }

    pub fn with_last_attendance(mut self, date: Option<NaiveDate>) -> Self {
        self.last_attendance = date;
        self
    }

    pub fn with_current_week(mut self, week: Option<u32>) -> Self {
        self.current_week = week;
        self
    }

    pub fn attendance_status(&self) -> &[bool] {
        &self.attendance_status
    }

    pub fn missed_classes(&self) -> usize {
        self.missed_classes
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Replaces the attendance sequence and re-derives missed count and priority.
    pub fn set_attendance(&mut self, attendance_status: Vec<bool>) {
        self.attendance_status = attendance_status;
        self.rederive();
    }

    /// Records presence or absence for one week, growing the sequence with
    /// absences if it is shorter than `week_index`.
    pub fn mark_week(&mut self, week_index: usize, present: bool) {
        if self.attendance_status.len() <= week_index {
            self.attendance_status.resize(week_index + 1, false);
        }
        self.attendance_status[week_index] = present;
        self.rederive();
    }

    pub(crate) fn rederive(&mut self) {
        self.missed_classes = classify::missed_classes(&self.attendance_status);
        self.priority = classify::priority_for_missed(self.missed_classes);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInNote {
    pub id: String,
    pub mentee_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub note: String,
    pub executive_name: String,
}

/// Optional predicates combined with logical AND. `None` places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub priority: Option<Priority>,
    pub status: Option<MenteeStatus>,
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: MenteeStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyRate {
    /// Zero-based index into the tracking window.
    pub week_index: usize,
    pub rate: u32,
}
