use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("invalid note: {0}")]
    Validation(String),
    #[error("note {0} not found")]
    NotFound(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("mentee {0} not found")]
    MenteeNotFound(String),
    #[error("week {week} is outside the {window}-week tracking window")]
    WeekOutOfRange { week: usize, window: usize },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("row {row}: missing mentee id")]
    MissingId { row: usize },
    #[error("row {row}: unrecognised attendance mark {mark:?}")]
    AttendanceMark { row: usize, mark: String },
    #[error("row {row}: {source}")]
    Label {
        row: usize,
        #[source]
        source: ParseLabelError,
    },
    #[error("row {row}: duplicate mentee id {id}")]
    DuplicateId { row: usize, id: String },
    #[error("row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseLabelError {
    #[error("unknown priority {0:?} (expected P0, P1, P2, P3 or None)")]
    Priority(String),
    #[error("unknown status {0:?}")]
    Status(String),
}
