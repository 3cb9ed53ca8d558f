use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Document lifecycle flag: 0 editable, 1 submitted, 2 cancelled.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DocStatus {
    Draft = 0,
    Submitted = 1,
    Cancelled = 2,
}

impl From<DocStatus> for u8 {
    fn from(status: DocStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for DocStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DocStatus::Draft),
            1 => Ok(DocStatus::Submitted),
            2 => Ok(DocStatus::Cancelled),
            other => Err(format!("unknown docstatus {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Cancelled,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Draft => "Draft",
            TimesheetStatus::Submitted => "Submitted",
            TimesheetStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Draft" => Some(TimesheetStatus::Draft),
            "Submitted" => Some(TimesheetStatus::Submitted),
            "Cancelled" => Some(TimesheetStatus::Cancelled),
            _ => None,
        }
    }
}

/// One child row of a timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeLog {
    pub project: Option<String>,
    pub task: Option<String>,
    pub activity_type: String,
    pub description: Option<String>,
    pub from_time: NaiveDateTime,
    pub to_time: NaiveDateTime,
    pub hours: f64,
    pub is_billable: bool,
}

/// Weekly period document for one employee.
#[derive(Debug, Clone, PartialEq)]
pub struct Timesheet {
    /// Store key, `None` until the first save
    pub id: Option<u64>,
    pub name: Option<String>,
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TimesheetStatus,
    pub docstatus: DocStatus,
    pub total_hours: f64,
    pub time_logs: Vec<TimeLog>,
}

impl Timesheet {
    pub fn new(employee_id: u64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: None,
            employee_id,
            start_date,
            end_date,
            status: TimesheetStatus::Draft,
            docstatus: DocStatus::Draft,
            total_hours: 0.0,
            time_logs: Vec::new(),
        }
    }

    pub fn set_time_logs(&mut self, time_logs: Vec<TimeLog>) {
        self.total_hours = time_logs.iter().map(|log| log.hours).sum();
        self.time_logs = time_logs;
    }

    pub fn is_editable(&self) -> bool {
        self.docstatus == DocStatus::Draft
    }
}

/// Human-facing identifier handed out once the store assigns a key.
pub fn timesheet_name(start_date: NaiveDate, id: u64) -> String {
    format!("TS-{}-{:05}", start_date.year(), id)
}
