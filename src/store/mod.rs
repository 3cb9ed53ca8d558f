//! Storage seams for timesheets and the user → employee link.
//!
//! Handlers only talk to these traits; `MySqlTimesheetStore` and
//! `MySqlEmployeeDirectory` back them in production.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::timesheet::{DocStatus, TimeLog, Timesheet};

pub mod employee;
#[cfg(test)]
pub mod memory;
pub mod timesheet;

pub use employee::MySqlEmployeeDirectory;
pub use timesheet::MySqlTimesheetStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Timesheet {0} already exists for this period")]
    Conflict(String),

    #[error("Timesheet cannot be modified in its current state ({0:?})")]
    NotEditable(DocStatus),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Typed repository over timesheet documents and their time-log rows.
#[async_trait]
pub trait TimesheetStore: Send + Sync {
    /// Non-cancelled timesheet for exactly this employee and period, rows in stored order.
    async fn find_period_document(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Timesheet>, StoreError>;

    /// Fresh, unsaved draft for the period.
    fn create_period_document(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Timesheet {
        Timesheet::new(employee_id, start_date, end_date)
    }

    /// Full replace of the child rows; nothing is persisted until `save`.
    fn replace_child_rows(&self, doc: &mut Timesheet, time_logs: Vec<TimeLog>) {
        doc.set_time_logs(time_logs);
    }

    /// Validate and persist header and rows atomically, assigning `id` and `name` on first save.
    async fn save(&self, doc: &mut Timesheet) -> Result<(), StoreError>;

    /// Move a saved draft to submitted.
    async fn finalize(&self, doc: &mut Timesheet) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn employee_for_user(&self, user_id: u64) -> Result<Option<u64>, StoreError>;
}

/// Checks every store runs before writing a document.
pub fn validate(doc: &Timesheet) -> Result<(), StoreError> {
    if !doc.is_editable() {
        return Err(StoreError::NotEditable(doc.docstatus));
    }

    if doc.start_date > doc.end_date {
        return Err(StoreError::Validation(
            "Start date cannot be after end date".into(),
        ));
    }

    for (i, log) in doc.time_logs.iter().enumerate() {
        let row = i + 1;
        if log.activity_type.trim().is_empty() {
            return Err(StoreError::Validation(format!(
                "Row {}: Activity Type is mandatory",
                row
            )));
        }
        if !(log.hours > 0.0) {
            return Err(StoreError::Validation(format!(
                "Row {}: Hours must be greater than zero",
                row
            )));
        }
        if log.to_time <= log.from_time {
            return Err(StoreError::Validation(format!(
                "Row {}: To Time must be after From Time",
                row
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn log(hours: f64) -> TimeLog {
        TimeLog {
            project: None,
            task: None,
            activity_type: "Development".into(),
            description: None,
            from_time: at(11, 9),
            to_time: at(11, 10),
            hours,
            is_billable: false,
        }
    }

    #[test]
    fn accepts_well_formed_draft() {
        let mut doc = Timesheet::new(1, day(11), day(17));
        doc.set_time_logs(vec![log(1.0)]);
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn rejects_inverted_period() {
        let doc = Timesheet::new(1, day(17), day(11));
        assert!(matches!(validate(&doc), Err(StoreError::Validation(_))));
    }

    #[test]
    fn rejects_bad_rows() {
        let mut doc = Timesheet::new(1, day(11), day(17));

        let mut missing_activity = log(1.0);
        missing_activity.activity_type = "  ".into();
        doc.set_time_logs(vec![missing_activity]);
        assert!(matches!(validate(&doc), Err(StoreError::Validation(_))));

        doc.set_time_logs(vec![log(0.0)]);
        assert!(matches!(validate(&doc), Err(StoreError::Validation(_))));

        let mut backwards = log(1.0);
        backwards.to_time = backwards.from_time;
        doc.set_time_logs(vec![backwards]);
        assert!(matches!(validate(&doc), Err(StoreError::Validation(_))));
    }

    #[test]
    fn rejects_submitted_document() {
        let mut doc = Timesheet::new(1, day(11), day(17));
        doc.docstatus = DocStatus::Submitted;
        assert!(matches!(
            validate(&doc),
            Err(StoreError::NotEditable(DocStatus::Submitted))
        ));
    }
}
