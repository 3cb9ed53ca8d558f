//! Weekly timesheet operations behind the two HTTP endpoints.
//!
//! Both take the caller explicitly and work only through the store and
//! directory traits.

use tracing::{debug, info};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::timesheet::DocStatus;
use crate::model::weekly::{SaveAction, SavePayload, SaveResult, WeeklyTimesheet};
use crate::store::{EmployeeDirectory, TimesheetStore};
use crate::utils::parse::parse_date;

pub mod grouping;

use grouping::{expand_rows, group_time_logs};

async fn resolve_employee(
    auth: &AuthUser,
    directory: &dyn EmployeeDirectory,
) -> Result<u64, AppError> {
    directory
        .employee_for_user(auth.user_id)
        .await?
        .ok_or(AppError::NoEmployee)
}

/// Existing timesheet for the period, projected into grid rows.
pub async fn get_weekly_timesheet(
    auth: &AuthUser,
    store: &dyn TimesheetStore,
    directory: &dyn EmployeeDirectory,
    start_date: &str,
    end_date: &str,
) -> Result<WeeklyTimesheet, AppError> {
    let start_date = parse_date(start_date)?;
    let end_date = parse_date(end_date)?;

    let employee_id = resolve_employee(auth, directory).await?;

    let Some(doc) = store
        .find_period_document(employee_id, start_date, end_date)
        .await?
    else {
        return Ok(WeeklyTimesheet::empty());
    };

    debug!(timesheet = ?doc.name, rows = doc.time_logs.len(), "Loaded timesheet");

    Ok(WeeklyTimesheet {
        rows: group_time_logs(&doc.time_logs),
        timesheet_name: doc.name,
        status: Some(doc.status),
        docstatus: doc.docstatus,
    })
}

/// Replace the period's rows with the grid contents, then save and optionally submit.
pub async fn save_weekly_timesheet(
    auth: &AuthUser,
    store: &dyn TimesheetStore,
    directory: &dyn EmployeeDirectory,
    payload: SavePayload,
) -> Result<SaveResult, AppError> {
    let week_start = parse_date(&payload.week_start)?;
    let week_end = parse_date(&payload.week_end)?;

    let employee_id = resolve_employee(auth, directory).await?;

    let mut doc = match store
        .find_period_document(employee_id, week_start, week_end)
        .await?
    {
        Some(doc) => doc,
        None => store.create_period_document(employee_id, week_start, week_end),
    };

    if doc.docstatus == DocStatus::Submitted {
        return Err(AppError::AlreadySubmitted);
    }

    let time_logs = expand_rows(&payload.rows)?;
    store.replace_child_rows(&mut doc, time_logs);
    store.save(&mut doc).await?;

    if payload.action == SaveAction::Submit {
        store.finalize(&mut doc).await?;
    }

    info!(
        timesheet = ?doc.name,
        employee_id,
        action = ?payload.action,
        rows = doc.time_logs.len(),
        "Weekly timesheet stored"
    );

    Ok(SaveResult {
        timesheet_name: doc.name.unwrap_or_default(),
        status: doc.status,
        docstatus: doc.docstatus,
    })
}
