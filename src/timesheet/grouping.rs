use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveTime, TimeDelta};

use crate::error::AppError;
use crate::model::timesheet::TimeLog;
use crate::model::weekly::{GroupedRow, RowInput};
use crate::utils::parse::parse_date;

type GroupKey<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    &'a str,
    Option<&'a str>,
);

/// Time of day every generated log starts at.
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Collapse time logs into one row per (project, task, activity, description).
///
/// Rows come out in the order their key is first seen. Hours for the same key
/// and day are summed.
pub fn group_time_logs(logs: &[TimeLog]) -> Vec<GroupedRow> {
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut rows: Vec<GroupedRow> = Vec::new();

    for log in logs {
        let key = (
            log.project.as_deref(),
            log.task.as_deref(),
            log.activity_type.as_str(),
            log.description.as_deref(),
        );

        let slot = *index.entry(key).or_insert_with(|| {
            rows.push(GroupedRow {
                project: log.project.clone(),
                task: log.task.clone(),
                activity_type: log.activity_type.clone(),
                description: log.description.clone().unwrap_or_default(),
                hours_by_date: BTreeMap::new(),
            });
            rows.len() - 1
        });

        let date = log.from_time.date().format("%Y-%m-%d").to_string();
        *rows[slot].hours_by_date.entry(date).or_insert(0.0) += log.hours;
    }

    rows
}

/// Whole microseconds covered by `hours`, never zero for a positive value.
fn span_micros(hours: f64) -> i64 {
    ((hours * 3_600_000_000.0).round() as i64).max(1)
}

/// Turn grid rows back into time logs, one per positive (date, hours) cell.
pub fn expand_rows(rows: &[RowInput]) -> Result<Vec<TimeLog>, AppError> {
    let start_time = default_start_time();
    let mut logs = Vec::new();

    for row in rows {
        let Some(activity_type) = row
            .activity_type
            .as_deref()
            .filter(|a| !a.trim().is_empty())
        else {
            continue;
        };

        for (date, hours) in &row.hours_by_date {
            let hours = hours.0;
            if hours <= 0.0 {
                continue;
            }

            let from_time = parse_date(date)?.and_time(start_time);
            let to_time = from_time
                .checked_add_signed(TimeDelta::microseconds(span_micros(hours)))
                .ok_or_else(|| {
                    AppError::InvalidPayload(format!("{} hours on {} is out of range", hours, date))
                })?;

            logs.push(TimeLog {
                project: row.project.clone(),
                task: row.task.clone(),
                activity_type: activity_type.to_string(),
                description: row.description.clone(),
                from_time,
                to_time,
                hours,
                is_billable: false,
            });
        }
    }

    Ok(logs)
}
