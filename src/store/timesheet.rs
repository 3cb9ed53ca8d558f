use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{debug, info};

use super::{StoreError, TimesheetStore, validate};
use crate::model::timesheet::{
    DocStatus, TimeLog, Timesheet, TimesheetStatus, timesheet_name,
};

pub struct MySqlTimesheetStore {
    pool: MySqlPool,
}

impl MySqlTimesheetStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TimesheetRow {
    id: u64,
    name: Option<String>,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    docstatus: u8,
    total_hours: f64,
}

impl TimesheetRow {
    fn into_document(self, time_logs: Vec<TimeLog>) -> Result<Timesheet, StoreError> {
        let status = TimesheetStatus::parse(&self.status).ok_or_else(|| {
            StoreError::Validation(format!("Unknown timesheet status '{}'", self.status))
        })?;
        let docstatus = DocStatus::try_from(self.docstatus).map_err(StoreError::Validation)?;

        Ok(Timesheet {
            id: Some(self.id),
            name: self.name,
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            docstatus,
            total_hours: self.total_hours,
            time_logs,
        })
    }
}

/// Duplicate key (23000) or a deadlock between first saves (40001) means a
/// concurrent request won the period.
fn map_write_error(e: sqlx::Error, period: &Timesheet) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if matches!(db_err.code().as_deref(), Some("23000") | Some("40001")) {
            return StoreError::Conflict(format!(
                "for employee {} ({} - {})",
                period.employee_id, period.start_date, period.end_date
            ));
        }
    }
    StoreError::Database(e)
}

async fn insert_time_logs(
    tx: &mut Transaction<'_, MySql>,
    timesheet_id: u64,
    time_logs: &[TimeLog],
) -> Result<(), sqlx::Error> {
    for (i, log) in time_logs.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO timesheet_logs
                (timesheet_id, idx, project, task, activity_type, description,
                 from_time, to_time, hours, is_billable)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timesheet_id)
        .bind((i + 1) as u32)
        .bind(&log.project)
        .bind(&log.task)
        .bind(&log.activity_type)
        .bind(&log.description)
        .bind(log.from_time)
        .bind(log.to_time)
        .bind(log.hours)
        .bind(log.is_billable)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl TimesheetStore for MySqlTimesheetStore {
    async fn find_period_document(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Timesheet>, StoreError> {
        let header = sqlx::query_as::<_, TimesheetRow>(
            r#"
            SELECT id, name, employee_id, start_date, end_date, status, docstatus, total_hours
            FROM timesheets
            WHERE employee_id = ?
            AND start_date = ?
            AND end_date = ?
            AND docstatus <> 2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            debug!(employee_id, %start_date, %end_date, "No timesheet for period");
            return Ok(None);
        };

        let time_logs = sqlx::query_as::<_, TimeLog>(
            r#"
            SELECT project, task, activity_type, description, from_time, to_time, hours, is_billable
            FROM timesheet_logs
            WHERE timesheet_id = ?
            ORDER BY idx
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await?;

        header.into_document(time_logs).map(Some)
    }

    async fn save(&self, doc: &mut Timesheet) -> Result<(), StoreError> {
        validate(doc)?;

        let mut tx = self.pool.begin().await?;

        let (id, name) = match doc.id {
            Some(id) => {
                let current = sqlx::query_scalar::<_, u8>(
                    "SELECT docstatus FROM timesheets WHERE id = ? FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

                match current.map(DocStatus::try_from) {
                    Some(Ok(DocStatus::Draft)) => {}
                    Some(Ok(other)) => return Err(StoreError::NotEditable(other)),
                    Some(Err(e)) => return Err(StoreError::Validation(e)),
                    None => return Err(StoreError::Database(sqlx::Error::RowNotFound)),
                }

                sqlx::query("UPDATE timesheets SET total_hours = ?, modified = NOW() WHERE id = ?")
                    .bind(doc.total_hours)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query("DELETE FROM timesheet_logs WHERE timesheet_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                (id, doc.name.clone().unwrap_or_else(|| timesheet_name(doc.start_date, id)))
            }
            None => {
                // Locks the period so concurrent first saves serialize here.
                let existing = sqlx::query_scalar::<_, Option<String>>(
                    r#"
                    SELECT name
                    FROM timesheets
                    WHERE employee_id = ?
                    AND start_date = ?
                    AND end_date = ?
                    AND docstatus <> 2
                    LIMIT 1
                    FOR UPDATE
                    "#,
                )
                .bind(doc.employee_id)
                .bind(doc.start_date)
                .bind(doc.end_date)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_write_error(e, doc))?;

                if let Some(existing) = existing {
                    return Err(StoreError::Conflict(existing.unwrap_or_default()));
                }

                let result = sqlx::query(
                    r#"
                    INSERT INTO timesheets
                        (employee_id, start_date, end_date, status, docstatus, total_hours)
                    VALUES (?, ?, ?, ?, 0, ?)
                    "#,
                )
                .bind(doc.employee_id)
                .bind(doc.start_date)
                .bind(doc.end_date)
                .bind(TimesheetStatus::Draft.as_str())
                .bind(doc.total_hours)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error(e, doc))?;

                let id = result.last_insert_id();
                let name = timesheet_name(doc.start_date, id);

                sqlx::query("UPDATE timesheets SET name = ? WHERE id = ?")
                    .bind(&name)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                (id, name)
            }
        };

        insert_time_logs(&mut tx, id, &doc.time_logs).await?;
        tx.commit().await?;

        info!(
            timesheet = %name,
            employee_id = doc.employee_id,
            rows = doc.time_logs.len(),
            total_hours = doc.total_hours,
            "Timesheet saved"
        );

        doc.id = Some(id);
        doc.name = Some(name);
        Ok(())
    }

    async fn finalize(&self, doc: &mut Timesheet) -> Result<(), StoreError> {
        if !doc.is_editable() {
            return Err(StoreError::NotEditable(doc.docstatus));
        }
        let id = doc.id.ok_or_else(|| {
            StoreError::Validation("Timesheet must be saved before it is submitted".into())
        })?;

        let result = sqlx::query(
            r#"
            UPDATE timesheets
            SET docstatus = 1, status = ?, modified = NOW()
            WHERE id = ?
            AND docstatus = 0
            "#,
        )
        .bind(TimesheetStatus::Submitted.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotEditable(DocStatus::Submitted));
        }

        doc.docstatus = DocStatus::Submitted;
        doc.status = TimesheetStatus::Submitted;

        info!(timesheet = ?doc.name, employee_id = doc.employee_id, "Timesheet submitted");
        Ok(())
    }
}
