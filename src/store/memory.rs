use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{EmployeeDirectory, StoreError, TimesheetStore, validate};
use crate::model::timesheet::{DocStatus, Timesheet, TimesheetStatus, timesheet_name};

#[derive(Default)]
struct Documents {
    next_id: u64,
    docs: Vec<Timesheet>,
}

/// Process-local store with the same lifecycle rules as the MySQL one.
#[derive(Default)]
pub struct MemoryTimesheetStore {
    inner: Mutex<Documents>,
}

impl MemoryTimesheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document as-is, bypassing validation.
    pub fn seed(&self, mut doc: Timesheet) -> Timesheet {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        doc.id = Some(id);
        doc.name = Some(timesheet_name(doc.start_date, id));
        inner.docs.push(doc.clone());
        doc
    }

    pub fn get(&self, id: u64) -> Option<Timesheet> {
        let inner = self.inner.lock().unwrap();
        inner.docs.iter().find(|d| d.id == Some(id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().docs.len()
    }
}

#[async_trait]
impl TimesheetStore for MemoryTimesheetStore {
    async fn find_period_document(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Timesheet>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .docs
            .iter()
            .find(|d| {
                d.employee_id == employee_id
                    && d.start_date == start_date
                    && d.end_date == end_date
                    && d.docstatus != DocStatus::Cancelled
            })
            .cloned())
    }

    async fn save(&self, doc: &mut Timesheet) -> Result<(), StoreError> {
        validate(doc)?;

        let mut inner = self.inner.lock().unwrap();
        match doc.id {
            Some(id) => {
                let stored = inner
                    .docs
                    .iter_mut()
                    .find(|d| d.id == Some(id))
                    .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
                if stored.docstatus != DocStatus::Draft {
                    return Err(StoreError::NotEditable(stored.docstatus));
                }
                *stored = doc.clone();
            }
            None => {
                if let Some(existing) = inner.docs.iter().find(|d| {
                    d.employee_id == doc.employee_id
                        && d.start_date == doc.start_date
                        && d.end_date == doc.end_date
                        && d.docstatus != DocStatus::Cancelled
                }) {
                    return Err(StoreError::Conflict(existing.name.clone().unwrap_or_default()));
                }
                inner.next_id += 1;
                let id = inner.next_id;
                doc.id = Some(id);
                doc.name = Some(timesheet_name(doc.start_date, id));
                inner.docs.push(doc.clone());
            }
        }
        Ok(())
    }

    async fn finalize(&self, doc: &mut Timesheet) -> Result<(), StoreError> {
        if !doc.is_editable() {
            return Err(StoreError::NotEditable(doc.docstatus));
        }
        let id = doc.id.ok_or_else(|| {
            StoreError::Validation("Timesheet must be saved before it is submitted".into())
        })?;

        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .docs
            .iter_mut()
            .find(|d| d.id == Some(id) && d.docstatus == DocStatus::Draft)
            .ok_or(StoreError::NotEditable(DocStatus::Submitted))?;
        stored.docstatus = DocStatus::Submitted;
        stored.status = TimesheetStatus::Submitted;

        doc.docstatus = DocStatus::Submitted;
        doc.status = TimesheetStatus::Submitted;
        Ok(())
    }
}

/// Fixed user → employee links.
#[derive(Default)]
pub struct MemoryEmployeeDirectory {
    links: Mutex<HashMap<u64, u64>>,
    lookups: Mutex<usize>,
}

impl MemoryEmployeeDirectory {
    pub fn with_link(user_id: u64, employee_id: u64) -> Self {
        let directory = Self::default();
        directory.link(user_id, employee_id);
        directory
    }

    pub fn link(&self, user_id: u64, employee_id: u64) {
        self.links.lock().unwrap().insert(user_id, employee_id);
    }

    /// How many times the directory was consulted.
    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryEmployeeDirectory {
    async fn employee_for_user(&self, user_id: u64) -> Result<Option<u64>, StoreError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self.links.lock().unwrap().get(&user_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[actix_web::test]
    async fn second_draft_for_same_period_conflicts() {
        let store = MemoryTimesheetStore::new();
        let mut first = store.create_period_document(1, day(11), day(17));
        store.save(&mut first).await.unwrap();
        assert_eq!(first.name.as_deref(), Some("TS-2025-00001"));

        let mut second = store.create_period_document(1, day(11), day(17));
        assert!(matches!(store.save(&mut second).await, Err(StoreError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[actix_web::test]
    async fn cancelled_documents_are_invisible() {
        let store = MemoryTimesheetStore::new();
        let mut cancelled = Timesheet::new(1, day(11), day(17));
        cancelled.docstatus = DocStatus::Cancelled;
        cancelled.status = TimesheetStatus::Cancelled;
        store.seed(cancelled);

        assert!(store.find_period_document(1, day(11), day(17)).await.unwrap().is_none());

        let mut fresh = store.create_period_document(1, day(11), day(17));
        store.save(&mut fresh).await.unwrap();
        assert_eq!(fresh.id, Some(2));
    }

    #[actix_web::test]
    async fn finalize_requires_saved_draft() {
        let store = MemoryTimesheetStore::new();
        let mut unsaved = store.create_period_document(1, day(11), day(17));
        assert!(matches!(store.finalize(&mut unsaved).await, Err(StoreError::Validation(_))));

        store.save(&mut unsaved).await.unwrap();
        store.finalize(&mut unsaved).await.unwrap();
        assert_eq!(unsaved.docstatus, DocStatus::Submitted);
        assert!(matches!(
            store.finalize(&mut unsaved).await,
            Err(StoreError::NotEditable(DocStatus::Submitted))
        ));
    }
}
