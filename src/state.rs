use std::sync::Arc;

use crate::store::{EmployeeDirectory, TimesheetStore};

/// Shared handles given to every request.
#[derive(Clone)]
pub struct AppState {
    pub timesheets: Arc<dyn TimesheetStore>,
    pub employees: Arc<dyn EmployeeDirectory>,
}

impl AppState {
    pub fn new<S, D>(timesheets: S, employees: D) -> Self
    where
        S: TimesheetStore + 'static,
        D: EmployeeDirectory + 'static,
    {
        Self {
            timesheets: Arc::new(timesheets),
            employees: Arc::new(employees),
        }
    }
}
