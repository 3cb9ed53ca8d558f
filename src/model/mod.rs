pub mod role;
pub mod timesheet;
pub mod weekly;
