use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::model::timesheet::{DocStatus, TimesheetStatus};
use crate::utils::parse::flt;

/// Hours value as sent by the grid: numbers, numeric strings and nulls are all accepted.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Hours(pub f64);

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Hours(flt(&value)))
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WeeklyQuery {
    /// First day of the period
    #[schema(example = "2025-08-11")]
    pub start_date: String,
    /// Last day of the period
    #[schema(example = "2025-08-17")]
    pub end_date: String,
}

/// Time logs sharing project, task, activity and description, collapsed per day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupedRow {
    #[schema(example = "P1", nullable = true)]
    pub project: Option<String>,
    #[schema(nullable = true)]
    pub task: Option<String>,
    #[schema(example = "Development")]
    pub activity_type: String,
    #[schema(example = "")]
    pub description: String,
    #[schema(example = json!({"2025-08-11": 4.0, "2025-08-12": 3.5}))]
    pub hours_by_date: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyTimesheet {
    #[schema(example = "TS-2025-00001", nullable = true)]
    pub timesheet_name: Option<String>,
    #[schema(nullable = true)]
    pub status: Option<TimesheetStatus>,
    #[schema(value_type = u8, example = 0)]
    pub docstatus: DocStatus,
    pub rows: Vec<GroupedRow>,
}

impl WeeklyTimesheet {
    pub fn empty() -> Self {
        Self {
            timesheet_name: None,
            status: None,
            docstatus: DocStatus::Draft,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum SaveAction {
    #[default]
    Save,
    Submit,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RowInput {
    #[schema(example = "P1", nullable = true)]
    pub project: Option<String>,
    #[schema(nullable = true)]
    pub task: Option<String>,
    /// Rows without an activity type are skipped
    #[schema(example = "Development", nullable = true)]
    pub activity_type: Option<String>,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[serde(default)]
    /// Cells become time logs in the order they are sent
    #[schema(value_type = Object, example = json!({"2025-08-11": 4, "2025-08-12": "3.5"}))]
    pub hours_by_date: IndexMap<String, Hours>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "week_start": "2025-08-11",
    "week_end": "2025-08-17",
    "action": "Save",
    "rows": [{
        "project": "P1",
        "activity_type": "Development",
        "hours_by_date": {"2025-08-11": 4, "2025-08-12": 3.5}
    }]
}))]
pub struct SavePayload {
    pub week_start: String,
    pub week_end: String,
    #[serde(default)]
    pub action: SaveAction,
    #[serde(default)]
    pub rows: Vec<RowInput>,
}

impl SavePayload {
    /// Accepts the payload either as a JSON object or as a JSON string holding the encoded object.
    pub fn decode(value: Value) -> Result<Self, AppError> {
        let value = match value {
            Value::String(encoded) => serde_json::from_str(&encoded)
                .map_err(|e| AppError::InvalidPayload(e.to_string()))?,
            other => other,
        };

        serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResult {
    #[schema(example = "TS-2025-00001")]
    pub timesheet_name: String,
    pub status: TimesheetStatus,
    #[schema(value_type = u8, example = 1)]
    pub docstatus: DocStatus,
}
