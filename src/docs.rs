use crate::model::timesheet::TimesheetStatus;
use crate::model::weekly::{
    GroupedRow, RowInput, SaveAction, SavePayload, SaveResult, WeeklyQuery, WeeklyTimesheet,
};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weekly Timesheet API",
        version = "1.0.0",
        description = r#"
## Weekly Timesheet

Read and write an employee's weekly timesheet as a grid: one row per
project / task / activity / description, one column per day.

### 🔹 Endpoints
- **Fetch** the timesheet for a period, grouped for the grid
- **Save** the grid back (full replace of the time logs), optionally **submitting** it

Submitted timesheets are immutable.

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication**; the caller must be
linked to an employee record.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::timesheet::get_weekly_timesheet,
        crate::api::timesheet::save_weekly_timesheet,
    ),
    components(
        schemas(
            WeeklyQuery,
            WeeklyTimesheet,
            GroupedRow,
            TimesheetStatus,
            SavePayload,
            SaveAction,
            RowInput,
            SaveResult
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Timesheet", description = "Weekly timesheet APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
