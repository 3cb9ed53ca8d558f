use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::weekly::{SavePayload, WeeklyQuery},
    state::AppState,
    timesheet,
};
use actix_web::{HttpResponse, web};
use serde_json::Value;
use tracing::instrument;

/// Weekly grid for the logged-in employee
#[utoipa::path(
    get,
    path = "/api/timesheet/weekly",
    params(WeeklyQuery),
    responses(
        (status = 200, description = "Timesheet rows grouped for the weekly grid", body = crate::model::weekly::WeeklyTimesheet),
        (status = 400, description = "Invalid date", body = Object, example = json!({
            "message": "Invalid date: next monday"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee linked to the user", body = Object, example = json!({
            "message": "No Employee found for current user"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timesheet"
)]
#[instrument(
    name = "get_weekly_timesheet",
    skip(auth, state, query),
    fields(user_id = auth.user_id, username = %auth.username, role = auth.role.as_str())
)]
pub async fn get_weekly_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<WeeklyQuery>,
) -> Result<HttpResponse, AppError> {
    let weekly = timesheet::get_weekly_timesheet(
        &auth,
        state.timesheets.as_ref(),
        state.employees.as_ref(),
        &query.start_date,
        &query.end_date,
    )
    .await?;

    Ok(HttpResponse::Ok().json(weekly))
}

/// Save (and optionally submit) the weekly grid
#[utoipa::path(
    post,
    path = "/api/timesheet/weekly",
    request_body(
        content = SavePayload,
        description = "Weekly grid rows; may also be sent as a JSON string holding the encoded object",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Timesheet stored", body = crate::model::weekly::SaveResult),
        (status = 400, description = "Malformed payload or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee linked to the user"),
        (status = 409, description = "Timesheet already submitted", body = Object, example = json!({
            "message": "This Timesheet is already submitted."
        })),
        (status = 422, description = "Rejected by timesheet validation"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timesheet"
)]
#[instrument(
    name = "save_weekly_timesheet",
    skip(auth, state, body),
    fields(user_id = auth.user_id, username = %auth.username, role = auth.role.as_str())
)]
pub async fn save_weekly_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let payload = SavePayload::decode(body.into_inner())?;

    let result = timesheet::save_weekly_timesheet(
        &auth,
        state.timesheets.as_ref(),
        state.employees.as_ref(),
        payload,
    )
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use crate::{
        auth::jwt::generate_access_token,
        config::Config,
        routes,
        state::AppState,
        store::memory::{MemoryEmployeeDirectory, MemoryTimesheetStore},
    };
    use actix_web::{App, http::StatusCode, test, web::Data};
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    const USER: u64 = 10;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn bearer(config: &Config, user_id: u64) -> (&'static str, String) {
        let token =
            generate_access_token(user_id, "jane".into(), 3, &config.jwt_secret, 900).unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    macro_rules! app {
        ($config:expr) => {{
            let config: Config = $config;
            let state = AppState::new(
                MemoryTimesheetStore::new(),
                MemoryEmployeeDirectory::with_link(USER, 500),
            );
            let routes_config = config.clone();
            test::init_service(
                App::new()
                    .app_data(Data::new(config))
                    .app_data(Data::new(state))
                    .configure(move |cfg| routes::configure(cfg, routes_config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = app!(Config::for_tests());

        let req = test::TestRequest::get()
            .uri("/api/timesheet/weekly?start_date=2025-08-11&end_date=2025-08-17")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn user_without_employee_is_forbidden() {
        let config = Config::for_tests();
        let auth = bearer(&config, 77);
        let app = app!(config);

        let req = test::TestRequest::get()
            .uri("/api/timesheet/weekly?start_date=2025-08-11&end_date=2025-08-17")
            .insert_header(auth)
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No Employee found for current user");
    }

    #[actix_web::test]
    async fn encoded_payload_saves_submits_and_locks() {
        let config = Config::for_tests();
        let auth = bearer(&config, USER);
        let app = app!(config);

        let payload = json!({
            "week_start": "2025-08-11",
            "week_end": "2025-08-17",
            "action": "Submit",
            "rows": [{
                "activity_type": "Development",
                "project": "P1",
                "hours_by_date": {"2025-08-11": 4, "2025-08-12": 3.5}
            }]
        });

        let req = test::TestRequest::post()
            .uri("/api/timesheet/weekly")
            .insert_header(auth.clone())
            .peer_addr(peer())
            .set_json(Value::String(payload.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"timesheet_name": "TS-2025-00001", "status": "Submitted", "docstatus": 1})
        );

        let req = test::TestRequest::get()
            .uri("/api/timesheet/weekly?start_date=2025-08-11&end_date=2025-08-17")
            .insert_header(auth.clone())
            .peer_addr(peer())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["docstatus"], 1);
        assert_eq!(body["rows"][0]["hours_by_date"], json!({"2025-08-11": 4.0, "2025-08-12": 3.5}));
        assert_eq!(body["rows"][0]["task"], Value::Null);

        let req = test::TestRequest::post()
            .uri("/api/timesheet/weekly")
            .insert_header(auth)
            .peer_addr(peer())
            .set_json(json!({"week_start": "2025-08-11", "week_end": "2025-08-17", "rows": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn malformed_payload_is_bad_request() {
        let config = Config::for_tests();
        let auth = bearer(&config, USER);
        let app = app!(config);

        let req = test::TestRequest::post()
            .uri("/api/timesheet/weekly")
            .insert_header(auth)
            .peer_addr(peer())
            .set_json(json!({"week_start": "2025-08-11"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
