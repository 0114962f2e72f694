//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::entitlements;
use crate::error::EngineError;
use crate::models::{Employee, PayStatement, YearMonth};
use crate::parsing::{DefaultedInput, parse_month};
use crate::store::Statistics;

use super::request::{
    DayCodesRequest, EmployeeDraft, EmployeeRequest, StatementQuery, parse_day_codes,
};
use super::response::{
    AccrualRun, AdjustmentsSaved, ApiError, ApiErrorResponse, AttendanceSaved, DataCounts,
    EmployeeSaved, EmployeeView, HealthStatus, MonthAdjustments, MonthAttendance,
    MonthStatements, ServiceInfo,
};
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Highest accepted theoretical working-day count.
const MAX_WORKING_DAYS: u32 = 31;

const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET|POST /employees",
    "GET|PUT|DELETE /employees/:matricule",
    "PUT /employees/:matricule/attendance/:year/:month",
    "GET /employees/:matricule/statements/:year/:month",
    "GET|POST /attendance/:year/:month",
    "GET|POST /adjustments/:year/:month",
    "GET /statements/:year/:month",
    "POST /leave/accrual",
    "GET /statistics",
];

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/employees", get(list_employees_handler).post(create_employee_handler))
        .route(
            "/employees/:matricule",
            get(get_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .route(
            "/employees/:matricule/attendance/:year/:month",
            put(update_employee_attendance_handler),
        )
        .route(
            "/employees/:matricule/statements/:year/:month",
            get(employee_statement_handler),
        )
        .route(
            "/attendance/:year/:month",
            get(month_attendance_handler).post(save_month_attendance_handler),
        )
        .route(
            "/adjustments/:year/:month",
            get(month_adjustments_handler).post(save_adjustments_handler),
        )
        .route("/statements/:year/:month", get(month_statements_handler))
        .route("/leave/accrual", post(run_accrual_handler))
        .route("/statistics", get(statistics_handler))
        .with_state(state)
}

/// Handler for GET /.
async fn index_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS.to_vec(),
    })
}

/// Handler for GET /health.
///
/// Reports healthy only if the stored data can be loaded.
async fn health_handler(State(state): State<AppState>) -> ApiResult<Json<HealthStatus>> {
    let correlation_id = Uuid::new_v4();
    let data = state
        .repository()
        .read(|dataset| {
            Ok(DataCounts {
                employees: dataset.employees.len(),
                attendance: dataset.attendance.len(),
                adjustments: dataset.adjustments.len(),
            })
        })
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    Ok(Json(HealthStatus {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        data,
    }))
}

/// Handler for GET /employees.
async fn list_employees_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EmployeeView>>> {
    let correlation_id = Uuid::new_v4();
    let today = state.today();
    let threshold = state.rules().constants.tenure_threshold_days;

    let views = state
        .repository()
        .read(|dataset| {
            Ok(dataset
                .employees
                .iter()
                .map(|employee| employee_view(employee.clone(), today, threshold))
                .collect())
        })
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;
    Ok(Json(views))
}

/// Handler for POST /employees.
///
/// Registers an employee and opens their leave ledger.
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EmployeeSaved>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employee creation");

    let EmployeeDraft {
        employee,
        defaulted,
        ..
    } = json_body(correlation_id, payload)?.into_draft();

    let stored = state
        .repository()
        .transaction(|dataset| dataset.add_employee(employee).cloned())
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        matricule = %stored.matricule,
        defaulted = defaulted.len(),
        "Employee created"
    );
    Ok((StatusCode::CREATED, Json(saved(&state, stored, defaulted))))
}

/// Handler for GET /employees/:matricule.
async fn get_employee_handler(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
) -> ApiResult<Json<EmployeeView>> {
    let correlation_id = Uuid::new_v4();
    let employee = state
        .repository()
        .read(|dataset| dataset.employee(&matricule).cloned())
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    let threshold = state.rules().constants.tenure_threshold_days;
    Ok(Json(employee_view(employee, state.today(), threshold)))
}

/// Handler for PUT /employees/:matricule.
///
/// Replaces the record but keeps the leave ledger.
async fn update_employee_handler(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<Json<EmployeeSaved>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, matricule = %matricule, "Processing employee update");

    let EmployeeDraft {
        employee,
        opening_balance,
        defaulted,
    } = json_body(correlation_id, payload)?.into_draft();

    let stored = state
        .repository()
        .transaction(|dataset| {
            dataset
                .update_employee(&matricule, employee, opening_balance)
                .cloned()
        })
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(correlation_id = %correlation_id, matricule = %matricule, "Employee updated");
    Ok(Json(saved(&state, stored, defaulted)))
}

/// Handler for DELETE /employees/:matricule.
async fn delete_employee_handler(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
) -> ApiResult<Json<EmployeeView>> {
    let correlation_id = Uuid::new_v4();
    let removed = state
        .repository()
        .transaction(|dataset| dataset.remove_employee(&matricule))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(correlation_id = %correlation_id, matricule = %matricule, "Employee removed");
    let threshold = state.rules().constants.tenure_threshold_days;
    Ok(Json(employee_view(removed, state.today(), threshold)))
}

/// Handler for GET /attendance/:year/:month.
async fn month_attendance_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, String)>, PathRejection>,
) -> ApiResult<Json<MonthAttendance>> {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;

    let attendance = state
        .repository()
        .read(|dataset| Ok(dataset.month_attendance(period)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;
    Ok(Json(MonthAttendance { period, attendance }))
}

/// Handler for POST /attendance/:year/:month.
///
/// The body maps `{matricule}_{year}_{month}_{day}` keys to code letters.
async fn save_month_attendance_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, String)>, PathRejection>,
    payload: Result<Json<BTreeMap<String, String>>, JsonRejection>,
) -> ApiResult<Json<AttendanceSaved>> {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;
    let entries = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        period = %period,
        entries = entries.len(),
        "Saving month attendance"
    );

    let summary = state
        .repository()
        .transaction(|dataset| Ok(dataset.save_month_attendance(period, &entries)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        stored = summary.stored,
        removed = summary.removed,
        rejected = summary.rejected,
        ignored = summary.ignored,
        "Attendance saved"
    );
    Ok(Json(AttendanceSaved { period, summary }))
}

/// Handler for PUT /employees/:matricule/attendance/:year/:month.
///
/// The body maps day numbers to code letters.
async fn update_employee_attendance_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, i32, String)>, PathRejection>,
    payload: Result<Json<DayCodesRequest>, JsonRejection>,
) -> ApiResult<Json<AttendanceSaved>> {
    let correlation_id = Uuid::new_v4();
    let Path((matricule, year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;
    let (days, unreadable) = parse_day_codes(json_body(correlation_id, payload)?);

    let mut summary = state
        .repository()
        .transaction(|dataset| dataset.update_employee_attendance(&matricule, period, &days))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;
    summary.ignored += unreadable;

    info!(
        correlation_id = %correlation_id,
        matricule = %matricule,
        period = %period,
        stored = summary.stored,
        "Employee attendance saved"
    );
    Ok(Json(AttendanceSaved { period, summary }))
}

/// Handler for GET /adjustments/:year/:month.
async fn month_adjustments_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, String)>, PathRejection>,
) -> ApiResult<Json<MonthAdjustments>> {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;

    let adjustments = state
        .repository()
        .read(|dataset| Ok(dataset.month_adjustments(period)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;
    Ok(Json(MonthAdjustments {
        period,
        adjustments,
    }))
}

/// Handler for POST /adjustments/:year/:month.
///
/// The body maps `{matricule}_{year}_{month}` keys to adjustment objects.
async fn save_adjustments_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, String)>, PathRejection>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<AdjustmentsSaved>> {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;
    let entries = json_body(correlation_id, payload)?;

    let summary = state
        .repository()
        .transaction(|dataset| Ok(dataset.save_adjustments(period, &entries)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    if !summary.defaulted.is_empty() {
        warn!(
            correlation_id = %correlation_id,
            period = %period,
            employees = summary.defaulted.len(),
            "Adjustment values defaulted"
        );
    }
    info!(
        correlation_id = %correlation_id,
        period = %period,
        stored = summary.stored,
        ignored = summary.ignored,
        "Adjustments saved"
    );
    Ok(Json(AdjustmentsSaved { period, summary }))
}

/// Handler for GET /statements/:year/:month.
async fn month_statements_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, String)>, PathRejection>,
    query: Result<Query<StatementQuery>, QueryRejection>,
) -> ApiResult<Json<MonthStatements>> {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;
    let working_days = working_days(correlation_id, &state, query)?;
    let today = state.today();

    let start_time = Instant::now();
    let statements = state
        .repository()
        .read(|dataset| Ok(dataset.month_statements(period, working_days, today, state.rules())))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        period = %period,
        statements = statements.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Month statements calculated"
    );
    Ok(Json(MonthStatements {
        period,
        working_days,
        statements,
    }))
}

/// Handler for GET /employees/:matricule/statements/:year/:month.
async fn employee_statement_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, i32, String)>, PathRejection>,
    query: Result<Query<StatementQuery>, QueryRejection>,
) -> ApiResult<Json<PayStatement>> {
    let correlation_id = Uuid::new_v4();
    let Path((matricule, year, month)) = path_params(correlation_id, path)?;
    let period = period_from(correlation_id, year, &month)?;
    let working_days = working_days(correlation_id, &state, query)?;
    let today = state.today();

    let statement = state
        .repository()
        .read(|dataset| dataset.statement(&matricule, period, working_days, today, state.rules()))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        matricule = %matricule,
        period = %period,
        gross = %statement.gross,
        net = %statement.net,
        "Statement calculated"
    );
    Ok(Json(statement))
}

/// Handler for POST /leave/accrual.
///
/// Credits every ledger for the months elapsed since its last accrual.
async fn run_accrual_handler(State(state): State<AppState>) -> ApiResult<Json<AccrualRun>> {
    let correlation_id = Uuid::new_v4();
    let today = state.today();
    let days_per_month = state.rules().constants.leave_days_per_month;

    let reports = state
        .repository()
        .transaction(|dataset| Ok(dataset.run_monthly_accrual(today, days_per_month)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;

    let credited = reports.iter().filter(|report| report.credited.is_some()).count();
    info!(
        correlation_id = %correlation_id,
        employees = reports.len(),
        credited,
        "Leave accrual run"
    );
    Ok(Json(AccrualRun {
        run_on: today,
        reports,
    }))
}

/// Handler for GET /statistics.
async fn statistics_handler(State(state): State<AppState>) -> ApiResult<Json<Statistics>> {
    let correlation_id = Uuid::new_v4();
    let today = state.today();
    let threshold = state.rules().constants.tenure_threshold_days;

    let statistics = state
        .repository()
        .read(|dataset| Ok(dataset.statistics(today, threshold)))
        .await
        .map_err(|err| engine_failure(correlation_id, err))?;
    Ok(Json(statistics))
}

fn employee_view(employee: Employee, today: NaiveDate, threshold_days: i64) -> EmployeeView {
    let entitlements = entitlements(employee.hire_date, today, threshold_days);
    EmployeeView {
        employee,
        entitlements,
    }
}

fn saved(state: &AppState, employee: Employee, defaulted: Vec<DefaultedInput>) -> EmployeeSaved {
    let threshold = state.rules().constants.tenure_threshold_days;
    EmployeeSaved {
        employee: employee_view(employee, state.today(), threshold),
        defaulted_inputs: defaulted,
    }
}

/// Logs an engine error and converts it to its HTTP response.
fn engine_failure(correlation_id: Uuid, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    err.into()
}

/// Unwraps a JSON body or maps the rejection to a 400.
fn json_body<T>(correlation_id: Uuid, payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn path_params<T>(
    correlation_id: Uuid,
    path: Result<Path<T>, PathRejection>,
) -> ApiResult<Path<T>> {
    path.map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid path parameters"
        );
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

/// Builds the period from path parameters. The month may be a number or a
/// French month name.
fn period_from(correlation_id: Uuid, year: i32, month: &str) -> ApiResult<YearMonth> {
    let month = parse_month(month).into_value();
    YearMonth::new(year, month).map_err(|err| engine_failure(correlation_id, err))
}

fn working_days(
    correlation_id: Uuid,
    state: &AppState,
    query: Result<Query<StatementQuery>, QueryRejection>,
) -> ApiResult<u32> {
    let Query(query) = query.map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid query parameters"
        );
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })?;

    let days = query
        .working_days
        .unwrap_or(state.rules().constants.default_working_days);
    if days > MAX_WORKING_DAYS {
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "working_days must be between 0 and {}, got {}",
            MAX_WORKING_DAYS, days
        ))));
    }
    Ok(days)
}
