//! Response types for the payroll API.
//!
//! This module defines the JSON response bodies, the error response
//! structure and the mapping from [`EngineError`] to HTTP status codes.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::Entitlements;
use crate::error::EngineError;
use crate::models::{Employee, ManualAdjustment, PayStatement, YearMonth};
use crate::parsing::DefaultedInput;
use crate::store::{AccrualReport, AdjustmentSaveSummary, AttendanceSaveSummary};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates an employee not found error response.
    pub fn employee_not_found(matricule: &str) -> Self {
        Self::with_details(
            "EMPLOYEE_NOT_FOUND",
            format!("Employee not found: {}", matricule),
            format!("No employee is registered under matricule '{}'", matricule),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidConfig { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Invalid configuration", message),
            },
            EngineError::EmployeeNotFound { matricule } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::employee_not_found(&matricule),
            },
            EngineError::DuplicateEmployee { matricule } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "DUPLICATE_EMPLOYEE",
                    format!("Matricule already in use: {}", matricule),
                    "Choose another matricule or update the existing employee",
                ),
            },
            EngineError::InvalidEmployee { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_EMPLOYEE",
                    format!("Invalid employee field '{}': {}", field, message),
                    "The employee data contains invalid information",
                ),
            },
            EngineError::InvalidPeriod { year, month } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_PERIOD",
                    format!("Invalid period: year {}, month {}", year, month),
                    "Months run from 1 to 12 and years start at 1",
                ),
            },
            EngineError::StorageError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "STORAGE_ERROR",
                    "Failed to access stored data",
                    format!("{}: {}", path, message),
                ),
            },
        }
    }
}

/// An employee with the entitlements derived from their hire date.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
    /// The stored record.
    #[serde(flatten)]
    pub employee: Employee,
    /// Tenure gate and seniority as of today.
    #[serde(flatten)]
    pub entitlements: Entitlements,
}

/// Response to creating or updating an employee.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSaved {
    /// The stored employee.
    pub employee: EmployeeView,
    /// Fields that could not be read and were defaulted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaulted_inputs: Vec<DefaultedInput>,
}

/// One month of attendance.
#[derive(Debug, Clone, Serialize)]
pub struct MonthAttendance {
    /// The month.
    pub period: YearMonth,
    /// External keys to code letters.
    pub attendance: BTreeMap<String, String>,
}

/// Response to an attendance save.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSaved {
    /// The month.
    pub period: YearMonth,
    /// What happened to the submitted entries.
    #[serde(flatten)]
    pub summary: AttendanceSaveSummary,
}

/// One month of manual adjustments.
#[derive(Debug, Clone, Serialize)]
pub struct MonthAdjustments {
    /// The month.
    pub period: YearMonth,
    /// External keys to adjustments.
    pub adjustments: BTreeMap<String, ManualAdjustment>,
}

/// Response to an adjustment save.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentsSaved {
    /// The month.
    pub period: YearMonth,
    /// What happened to the submitted entries.
    #[serde(flatten)]
    pub summary: AdjustmentSaveSummary,
}

/// Pay statements for a month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthStatements {
    /// The month.
    pub period: YearMonth,
    /// Theoretical working days used.
    pub working_days: u32,
    /// One statement per employee.
    pub statements: Vec<PayStatement>,
}

/// Response to an accrual run.
#[derive(Debug, Clone, Serialize)]
pub struct AccrualRun {
    /// The date the run was measured on.
    pub run_on: NaiveDate,
    /// Per-employee results.
    pub reports: Vec<AccrualReport>,
}

/// Collection sizes reported by the health check.
#[derive(Debug, Clone, Serialize)]
pub struct DataCounts {
    /// Employees.
    pub employees: usize,
    /// Attendance days.
    pub attendance: usize,
    /// Employee-months with adjustments.
    pub adjustments: usize,
}

/// Health check body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"` when the data could be read.
    pub status: &'static str,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Collection sizes.
    pub data: DataCounts,
}

/// Service description returned by `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Available routes.
    pub endpoints: Vec<&'static str>,
}
