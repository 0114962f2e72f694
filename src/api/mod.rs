//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for managing employees,
//! attendance and adjustments, and for producing monthly pay statements.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DayCodesRequest, EmployeeDraft, EmployeeRequest, StatementQuery, parse_day_codes};
pub use response::{
    AccrualRun, AdjustmentsSaved, ApiError, ApiErrorResponse, AttendanceSaved, DataCounts,
    EmployeeSaved, EmployeeView, HealthStatus, MonthAdjustments, MonthAttendance,
    MonthStatements, ServiceInfo,
};
pub use state::AppState;
