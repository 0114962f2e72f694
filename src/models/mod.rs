//! Core data models for the payroll engine.
//!
//! This module contains the persisted records (employees, attendance,
//! adjustments, leave ledgers) and the derived pay statement.

mod adjustment;
mod attendance;
mod employee;
mod leave;
mod pay_statement;
mod period;

pub use adjustment::{AdjustmentBook, AdjustmentKey, ManualAdjustment};
pub use attendance::{AttendanceCode, AttendanceKey, AttendanceLog};
pub use employee::Employee;
pub use leave::{AccrualEntry, LeaveAccount};
pub use pay_statement::{Deductions, Earnings, HourTotals, PayStatement, TaxBreakdown, TrancheLine};
pub use period::YearMonth;
