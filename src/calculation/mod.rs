//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: attendance
//! aggregation, progressive tax brackets, tenure and seniority rules, leave
//! accrual, and the pay statement calculation that ties them together.

mod attendance_hours;
mod leave_accrual;
mod payroll;
mod tax_brackets;
mod tenure;

pub use attendance_hours::{HOURS_PER_DAY, aggregate_attendance};
pub use leave_accrual::{
    AccrualOutcome, accrue_monthly, apply_monthly_accrual, recompute_after_leave,
    sync_leave_balance,
};
pub use payroll::{PayrollInput, calculate_pay_statement};
pub use tax_brackets::calculate_tax_brackets;
pub use tenure::{Entitlements, entitlements, seniority_label, seniority_years, tenure_gate};
