//! Tenure and seniority rules.
//!
//! The tenure gate decides eligibility for allowances, contributions and
//! income tax withholding; seniority years decide social contributions.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Returns true once more than `threshold_days` have passed since hire.
///
/// Exactly `threshold_days` is not enough. No hire date means no tenure.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::tenure_gate;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let a_year_ago = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let a_year_and_a_day = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
///
/// assert!(!tenure_gate(Some(a_year_ago), today, 365));
/// assert!(tenure_gate(Some(a_year_and_a_day), today, 365));
/// assert!(!tenure_gate(None, today, 365));
/// ```
pub fn tenure_gate(hire_date: Option<NaiveDate>, today: NaiveDate, threshold_days: i64) -> bool {
    hire_date.is_some_and(|hired| today.signed_duration_since(hired).num_days() > threshold_days)
}

/// Completed years of service on `today`; 0 without a hire date.
pub fn seniority_years(hire_date: Option<NaiveDate>, today: NaiveDate) -> i32 {
    let Some(hired) = hire_date else {
        return 0;
    };
    let before_anniversary = (today.month(), today.day()) < (hired.month(), hired.day());
    today.year() - hired.year() - i32::from(before_anniversary)
}

/// Seniority as shown on the employee sheet, e.g. `"2 ans 3 mois"`.
///
/// The month part is the calendar month difference modulo 12, ignoring the
/// day of month. Empty without a hire date.
pub fn seniority_label(hire_date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(hired) = hire_date else {
        return String::new();
    };
    let years = seniority_years(Some(hired), today);
    let months = (today.month() as i32 - hired.month() as i32).rem_euclid(12);
    format!("{years} ans {months} mois")
}

/// Entitlements derived from the hire date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    /// Past the tenure threshold: OSTIE/CNaPS, meal and transport rights.
    pub tenure_gate: bool,
    /// Completed years of service.
    pub seniority_years: i32,
    /// Human-readable seniority.
    pub seniority_label: String,
}

/// Computes every hire-date entitlement at once.
pub fn entitlements(
    hire_date: Option<NaiveDate>,
    today: NaiveDate,
    threshold_days: i64,
) -> Entitlements {
    Entitlements {
        tenure_gate: tenure_gate(hire_date, today, threshold_days),
        seniority_years: seniority_years(hire_date, today),
        seniority_label: seniority_label(hire_date, today),
    }
}
