//! Employee master record.
//!
//! Only the matricule, base salary, hire date and leave account feed the
//! calculation. The descriptive fields are carried for the payslip header.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::leave::LeaveAccount;

/// An employee, keyed by a unique matricule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub matricule: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Given name(s).
    #[serde(default)]
    pub first_name: String,
    /// Job title.
    #[serde(default)]
    pub function: String,
    /// How the salary is paid (cash, transfer...).
    #[serde(default)]
    pub payment_mode: String,
    /// Professional category.
    #[serde(default)]
    pub category: String,
    /// Campaign or team the employee is assigned to.
    #[serde(default)]
    pub campaign: String,
    /// Monthly base salary.
    #[serde(default)]
    pub base_salary: Decimal,
    /// Hire date, if one was given and could be read.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Leave ledger.
    #[serde(default)]
    pub leave: LeaveAccount,
    /// Any further descriptive fields, by label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl Employee {
    /// Creates an employee with empty descriptive fields and no leave.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee::new(
    ///     "EMP001",
    ///     Decimal::new(1_000_000, 0),
    ///     NaiveDate::from_ymd_opt(2023, 6, 1),
    /// );
    /// assert_eq!(employee.leave_balance(), Decimal::ZERO);
    /// assert!(!employee.has_blank_matricule());
    /// ```
    pub fn new(
        matricule: impl Into<String>,
        base_salary: Decimal,
        hire_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            matricule: matricule.into(),
            last_name: String::new(),
            first_name: String::new(),
            function: String::new(),
            payment_mode: String::new(),
            category: String::new(),
            campaign: String::new(),
            base_salary,
            hire_date,
            leave: LeaveAccount::default(),
            details: BTreeMap::new(),
        }
    }

    /// Current derived leave balance in days.
    pub fn leave_balance(&self) -> Decimal {
        self.leave.balance
    }

    /// Returns true if the matricule is empty or whitespace.
    pub fn has_blank_matricule(&self) -> bool {
        self.matricule.trim().is_empty()
    }
}
