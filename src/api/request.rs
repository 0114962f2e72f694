//! Request types for the payroll API.
//!
//! Employee bodies accept either the English field names or the French
//! column labels used by the payroll office spreadsheets. Amounts and dates
//! are read leniently: anything unreadable is defaulted and reported back.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Employee;
use crate::parsing::{DefaultedInput, amount_from_json, parse_hire_date};

/// Fields that are derived by the server and never stored as details.
const DERIVED_FIELDS: &[&str] = &[
    "leave",
    "leave_balance",
    "Solde congé",
    "Solde de congé",
    "tenure_gate",
    "seniority_years",
    "seniority_label",
    "details",
];

/// Request body for creating or replacing an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeRequest {
    /// Unique employee identifier.
    #[serde(default, alias = "Matricule")]
    pub matricule: String,
    /// Family name.
    #[serde(default, alias = "Nom")]
    pub last_name: String,
    /// Given name(s).
    #[serde(default, alias = "Prénom")]
    pub first_name: String,
    /// Job title.
    #[serde(default, alias = "Fonction")]
    pub function: String,
    /// How the salary is paid.
    #[serde(default, alias = "Mode de paiement")]
    pub payment_mode: String,
    /// Professional category.
    #[serde(default, alias = "Catégorie")]
    pub category: String,
    /// Campaign or team.
    #[serde(default, alias = "Compagne", alias = "Campagne")]
    pub campaign: String,
    /// Monthly base salary, as a number or text.
    #[serde(default, alias = "Salaire de base")]
    pub base_salary: Option<Value>,
    /// Hire date text.
    #[serde(default, alias = "Date d'embauche")]
    pub hire_date: Option<String>,
    /// Leave balance carried in when the employee was registered.
    #[serde(default, alias = "Solde initial congé")]
    pub initial_leave_balance: Option<Value>,
    /// Everything else, kept as descriptive details.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An employee record read from a request, with what had to be defaulted.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    /// The record. Its leave ledger is opened at `opening_balance` or zero.
    pub employee: Employee,
    /// The initial leave balance, if the request carried one.
    pub opening_balance: Option<Decimal>,
    /// Fields that could not be read.
    pub defaulted: Vec<DefaultedInput>,
}

impl EmployeeRequest {
    /// Reads the request into an employee record.
    pub fn into_draft(self) -> EmployeeDraft {
        let mut defaulted = Vec::new();

        let (base_salary, warning) =
            amount_from_json(self.base_salary.as_ref(), Decimal::ZERO).record("base_salary");
        defaulted.extend(warning);

        let hire_date = match self.hire_date.as_deref() {
            Some(raw) => {
                let (date, warning) = parse_hire_date(raw).record("hire_date");
                defaulted.extend(warning);
                date
            }
            None => None,
        };

        let opening_balance = match self.initial_leave_balance.as_ref() {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let (balance, warning) =
                    amount_from_json(Some(raw), Decimal::ZERO).record("initial_leave_balance");
                defaulted.extend(warning);
                Some(balance)
            }
        };

        let details = self
            .extra
            .into_iter()
            .filter(|(label, _)| !DERIVED_FIELDS.contains(&label.as_str()))
            .filter_map(|(label, value)| detail_text(value).map(|text| (label, text)))
            .collect();

        let mut employee = Employee::new(self.matricule.trim(), base_salary, hire_date);
        employee.last_name = self.last_name;
        employee.first_name = self.first_name;
        employee.function = self.function;
        employee.payment_mode = self.payment_mode;
        employee.category = self.category;
        employee.campaign = self.campaign;
        employee.details = details;
        employee.leave.initial_balance = opening_balance.unwrap_or(Decimal::ZERO);

        EmployeeDraft {
            employee,
            opening_balance,
            defaulted,
        }
    }
}

fn detail_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Day-level codes for one employee-month, keyed by day number text.
pub type DayCodesRequest = BTreeMap<String, String>;

/// Splits day-number keys into readable days and a count of unreadable ones.
pub fn parse_day_codes(request: DayCodesRequest) -> (BTreeMap<u32, String>, usize) {
    let mut days = BTreeMap::new();
    let mut unreadable = 0;
    for (day, code) in request {
        match day.trim().parse::<u32>() {
            Ok(day) => {
                days.insert(day, code);
            }
            Err(_) => unreadable += 1,
        }
    }
    (days, unreadable)
}

/// Query parameters for statement endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementQuery {
    /// Theoretical working days in the month.
    #[serde(default)]
    pub working_days: Option<u32>,
}
