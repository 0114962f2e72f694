//! The in-memory payroll dataset and its operations.
//!
//! A [`Dataset`] is loaded whole, changed by one operation and saved whole by
//! the [`Repository`](super::Repository). Every operation keeps the stored
//! leave balances consistent with the attendance log.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::calculation::{
    PayrollInput, aggregate_attendance, apply_monthly_accrual, calculate_pay_statement,
    sync_leave_balance, tenure_gate,
};
use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AccrualEntry, AdjustmentBook, AdjustmentKey, AttendanceCode, AttendanceKey, AttendanceLog,
    Employee, LeaveAccount, ManualAdjustment, PayStatement, YearMonth,
};
use crate::parsing::{DefaultedInput, bounded_amount};

/// Every persisted collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Employee master records.
    pub employees: Vec<Employee>,
    /// Daily attendance codes.
    pub attendance: AttendanceLog,
    /// Manual monthly adjustments.
    pub adjustments: AdjustmentBook,
}

/// What an attendance save did with its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSaveSummary {
    /// Codes written.
    pub stored: usize,
    /// Days cleared by an empty value.
    pub removed: usize,
    /// Entries whose code is not one of `p n a c m f`.
    pub rejected: usize,
    /// Entries whose key is unreadable or outside the month.
    pub ignored: usize,
}

/// What an adjustment save did with its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSaveSummary {
    /// Adjustments written.
    pub stored: usize,
    /// Entries whose key is unreadable, outside the month, or not an object.
    pub ignored: usize,
    /// Amounts that could not be read and were stored as zero, by key.
    pub defaulted: BTreeMap<String, Vec<DefaultedInput>>,
}

/// The effect of an accrual run on one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualReport {
    /// The employee's matricule.
    pub matricule: String,
    /// The accrual credited, if any month had elapsed.
    pub credited: Option<AccrualEntry>,
    /// Balance after the run.
    pub balance: Decimal,
}

/// Headline figures for the whole workforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of employees.
    pub employee_count: usize,
    /// Employees past the tenure threshold.
    pub active_employees: usize,
    /// Recorded attendance days across all months.
    pub attendance_records: usize,
    /// Sum of base salaries.
    pub payroll_mass: Decimal,
    /// Mean base salary; zero with no employees.
    pub average_salary: Decimal,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an employee.
    pub fn employee(&self, matricule: &str) -> EngineResult<&Employee> {
        self.employees
            .iter()
            .find(|employee| employee.matricule == matricule)
            .ok_or_else(|| not_found(matricule))
    }

    fn employee_index(&self, matricule: &str) -> EngineResult<usize> {
        self.employees
            .iter()
            .position(|employee| employee.matricule == matricule)
            .ok_or_else(|| not_found(matricule))
    }

    fn leave_days_taken(&self, matricule: &str) -> u32 {
        self.attendance.lifetime_count(matricule, AttendanceCode::Leave)
    }

    /// Adds an employee.
    ///
    /// The matricule is trimmed and must be non-blank and unused. The leave
    /// ledger is opened at the employee's initial balance, less any leave
    /// already in the attendance log under that matricule.
    pub fn add_employee(&mut self, mut employee: Employee) -> EngineResult<&Employee> {
        employee.matricule = employee.matricule.trim().to_string();
        if employee.has_blank_matricule() {
            return Err(EngineError::InvalidEmployee {
                field: "matricule".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        if self.employee(&employee.matricule).is_ok() {
            return Err(EngineError::DuplicateEmployee {
                matricule: employee.matricule,
            });
        }

        employee.leave = LeaveAccount::opening(employee.leave.initial_balance);
        sync_leave_balance(&mut employee.leave, self.leave_days_taken(&employee.matricule));

        debug!(matricule = %employee.matricule, "Employee added");
        self.employees.push(employee);
        let last = self.employees.len() - 1;
        Ok(&self.employees[last])
    }

    /// Replaces an employee's record, keeping their leave history.
    ///
    /// The matricule cannot change. `opening_balance`, when given, replaces the
    /// ledger's initial balance; the derived balance is then recomputed.
    pub fn update_employee(
        &mut self,
        matricule: &str,
        mut updated: Employee,
        opening_balance: Option<Decimal>,
    ) -> EngineResult<&Employee> {
        let index = self.employee_index(matricule)?;
        let new_matricule = updated.matricule.trim();
        if !new_matricule.is_empty() && new_matricule != matricule {
            return Err(EngineError::InvalidEmployee {
                field: "matricule".to_string(),
                message: format!("cannot change matricule from '{matricule}' to '{new_matricule}'"),
            });
        }
        updated.matricule = matricule.to_string();

        updated.leave = self.employees[index].leave.clone();
        if let Some(opening) = opening_balance {
            updated.leave.initial_balance = opening;
        }
        sync_leave_balance(&mut updated.leave, self.leave_days_taken(matricule));

        self.employees[index] = updated;
        Ok(&self.employees[index])
    }

    /// Removes an employee. Attendance and adjustments are kept.
    pub fn remove_employee(&mut self, matricule: &str) -> EngineResult<Employee> {
        let index = self.employee_index(matricule)?;
        Ok(self.employees.remove(index))
    }

    /// Re-derives every employee's leave balance from the attendance log.
    pub fn sync_leave_balances(&mut self) {
        let attendance = &self.attendance;
        for employee in &mut self.employees {
            let taken = attendance.lifetime_count(&employee.matricule, AttendanceCode::Leave);
            sync_leave_balance(&mut employee.leave, taken);
        }
    }

    /// Saves a month of attendance given as external keys to code text.
    ///
    /// Only keys inside `period` are applied. An empty value clears the day;
    /// an unknown code is dropped and leaves the day as it was. Leave balances
    /// are re-derived afterwards.
    pub fn save_month_attendance(
        &mut self,
        period: YearMonth,
        entries: &BTreeMap<String, String>,
    ) -> AttendanceSaveSummary {
        let mut summary = AttendanceSaveSummary::default();
        for (raw_key, raw_code) in entries {
            match AttendanceKey::parse(raw_key).filter(|key| key.period == period) {
                Some(key) => self.apply_attendance(key, raw_code, &mut summary),
                None => summary.ignored += 1,
            }
        }
        if summary.rejected > 0 {
            warn!(
                period = %period,
                rejected = summary.rejected,
                "Unknown attendance codes dropped"
            );
        }
        self.sync_leave_balances();
        summary
    }

    /// Saves day-level attendance for one employee-month.
    ///
    /// Days outside the month are ignored. Fails if the employee is unknown.
    pub fn update_employee_attendance(
        &mut self,
        matricule: &str,
        period: YearMonth,
        days: &BTreeMap<u32, String>,
    ) -> EngineResult<AttendanceSaveSummary> {
        self.employee(matricule)?;
        let mut summary = AttendanceSaveSummary::default();
        for (day, raw_code) in days {
            match AttendanceKey::new(matricule, period, *day) {
                Some(key) => self.apply_attendance(key, raw_code, &mut summary),
                None => summary.ignored += 1,
            }
        }
        self.sync_leave_balances();
        Ok(summary)
    }

    fn apply_attendance(
        &mut self,
        key: AttendanceKey,
        raw_code: &str,
        summary: &mut AttendanceSaveSummary,
    ) {
        if raw_code.trim().is_empty() {
            self.attendance.remove(&key);
            summary.removed += 1;
            return;
        }
        match AttendanceCode::parse(raw_code) {
            Some(code) => {
                self.attendance.set(key, code);
                summary.stored += 1;
            }
            None => summary.rejected += 1,
        }
    }

    /// Attendance recorded in `period`, as external keys to code letters.
    pub fn month_attendance(&self, period: YearMonth) -> BTreeMap<String, String> {
        self.attendance
            .month_records(period)
            .map(|(key, code)| (key.to_string(), code.to_string()))
            .collect()
    }

    /// Saves a month of adjustments given as external keys to free-form objects.
    ///
    /// See [`ManualAdjustment::from_raw`] for the accepted field names.
    pub fn save_adjustments(
        &mut self,
        period: YearMonth,
        entries: &Map<String, Value>,
    ) -> AdjustmentSaveSummary {
        let mut summary = AdjustmentSaveSummary::default();
        for (raw_key, raw_value) in entries {
            let key = AdjustmentKey::parse(raw_key).filter(|key| key.period == period);
            let (Some(key), Some(fields)) = (key, raw_value.as_object()) else {
                summary.ignored += 1;
                continue;
            };
            let (adjustment, defaulted) = ManualAdjustment::from_raw(fields);
            if !defaulted.is_empty() {
                summary.defaulted.insert(key.to_string(), defaulted);
            }
            self.adjustments.set(key, adjustment);
            summary.stored += 1;
        }
        summary
    }

    /// Replaces one employee-month's adjustment.
    pub fn set_adjustment(&mut self, key: AdjustmentKey, adjustment: ManualAdjustment) {
        self.adjustments.set(key, adjustment);
    }

    /// Looks up one employee-month's adjustment.
    pub fn adjustment(&self, matricule: &str, period: YearMonth) -> Option<&ManualAdjustment> {
        self.adjustments.get(&AdjustmentKey::new(matricule, period))
    }

    /// Adjustments recorded in `period`, by external key.
    pub fn month_adjustments(&self, period: YearMonth) -> BTreeMap<String, ManualAdjustment> {
        self.adjustments
            .month(period)
            .map(|(key, adjustment)| (key.to_string(), adjustment.clone()))
            .collect()
    }

    /// Runs the monthly leave accrual for every employee.
    pub fn run_monthly_accrual(
        &mut self,
        today: NaiveDate,
        days_per_month: Decimal,
    ) -> Vec<AccrualReport> {
        let attendance = &self.attendance;
        self.employees
            .iter_mut()
            .map(|employee| {
                let taken = attendance.lifetime_count(&employee.matricule, AttendanceCode::Leave);
                let credited =
                    apply_monthly_accrual(&mut employee.leave, taken, today, days_per_month);
                AccrualReport {
                    matricule: employee.matricule.clone(),
                    credited,
                    balance: employee.leave.balance,
                }
            })
            .collect()
    }

    /// Computes one employee's pay statement for `period`.
    pub fn statement(
        &self,
        matricule: &str,
        period: YearMonth,
        working_days: u32,
        today: NaiveDate,
        rules: &PayrollRules,
    ) -> EngineResult<PayStatement> {
        let employee = self.employee(matricule)?;
        Ok(self.statement_for(employee, period, working_days, today, rules))
    }

    /// Computes every employee's pay statement for `period`.
    pub fn month_statements(
        &self,
        period: YearMonth,
        working_days: u32,
        today: NaiveDate,
        rules: &PayrollRules,
    ) -> Vec<PayStatement> {
        self.employees
            .iter()
            .map(|employee| self.statement_for(employee, period, working_days, today, rules))
            .collect()
    }

    fn statement_for(
        &self,
        employee: &Employee,
        period: YearMonth,
        working_days: u32,
        today: NaiveDate,
        rules: &PayrollRules,
    ) -> PayStatement {
        let input = PayrollInput {
            employee,
            period,
            hours: aggregate_attendance(&employee.matricule, period, &self.attendance),
            adjustment: self.adjustment(&employee.matricule, period),
            working_days,
            today,
        };
        calculate_pay_statement(&input, rules)
    }

    /// Headline figures as of `today`.
    pub fn statistics(&self, today: NaiveDate, tenure_threshold_days: i64) -> Statistics {
        let employee_count = self.employees.len();
        let active_employees = self
            .employees
            .iter()
            .filter(|employee| tenure_gate(employee.hire_date, today, tenure_threshold_days))
            .count();
        let payroll_mass: Decimal = self
            .employees
            .iter()
            .map(|employee| bounded_amount(employee.base_salary).into_value())
            .sum();
        let average_salary = if employee_count == 0 {
            Decimal::ZERO
        } else {
            payroll_mass / Decimal::from(employee_count)
        };
        Statistics {
            employee_count,
            active_employees,
            attendance_records: self.attendance.len(),
            payroll_mass,
            average_salary,
        }
    }
}

fn not_found(matricule: &str) -> EngineError {
    EngineError::EmployeeNotFound {
        matricule: matricule.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    fn hired(matricule: &str, salary: &str, opening: &str) -> Employee {
        let mut employee = Employee::new(matricule, dec(salary), Some(date(2023, 1, 10)));
        employee.leave.initial_balance = dec(opening);
        employee
    }

    fn codes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_add_employee_rejects_blank_and_duplicate() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired(" M1 ", "100", "0")).unwrap();
        assert_eq!(dataset.employees[0].matricule, "M1");

        assert!(matches!(
            dataset.add_employee(hired("M1", "100", "0")),
            Err(EngineError::DuplicateEmployee { .. })
        ));
        assert!(matches!(
            dataset.add_employee(hired("  ", "100", "0")),
            Err(EngineError::InvalidEmployee { .. })
        ));
    }

    #[test]
    fn test_add_employee_opens_ledger() {
        let mut dataset = Dataset::new();
        let mut employee = hired("M1", "100", "6");
        employee.leave.balance = dec("99");
        employee.leave.last_accrual = Some(march());
        let added = dataset.add_employee(employee).unwrap();
        assert_eq!(added.leave.balance, dec("6"));
        assert_eq!(added.leave.last_accrual, None);
    }

    #[test]
    fn test_update_keeps_ledger_and_rejects_rename() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "10")).unwrap();
        dataset.run_monthly_accrual(date(2026, 1, 5), dec("2.5"));
        dataset.run_monthly_accrual(date(2026, 3, 5), dec("2.5"));
        assert_eq!(dataset.employee("M1").unwrap().leave.balance, dec("15"));

        let updated = hired("M1", "200", "0");
        let after = dataset.update_employee("M1", updated, None).unwrap();
        assert_eq!(after.base_salary, dec("200"));
        assert_eq!(after.leave.balance, dec("15"));

        let after = dataset
            .update_employee("M1", hired("", "200", "0"), Some(dec("4")))
            .unwrap();
        assert_eq!(after.leave.balance, dec("9"));
        assert_eq!(after.matricule, "M1");

        assert!(matches!(
            dataset.update_employee("M1", hired("M2", "200", "0"), None),
            Err(EngineError::InvalidEmployee { .. })
        ));
        assert!(matches!(
            dataset.update_employee("M9", hired("M9", "200", "0"), None),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_employee_keeps_history() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "0")).unwrap();
        dataset.save_month_attendance(march(), &codes(&[("M1_2026_3_2", "p")]));

        let removed = dataset.remove_employee("M1").unwrap();
        assert_eq!(removed.matricule, "M1");
        assert!(dataset.employees.is_empty());
        assert_eq!(dataset.attendance.len(), 1);
        assert!(dataset.remove_employee("M1").is_err());
    }

    #[test]
    fn test_save_month_attendance_scoping() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "5")).unwrap();
        dataset.save_month_attendance(march(), &codes(&[("M1_2026_3_4", "p")]));

        let summary = dataset.save_month_attendance(
            march(),
            &codes(&[
                ("M1_2026_3_2", " C "),
                ("M1_2026_3_3", "z"),
                ("M1_2026_3_4", ""),
                ("M1_2026_4_1", "p"),
                ("nonsense", "p"),
            ]),
        );
        assert_eq!(
            summary,
            AttendanceSaveSummary {
                stored: 1,
                removed: 1,
                rejected: 1,
                ignored: 2,
            }
        );
        assert_eq!(
            dataset.month_attendance(march()),
            codes(&[("M1_2026_3_2", "c")])
        );
        assert_eq!(dataset.employee("M1").unwrap().leave.balance, dec("4"));
    }

    #[test]
    fn test_leave_sync_uses_lifetime_count() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "5")).unwrap();
        dataset.save_month_attendance(
            YearMonth::new(2026, 2).unwrap(),
            &codes(&[("M1_2026_2_2", "c"), ("M1_2026_2_3", "c")]),
        );
        dataset.save_month_attendance(march(), &codes(&[("M1_2026_3_9", "c")]));
        assert_eq!(dataset.employee("M1").unwrap().leave.balance, dec("2"));

        dataset.save_month_attendance(
            march(),
            &codes(&[("M1_2026_3_10", "c"), ("M1_2026_3_11", "c"), ("M1_2026_3_12", "c")]),
        );
        assert_eq!(dataset.employee("M1").unwrap().leave.balance, Decimal::ZERO);
    }

    #[test]
    fn test_update_employee_attendance() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "0")).unwrap();
        let april = YearMonth::new(2026, 4).unwrap();
        let days: BTreeMap<u32, String> = [
            (1, "p".to_string()),
            (30, "n".to_string()),
            (31, "p".to_string()),
        ]
        .into_iter()
        .collect();

        let summary = dataset.update_employee_attendance("M1", april, &days).unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.ignored, 1);
        assert!(dataset.update_employee_attendance("M9", april, &days).is_err());
    }

    #[test]
    fn test_save_adjustments() {
        let mut dataset = Dataset::new();
        let payload = json!({
            "M1_2026_3": {"Prime de production": "10 000", "Social": "oops"},
            "M2_2026_3": {"salary_advance": 5000},
            "M1_2026_4": {"salary_advance": 5000},
            "M3_2026_3": "not an object"
        });
        let summary = dataset.save_adjustments(march(), payload.as_object().unwrap());
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.ignored, 2);
        assert_eq!(summary.defaulted["M1_2026_3"][0].field, "social_deduction");

        let adjustment = dataset.adjustment("M1", march()).unwrap();
        assert_eq!(adjustment.production_bonus, dec("10000"));
        assert_eq!(adjustment.social_deduction, Some(Decimal::ZERO));
        assert_eq!(dataset.month_adjustments(march()).len(), 2);
    }

    #[test]
    fn test_run_monthly_accrual_reports() {
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "100", "1")).unwrap();

        let first = dataset.run_monthly_accrual(date(2026, 1, 31), dec("2.5"));
        assert_eq!(first[0].credited, None);
        assert_eq!(first[0].balance, dec("1"));

        let second = dataset.run_monthly_accrual(date(2026, 3, 1), dec("2.5"));
        assert_eq!(second[0].credited.as_ref().unwrap().months, 2);
        assert_eq!(second[0].balance, dec("6"));

        let again = dataset.run_monthly_accrual(date(2026, 3, 20), dec("2.5"));
        assert_eq!(again[0].credited, None);
        assert_eq!(again[0].balance, dec("6"));
    }

    #[test]
    fn test_statement_uses_attendance_and_adjustment() {
        let rules = PayrollRules::standard();
        let mut dataset = Dataset::new();
        dataset.add_employee(hired("M1", "176000", "0")).unwrap();
        dataset.save_month_attendance(
            march(),
            &codes(&[("M1_2026_3_2", "p"), ("M1_2026_3_3", "a")]),
        );
        dataset.set_adjustment(
            AdjustmentKey::new("M1", march()),
            ManualAdjustment {
                social_deduction: Some(dec("0")),
                ..ManualAdjustment::default()
            },
        );

        let statement = dataset.statement("M1", march(), 23, date(2026, 3, 31), &rules).unwrap();
        assert_eq!(statement.hours.presence, 8);
        assert_eq!(statement.corrected_working_days, 22);
        assert_eq!(statement.hourly_rate, dec("1000"));
        assert_eq!(statement.deductions.social_deduction, Decimal::ZERO);

        assert!(matches!(
            dataset.statement("M9", march(), 22, date(2026, 3, 31), &rules),
            Err(EngineError::EmployeeNotFound { .. })
        ));
        assert_eq!(dataset.month_statements(march(), 22, date(2026, 3, 31), &rules).len(), 1);
    }

    #[test]
    fn test_statistics() {
        let mut dataset = Dataset::new();
        assert_eq!(dataset.statistics(date(2026, 3, 1), 365).average_salary, Decimal::ZERO);

        dataset.add_employee(hired("M1", "300000", "0")).unwrap();
        dataset
            .add_employee(Employee::new("M2", dec("500000"), Some(date(2026, 2, 1))))
            .unwrap();
        dataset.save_month_attendance(march(), &codes(&[("M1_2026_3_2", "p")]));

        let stats = dataset.statistics(date(2026, 3, 1), 365);
        assert_eq!(stats.employee_count, 2);
        assert_eq!(stats.active_employees, 1);
        assert_eq!(stats.attendance_records, 1);
        assert_eq!(stats.payroll_mass, dec("800000"));
        assert_eq!(stats.average_salary, dec("400000"));
    }

    #[test]
    fn test_statistics_ignore_out_of_range_salaries() {
        let mut dataset = Dataset::new();
        dataset.add_employee(Employee::new("M1", Decimal::MAX, None)).unwrap();
        dataset.add_employee(Employee::new("M2", Decimal::MAX, None)).unwrap();
        dataset.add_employee(Employee::new("M3", dec("300000"), None)).unwrap();

        let stats = dataset.statistics(date(2026, 3, 1), 365);
        assert_eq!(stats.payroll_mass, dec("300000"));
        assert_eq!(stats.average_salary, dec("100000"));

        let rules = PayrollRules::standard();
        let statements = dataset.month_statements(march(), 22, date(2026, 3, 31), &rules);
        assert_eq!(statements[0].gross, Decimal::ZERO);
        assert_eq!(statements[0].defaulted_inputs[0].field, "hire_date");
        assert!(statements[0].defaulted_inputs.iter().any(|d| d.field == "base_salary"));
    }
}
