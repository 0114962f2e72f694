//! Pay statement calculation.
//!
//! This module assembles a [`PayStatement`] from an employee, the month's
//! hour totals and manual adjustments, using the tenure and tax rules of this
//! crate. Bad inputs never fail the calculation: they have already been
//! replaced by defaults, and the statement lists which ones.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PayrollRules;
use crate::models::{
    Deductions, Earnings, Employee, HourTotals, ManualAdjustment, PayStatement, YearMonth,
};
use crate::parsing::{DefaultReason, DefaultedInput, bounded_amount};

use super::attendance_hours::HOURS_PER_DAY;
use super::tax_brackets::calculate_tax_brackets;
use super::tenure::{seniority_years, tenure_gate};

/// Everything one pay statement is computed from.
#[derive(Debug, Clone)]
pub struct PayrollInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The pay month.
    pub period: YearMonth,
    /// Hour totals for the month.
    pub hours: HourTotals,
    /// Manual adjustments, if any were entered.
    pub adjustment: Option<&'a ManualAdjustment>,
    /// Theoretical working days entered by the operator.
    pub working_days: u32,
    /// The date tenure and seniority are measured on.
    pub today: NaiveDate,
}

/// Returns `value`, or zero with a record under `field` when it exceeds
/// the accepted amount range.
fn bounded(value: Decimal, field: &str, defaulted_inputs: &mut Vec<DefaultedInput>) -> Decimal {
    let (value, defaulted) = bounded_amount(value).record(field);
    defaulted_inputs.extend(defaulted);
    value
}

/// Calculates the pay statement for one employee-month.
///
/// Stored amounts beyond [`MAX_AMOUNT`](crate::parsing::MAX_AMOUNT) are
/// treated as malformed and replaced by zero before any arithmetic.
///
/// The steps are:
/// 1. Tenure gate and seniority years from the hire date.
/// 2. Hourly rate: base salary over `(working_days - absence days) * 8`
///    hours, or zero when no working day remains.
/// 3. Earnings lines and the five bonuses; their sum is the gross.
/// 4. OSTIE and CNaPS at the contribution rate, for employees past the
///    tenure gate with at least one year of seniority.
/// 5. Progressive income tax, withheld only past the tenure gate and never
///    for a blank matricule.
/// 6. Net pay: gross minus every deduction.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{PayrollInput, calculate_pay_statement};
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{Employee, HourTotals, YearMonth};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee::new("M1", Decimal::new(500_000, 0), None);
/// let input = PayrollInput {
///     employee: &employee,
///     period: YearMonth::new(2026, 3).unwrap(),
///     hours: HourTotals { presence: 160, ..HourTotals::default() },
///     adjustment: None,
///     working_days: 20,
///     today: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
/// };
///
/// let statement = calculate_pay_statement(&input, &PayrollRules::standard());
/// assert_eq!(statement.gross, Decimal::new(500_000, 0));
/// // No hire date: no allowances, contributions or income tax
/// assert_eq!(statement.deductions.income_tax, Decimal::ZERO);
/// assert_eq!(statement.net, Decimal::new(485_000, 0));
/// ```
pub fn calculate_pay_statement(input: &PayrollInput<'_>, rules: &PayrollRules) -> PayStatement {
    let constants = &rules.constants;
    let employee = input.employee;
    let hours = input.hours;
    let empty = ManualAdjustment::default();
    let adjustment = input.adjustment.unwrap_or(&empty);
    let mut defaulted_inputs = Vec::new();

    if employee.hire_date.is_none() {
        defaulted_inputs.push(DefaultedInput {
            field: "hire_date".to_string(),
            reason: DefaultReason::Missing,
        });
    }
    if adjustment.social_deduction.is_none() {
        defaulted_inputs.push(DefaultedInput {
            field: "social_deduction".to_string(),
            reason: DefaultReason::Missing,
        });
    }

    let base_salary = bounded(employee.base_salary, "base_salary", &mut defaulted_inputs);
    let production_bonus = bounded(
        adjustment.production_bonus,
        "production_bonus",
        &mut defaulted_inputs,
    );
    let attendance_bonus = bounded(
        adjustment.attendance_bonus,
        "attendance_bonus",
        &mut defaulted_inputs,
    );
    let seniority_bonus = bounded(
        adjustment.seniority_bonus,
        "seniority_bonus",
        &mut defaulted_inputs,
    );
    let elite_bonus = bounded(adjustment.elite_bonus, "elite_bonus", &mut defaulted_inputs);
    let responsibility_bonus = bounded(
        adjustment.responsibility_bonus,
        "responsibility_bonus",
        &mut defaulted_inputs,
    );
    let salary_advance = bounded(
        adjustment.salary_advance,
        "salary_advance",
        &mut defaulted_inputs,
    );
    let social_deduction = bounded(
        adjustment.social_deduction_or(constants.default_social_deduction),
        "social_deduction",
        &mut defaulted_inputs,
    );

    // Step 1
    let gate = tenure_gate(employee.hire_date, input.today, constants.tenure_threshold_days);
    let seniority = seniority_years(employee.hire_date, input.today);
    let gate_factor = if gate { Decimal::ONE } else { Decimal::ZERO };

    // Step 2
    let corrected_working_days = input.working_days.saturating_sub(hours.absence_days());
    let corrected_hours = Decimal::from(corrected_working_days) * Decimal::from(HOURS_PER_DAY);
    let hourly_rate = if corrected_hours.is_zero() {
        Decimal::ZERO
    } else {
        base_salary / corrected_hours
    };

    // Step 3
    let presence_days = hours.presence_days();
    let earnings = Earnings {
        worked_pay: Decimal::from(hours.presence) * hourly_rate,
        night_premium: Decimal::from(hours.night) * hourly_rate * constants.night_premium_rate,
        holiday_premium: Decimal::from(hours.holiday)
            * hourly_rate
            * constants.holiday_premium_rate,
        leave_indemnity: Decimal::from(hours.leave) * hourly_rate,
        training_indemnity: Decimal::from(hours.training) * constants.training_rate_per_hour,
        meal_allowance: presence_days * constants.meal_allowance_per_day * gate_factor,
        transport_allowance: presence_days * constants.transport_allowance_per_day * gate_factor,
        production_bonus,
        attendance_bonus,
        seniority_bonus,
        elite_bonus,
        responsibility_bonus,
    };
    let gross = earnings.total();

    // Step 4
    let contribution = if gate && seniority >= 1 {
        gross * constants.social_contribution_rate
    } else {
        Decimal::ZERO
    };

    // Step 5
    let tax = calculate_tax_brackets(gross, &rules.tax);
    let income_tax = if gate && !employee.has_blank_matricule() {
        tax.total
    } else {
        Decimal::ZERO
    };

    // Step 6
    let deductions = Deductions {
        salary_advance,
        ostie: contribution,
        cnaps: contribution,
        social_deduction,
        income_tax,
    };
    let net = gross - deductions.total();

    debug!(
        matricule = %employee.matricule,
        period = %input.period,
        hourly_rate = %hourly_rate,
        gross = %gross,
        net = %net,
        defaulted = defaulted_inputs.len(),
        "Pay statement calculated"
    );

    PayStatement {
        matricule: employee.matricule.clone(),
        period: input.period,
        last_name: employee.last_name.clone(),
        first_name: employee.first_name.clone(),
        base_salary,
        theoretical_working_days: input.working_days,
        corrected_working_days,
        hourly_rate,
        available_leave: employee.leave_balance(),
        tenure_gate: gate,
        seniority_years: seniority,
        hours,
        earnings,
        gross,
        deductions,
        tax,
        net,
        defaulted_inputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    fn veteran(salary: &str) -> Employee {
        Employee::new("M1", dec(salary), NaiveDate::from_ymd_opt(2024, 3, 1))
    }

    fn present_days(days: u32) -> HourTotals {
        HourTotals {
            presence: days * 8,
            ..HourTotals::default()
        }
    }

    fn statement(
        employee: &Employee,
        hours: HourTotals,
        adjustment: Option<&ManualAdjustment>,
        working_days: u32,
    ) -> PayStatement {
        let input = PayrollInput {
            employee,
            period: march(),
            hours,
            adjustment,
            working_days,
            today: today(),
        };
        calculate_pay_statement(&input, &PayrollRules::standard())
    }

    /// PY-001: a full month for a two-year employee
    #[test]
    fn test_full_month_two_year_employee() {
        let employee = veteran("1000000");
        let result = statement(&employee, present_days(22), None, 22);

        assert_eq!(result.hourly_rate.round_dp(2), dec("5681.82"));
        assert_eq!(result.earnings.worked_pay.round_dp(2), dec("1000000"));
        assert_eq!(result.earnings.meal_allowance, dec("55000"));
        assert_eq!(result.earnings.transport_allowance, dec("26400"));
        assert_eq!(result.gross.round_dp(2), dec("1081400"));
        assert_eq!(result.deductions.ostie.round_dp(2), dec("10814"));
        assert_eq!(result.deductions.cnaps, result.deductions.ostie);
        assert_eq!(result.deductions.social_deduction, dec("15000"));
        // 2500 + 10000 + 15000 + 481400 * 0.2
        assert_eq!(result.deductions.income_tax.round_dp(2), dec("123780"));
        assert_eq!(result.net, result.gross - result.deductions.total());
        assert!(result.tenure_gate);
        assert_eq!(result.seniority_years, 2);
    }

    /// PY-002: no hire date means no allowances, contributions or tax
    #[test]
    fn test_missing_hire_date() {
        let employee = Employee::new("M1", dec("1000000"), None);
        let result = statement(&employee, present_days(22), None, 22);

        assert!(!result.tenure_gate);
        assert_eq!(result.seniority_years, 0);
        assert_eq!(result.earnings.meal_allowance, Decimal::ZERO);
        assert_eq!(result.earnings.transport_allowance, Decimal::ZERO);
        assert_eq!(result.deductions.ostie, Decimal::ZERO);
        assert_eq!(result.deductions.income_tax, Decimal::ZERO);
        assert!(result.tax.total > Decimal::ZERO);
        assert!(result.defaulted_inputs.iter().any(|d| d.field == "hire_date"));
    }

    /// PY-003: gate and seniority around the first anniversary
    #[test]
    fn test_gate_and_seniority_near_first_anniversary() {
        let mut employee = veteran("400000");
        employee.hire_date = Some(today() - Duration::days(366));
        let result = statement(&employee, present_days(20), None, 20);
        assert!(result.tenure_gate);
        assert_eq!(result.seniority_years, 1);

        employee.hire_date = NaiveDate::from_ymd_opt(2025, 3, 15);
        let result = statement(&employee, present_days(20), None, 20);
        assert!(result.tenure_gate);
        assert_eq!(result.seniority_years, 1);

        employee.hire_date = NaiveDate::from_ymd_opt(2025, 4, 15);
        let result = statement(&employee, present_days(20), None, 20);
        assert!(!result.tenure_gate);
        assert_eq!(result.deductions.ostie, Decimal::ZERO);
    }

    /// PY-004: absences shrink the divisor
    #[test]
    fn test_absence_corrects_working_days() {
        let employee = veteran("440000");
        let hours = HourTotals {
            presence: 160,
            absence: 16,
            ..HourTotals::default()
        };
        let result = statement(&employee, hours, None, 22);
        assert_eq!(result.corrected_working_days, 20);
        assert_eq!(result.hourly_rate, dec("2750"));
        assert_eq!(result.earnings.worked_pay, dec("440000"));
    }

    /// PY-005: zero working days yields a zero rate, not a failure
    #[test]
    fn test_zero_working_days() {
        let employee = veteran("440000");
        let hours = HourTotals {
            absence: 40,
            ..HourTotals::default()
        };
        let result = statement(&employee, hours, None, 3);
        assert_eq!(result.corrected_working_days, 0);
        assert_eq!(result.hourly_rate, Decimal::ZERO);
        assert_eq!(result.earnings.worked_pay, Decimal::ZERO);
    }

    /// PY-006: premiums, indemnities and bonuses
    #[test]
    fn test_premiums_and_bonuses() {
        let employee = veteran("176000");
        let hours = HourTotals {
            presence: 176,
            night: 16,
            holiday: 8,
            leave: 8,
            training: 8,
            absence: 0,
        };
        let adjustment = ManualAdjustment {
            production_bonus: dec("1000"),
            attendance_bonus: dec("2000"),
            seniority_bonus: dec("3000"),
            elite_bonus: dec("4000"),
            responsibility_bonus: dec("5000"),
            social_deduction: Some(dec("12000")),
            salary_advance: dec("20000"),
        };
        let result = statement(&employee, hours, Some(&adjustment), 22);

        assert_eq!(result.hourly_rate, dec("1000"));
        assert_eq!(result.earnings.night_premium, dec("4800"));
        assert_eq!(result.earnings.holiday_premium, dec("8000"));
        assert_eq!(result.earnings.leave_indemnity, dec("8000"));
        assert_eq!(result.earnings.training_indemnity, dec("80000"));
        assert_eq!(result.deductions.social_deduction, dec("12000"));
        assert_eq!(result.deductions.salary_advance, dec("20000"));
        assert!(result.defaulted_inputs.is_empty());

        let expected_gross = dec("176000") + dec("4800") + dec("8000") + dec("8000")
            + dec("80000") + dec("55000") + dec("26400") + dec("15000");
        assert_eq!(result.gross, expected_gross);
    }

    /// PY-007: blank matricule pays no income tax
    #[test]
    fn test_blank_matricule_pays_no_income_tax() {
        let mut employee = veteran("1000000");
        employee.matricule = " ".to_string();
        let result = statement(&employee, present_days(22), None, 22);
        assert_eq!(result.deductions.income_tax, Decimal::ZERO);
        assert!(result.deductions.ostie > Decimal::ZERO);
    }

    /// PY-008: the minimum tax applies to low earners past the gate
    #[test]
    fn test_minimum_tax_for_low_earner() {
        let employee = veteran("200000");
        let result = statement(&employee, present_days(22), None, 22);
        assert!(result.tax.minimum_applied);
        assert_eq!(result.deductions.income_tax, dec("2000"));
    }

    #[test]
    fn test_net_can_go_negative_with_large_advance() {
        let employee = Employee::new("M1", dec("176000"), None);
        let adjustment = ManualAdjustment {
            salary_advance: dec("250000"),
            ..ManualAdjustment::default()
        };
        let result = statement(&employee, present_days(22), Some(&adjustment), 22);
        assert_eq!(result.net, dec("176000") - dec("250000") - dec("15000"));
    }

    /// PY-009: amounts beyond the accepted range are zeroed, not overflowed
    #[test]
    fn test_out_of_range_amounts_are_defaulted() {
        let mut employee = veteran("0");
        employee.base_salary = Decimal::MAX;
        let adjustment = ManualAdjustment {
            production_bonus: Decimal::MAX,
            salary_advance: Decimal::MIN,
            ..ManualAdjustment::default()
        };
        let result = statement(&employee, present_days(22), Some(&adjustment), 22);

        assert_eq!(result.base_salary, Decimal::ZERO);
        assert_eq!(result.hourly_rate, Decimal::ZERO);
        assert_eq!(result.earnings.production_bonus, Decimal::ZERO);
        assert_eq!(result.deductions.salary_advance, Decimal::ZERO);
        assert_eq!(result.gross, dec("81400"));
        assert_eq!(result.net, result.gross - result.deductions.total());

        let fields: Vec<&str> = result
            .defaulted_inputs
            .iter()
            .map(|d| d.field.as_str())
            .collect();
        assert!(fields.contains(&"base_salary"));
        assert!(fields.contains(&"production_bonus"));
        assert!(fields.contains(&"salary_advance"));
    }

    #[test]
    fn test_available_leave_reflects_balance() {
        let mut employee = veteran("300000");
        employee.leave.balance = dec("12.5");
        let result = statement(&employee, present_days(1), None, 22);
        assert_eq!(result.available_leave, dec("12.5"));
    }
}
