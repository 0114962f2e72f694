//! Pay statement output types.
//!
//! A [`PayStatement`] is derived on demand and never persisted. All monetary
//! amounts are unrounded decimals; presentation rounding is left to whoever
//! renders the payslip.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parsing::DefaultedInput;

use super::period::YearMonth;

/// Hours per attendance category for one employee-month.
///
/// Night and holiday hours are also counted as presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourTotals {
    /// Hours worked (`p`, `n` and `m` days).
    pub presence: u32,
    /// Night hours (`n` days).
    pub night: u32,
    /// Public holiday hours (`m` days).
    pub holiday: u32,
    /// Paid leave hours (`c` days).
    pub leave: u32,
    /// Training hours (`f` days).
    pub training: u32,
    /// Absence hours (`a` days).
    pub absence: u32,
}

impl HourTotals {
    /// Whole days of absence.
    pub fn absence_days(&self) -> u32 {
        self.absence / 8
    }

    /// Presence expressed in days, rounded half to even.
    pub fn presence_days(&self) -> Decimal {
        (Decimal::from(self.presence) / Decimal::from(8)).round()
    }
}

/// One progressive tax tranche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrancheLine {
    /// Lower bound of the tranche.
    pub lower: Decimal,
    /// Upper bound; `None` for the open top tranche.
    pub upper: Option<Decimal>,
    /// Rate applied to the amount inside the tranche.
    pub rate: Decimal,
    /// Part of the taxable base falling inside the tranche.
    pub base: Decimal,
    /// Tax due on that part.
    pub tax: Decimal,
}

/// Result of the progressive income tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// `max(0, gross)`.
    pub taxable_base: Decimal,
    /// Per-tranche detail, lowest first.
    pub tranches: Vec<TrancheLine>,
    /// Sum of tranche taxes before the minimum is applied.
    pub computed_total: Decimal,
    /// Whether the minimum tax replaced a zero total.
    pub minimum_applied: bool,
    /// Tax after the minimum.
    pub total: Decimal,
}

/// Earnings lines of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earnings {
    /// Presence hours at the hourly rate.
    pub worked_pay: Decimal,
    /// Night hour premium.
    pub night_premium: Decimal,
    /// Public holiday premium.
    pub holiday_premium: Decimal,
    /// Paid leave at the hourly rate.
    pub leave_indemnity: Decimal,
    /// Training hours at the flat training rate.
    pub training_indemnity: Decimal,
    /// Meal allowance.
    pub meal_allowance: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Production bonus.
    pub production_bonus: Decimal,
    /// Attendance bonus.
    pub attendance_bonus: Decimal,
    /// Seniority bonus.
    pub seniority_bonus: Decimal,
    /// Elite bonus.
    pub elite_bonus: Decimal,
    /// Responsibility bonus.
    pub responsibility_bonus: Decimal,
}

impl Earnings {
    /// Sum of every line: the gross salary.
    pub fn total(&self) -> Decimal {
        self.worked_pay
            + self.night_premium
            + self.holiday_premium
            + self.leave_indemnity
            + self.training_indemnity
            + self.meal_allowance
            + self.transport_allowance
            + self.production_bonus
            + self.attendance_bonus
            + self.seniority_bonus
            + self.elite_bonus
            + self.responsibility_bonus
    }
}

/// Deduction lines of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Advance already paid.
    pub salary_advance: Decimal,
    /// OSTIE health contribution.
    pub ostie: Decimal,
    /// CNaPS pension contribution.
    pub cnaps: Decimal,
    /// Social deduction.
    pub social_deduction: Decimal,
    /// Income tax payable.
    pub income_tax: Decimal,
}

impl Deductions {
    /// Sum of every deduction.
    pub fn total(&self) -> Decimal {
        self.salary_advance + self.ostie + self.cnaps + self.social_deduction + self.income_tax
    }
}

/// A fully itemized pay statement for one employee-month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayStatement {
    /// The employee's matricule.
    pub matricule: String,
    /// The pay month.
    pub period: YearMonth,
    /// Family name, for the payslip header.
    pub last_name: String,
    /// Given name(s), for the payslip header.
    pub first_name: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Working days the operator entered for the month.
    pub theoretical_working_days: u32,
    /// Working days after removing absences.
    pub corrected_working_days: u32,
    /// Base salary per corrected working hour.
    pub hourly_rate: Decimal,
    /// Leave balance at the time of calculation.
    pub available_leave: Decimal,
    /// Whether the employee has passed the tenure threshold.
    pub tenure_gate: bool,
    /// Completed years of service.
    pub seniority_years: i32,
    /// Hours per attendance category.
    pub hours: HourTotals,
    /// Earnings lines.
    pub earnings: Earnings,
    /// Gross salary.
    pub gross: Decimal,
    /// Deduction lines.
    pub deductions: Deductions,
    /// Progressive tax detail.
    pub tax: TaxBreakdown,
    /// Net pay: gross minus every deduction.
    pub net: Decimal,
    /// Inputs that were missing or unreadable and replaced by defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted_inputs: Vec<DefaultedInput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_presence_days_round_half_to_even() {
        let hours = |presence| HourTotals {
            presence,
            ..HourTotals::default()
        };
        assert_eq!(hours(176).presence_days(), dec("22"));
        assert_eq!(hours(20).presence_days(), dec("2"));
        assert_eq!(hours(28).presence_days(), dec("4"));
    }

    #[test]
    fn test_absence_days() {
        let hours = HourTotals {
            absence: 24,
            ..HourTotals::default()
        };
        assert_eq!(hours.absence_days(), 3);
    }

    #[test]
    fn test_earnings_total_sums_all_lines() {
        let earnings = Earnings {
            worked_pay: dec("100"),
            night_premium: dec("1"),
            holiday_premium: dec("2"),
            leave_indemnity: dec("3"),
            training_indemnity: dec("4"),
            meal_allowance: dec("5"),
            transport_allowance: dec("6"),
            production_bonus: dec("7"),
            attendance_bonus: dec("8"),
            seniority_bonus: dec("9"),
            elite_bonus: dec("10"),
            responsibility_bonus: dec("11"),
        };
        assert_eq!(earnings.total(), dec("166"));
    }

    #[test]
    fn test_deductions_total() {
        let deductions = Deductions {
            salary_advance: dec("50000"),
            ostie: dec("10000"),
            cnaps: dec("10000"),
            social_deduction: dec("15000"),
            income_tax: dec("80000"),
        };
        assert_eq!(deductions.total(), dec("165000"));
    }
}
