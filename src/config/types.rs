//! Configuration types for payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive income tax bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Lower bound (inclusive of the amount above it).
    pub lower: Decimal,
    /// Upper bound; `None` for the open top bracket.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Marginal rate, as a fraction.
    pub rate: Decimal,
}

/// The full income tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    /// Brackets in ascending order.
    pub brackets: Vec<TaxBracket>,
    /// Tax charged when the brackets yield exactly zero.
    pub minimum_tax: Decimal,
}

impl TaxSchedule {
    /// The shipped schedule: 0% to 350,000, then 5%, 10%, 15% in 50k/100k
    /// steps up to 600,000, and 20% above, with a 2000 minimum.
    pub fn standard() -> Self {
        let bracket = |lower: i64, upper: Option<i64>, rate_percent: i64| TaxBracket {
            lower: Decimal::from(lower),
            upper: upper.map(Decimal::from),
            rate: Decimal::new(rate_percent, 2),
        };
        Self {
            brackets: vec![
                bracket(0, Some(350_000), 0),
                bracket(350_000, Some(400_000), 5),
                bracket(400_000, Some(500_000), 10),
                bracket(500_000, Some(600_000), 15),
                bracket(600_000, None, 20),
            ],
            minimum_tax: Decimal::from(2000),
        }
    }
}

/// Rule constants from `rules.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConstants {
    /// Working days assumed when the operator supplies none.
    pub default_working_days: u32,
    /// Night premium as a fraction of the hourly rate.
    pub night_premium_rate: Decimal,
    /// Holiday premium as a fraction of the hourly rate.
    pub holiday_premium_rate: Decimal,
    /// Flat pay per training hour.
    pub training_rate_per_hour: Decimal,
    /// Meal allowance per day present.
    pub meal_allowance_per_day: Decimal,
    /// Transport allowance per day present.
    pub transport_allowance_per_day: Decimal,
    /// OSTIE and CNaPS employee contribution rate, each.
    pub social_contribution_rate: Decimal,
    /// Social deduction withheld when none was entered.
    pub default_social_deduction: Decimal,
    /// Days of service after which the tenure gate opens.
    pub tenure_threshold_days: i64,
    /// Leave days credited per elapsed month.
    pub leave_days_per_month: Decimal,
}

/// Everything the calculator needs besides its inputs.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollRules;
/// use rust_decimal::Decimal;
///
/// let rules = PayrollRules::standard();
/// assert_eq!(rules.constants.default_working_days, 22);
/// assert_eq!(rules.tax.minimum_tax, Decimal::new(2000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRules {
    /// Rule constants.
    pub constants: RuleConstants,
    /// Income tax schedule.
    pub tax: TaxSchedule,
}

impl PayrollRules {
    /// The rules the payroll was designed around.
    pub fn standard() -> Self {
        Self {
            constants: RuleConstants {
                default_working_days: 22,
                night_premium_rate: Decimal::new(30, 2),
                holiday_premium_rate: Decimal::ONE,
                training_rate_per_hour: Decimal::from(10_000),
                meal_allowance_per_day: Decimal::from(2_500),
                transport_allowance_per_day: Decimal::from(1_200),
                social_contribution_rate: Decimal::new(1, 2),
                default_social_deduction: Decimal::from(15_000),
                tenure_threshold_days: 365,
                leave_days_per_month: Decimal::new(25, 1),
            },
            tax: TaxSchedule::standard(),
        }
    }
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self::standard()
    }
}
