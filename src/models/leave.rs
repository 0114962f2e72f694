//! Leave ledger model.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::parsing::parse_year_month;

use super::period::YearMonth;

/// One monthly accrual credited to a leave account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualEntry {
    /// The month the accrual ran in.
    pub period: YearMonth,
    /// How many months it covered.
    pub months: u32,
    /// Days credited.
    pub days: Decimal,
}

/// An employee's leave ledger.
///
/// The balance is derived: opening balance plus every accrual, minus the
/// leave days taken according to the attendance log, floored at zero. It is
/// stored so reads need not consult the attendance log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveAccount {
    /// Balance the employee was hired with.
    #[serde(default)]
    pub initial_balance: Decimal,
    /// Current derived balance.
    #[serde(default)]
    pub balance: Decimal,
    /// Month of the last accrual run. Unparseable stamps load as `None`.
    #[serde(default, deserialize_with = "lenient_stamp")]
    pub last_accrual: Option<YearMonth>,
    /// Every accrual credited so far, oldest first.
    #[serde(default)]
    pub accruals: Vec<AccrualEntry>,
}

fn lenient_stamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<YearMonth>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| parse_year_month(&raw).into_value()))
}

impl LeaveAccount {
    /// Opens an account with `initial` days and no history.
    pub fn opening(initial: Decimal) -> Self {
        Self {
            initial_balance: initial,
            balance: initial.max(Decimal::ZERO),
            last_accrual: None,
            accruals: Vec::new(),
        }
    }

    /// Sum of every accrual credited.
    pub fn accrued_total(&self) -> Decimal {
        self.accruals.iter().map(|entry| entry.days).sum()
    }

    /// The balance implied by the ledger after `consumed` leave days.
    ///
    /// ```
    /// use payroll_engine::models::LeaveAccount;
    /// use rust_decimal::Decimal;
    ///
    /// let account = LeaveAccount::opening(Decimal::new(3, 0));
    /// assert_eq!(account.derived_balance(1), Decimal::new(2, 0));
    /// assert_eq!(account.derived_balance(10), Decimal::ZERO);
    /// ```
    pub fn derived_balance(&self, consumed: u32) -> Decimal {
        (self.initial_balance + self.accrued_total() - Decimal::from(consumed))
            .max(Decimal::ZERO)
            .round_dp(2)
    }
}
