//! Leave accrual calculation.
//!
//! Leave is credited monthly and consumed by `c` days in the attendance log.
//! The two primitives, [`accrue_monthly`] and [`recompute_after_leave`], are
//! pure. [`apply_monthly_accrual`] and [`sync_leave_balance`] compose them
//! through the employee's [`LeaveAccount`] ledger, so the stored balance is
//! always `max(0, opening + accrued - consumed)` whatever order they run in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AccrualEntry, LeaveAccount, YearMonth};

/// Result of a monthly accrual on a bare balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualOutcome {
    /// Balance after accrual, rounded to 2 decimal places.
    pub balance: Decimal,
    /// Months elapsed since the previous stamp; may be zero or negative.
    pub months_elapsed: i64,
    /// The new stamp: always the month of `today`.
    pub stamp: YearMonth,
}

/// Months to credit since `last_stamp`, treating a missing stamp as this month.
fn months_elapsed(last_stamp: Option<YearMonth>, today: NaiveDate) -> i64 {
    let current = YearMonth::of(today);
    current.months_since(last_stamp.unwrap_or(current))
}

/// Credits `days_per_month` for every month elapsed since `last_stamp`.
///
/// A missing stamp counts as the current month, so nothing is credited the
/// first time. The stamp always moves to the current month, which makes a
/// second call in the same month a no-op.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::accrue_monthly;
/// use payroll_engine::models::YearMonth;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
/// let outcome = accrue_monthly(
///     Decimal::new(10, 0),
///     YearMonth::new(2026, 2).ok(),
///     today,
///     Decimal::new(25, 1),
/// );
/// assert_eq!(outcome.months_elapsed, 3);
/// assert_eq!(outcome.balance, Decimal::new(175, 1));
/// assert_eq!(outcome.stamp, YearMonth::new(2026, 5).unwrap());
/// ```
pub fn accrue_monthly(
    balance: Decimal,
    last_stamp: Option<YearMonth>,
    today: NaiveDate,
    days_per_month: Decimal,
) -> AccrualOutcome {
    let elapsed = months_elapsed(last_stamp, today);
    let balance = if elapsed > 0 {
        balance + days_per_month * Decimal::from(elapsed)
    } else {
        balance
    };
    AccrualOutcome {
        balance: balance.round_dp(2),
        months_elapsed: elapsed,
        stamp: YearMonth::of(today),
    }
}

/// Balance left after `consumed` leave days: `max(0, initial - consumed)`.
///
/// `consumed` is the lifetime count of `c` days, not one month's.
pub fn recompute_after_leave(initial_balance: Decimal, consumed: u32) -> Decimal {
    (initial_balance - Decimal::from(consumed)).max(Decimal::ZERO)
}

/// Runs the monthly accrual on an account's ledger.
///
/// Appends an [`AccrualEntry`] when at least one month elapsed, moves the
/// stamp to the current month and re-derives the balance with `consumed`
/// leave days. Returns the appended entry, if any.
pub fn apply_monthly_accrual(
    account: &mut LeaveAccount,
    consumed: u32,
    today: NaiveDate,
    days_per_month: Decimal,
) -> Option<AccrualEntry> {
    let outcome = accrue_monthly(Decimal::ZERO, account.last_accrual, today, days_per_month);

    let entry = (outcome.months_elapsed > 0).then(|| AccrualEntry {
        period: outcome.stamp,
        months: u32::try_from(outcome.months_elapsed).unwrap_or(u32::MAX),
        days: outcome.balance,
    });

    if let Some(entry) = &entry {
        debug!(
            period = %entry.period,
            months = entry.months,
            days = %entry.days,
            "Leave accrual credited"
        );
        account.accruals.push(entry.clone());
    }

    account.last_accrual = Some(outcome.stamp);
    sync_leave_balance(account, consumed);
    entry
}

/// Re-derives the stored balance from the ledger and `consumed` leave days.
pub fn sync_leave_balance(account: &mut LeaveAccount, consumed: u32) {
    account.balance = account.derived_balance(consumed);
}
