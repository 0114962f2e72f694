//! Progressive income tax calculation.
//!
//! This module applies a [`TaxSchedule`] to a gross salary, producing the
//! per-tranche detail shown on payslips.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TaxSchedule;
use crate::models::{TaxBreakdown, TrancheLine};

/// Computes the income tax due on `gross`.
///
/// The taxable base is `max(0, gross)`. Each bracket taxes the part of the
/// base between its bounds at its rate. When the sum is exactly zero the
/// schedule's minimum tax is charged instead.
///
/// # Arguments
///
/// * `gross` - The gross salary for the month
/// * `schedule` - The bracket table and minimum tax
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_tax_brackets;
/// use payroll_engine::config::TaxSchedule;
/// use rust_decimal::Decimal;
///
/// let schedule = TaxSchedule::standard();
///
/// // 50,000 at 5% + 100,000 at 10% + 100,000 at 15% + 400,000 at 20%
/// let tax = calculate_tax_brackets(Decimal::new(1_000_000, 0), &schedule);
/// assert_eq!(tax.total, Decimal::new(107_500, 0));
/// assert!(!tax.minimum_applied);
///
/// // Nothing taxable: the minimum applies
/// let tax = calculate_tax_brackets(Decimal::ZERO, &schedule);
/// assert_eq!(tax.total, Decimal::new(2_000, 0));
/// assert!(tax.minimum_applied);
/// ```
pub fn calculate_tax_brackets(gross: Decimal, schedule: &TaxSchedule) -> TaxBreakdown {
    let taxable_base = gross.max(Decimal::ZERO);

    let tranches: Vec<TrancheLine> = schedule
        .brackets
        .iter()
        .map(|bracket| {
            let capped = match bracket.upper {
                Some(upper) => taxable_base.min(upper),
                None => taxable_base,
            };
            let base = (capped - bracket.lower).max(Decimal::ZERO);
            TrancheLine {
                lower: bracket.lower,
                upper: bracket.upper,
                rate: bracket.rate,
                base,
                tax: base * bracket.rate,
            }
        })
        .collect();

    let computed_total: Decimal = tranches.iter().map(|tranche| tranche.tax).sum();
    let minimum_applied = computed_total.is_zero();
    let total = if minimum_applied {
        schedule.minimum_tax
    } else {
        computed_total
    };

    if minimum_applied {
        debug!(
            gross = %gross,
            minimum_tax = %schedule.minimum_tax,
            "Bracket tax is zero, minimum tax applied"
        );
    }

    TaxBreakdown {
        taxable_base,
        tranches,
        computed_total,
        minimum_applied,
        total,
    }
}
