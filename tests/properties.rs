//! Property tests for the calculation rules.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{
    PayrollInput, aggregate_attendance, apply_monthly_accrual, calculate_pay_statement,
    calculate_tax_brackets,
};
use payroll_engine::config::{PayrollRules, TaxSchedule};
use payroll_engine::models::{
    AttendanceCode, AttendanceKey, AttendanceLog, Employee, HourTotals, LeaveAccount,
    ManualAdjustment, YearMonth,
};
use payroll_engine::parsing::parse_amount;

fn code() -> impl Strategy<Value = AttendanceCode> {
    prop::sample::select(AttendanceCode::ALL.to_vec())
}

/// Hours of every recorded day. Night and holiday hours are already in presence.
fn recorded_hours(hours: &HourTotals) -> u32 {
    hours.presence + hours.leave + hours.training + hours.absence
}

proptest! {
    #[test]
    fn bracket_tax_never_decreases(a in 0u64..5_000_000, b in 0u64..5_000_000) {
        let schedule = TaxSchedule::standard();
        let (low, high) = (a.min(b), a.max(b));
        let low_tax = calculate_tax_brackets(Decimal::from(low), &schedule);
        let high_tax = calculate_tax_brackets(Decimal::from(high), &schedule);
        prop_assert!(low_tax.computed_total <= high_tax.computed_total);
    }

    #[test]
    fn tax_is_minimum_or_bracket_sum(gross in -1_000_000i64..5_000_000) {
        let schedule = TaxSchedule::standard();
        let tax = calculate_tax_brackets(Decimal::from(gross), &schedule);
        let sum: Decimal = tax.tranches.iter().map(|tranche| tranche.tax).sum();
        prop_assert_eq!(sum, tax.computed_total);
        if tax.minimum_applied {
            prop_assert_eq!(tax.total, schedule.minimum_tax);
        } else {
            prop_assert_eq!(tax.total, tax.computed_total);
        }
        prop_assert!(tax.computed_total <= tax.taxable_base * Decimal::new(2, 1));
    }

    #[test]
    fn net_is_gross_minus_deductions(
        salary in 0u64..3_000_000,
        presence_days in 0u32..31,
        night in 0u32..80,
        absence_days in 0u32..10,
        working_days in 0u32..=31,
        bonus in 0u64..200_000,
        advance in 0u64..200_000,
        hired_days_ago in 0i64..4_000,
    ) {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let employee = Employee::new(
            "M1",
            Decimal::from(salary),
            Some(today - chrono::Duration::days(hired_days_ago)),
        );
        let adjustment = ManualAdjustment {
            production_bonus: Decimal::from(bonus),
            salary_advance: Decimal::from(advance),
            ..ManualAdjustment::default()
        };
        let input = PayrollInput {
            employee: &employee,
            period: YearMonth::of(today),
            hours: HourTotals {
                presence: presence_days * 8,
                night,
                absence: absence_days * 8,
                ..HourTotals::default()
            },
            adjustment: Some(&adjustment),
            working_days,
            today,
        };

        let statement = calculate_pay_statement(&input, &PayrollRules::standard());
        prop_assert_eq!(statement.gross, statement.earnings.total());
        prop_assert_eq!(statement.net, statement.gross - statement.deductions.total());
        prop_assert_eq!(statement.deductions.ostie, statement.deductions.cnaps);
        prop_assert!(statement.corrected_working_days <= working_days);
        prop_assert!(statement.hourly_rate >= Decimal::ZERO);
    }

    #[test]
    fn aggregation_counts_only_the_requested_employee_month(
        days in prop::collection::btree_map(1u32..=31, code(), 0..31),
        noise in prop::collection::vec((1u32..=28, code()), 0..20),
    ) {
        let march = YearMonth::new(2026, 3).unwrap();
        let april = YearMonth::new(2026, 4).unwrap();
        let mut log = AttendanceLog::new();
        for (day, code) in &days {
            log.set(AttendanceKey::new("M1", march, *day).unwrap(), *code);
        }
        for (day, code) in &noise {
            log.set(AttendanceKey::new("M2", march, *day).unwrap(), *code);
            log.set(AttendanceKey::new("M1", april, *day).unwrap(), *code);
        }

        let hours = aggregate_attendance("M1", march, &log);
        prop_assert_eq!(recorded_hours(&hours), days.len() as u32 * 8);
        prop_assert!(hours.night + hours.holiday <= hours.presence);
        let leave_days = days.values().filter(|code| **code == AttendanceCode::Leave).count();
        prop_assert_eq!(hours.leave, leave_days as u32 * 8);
    }

    #[test]
    fn accrual_is_idempotent_within_a_month(
        initial in 0u32..60,
        consumed in 0u32..80,
        months_behind in 0u32..36,
        day in 1u32..=28,
    ) {
        let today = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        let mut account = LeaveAccount::opening(Decimal::from(initial));
        let stamp = YearMonth::of(today).first_day() - chrono::Months::new(months_behind);
        account.last_accrual = Some(YearMonth::of(stamp));

        let rate = Decimal::new(25, 1);
        let first = apply_monthly_accrual(&mut account, consumed, today, rate);
        let balance = account.balance;
        let second = apply_monthly_accrual(&mut account, consumed, today, rate);

        prop_assert_eq!(first.is_some(), months_behind > 0);
        prop_assert!(second.is_none());
        prop_assert_eq!(account.balance, balance);
        prop_assert!(account.balance >= Decimal::ZERO);
        prop_assert_eq!(
            account.balance,
            (Decimal::from(initial) + rate * Decimal::from(months_behind) - Decimal::from(consumed))
                .max(Decimal::ZERO)
        );
    }

    #[test]
    fn amount_parsing_defaults_to_zero(raw in "[0-9 ,.a-dx-]{0,20}") {
        let parsed = parse_amount(&raw);
        if parsed.is_defaulted() {
            prop_assert_eq!(parsed.into_value(), Decimal::ZERO);
        }
    }

    #[test]
    fn grouped_integers_parse_exactly(value in 0u64..10_000_000_000) {
        let digits = value.to_string();
        let grouped: Vec<String> = digits
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| String::from_utf8(chunk.to_vec()).unwrap())
            .collect();
        let parsed = parse_amount(&grouped.join(" "));
        prop_assert!(!parsed.is_defaulted());
        prop_assert_eq!(parsed.into_value(), Decimal::from(value));
    }
}
