//! Manual monthly adjustments: bonuses, salary advance and social deduction.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parsing::{DefaultedInput, amount_from_json};

use super::period::YearMonth;

/// Identifies one employee-month of manual adjustments.
///
/// External form: `"{matricule}_{year}_{month}"`, split from the right.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdjustmentKey {
    /// The employee's matricule.
    pub matricule: String,
    /// The pay month.
    pub period: YearMonth,
}

impl AdjustmentKey {
    /// Creates a key.
    pub fn new(matricule: impl Into<String>, period: YearMonth) -> Self {
        Self {
            matricule: matricule.into(),
            period,
        }
    }

    /// Parses the external key form.
    ///
    /// ```
    /// use payroll_engine::models::AdjustmentKey;
    ///
    /// let key = AdjustmentKey::parse("A_7_2026_11").unwrap();
    /// assert_eq!(key.matricule, "A_7");
    /// assert_eq!(key.period.year(), 2026);
    /// assert!(AdjustmentKey::parse("A_7_2026").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.rsplitn(3, '_');
        let month: u32 = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.parse().ok()?;
        let matricule = parts.next()?;
        if matricule.is_empty() {
            return None;
        }
        Some(Self::new(matricule, YearMonth::new(year, month).ok()?))
    }
}

impl fmt::Display for AdjustmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.matricule,
            self.period.year(),
            self.period.month()
        )
    }
}

/// Operator-entered amounts for one employee-month.
///
/// `social_deduction` is `None` when nothing was entered; the calculator then
/// withholds the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAdjustment {
    /// Production bonus.
    #[serde(default)]
    pub production_bonus: Decimal,
    /// Attendance (assiduité) bonus.
    #[serde(default)]
    pub attendance_bonus: Decimal,
    /// Seniority (ancienneté) bonus.
    #[serde(default)]
    pub seniority_bonus: Decimal,
    /// Elite bonus.
    #[serde(default)]
    pub elite_bonus: Decimal,
    /// Responsibility bonus.
    #[serde(default)]
    pub responsibility_bonus: Decimal,
    /// Social deduction, if entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_deduction: Option<Decimal>,
    /// Salary advance already paid out.
    #[serde(default)]
    pub salary_advance: Decimal,
}

const PRODUCTION: &[&str] = &["production_bonus", "Prime de production", "Prime production"];
const ATTENDANCE: &[&str] = &[
    "attendance_bonus",
    "Prime d’assiduité",
    "Prime d'assiduité",
    "Prime assiduité",
];
const SENIORITY: &[&str] = &[
    "seniority_bonus",
    "Prime d’ancienneté",
    "Prime d'ancienneté",
    "prime d'ancienneté",
];
const ELITE: &[&str] = &["elite_bonus", "Prime élite", "Prime Elité"];
const RESPONSIBILITY: &[&str] = &["responsibility_bonus", "Prime de responsabilité"];
const SOCIAL: &[&str] = &["social_deduction", "Social"];
const ADVANCE: &[&str] = &["salary_advance", "Avance sur salaire"];

fn lookup<'a>(raw: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| raw.get(*name))
}

impl ManualAdjustment {
    /// Sum of the five bonuses.
    pub fn bonuses_total(&self) -> Decimal {
        self.production_bonus
            + self.attendance_bonus
            + self.seniority_bonus
            + self.elite_bonus
            + self.responsibility_bonus
    }

    /// The social deduction to withhold, `default` if none was entered.
    pub fn social_deduction_or(&self, default: Decimal) -> Decimal {
        self.social_deduction.unwrap_or(default)
    }

    /// Builds an adjustment from free-form operator input.
    ///
    /// Fields may be named in English (`production_bonus`) or by their payslip
    /// label (`Prime de production`). Values may be numbers or text such as
    /// `"12 500"`. Unparseable values become zero and are reported; an absent
    /// social deduction stays `None` and is not reported.
    ///
    /// ```
    /// use payroll_engine::models::ManualAdjustment;
    /// use rust_decimal::Decimal;
    /// use serde_json::json;
    ///
    /// let raw = json!({"Prime de production": "12 500", "Social": "abc"});
    /// let (adjustment, defaulted) = ManualAdjustment::from_raw(raw.as_object().unwrap());
    /// assert_eq!(adjustment.production_bonus, Decimal::new(12500, 0));
    /// assert_eq!(adjustment.social_deduction, Some(Decimal::ZERO));
    /// assert_eq!(defaulted.len(), 1);
    /// ```
    pub fn from_raw(raw: &Map<String, Value>) -> (Self, Vec<DefaultedInput>) {
        let mut defaulted = Vec::new();
        let mut amount = |names: &[&str]| -> Option<Decimal> {
            let value = lookup(raw, names)?;
            let (amount, note) = amount_from_json(Some(value), Decimal::ZERO).record(names[0]);
            defaulted.extend(note);
            Some(amount)
        };

        let adjustment = Self {
            production_bonus: amount(PRODUCTION).unwrap_or_default(),
            attendance_bonus: amount(ATTENDANCE).unwrap_or_default(),
            seniority_bonus: amount(SENIORITY).unwrap_or_default(),
            elite_bonus: amount(ELITE).unwrap_or_default(),
            responsibility_bonus: amount(RESPONSIBILITY).unwrap_or_default(),
            social_deduction: lookup(raw, SOCIAL)
                .filter(|value| !value.is_null())
                .and_then(|_| amount(SOCIAL)),
            salary_advance: amount(ADVANCE).unwrap_or_default(),
        };
        (adjustment, defaulted)
    }
}

/// Every manual adjustment, keyed by employee-month.
///
/// Persisted as a JSON object of external keys to adjustments; entries whose
/// key does not parse are dropped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ManualAdjustment>",
    into = "BTreeMap<String, ManualAdjustment>"
)]
pub struct AdjustmentBook {
    entries: BTreeMap<AdjustmentKey, ManualAdjustment>,
}

impl AdjustmentBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the adjustment for an employee-month.
    pub fn get(&self, key: &AdjustmentKey) -> Option<&ManualAdjustment> {
        self.entries.get(key)
    }

    /// Replaces the adjustment for an employee-month.
    pub fn set(&mut self, key: AdjustmentKey, adjustment: ManualAdjustment) {
        self.entries.insert(key, adjustment);
    }

    /// Every adjustment recorded for `period`.
    pub fn month(
        &self,
        period: YearMonth,
    ) -> impl Iterator<Item = (&AdjustmentKey, &ManualAdjustment)> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.period == period)
    }

    /// Number of employee-months with adjustments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no adjustment is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, ManualAdjustment>> for AdjustmentBook {
    fn from(raw: BTreeMap<String, ManualAdjustment>) -> Self {
        let entries = raw
            .into_iter()
            .filter_map(|(key, adjustment)| Some((AdjustmentKey::parse(&key)?, adjustment)))
            .collect();
        Self { entries }
    }
}

impl From<AdjustmentBook> for BTreeMap<String, ManualAdjustment> {
    fn from(book: AdjustmentBook) -> Self {
        book.entries
            .into_iter()
            .map(|(key, adjustment)| (key.to_string(), adjustment))
            .collect()
    }
}
