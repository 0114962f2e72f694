//! Attendance log models.
//!
//! Attendance is a sparse map from `(matricule, year, month, day)` to one
//! [`AttendanceCode`]. A missing key means nothing was recorded for that day;
//! it does not mean the employee was absent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::period::YearMonth;

/// The closed set of daily attendance codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceCode {
    /// `p`: worked a normal day.
    #[serde(rename = "p")]
    Present,
    /// `n`: worked a night shift.
    #[serde(rename = "n")]
    Night,
    /// `a`: absent.
    #[serde(rename = "a")]
    Absent,
    /// `c`: on paid leave (congé).
    #[serde(rename = "c")]
    Leave,
    /// `m`: worked on a public holiday.
    #[serde(rename = "m")]
    Holiday,
    /// `f`: in training (formation).
    #[serde(rename = "f")]
    Training,
}

impl AttendanceCode {
    /// Every code, in display order.
    pub const ALL: [AttendanceCode; 6] = [
        AttendanceCode::Present,
        AttendanceCode::Night,
        AttendanceCode::Absent,
        AttendanceCode::Leave,
        AttendanceCode::Holiday,
        AttendanceCode::Training,
    ];

    /// Parses a code, ignoring case and surrounding whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AttendanceCode;
    ///
    /// assert_eq!(AttendanceCode::parse(" P "), Some(AttendanceCode::Present));
    /// assert_eq!(AttendanceCode::parse("c"), Some(AttendanceCode::Leave));
    /// assert_eq!(AttendanceCode::parse("x"), None);
    /// assert_eq!(AttendanceCode::parse(""), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "p" => Some(AttendanceCode::Present),
            "n" => Some(AttendanceCode::Night),
            "a" => Some(AttendanceCode::Absent),
            "c" => Some(AttendanceCode::Leave),
            "m" => Some(AttendanceCode::Holiday),
            "f" => Some(AttendanceCode::Training),
            _ => None,
        }
    }

    /// The single-letter form used in stored logs.
    pub fn as_char(&self) -> char {
        match self {
            AttendanceCode::Present => 'p',
            AttendanceCode::Night => 'n',
            AttendanceCode::Absent => 'a',
            AttendanceCode::Leave => 'c',
            AttendanceCode::Holiday => 'm',
            AttendanceCode::Training => 'f',
        }
    }
}

impl fmt::Display for AttendanceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Identifies one employee-day in the attendance log.
///
/// The external form is `"{matricule}_{year}_{month}_{day}"` without zero
/// padding. Matricules may contain underscores, so the key is split from the
/// right.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendanceKey;
///
/// let key = AttendanceKey::parse("EMP_01_2026_3_9").unwrap();
/// assert_eq!(key.matricule, "EMP_01");
/// assert_eq!(key.period.month(), 3);
/// assert_eq!(key.day, 9);
/// assert_eq!(key.to_string(), "EMP_01_2026_3_9");
///
/// // 31 April does not exist
/// assert!(AttendanceKey::parse("EMP_01_2026_4_31").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttendanceKey {
    /// The employee's matricule.
    pub matricule: String,
    /// The month of the day.
    pub period: YearMonth,
    /// The day of the month.
    pub day: u32,
}

impl AttendanceKey {
    /// Creates a key; returns `None` when `day` is not in `period`.
    pub fn new(matricule: impl Into<String>, period: YearMonth, day: u32) -> Option<Self> {
        period.contains_day(day).then(|| Self {
            matricule: matricule.into(),
            period,
            day,
        })
    }

    /// Parses the external key form.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.rsplitn(4, '_');
        let day: u32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.parse().ok()?;
        let matricule = parts.next()?;
        if matricule.is_empty() {
            return None;
        }
        let period = YearMonth::new(year, month).ok()?;
        Self::new(matricule, period, day)
    }
}

impl fmt::Display for AttendanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.matricule,
            self.period.year(),
            self.period.month(),
            self.day
        )
    }
}

/// The attendance log for all employees.
///
/// Persisted as a flat JSON object of external keys to code letters. Entries
/// whose key or code cannot be parsed are dropped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct AttendanceLog {
    entries: BTreeMap<AttendanceKey, AttendanceCode>,
}

impl AttendanceLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the code recorded for a day.
    pub fn get(&self, key: &AttendanceKey) -> Option<AttendanceCode> {
        self.entries.get(key).copied()
    }

    /// Records a code for a day, returning the previous one.
    pub fn set(&mut self, key: AttendanceKey, code: AttendanceCode) -> Option<AttendanceCode> {
        self.entries.insert(key, code)
    }

    /// Removes the record for a day.
    pub fn remove(&mut self, key: &AttendanceKey) -> Option<AttendanceCode> {
        self.entries.remove(key)
    }

    /// Every record in `period`, across all employees.
    pub fn month_records(
        &self,
        period: YearMonth,
    ) -> impl Iterator<Item = (&AttendanceKey, AttendanceCode)> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.period == period)
            .map(|(key, code)| (key, *code))
    }

    /// Day number to code for one employee in one month.
    pub fn employee_month(
        &self,
        matricule: &str,
        period: YearMonth,
    ) -> BTreeMap<u32, AttendanceCode> {
        self.entries
            .iter()
            .filter(|(key, _)| key.matricule == matricule && key.period == period)
            .map(|(key, code)| (key.day, *code))
            .collect()
    }

    /// How many days carry `code` for `matricule` over the whole history.
    pub fn lifetime_count(&self, matricule: &str, code: AttendanceCode) -> u32 {
        self.entries
            .iter()
            .filter(|(key, recorded)| key.matricule == matricule && **recorded == code)
            .count() as u32
    }

    /// Number of recorded days.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates every record in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttendanceKey, AttendanceCode)> {
        self.entries.iter().map(|(key, code)| (key, *code))
    }
}

impl From<BTreeMap<String, String>> for AttendanceLog {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let entries = raw
            .iter()
            .filter_map(|(key, code)| {
                Some((AttendanceKey::parse(key)?, AttendanceCode::parse(code)?))
            })
            .collect();
        Self { entries }
    }
}

impl From<AttendanceLog> for BTreeMap<String, String> {
    fn from(log: AttendanceLog) -> Self {
        log.entries
            .into_iter()
            .map(|(key, code)| (key.to_string(), code.as_char().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    fn key(matricule: &str, period: YearMonth, day: u32) -> AttendanceKey {
        AttendanceKey::new(matricule, period, day).unwrap()
    }

    #[test]
    fn test_codes_round_trip_through_letters() {
        for code in AttendanceCode::ALL {
            assert_eq!(AttendanceCode::parse(&code.as_char().to_string()), Some(code));
        }
        assert_eq!(AttendanceCode::parse("N"), Some(AttendanceCode::Night));
        assert_eq!(AttendanceCode::parse("pp"), None);
    }

    #[test]
    fn test_key_without_zero_padding() {
        let key = key("M1", YearMonth::new(2026, 1).unwrap(), 5);
        assert_eq!(key.to_string(), "M1_2026_1_5");
    }

    #[test]
    fn test_key_parse_rejects_malformed() {
        assert!(AttendanceKey::parse("M1_2026_3").is_none());
        assert!(AttendanceKey::parse("_2026_3_1").is_none());
        assert!(AttendanceKey::parse("M1_2026_13_1").is_none());
        assert!(AttendanceKey::parse("M1_2026_2_29").is_none());
        assert!(AttendanceKey::parse("M1_2024_2_29").is_some());
        assert!(AttendanceKey::parse("M1_abc_3_1").is_none());
    }

    #[test]
    fn test_similar_matricules_do_not_collide() {
        let mut log = AttendanceLog::new();
        log.set(key("1", march(), 1), AttendanceCode::Leave);
        log.set(key("11", march(), 1), AttendanceCode::Leave);
        log.set(key("11", march(), 2), AttendanceCode::Leave);

        assert_eq!(log.lifetime_count("1", AttendanceCode::Leave), 1);
        assert_eq!(log.lifetime_count("11", AttendanceCode::Leave), 2);
        assert_eq!(log.employee_month("1", march()).len(), 1);
    }

    #[test]
    fn test_lifetime_count_spans_periods() {
        let mut log = AttendanceLog::new();
        log.set(key("M1", YearMonth::new(2025, 12).unwrap(), 24), AttendanceCode::Leave);
        log.set(key("M1", march(), 2), AttendanceCode::Leave);
        log.set(key("M1", march(), 3), AttendanceCode::Present);
        assert_eq!(log.lifetime_count("M1", AttendanceCode::Leave), 2);
    }

    #[test]
    fn test_month_records_filters_period() {
        let mut log = AttendanceLog::new();
        log.set(key("M1", march(), 2), AttendanceCode::Present);
        log.set(key("M2", march(), 2), AttendanceCode::Absent);
        log.set(key("M1", YearMonth::new(2026, 4).unwrap(), 2), AttendanceCode::Present);

        assert_eq!(log.month_records(march()).count(), 2);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_serde_drops_invalid_entries() {
        let json = r#"{
            "M1_2026_3_1": "p",
            "M1_2026_3_2": " C ",
            "M1_2026_3_3": "x",
            "garbage": "p",
            "M1_2026_2_30": "p"
        }"#;
        let log: AttendanceLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&key("M1", march(), 2)), Some(AttendanceCode::Leave));

        let back = serde_json::to_value(&log).unwrap();
        assert_eq!(back["M1_2026_3_2"], "c");
    }
}
