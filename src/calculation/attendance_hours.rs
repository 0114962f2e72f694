//! Attendance aggregation.
//!
//! Turns one employee's day codes for a month into hour totals per category.

use crate::models::{AttendanceCode, AttendanceKey, AttendanceLog, HourTotals, YearMonth};

/// Hours credited for one recorded day.
pub const HOURS_PER_DAY: u32 = 8;

impl HourTotals {
    /// Adds one day carrying `code`.
    ///
    /// Night and holiday days also count as presence.
    pub fn record(&mut self, code: AttendanceCode) {
        match code {
            AttendanceCode::Present => self.presence += HOURS_PER_DAY,
            AttendanceCode::Night => {
                self.presence += HOURS_PER_DAY;
                self.night += HOURS_PER_DAY;
            }
            AttendanceCode::Absent => self.absence += HOURS_PER_DAY,
            AttendanceCode::Leave => self.leave += HOURS_PER_DAY,
            AttendanceCode::Holiday => {
                self.presence += HOURS_PER_DAY;
                self.holiday += HOURS_PER_DAY;
            }
            AttendanceCode::Training => self.training += HOURS_PER_DAY,
        }
    }
}

/// Aggregates the attendance of `matricule` over every day of `period`.
///
/// Days with no record contribute nothing.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_attendance;
/// use payroll_engine::models::{AttendanceCode, AttendanceKey, AttendanceLog, YearMonth};
///
/// let period = YearMonth::new(2026, 3).unwrap();
/// let mut log = AttendanceLog::new();
/// log.set(AttendanceKey::new("M1", period, 2).unwrap(), AttendanceCode::Present);
/// log.set(AttendanceKey::new("M1", period, 3).unwrap(), AttendanceCode::Night);
///
/// let hours = aggregate_attendance("M1", period, &log);
/// assert_eq!(hours.presence, 16);
/// assert_eq!(hours.night, 8);
/// ```
pub fn aggregate_attendance(matricule: &str, period: YearMonth, log: &AttendanceLog) -> HourTotals {
    period
        .days()
        .filter_map(|day| AttendanceKey::new(matricule, period, day))
        .filter_map(|key| log.get(&key))
        .fold(HourTotals::default(), |mut totals, code| {
            totals.record(code);
            totals
        })
}
