//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for the conditions that are reported to callers. Malformed field values
//! are not errors: they are defaulted at the parsing boundary (see
//! [`crate::parsing`]).

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::EmployeeNotFound {
///     matricule: "EMP042".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: EMP042");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but its values are inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// No employee carries the requested matricule.
    #[error("Employee not found: {matricule}")]
    EmployeeNotFound {
        /// The matricule that was looked up.
        matricule: String,
    },

    /// An employee with this matricule already exists.
    #[error("Matricule already in use: {matricule}")]
    DuplicateEmployee {
        /// The conflicting matricule.
        matricule: String,
    },

    /// An employee record was rejected.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The requested year/month does not name a calendar month.
    #[error("Invalid period: year {year}, month {month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// Reading or writing a persisted collection failed.
    #[error("Storage error on '{path}': {message}")]
    StorageError {
        /// The file or collection involved.
        path: String,
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
