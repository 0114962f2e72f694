//! Monthly payroll engine.
//!
//! This crate turns employee master data, daily attendance codes and manual
//! monthly adjustments into pay statements: hour totals, earnings, social
//! contributions, progressive income tax and net pay. It also keeps each
//! employee's paid-leave ledger, crediting a fixed number of days per elapsed
//! month and deriving the balance from the leave days recorded in attendance.
//!
//! Data is persisted as JSON collections and served over an HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod parsing;
pub mod store;
