//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::PayrollRules;
use crate::store::Repository;

/// Shared application state.
///
/// Holds the loaded payroll rules, the repository every handler reads and
/// writes through, and the clock that supplies "today".
#[derive(Clone)]
pub struct AppState {
    rules: Arc<PayrollRules>,
    repository: Arc<Repository>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new<C: Clock + 'static>(rules: PayrollRules, repository: Repository, clock: C) -> Self {
        Self {
            rules: Arc::new(rules),
            repository: Arc::new(repository),
            clock: Arc::new(clock),
        }
    }

    /// Returns the payroll rules.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// Returns the repository.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Returns today's date according to the state's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
