//! Configuration loading for the payroll engine.
//!
//! Payroll rule constants and the income tax schedule are loaded from YAML
//! files; server settings come from the environment.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Tax brackets: {}", config.rules().tax.brackets.len());
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, ServerSettings, validate_tax_schedule};
pub use types::{PayrollRules, RuleConstants, TaxBracket, TaxSchedule};
