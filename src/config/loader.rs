//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll rules
//! from YAML files, and [`ServerSettings`] for the HTTP server's environment.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{PayrollRules, RuleConstants, TaxSchedule};

/// Loads and validates payroll rules.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── rules.yaml         # Rates, allowances, thresholds
/// └── tax_brackets.yaml  # Progressive income tax brackets
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll")?;
/// println!("Minimum tax: {}", loader.rules().tax.minimum_tax);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: PayrollRules,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, is not valid YAML, or
    /// describes an inconsistent tax schedule.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let constants = Self::load_yaml::<RuleConstants>(&path.join("rules.yaml"))?;
        let tax = Self::load_yaml::<TaxSchedule>(&path.join("tax_brackets.yaml"))?;
        validate_tax_schedule(&tax)?;

        info!(
            path = %path.display(),
            brackets = tax.brackets.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            rules: PayrollRules { constants, tax },
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rules.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// Consumes the loader, returning the rules.
    pub fn into_rules(self) -> PayrollRules {
        self.rules
    }
}

/// Checks that brackets start at zero, are contiguous, end open and carry
/// rates between 0 and 1.
pub fn validate_tax_schedule(schedule: &TaxSchedule) -> EngineResult<()> {
    let invalid = |message: String| Err(EngineError::InvalidConfig { message });

    let Some(first) = schedule.brackets.first() else {
        return invalid("tax schedule has no brackets".to_string());
    };
    if first.lower != Decimal::ZERO {
        return invalid(format!("first bracket starts at {}, expected 0", first.lower));
    }
    if schedule.minimum_tax < Decimal::ZERO {
        return invalid(format!("minimum tax {} is negative", schedule.minimum_tax));
    }

    let last_index = schedule.brackets.len() - 1;
    for (index, bracket) in schedule.brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return invalid(format!("bracket {index} rate {} is outside [0, 1]", bracket.rate));
        }
        match (bracket.upper, schedule.brackets.get(index + 1)) {
            (Some(upper), _) if upper <= bracket.lower => {
                return invalid(format!("bracket {index} is empty or inverted"));
            }
            (Some(upper), Some(next)) if next.lower != upper => {
                return invalid(format!(
                    "bracket {} starts at {}, expected {upper}",
                    index + 1,
                    next.lower
                ));
            }
            (Some(_), None) => {
                return invalid("last bracket must have no upper bound".to_string());
            }
            (None, _) if index != last_index => {
                return invalid(format!("bracket {index} is open but not last"));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Runtime settings for the HTTP server, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Port to bind (`PORT`, default 5002).
    pub port: u16,
    /// Directory holding the JSON collections (`DATA_DIR`, default `data`).
    pub data_dir: String,
    /// Directory holding the rule files (`PAYROLL_CONFIG_DIR`, default `config/payroll`).
    pub config_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            data_dir: "data".to_string(),
            config_dir: "config/payroll".to_string(),
        }
    }
}

impl ServerSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| EngineError::InvalidConfig {
                message: format!("PORT must be a port number, got '{raw}'"),
            })?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            data_dir: lookup("DATA_DIR").unwrap_or(defaults.data_dir),
            config_dir: lookup("PAYROLL_CONFIG_DIR").unwrap_or(defaults.config_dir),
        })
    }

    /// The `host:port` address to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
