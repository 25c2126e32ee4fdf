//! Configuration validation.
//!
//! Validates all config fields before a comparison runs.

use crate::domain::comparison::{ComparisonConfig, Window};
use crate::domain::error::FolioduelError;
use crate::domain::portfolio::parse_weights;
use crate::domain::tax_drag::parse_rates;
use crate::ports::config_port::ConfigPort;

pub fn validate_comparison_config(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    validate_initial_capital(config)?;
    validate_window(config)?;
    validate_home_fx(config)?;
    validate_quote_dir(config)?;
    validate_portfolios(config)?;
    validate_tax_drag(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    let value = config.get_double("comparison", "initial_capital", 1_000_000.0);
    if value <= 0.0 {
        return Err(FolioduelError::ConfigInvalid {
            section: "comparison".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    let value = config
        .get_string("comparison", "window")
        .unwrap_or_else(|| "max".to_string());
    if Window::parse(&value).is_none() {
        return Err(FolioduelError::ConfigInvalid {
            section: "comparison".to_string(),
            key: "window".to_string(),
            reason: format!("unknown window {value}, expected ytd/6mo/1y/2y/5y/max"),
        });
    }
    Ok(())
}

fn validate_home_fx(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    match config.get_string("comparison", "home_fx") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(FolioduelError::ConfigMissing {
            section: "comparison".to_string(),
            key: "home_fx".to_string(),
        }),
    }
}

fn validate_quote_dir(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    match config.get_string("data", "quote_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(FolioduelError::ConfigMissing {
            section: "data".to_string(),
            key: "quote_dir".to_string(),
        }),
    }
}

fn validate_portfolios(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    let roster = config.get_list("comparison", "portfolios");
    if roster.is_empty() {
        return Err(FolioduelError::ConfigMissing {
            section: "comparison".to_string(),
            key: "portfolios".to_string(),
        });
    }

    for id in roster {
        let section = format!("portfolio.{id}");
        let weights = config.get_string(&section, "weights").ok_or_else(|| {
            FolioduelError::ConfigMissing {
                section: section.clone(),
                key: "weights".to_string(),
            }
        })?;
        parse_weights(&weights).map_err(|e| FolioduelError::ConfigInvalid {
            section: section.clone(),
            key: "weights".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn validate_tax_drag(config: &dyn ConfigPort) -> Result<(), FolioduelError> {
    let default_rate = config.get_double("tax_drag", "default_rate", 0.0);
    if default_rate < 0.0 {
        return Err(FolioduelError::ConfigInvalid {
            section: "tax_drag".to_string(),
            key: "default_rate".to_string(),
            reason: "default_rate must be non-negative".to_string(),
        });
    }

    if let Some(rates) = config.get_string("tax_drag", "rates") {
        parse_rates(&rates).map_err(|e| FolioduelError::ConfigInvalid {
            section: "tax_drag".to_string(),
            key: "rates".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Portfolios whose weights do not sum to 1.0 (beyond float tolerance).
/// The valuation arithmetic stays permissive; callers decide whether a
/// deviation warns or fails.
pub fn weight_deviations(config: &ComparisonConfig) -> Vec<(String, f64)> {
    config
        .portfolios
        .iter()
        .filter_map(|def| {
            let sum = def.weight_sum();
            if (sum - 1.0).abs() > 1e-6 {
                Some((def.name.clone(), sum))
            } else {
                None
            }
        })
        .collect()
}
