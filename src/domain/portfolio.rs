//! Portfolio definitions, unit allocation and buy-and-hold valuation.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::series::PriceSeries;

/// A named, fixed-weight portfolio. Weights are fractions of capital in
/// `(0, 1]` and are assumed to sum to 1.0; the valuation arithmetic does not
/// enforce the sum, so a deviating configuration mis-scales capital instead of
/// erroring. Definitions are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDefinition {
    pub name: String,
    pub weights: Vec<(String, f64)>,
}

impl PortfolioDefinition {
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|(symbol, _)| symbol.as_str())
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().map(|(_, weight)| weight).sum()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WeightParseError {
    #[error("empty token in weight list")]
    EmptyToken,

    #[error("malformed weight entry: {0} (expected SYMBOL:FRACTION)")]
    Malformed(String),

    #[error("invalid weight for {symbol}: {reason}")]
    InvalidWeight { symbol: String, reason: String },

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse `"VOO:0.30, AVUV:0.30"` into ordered (symbol, weight) pairs.
pub fn parse_weights(input: &str) -> Result<Vec<(String, f64)>, WeightParseError> {
    let mut weights = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WeightParseError::EmptyToken);
        }
        let (symbol, weight) = trimmed
            .split_once(':')
            .ok_or_else(|| WeightParseError::Malformed(trimmed.to_string()))?;
        let symbol = symbol.trim().to_uppercase();
        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| WeightParseError::InvalidWeight {
                symbol: symbol.clone(),
                reason: format!("{} is not a number", weight.trim()),
            })?;
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(WeightParseError::InvalidWeight {
                symbol,
                reason: "must be in (0, 1]".into(),
            });
        }
        if !seen.insert(symbol.clone()) {
            return Err(WeightParseError::DuplicateSymbol(symbol));
        }
        weights.push((symbol, weight));
    }

    Ok(weights)
}

/// Units of each instrument bought at the first aligned date. Fixed for the
/// life of a run: buy and hold, no rebalancing.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAllocation {
    pub units: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioValueSeries {
    pub name: String,
    pub points: Vec<ValuePoint>,
}

/// Outcome of composing one portfolio over a run's aligned prices.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    Valued(PortfolioValueSeries),
    /// The portfolio needs a symbol with no start-date price; a partial
    /// allocation is never produced.
    Excluded { symbol: String },
}

/// Buy `weight x initial_capital` of each instrument at the first aligned
/// date. `Err` carries the first symbol without a start-date price.
pub fn allocate_units(
    definition: &PortfolioDefinition,
    home_prices: &HashMap<String, PriceSeries>,
    initial_capital: f64,
) -> Result<UnitAllocation, String> {
    let mut units = Vec::with_capacity(definition.weights.len());
    for (symbol, weight) in &definition.weights {
        let start_price = home_prices
            .get(symbol.as_str())
            .and_then(|series| series.first_point())
            .map(|point| point.price);
        let Some(start_price) = start_price else {
            return Err(symbol.clone());
        };
        units.push((symbol.clone(), initial_capital * weight / start_price));
    }
    Ok(UnitAllocation { units })
}

/// Day-by-day value of a portfolio: allocate once, then sum
/// `units x home price` across instruments for every aligned date.
pub fn compose(
    definition: &PortfolioDefinition,
    home_prices: &HashMap<String, PriceSeries>,
    initial_capital: f64,
) -> Composition {
    let allocation = match allocate_units(definition, home_prices, initial_capital) {
        Ok(allocation) => allocation,
        Err(symbol) => return Composition::Excluded { symbol },
    };

    let mut holdings: Vec<(f64, &PriceSeries)> = Vec::with_capacity(allocation.units.len());
    for (symbol, unit_count) in &allocation.units {
        match home_prices.get(symbol.as_str()) {
            Some(series) => holdings.push((*unit_count, series)),
            None => return Composition::Excluded { symbol: symbol.clone() },
        }
    }

    let Some((_, base)) = holdings.first() else {
        // An empty definition has nothing to value; config validation rejects
        // this before a run.
        return Composition::Excluded {
            symbol: "(empty definition)".to_string(),
        };
    };

    let points = base
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| ValuePoint {
            date: point.date,
            value: holdings
                .iter()
                .map(|(unit_count, series)| unit_count * series.points[i].price)
                .sum(),
        })
        .collect();

    Composition::Valued(PortfolioValueSeries {
        name: definition.name.clone(),
        points,
    })
}
