//! Dividend tax drag: estimated rates per symbol and return-stream adjustment.

use std::collections::HashMap;

use super::series::{PricePoint, PriceSeries};
use super::TRADING_DAYS_PER_YEAR;

/// Per-symbol annual drag rates plus exemption rules. Built from configuration;
/// the core adjustment below only ever sees a plain rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragTable {
    pub rates: HashMap<String, f64>,
    pub default_rate: f64,
    pub exempt_markers: Vec<String>,
}

impl DragTable {
    /// Symbols matching any marker (e.g. `.L`, `.TW`, `BTC`) are exempt:
    /// already taxed at source or outside dividend-withholding scope.
    pub fn is_exempt(&self, symbol: &str) -> bool {
        self.exempt_markers.iter().any(|m| symbol.contains(m.as_str()))
    }

    /// Annual drag for a symbol: zero when exempt, the table rate when listed,
    /// the default rate otherwise.
    pub fn annual_rate(&self, symbol: &str) -> f64 {
        if self.is_exempt(symbol) {
            return 0.0;
        }
        self.rates.get(symbol).copied().unwrap_or(self.default_rate)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RateParseError {
    #[error("malformed rate entry: {0} (expected SYMBOL:RATE)")]
    Malformed(String),

    #[error("invalid rate for {symbol}: {reason}")]
    InvalidRate { symbol: String, reason: String },
}

/// Parse `"VOO:0.0045, VEA:0.009"` into a rate table. An empty input yields an
/// empty table; a symbol listed twice keeps the last rate.
pub fn parse_rates(input: &str) -> Result<HashMap<String, f64>, RateParseError> {
    let mut rates = HashMap::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (symbol, rate) = trimmed
            .split_once(':')
            .ok_or_else(|| RateParseError::Malformed(trimmed.to_string()))?;
        let symbol = symbol.trim().to_uppercase();
        let rate: f64 = rate
            .trim()
            .parse()
            .map_err(|_| RateParseError::InvalidRate {
                symbol: symbol.clone(),
                reason: format!("{} is not a number", rate.trim()),
            })?;
        if rate < 0.0 {
            return Err(RateParseError::InvalidRate {
                symbol,
                reason: "must be non-negative".into(),
            });
        }
        rates.insert(symbol, rate);
    }
    Ok(rates)
}

/// Strip a constant estimated drag from a price series' daily returns and
/// recompound from the original first price.
///
/// The anchor point keeps the original first price; drag applies from the
/// second point on. A zero rate returns the input unchanged, and a series too
/// short to have returns passes through as-is.
pub fn adjust(prices: &PriceSeries, annual_drag_rate: f64) -> PriceSeries {
    if annual_drag_rate == 0.0 || prices.points.len() < 2 {
        return prices.clone();
    }

    let daily_drag = annual_drag_rate / TRADING_DAYS_PER_YEAR;
    let mut points = Vec::with_capacity(prices.points.len());
    points.push(prices.points[0].clone());

    let mut prev_adjusted = prices.points[0].price;
    for window in prices.points.windows(2) {
        let daily_return = window[1].price / window[0].price - 1.0;
        prev_adjusted *= 1.0 + daily_return - daily_drag;
        points.push(PricePoint {
            date: window[1].date,
            price: prev_adjusted,
        });
    }

    PriceSeries {
        symbol: prices.symbol.clone(),
        points,
    }
}
