#![allow(dead_code)]

use chrono::NaiveDate;
use folioduel::domain::comparison::{ComparisonConfig, Window};
use folioduel::domain::error::FolioduelError;
use folioduel::domain::portfolio::PortfolioDefinition;
use folioduel::domain::series::{PricePoint, PriceSeries};
use folioduel::domain::tax_drag::DragTable;
use folioduel::ports::quote_port::QuotePort;
use std::collections::HashMap;

pub const HOME_FX: &str = "USDTWD=X";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily closes starting at `start`.
pub fn make_series(symbol: &str, start: NaiveDate, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        symbol,
        closes
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                price,
            })
            .collect(),
    )
}

pub fn definition(name: &str, weights: &[(&str, f64)]) -> PortfolioDefinition {
    PortfolioDefinition {
        name: name.to_string(),
        weights: weights
            .iter()
            .map(|&(symbol, weight)| (symbol.to_string(), weight))
            .collect(),
    }
}

/// A config with no drag, one million capital and an unbounded window.
pub fn config_with(portfolios: Vec<PortfolioDefinition>) -> ComparisonConfig {
    ComparisonConfig {
        portfolios,
        drag: DragTable::default(),
        apply_tax_drag: false,
        initial_capital: 1_000_000.0,
        home_fx: HOME_FX.to_string(),
        window: Window::Max,
    }
}

pub struct MockQuotePort {
    pub data: HashMap<String, PriceSeries>,
    pub failure: Option<String>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            failure: None,
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.symbol.clone(), series);
        self
    }

    pub fn with_failure(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_closes(
        &self,
        symbols: &[String],
        _window: Window,
    ) -> Result<Vec<PriceSeries>, FolioduelError> {
        if let Some(reason) = &self.failure {
            return Err(FolioduelError::QuoteSource {
                reason: reason.clone(),
            });
        }
        Ok(symbols
            .iter()
            .filter_map(|symbol| self.data.get(symbol).cloned())
            .collect())
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FolioduelError> {
        Ok(self.data.get(symbol).and_then(|series| {
            match (series.first_point(), series.last_point()) {
                (Some(first), Some(last)) => Some((first.date, last.date, series.len())),
                _ => None,
            }
        }))
    }
}
