//! Full comparison run: align, adjust, convert, compose, analyze.
//!
//! One call per refresh; the run holds no state and every result is rebuilt
//! from the quote snapshot it is given.

use chrono::{Datelike, Months, NaiveDate};
use std::collections::{HashMap, HashSet};

use super::currency::to_home_currency;
use super::error::FolioduelError;
use super::metrics::PerformanceStats;
use super::portfolio::{compose, Composition, PortfolioDefinition, PortfolioValueSeries};
use super::series::{align, PriceSeries};
use super::tax_drag::{adjust, DragTable};

/// Historical window keyword, resolved by the quote source against its newest
/// available date rather than the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Ytd,
    Months6,
    Years1,
    Years2,
    Years5,
    Max,
}

impl Window {
    pub fn parse(input: &str) -> Option<Window> {
        match input.trim().to_lowercase().as_str() {
            "ytd" => Some(Window::Ytd),
            "6mo" => Some(Window::Months6),
            "1y" => Some(Window::Years1),
            "2y" => Some(Window::Years2),
            "5y" => Some(Window::Years5),
            "max" => Some(Window::Max),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Window::Ytd => "ytd",
            Window::Months6 => "6mo",
            Window::Years1 => "1y",
            Window::Years2 => "2y",
            Window::Years5 => "5y",
            Window::Max => "max",
        }
    }

    /// Earliest date admitted by this window when anchored on `end`.
    /// `None` means unbounded history.
    pub fn start_from(self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            Window::Ytd => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Window::Months6 => end.checked_sub_months(Months::new(6)),
            Window::Years1 => end.checked_sub_months(Months::new(12)),
            Window::Years2 => end.checked_sub_months(Months::new(24)),
            Window::Years5 => end.checked_sub_months(Months::new(60)),
            Window::Max => None,
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run needs, supplied as plain data. Built once from
/// configuration and never mutated by the core.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    pub portfolios: Vec<PortfolioDefinition>,
    pub drag: DragTable,
    pub apply_tax_drag: bool,
    pub initial_capital: f64,
    /// Symbol of the exchange-rate series converting instrument prices into
    /// the home currency. Its absence aborts a run.
    pub home_fx: String,
    pub window: Window,
}

impl ComparisonConfig {
    /// Every symbol the run must request from the quote source, FX included,
    /// deduplicated in first-seen order.
    pub fn required_symbols(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        let mut seen = HashSet::new();
        for definition in &self.portfolios {
            for symbol in definition.symbols() {
                if seen.insert(symbol.to_string()) {
                    symbols.push(symbol.to_string());
                }
            }
        }
        if seen.insert(self.home_fx.clone()) {
            symbols.push(self.home_fx.clone());
        }
        symbols
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    pub values: PortfolioValueSeries,
    pub stats: PerformanceStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedPortfolio {
    pub name: String,
    pub missing_symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Valued portfolios in configuration order.
    pub results: Vec<PortfolioResult>,
    pub excluded: Vec<ExcludedPortfolio>,
}

impl ComparisonReport {
    /// Highest total return among the portfolios that produced a result.
    pub fn winner(&self) -> Option<&PortfolioResult> {
        self.results
            .iter()
            .max_by(|a, b| a.stats.total_return.total_cmp(&b.stats.total_return))
    }
}

/// Run the whole pipeline over one quote snapshot.
///
/// Symbols with no observations are treated as absent: the portfolios that
/// need them are excluded, siblings proceed. A missing exchange-rate series
/// is fatal, as is an integrity violation in any composed value series.
pub fn run_comparison(
    quotes: Vec<PriceSeries>,
    config: &ComparisonConfig,
) -> Result<ComparisonReport, FolioduelError> {
    let quotes: Vec<PriceSeries> = quotes.into_iter().filter(|s| !s.is_empty()).collect();
    if quotes.is_empty() {
        return Err(FolioduelError::DataUnavailable {
            what: "quote source returned nothing".into(),
        });
    }
    if !quotes.iter().any(|s| s.symbol == config.home_fx) {
        return Err(FolioduelError::DataUnavailable {
            what: format!("exchange rate series {}", config.home_fx),
        });
    }

    let aligned = align(&quotes)?;

    let mut fx = None;
    let mut instruments = Vec::new();
    for series in aligned {
        if series.symbol == config.home_fx {
            fx = Some(series);
        } else {
            instruments.push(series);
        }
    }
    let Some(fx) = fx else {
        return Err(FolioduelError::DataUnavailable {
            what: format!("exchange rate series {}", config.home_fx),
        });
    };

    let (start_date, end_date) = match (fx.first_point(), fx.last_point()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            return Err(FolioduelError::DataUnavailable {
                what: "aligned date index is empty".into(),
            });
        }
    };

    let mut home_prices: HashMap<String, PriceSeries> = HashMap::with_capacity(instruments.len());
    for series in instruments {
        let adjusted = if config.apply_tax_drag {
            adjust(&series, config.drag.annual_rate(&series.symbol))
        } else {
            series
        };
        let converted = to_home_currency(&adjusted, &fx);
        home_prices.insert(converted.symbol.clone(), converted);
    }

    let mut results = Vec::new();
    let mut excluded = Vec::new();
    for definition in &config.portfolios {
        match compose(definition, &home_prices, config.initial_capital) {
            Composition::Valued(values) => {
                let stats = PerformanceStats::compute(&values)?;
                results.push(PortfolioResult { values, stats });
            }
            Composition::Excluded { symbol } => {
                excluded.push(ExcludedPortfolio {
                    name: definition.name.clone(),
                    missing_symbol: symbol,
                });
            }
        }
    }

    Ok(ComparisonReport {
        start_date,
        end_date,
        results,
        excluded,
    })
}
