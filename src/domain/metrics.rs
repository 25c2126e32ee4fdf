//! Performance statistics over a portfolio value series.

use super::error::FolioduelError;
use super::portfolio::{PortfolioValueSeries, ValuePoint};
use super::TRADING_DAYS_PER_YEAR;

const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    /// Sample standard deviation of daily returns, annualized with sqrt(252).
    pub volatility: f64,
    /// Worst decline from a prior peak, as a fraction. Always <= 0.
    pub max_drawdown: f64,
    /// Annualized return per unit of volatility; 0 for a flat series.
    pub sharpe_ratio: f64,
    /// Calendar days between the first and last point.
    pub elapsed_days: i64,
}

impl PerformanceStats {
    /// Derive statistics from an equity curve.
    ///
    /// A non-positive or non-finite value anywhere in the curve is upstream
    /// data corruption and fails hard: it invalidates both the drawdown and
    /// the return semantics. Series too short for a given statistic degrade to
    /// documented zero fallbacks instead of erroring.
    pub fn compute(values: &PortfolioValueSeries) -> Result<Self, FolioduelError> {
        for point in &values.points {
            if !point.value.is_finite() || point.value <= 0.0 {
                return Err(FolioduelError::IntegrityViolation {
                    portfolio: values.name.clone(),
                    date: point.date,
                    value: point.value,
                });
            }
        }

        let Some(first) = values.points.first() else {
            return Ok(PerformanceStats {
                final_value: 0.0,
                total_return: 0.0,
                annualized_return: 0.0,
                volatility: 0.0,
                max_drawdown: 0.0,
                sharpe_ratio: 0.0,
                elapsed_days: 0,
            });
        };
        let last = values.points.last().unwrap_or(first);

        let final_value = last.value;
        let total_return = last.value / first.value - 1.0;
        let elapsed_days = (last.date - first.date).num_days();

        let returns: Vec<f64> = values
            .points
            .windows(2)
            .map(|w| w[1].value / w[0].value - 1.0)
            .collect();

        let volatility = if returns.len() >= 2 {
            let n = returns.len() as f64;
            let mean = returns.iter().sum::<f64>() / n;
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            0.0
        };

        let max_drawdown = max_drawdown(&values.points);

        let annualized_return = if elapsed_days > 0 {
            (1.0 + total_return).powf(CALENDAR_DAYS_PER_YEAR / elapsed_days as f64) - 1.0
        } else {
            0.0
        };

        let sharpe_ratio = if volatility != 0.0 {
            annualized_return / volatility
        } else {
            0.0
        };

        Ok(PerformanceStats {
            final_value,
            total_return,
            annualized_return,
            volatility,
            max_drawdown,
            sharpe_ratio,
            elapsed_days,
        })
    }
}

fn max_drawdown(points: &[ValuePoint]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };

    let mut peak = first.value;
    let mut worst = 0.0_f64;
    for point in points {
        if point.value > peak {
            peak = point.value;
        }
        let drawdown = (point.value - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    worst
}
