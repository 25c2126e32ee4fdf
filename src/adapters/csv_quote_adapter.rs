//! CSV quote directory adapter.
//!
//! One `SYMBOL.csv` file per symbol (`date,close` rows) under a base
//! directory. Relative windows resolve against the newest date seen across
//! the loaded files, so a fixed quote directory always reproduces the same
//! run.

use crate::domain::comparison::Window;
use crate::domain::error::FolioduelError;
use crate::domain::series::{PricePoint, PriceSeries};
use crate::ports::quote_port::QuotePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvQuoteAdapter {
    base_path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn quote_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    /// Load one symbol's file. A missing or unreadable file means the source
    /// has nothing for that symbol (`None`); a malformed file is an error.
    fn load_symbol(&self, symbol: &str) -> Result<Option<PriceSeries>, FolioduelError> {
        let path = self.quote_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Ok(None),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FolioduelError::QuoteSource {
                reason: format!("{}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| FolioduelError::QuoteSource {
                reason: format!("{}: missing date column", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                FolioduelError::QuoteSource {
                    reason: format!("{}: invalid date {date_str}: {e}", path.display()),
                }
            })?;

            let close_str = record.get(1).ok_or_else(|| FolioduelError::QuoteSource {
                reason: format!("{}: missing close column", path.display()),
            })?;
            let close: f64 = close_str.parse().map_err(|_| FolioduelError::QuoteSource {
                reason: format!("{}: invalid close {close_str} on {date}", path.display()),
            })?;
            if !close.is_finite() || close <= 0.0 {
                return Err(FolioduelError::QuoteSource {
                    reason: format!("{}: non-positive close {close} on {date}", path.display()),
                });
            }

            points.push(PricePoint { date, price: close });
        }

        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Ok(Some(PriceSeries::new(symbol, points)))
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn fetch_closes(
        &self,
        symbols: &[String],
        window: Window,
    ) -> Result<Vec<PriceSeries>, FolioduelError> {
        let mut loaded = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(series) = self.load_symbol(symbol)? {
                if !series.is_empty() {
                    loaded.push(series);
                }
            }
        }

        let newest = loaded
            .iter()
            .filter_map(|s| s.last_point())
            .map(|p| p.date)
            .max();
        let Some(newest) = newest else {
            return Ok(Vec::new());
        };

        let Some(cutoff) = window.start_from(newest) else {
            return Ok(loaded);
        };

        Ok(loaded
            .into_iter()
            .map(|mut series| {
                series.points.retain(|p| p.date >= cutoff);
                series
            })
            .filter(|series| !series.is_empty())
            .collect())
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FolioduelError> {
        Ok(self.load_symbol(symbol)?.and_then(|series| {
            match (series.first_point(), series.last_point()) {
                (Some(first), Some(last)) => Some((first.date, last.date, series.len())),
                _ => None,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_quotes() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("AAA.csv"),
            "date,close\n\
             2024-01-15,100.0\n\
             2024-01-16,105.0\n\
             2024-01-17,110.0\n",
        )
        .unwrap();
        fs::write(
            path.join("USDTWD=X.csv"),
            "date,close\n\
             2024-01-15,31.2\n\
             2024-01-16,31.4\n\
             2024-01-17,31.1\n",
        )
        .unwrap();

        (dir, path)
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fetch_closes_reads_and_sorts() {
        let (_dir, path) = setup_quotes();
        fs::write(
            path.join("ZZZ.csv"),
            "date,close\n2024-01-17,3.0\n2024-01-15,1.0\n2024-01-16,2.0\n",
        )
        .unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let series = adapter.fetch_closes(&symbols(&["ZZZ"]), Window::Max).unwrap();

        assert_eq!(series.len(), 1);
        let closes: Vec<f64> = series[0].points.iter().map(|p| p.price).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_file_is_absent_not_error() {
        let (_dir, path) = setup_quotes();
        let adapter = CsvQuoteAdapter::new(path);

        let series = adapter
            .fetch_closes(&symbols(&["AAA", "GONE"]), Window::Max)
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].symbol, "AAA");
    }

    #[test]
    fn malformed_close_is_an_error() {
        let (_dir, path) = setup_quotes();
        fs::write(path.join("BAD.csv"), "date,close\n2024-01-15,abc\n").unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let result = adapter.fetch_closes(&symbols(&["BAD"]), Window::Max);
        assert!(matches!(result, Err(FolioduelError::QuoteSource { .. })));
    }

    #[test]
    fn non_positive_close_is_an_error() {
        let (_dir, path) = setup_quotes();
        fs::write(path.join("ZERO.csv"), "date,close\n2024-01-15,0.0\n").unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let result = adapter.fetch_closes(&symbols(&["ZERO"]), Window::Max);
        assert!(matches!(result, Err(FolioduelError::QuoteSource { .. })));
    }

    #[test]
    fn window_trims_relative_to_newest_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        let mut rows = String::from("date,close\n");
        for month in 1..=12 {
            rows.push_str(&format!("2023-{month:02}-01,100.0\n"));
        }
        rows.push_str("2024-01-02,100.0\n");
        fs::write(path.join("AAA.csv"), rows).unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let series = adapter
            .fetch_closes(&symbols(&["AAA"]), Window::Months6)
            .unwrap();

        // Newest row is 2024-01-02; six months back admits 2023-07-02 onward.
        assert_eq!(series[0].points[0].date, date(2023, 8, 1));
    }

    #[test]
    fn symbol_dropped_when_outside_window() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join("OLD.csv"), "date,close\n2018-01-02,50.0\n").unwrap();
        fs::write(
            path.join("NEW.csv"),
            "date,close\n2024-01-02,100.0\n2024-01-03,101.0\n",
        )
        .unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let series = adapter
            .fetch_closes(&symbols(&["OLD", "NEW"]), Window::Years1)
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].symbol, "NEW");
    }

    #[test]
    fn duplicate_dates_are_collapsed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("DUP.csv"),
            "date,close\n2024-01-15,1.0\n2024-01-15,2.0\n2024-01-16,3.0\n",
        )
        .unwrap();
        let adapter = CsvQuoteAdapter::new(path);

        let series = adapter.fetch_closes(&symbols(&["DUP"]), Window::Max).unwrap();
        assert_eq!(series[0].len(), 2);
    }

    #[test]
    fn data_range_reports_coverage() {
        let (_dir, path) = setup_quotes();
        let adapter = CsvQuoteAdapter::new(path);

        let range = adapter.data_range("AAA").unwrap();
        assert_eq!(range, Some((date(2024, 1, 15), date(2024, 1, 17), 3)));

        assert_eq!(adapter.data_range("GONE").unwrap(), None);
    }
}
