//! CSV value-history report adapter.
//!
//! One row per aligned date, one column per portfolio: the chart feed.

use crate::domain::comparison::ComparisonReport;
use crate::domain::error::FolioduelError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ComparisonReport, output_path: &str) -> Result<(), FolioduelError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(std::io::Error::other)?;

        let mut header = vec!["date".to_string()];
        header.extend(report.results.iter().map(|r| r.values.name.clone()));
        writer
            .write_record(&header)
            .map_err(std::io::Error::other)?;

        // All value series share the aligned index.
        let rows = report
            .results
            .first()
            .map(|r| r.values.points.len())
            .unwrap_or(0);
        for i in 0..rows {
            let mut record = vec![report.results[0].values.points[i].date.to_string()];
            record.extend(
                report
                    .results
                    .iter()
                    .map(|r| format!("{:.4}", r.values.points[i].value)),
            );
            writer.write_record(&record).map_err(std::io::Error::other)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::PortfolioResult;
    use crate::domain::metrics::PerformanceStats;
    use crate::domain::portfolio::{PortfolioValueSeries, ValuePoint};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn result(name: &str, values: &[f64]) -> PortfolioResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values = PortfolioValueSeries {
            name: name.to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| ValuePoint {
                    date: start + chrono::Duration::days(i as i64),
                    value,
                })
                .collect(),
        };
        let stats = PerformanceStats::compute(&values).unwrap();
        PortfolioResult { values, stats }
    }

    #[test]
    fn writes_one_column_per_portfolio() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let report = ComparisonReport {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            results: vec![
                result("Factor Mix", &[1_000_000.0, 1_010_000.0]),
                result("S&P 500", &[1_000_000.0, 1_020_000.0]),
            ],
            excluded: Vec::new(),
        };

        CsvReportAdapter
            .write(&report, &path.to_string_lossy())
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "date,Factor Mix,S&P 500");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-01,1000000.0000,1000000.0000"));
    }

    #[test]
    fn empty_report_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let report = ComparisonReport {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            results: Vec::new(),
            excluded: Vec::new(),
        };

        CsvReportAdapter
            .write(&report, &path.to_string_lossy())
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "date");
    }
}
