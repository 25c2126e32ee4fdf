//! Plain-text summary report adapter.

use crate::domain::comparison::ComparisonReport;
use crate::domain::error::FolioduelError;
use crate::ports::report_port::ReportPort;
use std::fs;

pub struct TextReportAdapter;

impl TextReportAdapter {
    fn render(report: &ComparisonReport) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Portfolio comparison: {} to {}\n\n",
            report.start_date, report.end_date
        ));

        for result in &report.results {
            let stats = &result.stats;
            out.push_str(&format!("=== {} ===\n", result.values.name));
            out.push_str(&format!("Final Value:      {:.0}\n", stats.final_value));
            out.push_str(&format!(
                "Total Return:     {:.2}%\n",
                stats.total_return * 100.0
            ));
            out.push_str(&format!(
                "Annualized:       {:.2}%\n",
                stats.annualized_return * 100.0
            ));
            out.push_str(&format!(
                "Volatility:       {:.2}%\n",
                stats.volatility * 100.0
            ));
            out.push_str(&format!(
                "Max Drawdown:     {:.2}%\n",
                stats.max_drawdown * 100.0
            ));
            out.push_str(&format!("Sharpe:           {:.2}\n\n", stats.sharpe_ratio));
        }

        for excluded in &report.excluded {
            out.push_str(&format!(
                "Excluded {}: no start price for {}\n",
                excluded.name, excluded.missing_symbol
            ));
        }

        if let Some(winner) = report.winner() {
            out.push_str(&format!(
                "\nWinner: {} (total return {:.2}%)\n",
                winner.values.name,
                winner.stats.total_return * 100.0
            ));
        }

        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &ComparisonReport, output_path: &str) -> Result<(), FolioduelError> {
        fs::write(output_path, Self::render(report))?;
        Ok(())
    }
}
