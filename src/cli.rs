//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::comparison::{
    run_comparison, ComparisonConfig, ComparisonReport, Window,
};
use crate::domain::config_validation::{validate_comparison_config, weight_deviations};
use crate::domain::error::FolioduelError;
use crate::domain::portfolio::{parse_weights, PortfolioDefinition};
use crate::domain::tax_drag::{parse_rates, DragTable};
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "folioduel", about = "Fixed-weight ETF portfolio comparison")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a portfolio comparison
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Write a plain-text summary report here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the per-date value history (CSV) here
        #[arg(long)]
        history: Option<PathBuf>,
        /// Override the configured window (ytd/6mo/1y/2y/5y/max)
        #[arg(long)]
        window: Option<String>,
        /// Re-run every N seconds, discarding previous results
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Validate a comparison configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show available data range for configured symbols
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Compare {
            config,
            output,
            history,
            window,
            watch,
        } => run_compare(
            &config,
            output.as_ref(),
            history.as_ref(),
            window.as_deref(),
            watch,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FolioduelError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_compare(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    history_path: Option<&PathBuf>,
    window_override: Option<&str>,
    watch: Option<u64>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_comparison_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut config = match build_comparison_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Some(window_str) = window_override {
        match Window::parse(window_str) {
            Some(window) => config.window = window,
            None => {
                eprintln!("error: unknown window {window_str}, expected ytd/6mo/1y/2y/5y/max");
                return ExitCode::from(2);
            }
        }
    }

    for (name, sum) in weight_deviations(&config) {
        eprintln!("warning: weights of {name} sum to {sum:.4}, capital will be mis-scaled");
    }

    let quote_dir = match adapter.get_string("data", "quote_dir") {
        Some(dir) => dir,
        None => {
            // validate_comparison_config has already required this key.
            eprintln!("error: missing config key [data] quote_dir");
            return ExitCode::from(2);
        }
    };
    let quote_port = CsvQuoteAdapter::new(PathBuf::from(quote_dir));
    let symbols = config.required_symbols();

    loop {
        if let Err(e) = run_once(&quote_port, &config, &symbols, output_path, history_path) {
            eprintln!("error: {e}");
            if watch.is_none() {
                return (&e).into();
            }
            // In watch mode a failed refresh is retried wholesale next tick.
        }

        let Some(seconds) = watch else {
            return ExitCode::SUCCESS;
        };
        eprintln!("\nNext refresh in {seconds}s (ctrl-c to stop)");
        thread::sleep(Duration::from_secs(seconds));
    }
}

fn run_once(
    quote_port: &dyn QuotePort,
    config: &ComparisonConfig,
    symbols: &[String],
    output_path: Option<&PathBuf>,
    history_path: Option<&PathBuf>,
) -> Result<(), FolioduelError> {
    eprintln!(
        "Fetching {} symbols over the {} window...",
        symbols.len(),
        config.window
    );
    let quotes = quote_port.fetch_closes(symbols, config.window)?;

    for symbol in symbols {
        if !quotes.iter().any(|s| &s.symbol == symbol) {
            eprintln!("warning: no data for {symbol}");
        }
    }

    let report = run_comparison(quotes, config)?;
    print_summary(&report);

    if let Some(path) = output_path {
        TextReportAdapter.write(&report, &path.to_string_lossy())?;
        eprintln!("Report written to: {}", path.display());
    }
    if let Some(path) = history_path {
        CsvReportAdapter.write(&report, &path.to_string_lossy())?;
        eprintln!("Value history written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &ComparisonReport) {
    eprintln!(
        "\nDate range: {} to {}",
        report.start_date, report.end_date
    );

    for result in &report.results {
        let stats = &result.stats;
        eprintln!("\n=== {} ===", result.values.name);
        eprintln!("Final Value:      {:.0}", stats.final_value);
        eprintln!("Total Return:     {:.2}%", stats.total_return * 100.0);
        eprintln!("Annualized:       {:.2}%", stats.annualized_return * 100.0);
        eprintln!("Volatility:       {:.2}%", stats.volatility * 100.0);
        eprintln!("Max Drawdown:     {:.2}%", stats.max_drawdown * 100.0);
        eprintln!("Sharpe:           {:.2}", stats.sharpe_ratio);
    }

    for excluded in &report.excluded {
        eprintln!(
            "\nExcluded {}: no start price for {}",
            excluded.name, excluded.missing_symbol
        );
    }

    if let Some(winner) = report.winner() {
        eprintln!(
            "\nWinner: {} (total return {:.2}%)",
            winner.values.name,
            winner.stats.total_return * 100.0
        );
    }
}

pub fn build_comparison_config(
    adapter: &dyn ConfigPort,
) -> Result<ComparisonConfig, FolioduelError> {
    let window_str = adapter
        .get_string("comparison", "window")
        .unwrap_or_else(|| "max".to_string());
    let window = Window::parse(&window_str).ok_or_else(|| FolioduelError::ConfigInvalid {
        section: "comparison".into(),
        key: "window".into(),
        reason: format!("unknown window {window_str}"),
    })?;

    let home_fx = adapter
        .get_string("comparison", "home_fx")
        .ok_or_else(|| FolioduelError::ConfigMissing {
            section: "comparison".into(),
            key: "home_fx".into(),
        })?;

    let roster = adapter.get_list("comparison", "portfolios");
    if roster.is_empty() {
        return Err(FolioduelError::ConfigMissing {
            section: "comparison".into(),
            key: "portfolios".into(),
        });
    }

    let mut portfolios = Vec::with_capacity(roster.len());
    for id in roster {
        let section = format!("portfolio.{id}");
        let name = adapter
            .get_string(&section, "name")
            .unwrap_or_else(|| id.clone());
        let weights_str = adapter.get_string(&section, "weights").ok_or_else(|| {
            FolioduelError::ConfigMissing {
                section: section.clone(),
                key: "weights".into(),
            }
        })?;
        let weights =
            parse_weights(&weights_str).map_err(|e| FolioduelError::ConfigInvalid {
                section: section.clone(),
                key: "weights".into(),
                reason: e.to_string(),
            })?;
        portfolios.push(PortfolioDefinition { name, weights });
    }

    let rates_str = adapter.get_string("tax_drag", "rates").unwrap_or_default();
    let drag = DragTable {
        rates: parse_rates(&rates_str).map_err(|e| FolioduelError::ConfigInvalid {
            section: "tax_drag".into(),
            key: "rates".into(),
            reason: e.to_string(),
        })?,
        default_rate: adapter.get_double("tax_drag", "default_rate", 0.0),
        exempt_markers: adapter.get_list("tax_drag", "exempt_markers"),
    };

    Ok(ComparisonConfig {
        portfolios,
        drag,
        apply_tax_drag: adapter.get_bool("comparison", "apply_tax_drag", false),
        initial_capital: adapter.get_double("comparison", "initial_capital", 1_000_000.0),
        home_fx,
        window,
    })
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_comparison_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match build_comparison_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let deviations = weight_deviations(&config);
    if !deviations.is_empty() {
        for (name, sum) in &deviations {
            eprintln!("error: weights of {name} sum to {sum:.4}, expected 1.0");
        }
        return ExitCode::from(2);
    }

    eprintln!(
        "Config validated successfully: {} portfolios, window {}",
        config.portfolios.len(),
        config.window
    );
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol_filter: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_comparison_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let quote_dir = match adapter.get_string("data", "quote_dir") {
        Some(dir) => dir,
        None => {
            eprintln!("error: missing config key [data] quote_dir");
            return ExitCode::from(2);
        }
    };
    let quote_port = CsvQuoteAdapter::new(PathBuf::from(quote_dir));

    let symbols: Vec<String> = match symbol_filter {
        Some(symbol) => vec![symbol.to_uppercase()],
        None => config.required_symbols(),
    };

    for symbol in &symbols {
        match quote_port.data_range(symbol) {
            Ok(Some((first, last, rows))) => {
                eprintln!("  {symbol}: {rows} rows, {first} to {last}");
            }
            Ok(None) => eprintln!("  {symbol}: no data"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}
