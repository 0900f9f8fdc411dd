//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use layoutspec_runner::SuiteReport;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// One reported test, flattened for display
#[derive(Serialize)]
struct ResultRow {
    suite: String,
    test: String,
    passed: bool,
    kind: Option<&'static str>,
    duration_ms: u64,
    message: Option<String>,
}

impl TableDisplay for ResultRow {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Test", "Result", "Duration", "Message"]
    }

    fn row(&self) -> Vec<String> {
        let result = match (self.passed, self.kind) {
            (true, _) => "✓ pass".green().to_string(),
            (false, Some("error")) => "✗ error".red().bold().to_string(),
            (false, _) => "✗ fail".red().to_string(),
        };
        vec![
            self.suite.clone(),
            self.test.clone(),
            result,
            format!("{}ms", self.duration_ms),
            self.message.clone().unwrap_or_default(),
        ]
    }
}

/// Print suite reports in the requested format
pub fn print_reports(reports: &[SuiteReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let records: Vec<_> = reports.iter().map(SuiteReport::to_record).collect();
            println!("{}", serde_json::to_string_pretty(&records).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            let records: Vec<_> = reports.iter().map(SuiteReport::to_record).collect();
            println!("{}", serde_yaml::to_string(&records).unwrap_or_default());
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let rows: Vec<ResultRow> = reports
                .iter()
                .flat_map(|report| {
                    report.to_record().tests.into_iter().map(move |t| ResultRow {
                        suite: report.suite.clone(),
                        test: t.name,
                        passed: t.passed,
                        kind: t.kind,
                        duration_ms: t.duration_ms,
                        message: t.message,
                    })
                })
                .collect();
            print_list(&rows, format);
            print_totals(reports);
        }
    }
}

fn print_totals(reports: &[SuiteReport]) {
    let total: usize = reports.iter().map(SuiteReport::run_count).sum();
    let passed: usize = reports.iter().map(SuiteReport::passed).sum();
    let failed = total - passed;

    let line = format!("{} test(s): {} passed, {} failed", total, passed, failed);
    if failed == 0 {
        print_success(&line);
    } else {
        print_error(&line);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}
