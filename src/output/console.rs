//! Colored console output for unpack results.

use crate::types::{EntrySource, ModuleId, Result, UnpackReport};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Console output handler with colors and formatting.
pub struct ConsoleOutput {
    verbose: bool,
    json_mode: bool,
    quiet: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(verbose: bool, json_mode: bool, quiet: bool) -> Self {
        Self {
            verbose,
            json_mode,
            quiet,
        }
    }

    /// Print the report for one input.
    pub fn print_report(&self, report: &UnpackReport) {
        if self.json_mode || (self.quiet && report.is_ok()) {
            return;
        }

        println!();
        println!("{} {}", "===".bright_cyan(), report.source.bright_white().bold());

        if !report.is_ok() {
            for error in &report.errors {
                println!("    +-- {}", error.red());
            }
            return;
        }

        let format = report
            .format
            .map_or_else(|| "unknown".to_string(), |f| f.to_string());
        println!("    |-- Format:  {}", format);
        println!(
            "    |-- Entry:   {}",
            format_entry(report.entry_id.as_ref(), report.entry_source)
        );
        println!("    +-- Modules: {}", report.module_count);

        if self.verbose {
            for module in &report.modules {
                let marker = if module.is_entry { "*".green().bold() } else { " ".normal() };
                println!(
                    "        {} {:<12} {}",
                    marker,
                    module.id.to_string(),
                    format!("{}..{}", module.start, module.end).dimmed()
                );
            }
        }
    }

    /// Print the summary across all inputs, or the JSON document in JSON mode.
    pub fn print_summary(&self, reports: &[UnpackReport]) -> Result<()> {
        if self.json_mode {
            println!("{}", serde_json::to_string_pretty(reports)?);
            return Ok(());
        }

        let failed = reports.iter().filter(|r| !r.is_ok()).count();
        if self.quiet && failed == 0 {
            return Ok(());
        }

        let modules: usize = reports.iter().map(|r| r.module_count).sum();

        println!();
        println!("{}", "=== Summary ===".bright_cyan());
        println!("  Inputs:   {}", reports.len());
        println!("  Modules:  {}", modules);

        if failed > 0 {
            println!("  {}", format!("Failed inputs: {}", failed).red().bold());
        } else {
            println!("  {}", "All inputs recognized.".green());
        }

        println!();
        Ok(())
    }

    /// Write the reports as JSON to a file.
    pub fn write_json(&self, reports: &[UnpackReport], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(reports)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Format the entry id with where it came from.
fn format_entry(entry_id: Option<&ModuleId>, source: Option<EntrySource>) -> colored::ColoredString {
    match (entry_id, source) {
        (Some(id), Some(EntrySource::Override)) => format!("{} (given)", id).yellow(),
        (Some(id), _) => id.to_string().green(),
        (None, _) => "not found".dimmed(),
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false, false, false)
    }
}
