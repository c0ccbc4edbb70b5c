//! Output formatting and styling module.
//!
//! Provides a centralized interface for all user-facing CLI output: colored
//! status lines, the processing progress bar and the summary tables printed
//! after a run, a dry run or an undo. Diagnostics go through `tracing` instead.

use crate::file_organizer::ReorganizationRun;
use crate::undo::UndoReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use orisort::output::OutputFormatter;
    /// OutputFormatter::success("Sorted 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use orisort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts per orientation folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use orisort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Portrait-Photo".to_string(), 15);
    /// counts.insert("Landscape-Video".to_string(), 3);
    /// OutputFormatter::summary_table(&counts, 18);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_folder_len = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_folder_len
        );
    }

    /// Prints the counters of a finished run.
    pub fn run_summary(run: &ReorganizationRun) {
        Self::header("RESULT");
        Self::success(&format!("Moved: {}", run.processed));
        if run.ignored > 0 {
            Self::warning(&format!("Ignored (unsupported): {}", run.ignored));
        }
        if run.extraction_failures > 0 {
            Self::error(&format!(
                "Could not read dimensions: {}",
                run.extraction_failures
            ));
        }
        if run.move_failures > 0 {
            Self::error(&format!("Could not move: {}", run.move_failures));
        }
    }

    /// Prints what an undo did.
    pub fn undo_summary(report: &UndoReport) {
        Self::header("UNDO");
        Self::success(&format!("Restored: {}", report.restored_files));

        if !report.skipped_files.is_empty() {
            Self::warning(&format!(
                "Skipped (no longer in place): {}",
                report.skipped_files.len()
            ));
            for path in &report.skipped_files {
                println!("    - {}", path.display());
            }
        }

        for (original, backup) in &report.backups {
            Self::warning(&format!(
                "{} was occupied; the occupant was renamed to {}",
                original.display(),
                backup.display()
            ));
        }

        if !report.failed_restores.is_empty() {
            Self::error(&format!("Failed: {}", report.failed_restores.len()));
            for (path, reason) in &report.failed_restores {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.removed_dirs.is_empty() {
            Self::plain(&format!(
                "Removed {} empty folder{}",
                report.removed_dirs.len(),
                if report.removed_dirs.len() == 1 { "" } else { "s" }
            ));
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
