//! Command-line interface module for orisort.
//!
//! This module ties the pieces together for one invocation:
//! - Argument parsing
//! - Input expansion and mode selection
//! - Dry runs and real runs with progress output
//! - The optional undo at the end of a run

use crate::config::{CompiledFilters, Config, ModeSetting};
use crate::extractor::{DimensionExtractor, MediaExtractor};
use crate::file_organizer::{
    Candidate, FolderMode, OrganizeError, ReorganizationRun, Reorganizer,
};
use crate::media_format::{FormatMapper, MediaKind};
use crate::output::OutputFormatter;
use crate::probe::FfmpegProbe;
use crate::undo::UndoEngine;
use crate::walker::expand_inputs;
use clap::{ArgAction, Parser, ValueEnum};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Sort photos and videos into Portrait, Landscape and Square folders.
#[derive(Debug, Parser)]
#[command(name = "orisort", version, about)]
pub struct Cli {
    /// Files and directories to sort. Directories are searched recursively.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Folder naming when photos and videos are mixed.
    #[arg(long, value_enum)]
    pub mode: Option<ModeSetting>,

    /// Show where files would go without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Whether to undo the moves once the run is finished.
    #[arg(long, value_enum, default_value_t = UndoPolicy::Ask)]
    pub undo: UndoPolicy,

    /// Configuration file to use instead of the default locations.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log more detail (-v for info, -vv for debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What to do with a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UndoPolicy {
    Ask,
    Always,
    Never,
}

/// Combines the configured log level with the number of `-v` flags.
pub fn effective_log_level(configured: Level, verbose: u8) -> Level {
    match verbose {
        0 => configured,
        1 => configured.max(Level::INFO),
        _ => configured.max(Level::DEBUG),
    }
}

/// Runs one invocation.
///
/// Per-file problems are reported and never abort the run. An error is
/// returned only when nothing could be attempted, e.g. invalid filters or a
/// missing video probe while videos are present.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use orisort::cli::{Cli, run_cli};
/// use orisort::config::Config;
///
/// let cli = Cli::parse_from(["orisort", "--dry-run", "/path/to/photos"]);
/// if let Err(e) = run_cli(&cli, &Config::default()) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli, config: &Config) -> Result<(), String> {
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let extractor = MediaExtractor::new(FfmpegProbe::new(&config.probe.program));
    let setting = cli.mode.unwrap_or(config.organize.mode);

    run_with(
        cli,
        &filters,
        extractor,
        setting,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )
}

/// Runs one invocation with an explicit extractor and prompt streams.
pub fn run_with<E, R, W>(
    cli: &Cli,
    filters: &CompiledFilters,
    extractor: E,
    setting: ModeSetting,
    input: &mut R,
    output: &mut W,
) -> Result<(), String>
where
    E: DimensionExtractor,
    R: BufRead,
    W: Write,
{
    let expansion = expand_inputs(&cli.paths, filters);
    for path in &expansion.missing {
        OutputFormatter::warning(&format!("Skipping missing path: {}", path.display()));
    }

    if expansion.filtered > 0 {
        OutputFormatter::info(&format!(
            "Left out {} file{} matching the configured filters",
            expansion.filtered,
            if expansion.filtered == 1 { "" } else { "s" }
        ));
    }

    let candidates = expansion.candidates;
    if candidates.is_empty() {
        OutputFormatter::warning("No files found.");
        return Ok(());
    }

    let kinds = media_kinds(&candidates);
    if kinds.is_empty() {
        OutputFormatter::warning(&format!(
            "No supported media files found ({} file{} ignored).",
            candidates.len(),
            if candidates.len() == 1 { "" } else { "s" }
        ));
        return Ok(());
    }

    let mode = choose_mode(setting, &kinds, || {
        confirm(
            input,
            output,
            "Photos and videos found. Keep them in separate folders?",
            true,
        )
        .unwrap_or(true)
    });

    let reorganizer = Reorganizer::new(extractor, mode);
    reorganizer.preflight(&candidates).map_err(|e| {
        if matches!(e, OrganizeError::ToolMissing { .. }) {
            format!("{}. Install ffmpeg or set [probe] program.", e)
        } else {
            e.to_string()
        }
    })?;

    if cli.dry_run {
        dry_run(&reorganizer, &candidates);
        return Ok(());
    }

    let mut run = ReorganizationRun::new();
    organize(&reorganizer, &mut run, &candidates);
    OutputFormatter::run_summary(&run);

    if run.log().is_empty() {
        return Ok(());
    }

    let undo = match cli.undo {
        UndoPolicy::Always => true,
        UndoPolicy::Never => false,
        UndoPolicy::Ask => confirm(input, output, "Undo these moves?", false).unwrap_or(false),
    };

    if undo {
        let report = UndoEngine::undo(&mut run);
        OutputFormatter::undo_summary(&report);
    }

    Ok(())
}

fn media_kinds(candidates: &[Candidate]) -> BTreeSet<MediaKind> {
    let mapper = FormatMapper::default();
    candidates
        .iter()
        .filter_map(|c| mapper.format_of(&c.path))
        .map(|format| format.kind())
        .collect()
}

/// Picks the folder mode for a run. `ask` is only called when the setting is
/// `ask` and both photos and videos are present.
pub fn choose_mode(
    setting: ModeSetting,
    kinds: &BTreeSet<MediaKind>,
    ask: impl FnOnce() -> bool,
) -> FolderMode {
    match setting {
        ModeSetting::Separate => FolderMode::Separate,
        ModeSetting::Combined => FolderMode::Combined,
        ModeSetting::Ask => FolderMode::resolve(kinds).unwrap_or_else(|| {
            if ask() {
                FolderMode::Separate
            } else {
                FolderMode::Combined
            }
        }),
    }
}

/// Asks a yes/no question. Empty or unrecognized answers and end of input
/// give `default`.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: bool,
) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    write!(output, "{} {} ", question, hint)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(default);
    }

    Ok(match line.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    })
}

fn organize<E: DimensionExtractor>(
    reorganizer: &Reorganizer<E>,
    run: &mut ReorganizationRun,
    candidates: &[Candidate],
) {
    let pb = OutputFormatter::create_progress_bar(candidates.len() as u64);

    for candidate in candidates {
        pb.set_message(file_label(&candidate.path));
        // Log lines are written while the bar is hidden.
        pb.suspend(|| {
            reorganizer.process_file(run, &candidate.path, &candidate.base_dir);
        });
        pb.inc(1);
    }

    pb.finish_and_clear();
}

fn dry_run<E: DimensionExtractor>(reorganizer: &Reorganizer<E>, candidates: &[Candidate]) {
    OutputFormatter::dry_run_notice("Files would be sorted as follows:");

    let mut folder_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut ignored = 0;
    let mut failed = 0;

    for candidate in candidates {
        let name = file_label(&candidate.path);
        match reorganizer.plan_file(&candidate.path) {
            Ok(placement) => {
                OutputFormatter::plain(&format!(
                    " - {} ({}) → {}/",
                    name, placement.dimensions, placement.folder
                ));
                *folder_counts.entry(placement.folder).or_insert(0) += 1;
            }
            Err(OrganizeError::UnsupportedFormat { .. }) => ignored += 1,
            Err(e) => {
                OutputFormatter::error(&format!("{}: {}", name, e));
                failed += 1;
            }
        }
    }

    let total = folder_counts.values().sum();
    OutputFormatter::summary_table(&folder_counts, total);

    if ignored > 0 {
        OutputFormatter::warning(&format!("Would ignore {} unsupported file(s)", ignored));
    }
    if failed > 0 {
        OutputFormatter::warning(&format!("Could not read {} file(s)", failed));
    }
    OutputFormatter::success("Dry run complete. No files were moved.");
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
