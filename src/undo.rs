/// Undo functionality for reverting a reorganization run.
///
/// This module moves files back to where they were before the run, using the
/// run's in-memory move log, and then removes orientation folders that the
/// reversal left empty.
use crate::file_organizer::{MoveRecord, ReorganizationRun, move_file};
use crate::path_allocator::PathAllocator;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that could not be moved back, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Records whose destination no longer exists.
    pub skipped_files: Vec<PathBuf>,
    /// Files found at an original location and moved aside, as (from, to).
    pub backups: Vec<(PathBuf, PathBuf)>,
    /// Orientation folders removed because they were empty.
    pub removed_dirs: Vec<PathBuf>,
}

impl UndoReport {
    /// Returns the total number of records processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every recorded file was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Reverses the moves of a reorganization run.
pub struct UndoEngine;

impl UndoEngine {
    /// Undoes every move recorded in `run`, most recent first.
    ///
    /// Undo is one-shot and best effort: the run's log is drained before any
    /// file is touched, so after this call the run holds no records even if
    /// some restores failed.
    ///
    /// # Edge Cases Handled
    ///
    /// * **Destination missing**: the record is skipped, not treated as an error
    /// * **Source occupied**: the occupying file is moved aside under a new name
    /// * **Source directory removed**: it is recreated
    /// * **Permission denied**: recorded as a failure; the file stays in its folder
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use orisort::file_organizer::ReorganizationRun;
    /// use orisort::undo::UndoEngine;
    ///
    /// let mut run = ReorganizationRun::new();
    /// // ... process files ...
    /// let report = UndoEngine::undo(&mut run);
    /// println!("Restored {} files", report.restored_files);
    /// ```
    pub fn undo(run: &mut ReorganizationRun) -> UndoReport {
        let records = run.log_mut().drain();
        let mut report = UndoReport::default();

        if records.is_empty() {
            info!("Nothing to undo");
            return report;
        }

        for record in records.iter().rev() {
            Self::restore_file(record, &mut report);
        }

        let touched: BTreeSet<&Path> = records
            .iter()
            .filter_map(|record| record.destination().parent())
            .collect();
        report.removed_dirs = Self::remove_empty_dirs(touched);

        info!("Restored {} file(s)", report.restored_files);
        report
    }

    /// Moves a single file back to its original location.
    fn restore_file(record: &MoveRecord, report: &mut UndoReport) {
        let source = record.source();
        let destination = record.destination();

        if !destination.exists() {
            info!(
                "Skipping {}: no longer at {}",
                source.display(),
                destination.display()
            );
            report.skipped_files.push(destination.to_path_buf());
            return;
        }

        if let Some(parent) = source.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            error!("Failed to recreate {}: {}", parent.display(), e);
            report
                .failed_restores
                .push((destination.to_path_buf(), format!("Could not recreate directory: {}", e)));
            return;
        }

        // Something new sits at the original path; keep it under another name.
        if source.exists() {
            let Some(parent) = source.parent() else {
                report.failed_restores.push((
                    destination.to_path_buf(),
                    "Original location is occupied".to_string(),
                ));
                return;
            };
            let Some(name) = source.file_name() else {
                report.failed_restores.push((
                    destination.to_path_buf(),
                    "Original location has no file name".to_string(),
                ));
                return;
            };
            let backup = PathAllocator::allocate(parent, name);
            if let Err(e) = move_file(source, &backup) {
                error!("Failed to move aside {}: {}", source.display(), e);
                report.failed_restores.push((
                    destination.to_path_buf(),
                    format!("Could not move conflicting file aside: {}", e),
                ));
                return;
            }
            warn!(
                "Moved conflicting {} aside to {}",
                source.display(),
                backup.display()
            );
            report.backups.push((source.to_path_buf(), backup));
        }

        match move_file(destination, source) {
            Ok(()) => {
                info!("Restored {}", source.display());
                report.restored_files += 1;
            }
            Err(e) => {
                error!("Failed to restore {}: {}", destination.display(), e);
                report
                    .failed_restores
                    .push((destination.to_path_buf(), format!("Failed to restore file: {}", e)));
            }
        }
    }

    /// Removes each directory that exists and is empty. Failures are logged.
    fn remove_empty_dirs<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Vec<PathBuf> {
        let mut removed = Vec::new();

        for dir in dirs {
            let is_empty = match fs::read_dir(dir) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Could not inspect {}: {}", dir.display(), e);
                    continue;
                }
            };

            if !is_empty {
                continue;
            }

            match fs::remove_dir(dir) {
                Ok(()) => {
                    info!("Removed empty directory {}", dir.display());
                    removed.push(dir.to_path_buf());
                }
                Err(e) => warn!("Could not remove {}: {}", dir.display(), e),
            }
        }

        removed
    }
}
