/// Orientation-based reorganization of media files.
///
/// This module moves each supported file into an orientation folder created
/// next to it (or under a caller-chosen base directory) and records every
/// successful move in the run's [`MoveLog`] so the whole run can be undone.
/// Failures are isolated per file: a file that cannot be read or moved is
/// logged and left where it is.
use crate::extractor::{DimensionExtractor, ExtractError};
use crate::media_format::{FormatMapper, MediaFormat, MediaKind};
use crate::orientation::{Dimensions, Orientation};
use crate::path_allocator::PathAllocator;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// A single successful relocation.
///
/// Records are created only once the file system move has succeeded and are
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    source: PathBuf,
    destination: PathBuf,
}

impl MoveRecord {
    pub(crate) fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Where the file was before the move.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Where the file was moved to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Append-only, in-memory log of the moves performed during a run.
#[derive(Debug, Default)]
pub struct MoveLog {
    records: Vec<MoveRecord>,
}

impl MoveLog {
    /// Appends a record. Records keep the order in which moves happened.
    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.records.iter()
    }

    /// Removes and returns every record, leaving the log empty.
    pub(crate) fn drain(&mut self) -> Vec<MoveRecord> {
        std::mem::take(&mut self.records)
    }
}

/// State of one reorganization run, owned by the caller.
///
/// The same run is passed to every [`Reorganizer::process_file`] call and
/// finally to [`crate::undo::UndoEngine::undo`], which drains its log.
#[derive(Debug, Default)]
pub struct ReorganizationRun {
    log: MoveLog,
    /// Files moved into an orientation folder.
    pub processed: usize,
    /// Files skipped because their extension is not supported.
    pub ignored: usize,
    /// Files whose dimensions could not be determined.
    pub extraction_failures: usize,
    /// Files that were classified but could not be moved.
    pub move_failures: usize,
    /// Media kinds seen among supported files.
    pub kinds: BTreeSet<MediaKind>,
}

impl ReorganizationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// The moves recorded so far.
    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut MoveLog {
        &mut self.log
    }

    /// Number of files that were processed, ignored, or failed.
    pub fn files_seen(&self) -> usize {
        self.processed + self.ignored + self.extraction_failures + self.move_failures
    }

    /// Number of files that were left in place because of an error.
    pub fn failures(&self) -> usize {
        self.extraction_failures + self.move_failures
    }
}

/// Errors that can occur while reorganizing files.
#[derive(Debug)]
pub enum OrganizeError {
    /// The file extension is not a supported media format.
    UnsupportedFormat { path: PathBuf },
    /// The displayed dimensions could not be determined.
    Extraction(ExtractError),
    /// Failed to create an orientation directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its orientation directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Videos are present but the external probe cannot run.
    ToolMissing { videos: usize },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat { path } => {
                write!(f, "Unsupported file type: {}", path.display())
            }
            Self::Extraction(e) => write!(f, "{}", e),
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::ToolMissing { videos } => {
                write!(
                    f,
                    "Cannot process videos: the video probe tool is not available ({} video file{} found)",
                    videos,
                    if *videos == 1 { "" } else { "s" }
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Extraction(e) => Some(e),
            Self::DirectoryCreationFailed { source, .. } | Self::InvalidBasePath { source, .. } => {
                Some(source)
            }
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            _ => None,
        }
    }
}

impl From<ExtractError> for OrganizeError {
    fn from(e: ExtractError) -> Self {
        Self::Extraction(e)
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Folder naming policy, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderMode {
    /// Orientation plus media kind, e.g. `Portrait-Photo`.
    Separate,
    /// Orientation plus a generic label, e.g. `Portrait-Media`.
    Combined,
}

/// Suffix used for every folder in combined mode.
pub const COMBINED_LABEL: &str = "Media";

impl FolderMode {
    /// Returns the folder name for a file of the given orientation and kind.
    ///
    /// ```
    /// use orisort::file_organizer::FolderMode;
    /// use orisort::media_format::MediaKind;
    /// use orisort::orientation::Orientation;
    ///
    /// assert_eq!(
    ///     FolderMode::Separate.folder_name(Orientation::Portrait, MediaKind::Video),
    ///     "Portrait-Video"
    /// );
    /// assert_eq!(
    ///     FolderMode::Combined.folder_name(Orientation::Square, MediaKind::Photo),
    ///     "Square-Media"
    /// );
    /// ```
    pub fn folder_name(&self, orientation: Orientation, kind: MediaKind) -> String {
        match self {
            FolderMode::Separate => format!("{}-{}", orientation.label(), kind.label()),
            FolderMode::Combined => format!("{}-{}", orientation.label(), COMBINED_LABEL),
        }
    }

    /// Picks separate mode when only one media kind is present; otherwise
    /// returns `None` and the caller has to decide.
    pub fn resolve(kinds: &BTreeSet<MediaKind>) -> Option<Self> {
        if kinds.len() > 1 {
            None
        } else {
            Some(FolderMode::Separate)
        }
    }
}

/// Returns true when `name` is one of the folder names this crate creates.
///
/// Directory expansion skips such folders so already sorted files are not
/// processed again.
pub fn is_output_folder_name(name: &str) -> bool {
    Orientation::ALL.iter().any(|orientation| {
        [MediaKind::Photo.label(), MediaKind::Video.label(), COMBINED_LABEL]
            .iter()
            .any(|suffix| name == format!("{}-{}", orientation.label(), suffix))
    })
}

/// A file to process together with the directory its orientation folder goes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_dir: base_dir.into(),
        }
    }
}

/// Where a file belongs, computed without touching the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub format: MediaFormat,
    pub dimensions: Dimensions,
    pub orientation: Orientation,
    pub folder: String,
}

/// What happened to a single file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file now lives at `destination`.
    Moved {
        placement: Placement,
        destination: PathBuf,
    },
    /// Unsupported extension; nothing was attempted.
    Ignored,
    /// Extraction or move failed; the file was left in place.
    Failed(OrganizeError),
}

/// Drives extraction, classification, allocation and moving for each file.
pub struct Reorganizer<E> {
    extractor: E,
    mapper: FormatMapper,
    mode: FolderMode,
}

impl<E: DimensionExtractor> Reorganizer<E> {
    pub fn new(extractor: E, mode: FolderMode) -> Self {
        Self {
            extractor,
            mapper: FormatMapper::default(),
            mode,
        }
    }

    /// Fails with [`OrganizeError::ToolMissing`] when any candidate is a video
    /// and videos cannot be examined. Call before processing anything.
    pub fn preflight(&self, candidates: &[Candidate]) -> OrganizeResult<()> {
        let videos = candidates
            .iter()
            .filter(|c| self.mapper.format_of(&c.path) == Some(MediaFormat::Video))
            .count();

        if videos > 0 && !self.extractor.supports_video() {
            return Err(OrganizeError::ToolMissing { videos });
        }
        Ok(())
    }

    /// Determines the folder a file belongs in.
    pub fn plan_file(&self, file_path: &Path) -> OrganizeResult<Placement> {
        let format =
            self.mapper
                .format_of(file_path)
                .ok_or_else(|| OrganizeError::UnsupportedFormat {
                    path: file_path.to_path_buf(),
                })?;

        let dimensions = self.extractor.extract(file_path, format)?;
        let orientation = Orientation::classify(dimensions);

        Ok(Placement {
            format,
            dimensions,
            orientation,
            folder: self.mode.folder_name(orientation, format.kind()),
        })
    }

    /// Processes one file and updates `run` accordingly.
    pub fn process_file(
        &self,
        run: &mut ReorganizationRun,
        file_path: &Path,
        base_dir: &Path,
    ) -> FileOutcome {
        let name = display_name(file_path);

        if let Some(format) = self.mapper.format_of(file_path) {
            run.kinds.insert(format.kind());
        }

        let placement = match self.plan_file(file_path) {
            Ok(placement) => placement,
            Err(OrganizeError::UnsupportedFormat { .. }) => {
                warn!("Unsupported file type: {}", name);
                run.ignored += 1;
                return FileOutcome::Ignored;
            }
            Err(e) => {
                error!("Failed to process {}: {}", name, e);
                run.extraction_failures += 1;
                return FileOutcome::Failed(e);
            }
        };

        match FileOrganizer::move_to_folder_with_record(base_dir, file_path, &placement.folder) {
            Ok(record) => {
                info!(
                    "Moved {} ({}) -> {}",
                    name, placement.dimensions, placement.folder
                );
                let destination = record.destination().to_path_buf();
                run.log_mut().push(record);
                run.processed += 1;
                FileOutcome::Moved {
                    placement,
                    destination,
                }
            }
            Err(e) => {
                error!("Failed to move {}: {}", name, e);
                run.move_failures += 1;
                FileOutcome::Failed(e)
            }
        }
    }

    /// Processes candidates in the given order.
    pub fn process_all<'a>(
        &self,
        run: &mut ReorganizationRun,
        candidates: impl IntoIterator<Item = &'a Candidate>,
    ) {
        for candidate in candidates {
            self.process_file(run, &candidate.path, &candidate.base_dir);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Moves a file, copying across file systems when a rename is not possible.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(source, destination, |from, to| fs::copy(from, to))
        }
        Err(e) => Err(e),
    }
}

/// Copies `source` to `destination` with `copy`, then removes `source`.
///
/// Whatever fails, the file ends up at exactly one of the two paths: a partial
/// or orphaned copy at `destination` is deleted before the error is returned.
fn copy_then_remove(
    source: &Path,
    destination: &Path,
    copy: impl FnOnce(&Path, &Path) -> io::Result<u64>,
) -> io::Result<()> {
    let result = copy(source, destination).and_then(|_| fs::remove_file(source));

    if let Err(e) = result {
        if destination.exists()
            && let Err(cleanup) = fs::remove_file(destination)
        {
            warn!(
                "Could not remove incomplete copy {}: {}",
                destination.display(),
                cleanup
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Moves files into orientation subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves a file into `folder_name` under `base_path` and returns the record.
    ///
    /// The folder is created if needed. The destination name comes from
    /// [`PathAllocator`], so an existing file is never overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use orisort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_to_folder_with_record(
    ///     Path::new("/path/to/photos"),
    ///     Path::new("/path/to/photos/IMG_0001.jpg"),
    ///     "Portrait-Photo",
    /// );
    ///
    /// match result {
    ///     Ok(record) => println!("Moved to {}", record.destination().display()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn move_to_folder_with_record(
        base_path: &Path,
        file_path: &Path,
        folder_name: &str,
    ) -> OrganizeResult<MoveRecord> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path is not an existing directory",
                ),
            });
        }

        let folder_path = base_path.join(folder_name);
        fs::create_dir_all(&folder_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: folder_path.clone(),
            source: e,
        })?;

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: folder_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let destination_path = PathAllocator::allocate(&folder_path, file_name);

        move_file(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Ok(MoveRecord::new(file_path.to_path_buf(), destination_path))
    }
}
