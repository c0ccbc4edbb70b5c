//! orisort - sort photos and videos by orientation
//!
//! This library determines the displayed orientation of images, RAW captures
//! and videos (taking EXIF, RAW and container rotation into account), moves
//! each file into a `Portrait`, `Landscape` or `Square` folder, and can undo
//! every move of a run.

pub mod cli;
pub mod config;
pub mod extractor;
pub mod file_organizer;
pub mod logging;
pub mod media_format;
pub mod orientation;
pub mod output;
pub mod path_allocator;
pub mod probe;
pub mod undo;
pub mod walker;

pub use config::{CompiledFilters, Config, ConfigError, ModeSetting};
pub use extractor::{DimensionExtractor, ExtractError, MediaExtractor};
pub use file_organizer::{
    Candidate, FileOrganizer, FileOutcome, FolderMode, MoveRecord, OrganizeError,
    ReorganizationRun, Reorganizer,
};
pub use media_format::{FormatMapper, MediaFormat, MediaKind, RawVariant};
pub use orientation::{Dimensions, Orientation};
pub use path_allocator::PathAllocator;
pub use probe::{FfmpegProbe, MediaProbe, ProbeReport};
pub use undo::{UndoEngine, UndoReport};

pub use cli::{Cli, run_cli};
