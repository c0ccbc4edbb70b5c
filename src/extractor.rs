/// Displayed-dimension extraction for every supported media format.
///
/// Stored pixel geometry often differs from what a viewer shows: cameras write
/// an EXIF rotation tag instead of rotating pixels, RAW decoders report sensor
/// geometry plus a flip indicator, and phones tag videos with a rotation angle.
/// Each strategy here reads the stored size and applies its rotation
/// correction exactly once.
use crate::media_format::{MediaFormat, RawVariant};
use crate::orientation::Dimensions;
use crate::probe::{FfmpegProbe, MediaProbe};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Errors raised while determining a file's displayed dimensions.
#[derive(Debug)]
pub enum ExtractError {
    /// The file could not be opened or read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The container could not be decoded.
    Decode { path: PathBuf, reason: String },
    /// The external video probe could not be run.
    Probe { path: PathBuf, reason: String },
    /// The probe ran but reported no video resolution.
    NoResolution { path: PathBuf },
    /// The stored size was zero or out of range.
    InvalidDimensions {
        path: PathBuf,
        width: u64,
        height: u64,
    },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            Self::Decode { path, reason } => {
                write!(f, "Failed to decode {}: {}", path.display(), reason)
            }
            Self::Probe { path, reason } => {
                write!(f, "Failed to probe {}: {}", path.display(), reason)
            }
            Self::NoResolution { path } => {
                write!(f, "No video resolution reported for {}", path.display())
            }
            Self::InvalidDimensions {
                path,
                width,
                height,
            } => {
                write!(
                    f,
                    "Invalid dimensions {}x{} in {}",
                    width,
                    height,
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Source of displayed dimensions for a single file.
///
/// The reorganizer only depends on this trait, so tests can substitute fixed
/// answers for formats that are impractical to fabricate on disk.
pub trait DimensionExtractor {
    /// Returns the displayed dimensions of `path`, which has format `format`.
    fn extract(&self, path: &Path, format: MediaFormat) -> Result<Dimensions, ExtractError>;

    /// Returns false when video files cannot be examined at all.
    fn supports_video(&self) -> bool {
        true
    }
}

/// Default extractor: `image` + `kamadak-exif` for photos, `rawloader` for RAW
/// captures and a [`MediaProbe`] for videos.
#[derive(Debug, Clone, Default)]
pub struct MediaExtractor<P = FfmpegProbe> {
    probe: P,
}

impl<P: MediaProbe> MediaExtractor<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    fn video_dimensions(&self, path: &Path) -> Result<Dimensions, ExtractError> {
        let report = self.probe.probe(path)?;
        let stored = checked_dimensions(path, report.width.into(), report.height.into())?;
        Ok(apply_rotation_angle(stored, report.rotation))
    }
}

impl<P: MediaProbe> DimensionExtractor for MediaExtractor<P> {
    fn extract(&self, path: &Path, format: MediaFormat) -> Result<Dimensions, ExtractError> {
        match format {
            MediaFormat::StandardImage => standard_image_dimensions(path),
            MediaFormat::RawImage(variant) => raw_image_dimensions(path, variant),
            MediaFormat::Video => self.video_dimensions(path),
        }
    }

    fn supports_video(&self) -> bool {
        self.probe.is_available()
    }
}

/// Swaps width and height when an EXIF orientation value (1..=8) describes a
/// quarter turn, i.e. one of 5, 6, 7 or 8. Missing tags mean "as stored".
///
/// ```
/// use orisort::extractor::apply_exif_orientation;
/// use orisort::orientation::Dimensions;
///
/// let stored = Dimensions::new(4000, 3000).unwrap();
/// assert_eq!(apply_exif_orientation(stored, Some(6)), stored.swapped());
/// assert_eq!(apply_exif_orientation(stored, Some(3)), stored);
/// assert_eq!(apply_exif_orientation(stored, None), stored);
/// ```
pub fn apply_exif_orientation(stored: Dimensions, tag: Option<u32>) -> Dimensions {
    match tag {
        Some(5..=8) => stored.swapped(),
        _ => stored,
    }
}

/// Picks the orientation value that applies to a RAW capture.
///
/// DNG files carry a regular EXIF tag and the decoder's flip indicator is not
/// consulted for them. Every other variant uses the flip indicator. `None`
/// means the capture is shown as stored.
pub fn raw_orientation(
    variant: RawVariant,
    exif_tag: Option<u32>,
    flip: Option<u32>,
) -> Option<u32> {
    if variant.has_exif_orientation() {
        exif_tag
    } else {
        flip
    }
}

/// Returns true when a rotation angle in degrees is a quarter turn, in either
/// direction and modulo full turns. The angle is rounded to whole degrees.
pub fn is_quarter_turn(angle: f64) -> bool {
    let magnitude = (angle.abs().round() as u64) % 360;
    magnitude == 90 || magnitude == 270
}

/// Swaps width and height when the video rotation angle is a quarter turn.
pub fn apply_rotation_angle(stored: Dimensions, angle: Option<f64>) -> Dimensions {
    match angle {
        Some(angle) if is_quarter_turn(angle) => stored.swapped(),
        _ => stored,
    }
}

/// Maps a RAW decoder's flip indicator to EXIF orientation numbering.
///
/// Returns `None` when the decoder could not determine it.
pub fn flip_indicator(orientation: &rawloader::Orientation) -> Option<u32> {
    use rawloader::Orientation;

    match orientation {
        Orientation::Normal => Some(1),
        Orientation::HorizontalFlip => Some(2),
        Orientation::Rotate180 => Some(3),
        Orientation::VerticalFlip => Some(4),
        Orientation::Transpose => Some(5),
        Orientation::Rotate90 => Some(6),
        Orientation::Transverse => Some(7),
        Orientation::Rotate270 => Some(8),
        Orientation::Unknown => None,
    }
}

fn checked_dimensions(path: &Path, width: u64, height: u64) -> Result<Dimensions, ExtractError> {
    let invalid = || ExtractError::InvalidDimensions {
        path: path.to_path_buf(),
        width,
        height,
    };
    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    Dimensions::new(w, h).ok_or_else(invalid)
}

fn read_exif(path: &Path) -> Result<exif::Exif, exif::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader)
}

fn exif_orientation(exif: &exif::Exif) -> Option<u32> {
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn exif_pixel_dimensions(exif: &exif::Exif) -> Option<(u32, u32)> {
    let get = |tag| {
        exif.get_field(tag, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
    };

    let width = get(exif::Tag::PixelXDimension).or_else(|| get(exif::Tag::ImageWidth))?;
    let height = get(exif::Tag::PixelYDimension).or_else(|| get(exif::Tag::ImageLength))?;
    Some((width, height))
}

fn standard_image_dimensions(path: &Path) -> Result<Dimensions, ExtractError> {
    let exif = match read_exif(path) {
        Ok(exif) => Some(exif),
        Err(e) => {
            debug!("No EXIF block in {}: {}", path.display(), e);
            None
        }
    };

    let (width, height) = match image::image_dimensions(path) {
        Ok(size) => size,
        Err(image::ImageError::IoError(source)) => {
            return Err(ExtractError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        // The decoder has no HEIC support; the EXIF block still records the size.
        Err(e) => exif
            .as_ref()
            .and_then(exif_pixel_dimensions)
            .ok_or_else(|| ExtractError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?,
    };

    let stored = checked_dimensions(path, width.into(), height.into())?;
    let tag = exif.as_ref().and_then(exif_orientation);
    debug!(
        "{}: stored {} orientation tag {:?}",
        path.display(),
        stored,
        tag
    );
    Ok(apply_exif_orientation(stored, tag))
}

fn raw_image_dimensions(path: &Path, variant: RawVariant) -> Result<Dimensions, ExtractError> {
    let raw = rawloader::decode_file(path).map_err(|e| ExtractError::Decode {
        path: path.to_path_buf(),
        reason: format!("{:?}", e),
    })?;
    let sensor = checked_dimensions(path, raw.width as u64, raw.height as u64)?;

    let exif_tag = if variant.has_exif_orientation() {
        match read_exif(path) {
            Ok(exif) => exif_orientation(&exif),
            Err(e) => {
                warn!(
                    "Could not read EXIF orientation of {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    } else {
        None
    };
    let indicator = raw_orientation(variant, exif_tag, flip_indicator(&raw.orientation));

    debug!(
        "{}: sensor {} orientation {:?}",
        path.display(),
        sensor,
        indicator
    );
    Ok(apply_exif_orientation(sensor, indicator))
}
