//! Video probing through an external media tool.
//!
//! Videos have no metadata reader in this crate. Instead an ffmpeg-compatible
//! program is run against the file and its diagnostic output is parsed into a
//! [`ProbeReport`]. The rest of the crate only sees the report, so the tool can
//! be swapped by implementing [`MediaProbe`].

use crate::extractor::ExtractError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::debug;

static VIDEO_RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Stream #\d+:\d+.*?: Video: .*?\b(\d{2,5})x(\d{2,5})\b")
        .expect("valid resolution regex")
});

static ROTATION_ANGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\brotate\s*:\s*|\brotation of\s+)(-?\d+(?:\.\d+)?)")
        .expect("valid rotation regex")
});

/// Structured result of probing a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReport {
    /// Stored frame width of the first video stream.
    pub width: u32,
    /// Stored frame height of the first video stream.
    pub height: u32,
    /// Rotation annotation in degrees, when the container carries one.
    pub rotation: Option<f64>,
}

/// A capability that can report a video's stored resolution and rotation.
pub trait MediaProbe {
    /// Probes a single video file.
    fn probe(&self, path: &Path) -> Result<ProbeReport, ExtractError>;

    /// Returns true when the probe can run at all on this machine.
    fn is_available(&self) -> bool;
}

/// Probes videos by running `ffmpeg -hide_banner -i <file>` and reading stderr.
#[derive(Debug, Clone)]
pub struct FfmpegProbe {
    program: PathBuf,
}

impl FfmpegProbe {
    /// Uses the given program name or path instead of `ffmpeg`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegProbe {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaProbe for FfmpegProbe {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ExtractError> {
        // Without an output file ffmpeg exits non-zero after printing the
        // input description, so the status is ignored.
        let output = Command::new(&self.program)
            .arg("-hide_banner")
            .arg("-i")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExtractError::Probe {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {}", self.program.display(), e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let report = parse_probe_output(&stderr).ok_or_else(|| ExtractError::NoResolution {
            path: path.to_path_buf(),
        })?;

        debug!(
            "Probed {}: {}x{} rotation {:?}",
            path.display(),
            report.width,
            report.height,
            report.rotation
        );
        Ok(report)
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Parses ffmpeg's input description.
///
/// Takes the first video stream's `WxH` and the first rotation annotation,
/// either the legacy `rotate : 90` metadata line or the newer
/// `displaymatrix: rotation of -90.00 degrees` side data. Returns `None` when
/// no resolution is present.
///
/// # Examples
///
/// ```
/// use orisort::probe::parse_probe_output;
///
/// let text = "  Stream #0:0(und): Video: h264 (High), yuv420p, 1920x1080, 30 fps\n\
///             \x20     rotate          : 90\n";
/// let report = parse_probe_output(text).unwrap();
/// assert_eq!((report.width, report.height), (1920, 1080));
/// assert_eq!(report.rotation, Some(90.0));
/// ```
pub fn parse_probe_output(text: &str) -> Option<ProbeReport> {
    let caps = VIDEO_RESOLUTION.captures(text)?;
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;

    let rotation = ROTATION_ANGLE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    Some(ProbeReport {
        width,
        height,
        rotation,
    })
}
