/// Media format detection for orientation sorting.
///
/// Every supported file extension maps to exactly one [`MediaFormat`]. The
/// format decides which dimension strategy is used and whether the file counts
/// as a photo or a video when folder names are built.
///
/// # Examples
///
/// ```
/// use orisort::media_format::{FormatMapper, MediaFormat, MediaKind, RawVariant};
///
/// let mapper = FormatMapper::default();
/// assert_eq!(mapper.extension_to_format("JPG"), Some(MediaFormat::StandardImage));
/// assert_eq!(mapper.extension_to_format("dng"), Some(MediaFormat::RawImage(RawVariant::Dng)));
/// assert_eq!(mapper.extension_to_format("txt"), None);
/// assert_eq!(MediaFormat::Video.kind(), MediaKind::Video);
/// ```
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// RAW container families that need distinct orientation handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawVariant {
    /// Adobe DNG. Carries a regular TIFF/EXIF orientation tag.
    Dng,
    /// Sony ARW
    Arw,
    /// Canon CR2
    Cr2,
    /// Nikon NEF
    Nef,
    /// Fujifilm RAF
    Raf,
    /// Sony SR2
    Sr2,
    /// Pentax PEF
    Pef,
    /// Olympus ORF
    Orf,
}

impl RawVariant {
    /// Returns true when the variant's orientation comes from an embedded EXIF
    /// block rather than the decoder's flip indicator.
    pub fn has_exif_orientation(&self) -> bool {
        matches!(self, RawVariant::Dng)
    }
}

/// Format category of a media file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    /// Common photo containers (JPEG, PNG, HEIC, ...)
    StandardImage,
    /// Camera RAW containers
    RawImage(RawVariant),
    /// Video containers, probed through an external tool
    Video,
}

impl MediaFormat {
    /// Returns the broad media kind used in folder names.
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaFormat::StandardImage | MediaFormat::RawImage(_) => MediaKind::Photo,
            MediaFormat::Video => MediaKind::Video,
        }
    }
}

/// Photo or video. Orders photos first so summaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Label used as the folder name suffix in separate mode.
    ///
    /// ```
    /// use orisort::media_format::MediaKind;
    ///
    /// assert_eq!(MediaKind::Photo.label(), "Photo");
    /// assert_eq!(MediaKind::Video.label(), "Video");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps lowercase file extensions to media formats.
#[derive(Debug, Clone)]
pub struct FormatMapper {
    extension_map: HashMap<String, MediaFormat>,
}

impl FormatMapper {
    /// Creates a mapper holding every supported extension.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        mapper.populate_standard_mappings();
        mapper
    }

    fn populate_standard_mappings(&mut self) {
        for ext in ["jpg", "jpeg", "png", "bmp", "tiff", "webp", "heic"] {
            self.add_extension_mapping(ext, MediaFormat::StandardImage);
        }

        self.add_extension_mapping("dng", MediaFormat::RawImage(RawVariant::Dng));
        self.add_extension_mapping("arw", MediaFormat::RawImage(RawVariant::Arw));
        self.add_extension_mapping("cr2", MediaFormat::RawImage(RawVariant::Cr2));
        self.add_extension_mapping("nef", MediaFormat::RawImage(RawVariant::Nef));
        self.add_extension_mapping("raf", MediaFormat::RawImage(RawVariant::Raf));
        self.add_extension_mapping("sr2", MediaFormat::RawImage(RawVariant::Sr2));
        self.add_extension_mapping("pef", MediaFormat::RawImage(RawVariant::Pef));
        self.add_extension_mapping("orf", MediaFormat::RawImage(RawVariant::Orf));

        for ext in [
            "mp4", "mov", "avi", "mkv", "flv", "wmv", "mpeg", "mpg", "m4v", "3gp",
        ] {
            self.add_extension_mapping(ext, MediaFormat::Video);
        }
    }

    /// Adds or replaces a file extension to format mapping.
    pub fn add_extension_mapping(&mut self, ext: &str, format: MediaFormat) {
        self.extension_map.insert(ext.to_lowercase(), format);
    }

    /// Maps a bare extension (no leading dot) to a format, case-insensitively.
    pub fn extension_to_format(&self, ext: &str) -> Option<MediaFormat> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Determines the format of a file from its path.
    ///
    /// Returns `None` for files without an extension or with an unsupported one.
    pub fn format_of(&self, path: &Path) -> Option<MediaFormat> {
        let ext = path.extension()?.to_str()?;
        self.extension_to_format(ext)
    }
}

impl Default for FormatMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_extensions() {
        let mapper = FormatMapper::default();
        for ext in ["jpg", "jpeg", "png", "bmp", "tiff", "webp", "heic"] {
            assert_eq!(
                mapper.extension_to_format(ext),
                Some(MediaFormat::StandardImage),
                "{ext}"
            );
        }
    }

    #[test]
    fn test_raw_extensions() {
        let mapper = FormatMapper::default();
        assert_eq!(
            mapper.extension_to_format("dng"),
            Some(MediaFormat::RawImage(RawVariant::Dng))
        );
        assert_eq!(
            mapper.extension_to_format("NEF"),
            Some(MediaFormat::RawImage(RawVariant::Nef))
        );
        assert_eq!(
            mapper.extension_to_format("Orf"),
            Some(MediaFormat::RawImage(RawVariant::Orf))
        );
    }

    #[test]
    fn test_video_extensions() {
        let mapper = FormatMapper::default();
        for ext in [
            "mp4", "mov", "avi", "mkv", "flv", "wmv", "mpeg", "mpg", "m4v", "3gp",
        ] {
            assert_eq!(mapper.extension_to_format(ext), Some(MediaFormat::Video));
        }
    }

    #[test]
    fn test_unsupported_extensions() {
        let mapper = FormatMapper::default();
        assert_eq!(mapper.extension_to_format("txt"), None);
        assert_eq!(mapper.extension_to_format("gif"), None);
        assert_eq!(mapper.format_of(Path::new("README")), None);
        assert_eq!(mapper.format_of(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_format_of_is_case_insensitive() {
        let mapper = FormatMapper::default();
        assert_eq!(
            mapper.format_of(Path::new("/photos/IMG_0001.JPG")),
            Some(MediaFormat::StandardImage)
        );
        assert_eq!(
            mapper.format_of(Path::new("clip.MoV")),
            Some(MediaFormat::Video)
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(MediaFormat::StandardImage.kind(), MediaKind::Photo);
        assert_eq!(
            MediaFormat::RawImage(RawVariant::Cr2).kind(),
            MediaKind::Photo
        );
        assert_eq!(MediaFormat::Video.kind(), MediaKind::Video);
    }

    #[test]
    fn test_only_dng_uses_exif() {
        assert!(RawVariant::Dng.has_exif_orientation());
        assert!(!RawVariant::Arw.has_exif_orientation());
        assert!(!RawVariant::Pef.has_exif_orientation());
    }
}
