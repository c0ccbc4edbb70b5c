//! Configuration loading and file filtering.
//!
//! Settings are read from a TOML file. Besides the folder mode, the video probe
//! program and the log level, the configuration carries filter rules that
//! keep files out of a run before they are ever examined:
//! - Exact filename matching
//! - Glob pattern matching
//! - File extension matching
//! - Regex pattern matching
//! - Include (whitelist) rules that override exclude rules
//! - Optionally, skipping hidden files
//!
//! # Configuration File Format
//!
//! ```toml
//! [organize]
//! mode = "ask"            # ask | separate | combined
//!
//! [probe]
//! program = "ffmpeg"
//!
//! [logging]
//! level = "warn"
//!
//! [filters]
//! skip_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["**/exports/**"]
//! extensions = ["xmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".orisortrc.toml";

/// Errors that can occur during configuration loading and filtering.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// Unknown log level name.
    InvalidLogLevel(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(
                    f,
                    "Invalid glob pattern '{}': expected *.ext or dir/**",
                    pattern
                )
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidLogLevel(level) => {
                write!(
                    f,
                    "Invalid log level '{}': expected error, warn, info, debug or trace",
                    level
                )
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organize: OrganizeSettings,
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// How the folder naming policy is chosen when photos and videos are mixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// Ask once per run.
    #[default]
    Ask,
    /// Orientation and media kind, e.g. `Portrait-Video`.
    Separate,
    /// Orientation only, e.g. `Portrait-Media`.
    Combined,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeSettings {
    #[serde(default)]
    pub mode: ModeSetting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Program name or path of the ffmpeg-compatible probe.
    #[serde(default = "default_probe_program")]
    pub program: PathBuf,
}

fn default_probe_program() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            program: default_probe_program(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level name.
    pub fn max_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave out files whose name starts with ".". Off by default, so hidden
    /// media is sorted like any other file.
    #[serde(default)]
    pub skip_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g. "**/exports/**").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g. "xmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.orisortrc.toml` in the current directory
    /// 3. Look for `~/.config/orisort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("orisort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// The filter rule that left a file out of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Hidden,
    FileName,
    Extension,
    Pattern,
    Regex,
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = match self {
            Exclusion::Hidden => "hidden file",
            Exclusion::FileName => "excluded file name",
            Exclusion::Extension => "excluded extension",
            Exclusion::Pattern => "excluded pattern",
            Exclusion::Regex => "excluded regex",
        };
        f.write_str(rule)
    }
}

/// Filter rules with every pattern compiled once up front.
pub struct CompiledFilters {
    skip_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden_files: rules.skip_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Returns true if `file_path` takes part in a run.
    pub fn should_include(&self, file_path: &Path) -> bool {
        self.exclusion(file_path).is_none()
    }

    /// Returns the rule that leaves `file_path` out, if any. Include patterns
    /// win over every exclude rule.
    pub fn exclusion(&self, file_path: &Path) -> Option<Exclusion> {
        if self.include_patterns.iter().any(|p| p.matches_path(file_path)) {
            return None;
        }

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let extension = file_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        if self.skip_hidden_files && file_name.starts_with('.') {
            Some(Exclusion::Hidden)
        } else if self.exclude_filenames.contains(file_name.as_ref()) {
            Some(Exclusion::FileName)
        } else if extension.is_some_and(|ext| self.exclude_extensions.contains(&ext)) {
            Some(Exclusion::Extension)
        } else if self.exclude_patterns.iter().any(|p| p.matches_path(file_path)) {
            Some(Exclusion::Pattern)
        } else if self.exclude_regexes.iter().any(|r| r.is_match(&file_name)) {
            Some(Exclusion::Regex)
        } else {
            None
        }
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            skip_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: FilterRules) -> CompiledFilters {
        Config {
            filters: rules,
            ..Default::default()
        }
        .compile_filters()
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.organize.mode, ModeSetting::Ask);
        assert_eq!(config.probe.program, PathBuf::from("ffmpeg"));
        assert_eq!(config.logging.max_level().unwrap(), tracing::Level::WARN);
        assert!(!config.filters.skip_hidden_files);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            [organize]
            mode = "combined"

            [probe]
            program = "/opt/ffmpeg/bin/ffmpeg"

            [logging]
            level = "debug"

            [filters]
            skip_hidden_files = true

            [filters.exclude]
            extensions = ["xmp"]
            "#,
        )
        .unwrap();

        assert_eq!(config.organize.mode, ModeSetting::Combined);
        assert_eq!(config.probe.program, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.logging.max_level().unwrap(), tracing::Level::DEBUG);
        assert!(config.filters.skip_hidden_files);
        assert_eq!(config.filters.exclude.extensions, vec!["xmp".to_string()]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml("[organize]\nmode = \"separate\"\n").unwrap();
        assert_eq!(config.organize.mode, ModeSetting::Separate);
        assert_eq!(config.probe.program, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Config::from_toml("[organize]\nmode = \"sideways\"\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_invalid_log_level() {
        let config = Config::from_toml("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(
            config.logging.max_level(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = Config::load(Some(Path::new("/non/existent/orisort.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_hidden_file_included_by_default() {
        let compiled = compile(FilterRules::default());

        assert!(compiled.should_include(Path::new(".beach.png")));
        assert!(compiled.should_include(Path::new("album/.IMG_0001.JPG")));
        assert_eq!(CompiledFilters::default().exclusion(Path::new(".beach.png")), None);
    }

    #[test]
    fn test_hidden_file_skipped_when_configured() {
        let compiled = compile(FilterRules {
            skip_hidden_files: true,
            ..Default::default()
        });

        assert_eq!(
            compiled.exclusion(Path::new("album/.hidden.jpg")),
            Some(Exclusion::Hidden)
        );
        assert!(compiled.should_include(Path::new("album/visible.jpg")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["cover.jpg".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("album/cover.jpg")));
        assert!(compiled.should_include(Path::new("album/photo.jpg")));
    }

    #[test]
    fn test_exclude_extensions() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["png".to_string(), ".MKV".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("screenshot.png")));
        assert!(!compiled.should_include(Path::new("screenshot.PNG")));
        assert!(!compiled.should_include(Path::new("movie.mkv")));
        assert!(compiled.should_include(Path::new("photo.jpg")));
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["**/exports/**".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("trip/exports/a.jpg")));
        assert!(compiled.should_include(Path::new("trip/my_exports/a.jpg")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                regex: vec![r"^Screenshot_.*\.png$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("Screenshot_2024.png")));
        assert!(compiled.should_include(Path::new("IMG_2024.png")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["png".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec!["**/keep-*.png".to_string()],
            },
            ..Default::default()
        });

        assert!(compiled.should_include(Path::new("album/keep-me.png")));
        assert!(!compiled.should_include(Path::new("album/drop-me.png")));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let bad_regex = Config {
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(bad_regex.compile_filters().is_err());

        let bad_glob = Config {
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(bad_glob.compile_filters().is_err());
    }
}
