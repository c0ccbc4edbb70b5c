//! Expansion of command line paths into the files of a run.

use crate::config::CompiledFilters;
use crate::file_organizer::{Candidate, is_output_folder_name};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Result of expanding the input paths.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Files to process, in the order they will be processed.
    pub candidates: Vec<Candidate>,
    /// Input paths that did not exist.
    pub missing: Vec<PathBuf>,
    /// Files left out by the filter rules.
    pub filtered: usize,
}

/// Turns the given files and directories into candidates.
///
/// A file given directly is placed relative to its parent directory.
/// Directories are walked recursively in file name order, and each file found
/// is placed relative to the directory that contains it. Orientation folders
/// left by an earlier run are never entered.
pub fn expand_inputs<P: AsRef<Path>>(paths: &[P], filters: &CompiledFilters) -> Expansion {
    let mut expansion = Expansion::default();

    for path in paths {
        let path = path.as_ref();

        if path.is_file() {
            push_file(path, filters, &mut expansion);
        } else if path.is_dir() {
            walk_directory(path, filters, &mut expansion);
        } else {
            warn!("Path does not exist: {}", path.display());
            expansion.missing.push(path.to_path_buf());
        }
    }

    expansion
}

fn walk_directory(root: &Path, filters: &CompiledFilters, expansion: &mut Expansion) {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_output_folder(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        push_file(entry.path(), filters, expansion);
    }
}

fn push_file(path: &Path, filters: &CompiledFilters, expansion: &mut Expansion) {
    match filters.exclusion(path) {
        Some(rule) => {
            debug!("Filtered out {} ({})", path.display(), rule);
            expansion.filtered += 1;
        }
        None => expansion
            .candidates
            .push(Candidate::new(path, parent_dir(path))),
    }
}

fn is_output_folder(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(is_output_folder_name)
}

/// The parent of a relative file name such as `a.jpg` is `.`.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ExcludeRules, FilterRules};
    use std::fs;
    use tempfile::TempDir;

    fn names(expansion: &Expansion) -> Vec<String> {
        expansion
            .candidates
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_walks_recursively_in_name_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("b.jpg"), "b").unwrap();
        fs::write(root.join("a.jpg"), "a").unwrap();
        fs::write(root.join("sub").join("c.mp4"), "c").unwrap();

        let expansion = expand_inputs(&[root], &CompiledFilters::default());

        assert_eq!(names(&expansion), vec!["a.jpg", "b.jpg", "c.mp4"]);
        assert_eq!(expansion.candidates[2].base_dir, root.join("sub"));
        assert_eq!(expansion.candidates[0].base_dir, root);
    }

    #[test]
    fn test_skips_orientation_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("Portrait-Photo")).unwrap();
        fs::create_dir(root.join("Square-Media")).unwrap();
        fs::create_dir(root.join("Portraits")).unwrap();
        fs::write(root.join("Portrait-Photo").join("sorted.jpg"), "x").unwrap();
        fs::write(root.join("Square-Media").join("sorted.mp4"), "x").unwrap();
        fs::write(root.join("Portraits").join("new.jpg"), "x").unwrap();

        let expansion = expand_inputs(&[root], &CompiledFilters::default());

        assert_eq!(names(&expansion), vec!["new.jpg"]);
    }

    #[test]
    fn test_orientation_folder_given_directly_is_walked() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("Landscape-Photo");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("wide.jpg"), "x").unwrap();

        let expansion = expand_inputs(&[&folder], &CompiledFilters::default());

        assert_eq!(names(&expansion), vec!["wide.jpg"]);
    }

    #[test]
    fn test_file_argument_uses_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, "x").unwrap();

        let expansion = expand_inputs(&[&file], &CompiledFilters::default());

        assert_eq!(expansion.candidates, vec![Candidate::new(&file, temp_dir.path())]);
    }

    #[test]
    fn test_missing_path_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        let expansion = expand_inputs(&[&missing], &CompiledFilters::default());

        assert!(expansion.candidates.is_empty());
        assert_eq!(expansion.missing, vec![missing]);
    }

    #[test]
    fn test_hidden_files_are_kept_by_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join(".beach.png"), "x").unwrap();
        fs::write(root.join("seen.png"), "x").unwrap();

        let expansion = expand_inputs(&[root], &CompiledFilters::default());
        assert_eq!(names(&expansion), vec![".beach.png", "seen.png"]);
        assert_eq!(expansion.filtered, 0);

        let direct = expand_inputs(&[root.join(".beach.png")], &CompiledFilters::default());
        assert_eq!(names(&direct), vec![".beach.png"]);
    }

    #[test]
    fn test_filters_are_applied() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join(".hidden.jpg"), "x").unwrap();
        fs::write(root.join("sidecar.xmp"), "x").unwrap();
        fs::write(root.join("photo.jpg"), "x").unwrap();

        let config = Config {
            filters: FilterRules {
                skip_hidden_files: true,
                exclude: ExcludeRules {
                    extensions: vec!["xmp".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let filters = config.compile_filters().unwrap();

        let expansion = expand_inputs(&[root], &filters);

        assert_eq!(names(&expansion), vec!["photo.jpg"]);
        assert_eq!(expansion.filtered, 2);
    }

    #[test]
    fn test_parent_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("a.jpg")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("x/a.jpg")), PathBuf::from("x"));
    }
}
