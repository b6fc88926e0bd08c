use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::{DirEntry, WalkDir};

/// Extension of the score files being watched.
pub const INPUT_EXTENSION: &str = "mscz";

/// Recursively collect every input file under `root`, sorted by walk order.
/// Directories or files matching an ignore pattern are skipped, and so are
/// entries that cannot be read.
pub fn find_input_files(root: &Path, ignore_patterns: &[Pattern]) -> Vec<PathBuf> {
    let is_ignored = |path: &Path| ignore_patterns.iter().any(|p| p.matches_path(path));

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                error!("Error reading entry under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| is_file_like(entry) && is_input_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Regular files, plus symlinks that do not point at a directory. Dangling
/// links are kept so the read failure shows up for that file.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

fn is_input_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == INPUT_EXTENSION)
}
