use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Name given to an output directory created by the resolver.
pub const OUTPUT_DIR_NAME: &str = "pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub path: PathBuf,
    /// The directory did not exist before this call, so it holds no outputs yet.
    pub freshly_created: bool,
    /// Every matching directory found, in walk order. More than one means the
    /// song directory is ambiguous.
    pub candidates: Vec<PathBuf>,
}

impl OutputLocation {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

fn is_output_dir_name(name: &str) -> bool {
    matches!(name, "pdf" | "pdfs")
}

/// Find the `pdf`/`pdfs` directory under `song_dir` (searching its whole
/// subtree), or create `song_dir/pdf` when there is none.
pub fn resolve_output_dir(song_dir: &Path) -> Result<OutputLocation> {
    let candidates = find_output_dirs(song_dir);

    let Some(first) = candidates.first().cloned() else {
        let path = song_dir.join(OUTPUT_DIR_NAME);
        fs::create_dir(&path).map_err(|source| Error::OutputDir {
            path: path.clone(),
            source,
        })?;
        return Ok(OutputLocation {
            path,
            freshly_created: true,
            candidates,
        });
    };

    if candidates.len() > 1 {
        let names: Vec<String> = candidates
            .iter()
            .map(|c| c.strip_prefix(song_dir).unwrap_or(c).display().to_string())
            .collect();
        warn!(
            "Found more than one pdf folder for song {}: {:?}. You should have only one folder. Will use {}.",
            song_dir.display(),
            names,
            names[0]
        );
    }

    Ok(OutputLocation {
        path: first,
        freshly_created: false,
        candidates,
    })
}

/// Matches ordered shallowest first, then by name-sorted walk order, so a
/// direct child of `song_dir` always wins over a nested match.
fn find_output_dirs(song_dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<(usize, PathBuf)> = WalkDir::new(song_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping entry under {}: {}", song_dir.display(), err);
                None
            }
        })
        // path().is_dir() follows symlinked directories
        .filter(|entry| entry.file_type().is_dir() || entry.path().is_dir())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_output_dir_name))
        .map(|entry| (entry.depth(), entry.into_path()))
        .collect();
    found.sort_by_key(|(depth, _)| *depth);
    found.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_pdf_dir_when_missing() {
        let dir = tempdir().unwrap();
        let location = resolve_output_dir(dir.path()).unwrap();
        assert_eq!(location.path, dir.path().join("pdf"));
        assert!(location.freshly_created);
        assert!(location.path.is_dir());

        let again = resolve_output_dir(dir.path()).unwrap();
        assert_eq!(again.path, location.path);
        assert!(!again.freshly_created);
        assert_eq!(again.candidates.len(), 1);
    }

    #[test]
    fn test_reuses_plural_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pdfs")).unwrap();
        let location = resolve_output_dir(dir.path()).unwrap();
        assert_eq!(location.path, dir.path().join("pdfs"));
        assert!(!location.freshly_created);
        assert!(!location.is_ambiguous());
        assert!(!dir.path().join("pdf").exists());
    }

    #[test]
    fn test_finds_nested_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("exports").join("pdf")).unwrap();
        let location = resolve_output_dir(dir.path()).unwrap();
        assert_eq!(location.path, dir.path().join("exports").join("pdf"));
        assert!(!location.freshly_created);
    }

    #[test]
    fn test_names_match_exactly() {
        let dir = tempdir().unwrap();
        for name in ["PDF", "old-pdf", "pdfs2", "mypdfs"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("pdfs"), "a file, not a directory").unwrap();

        let location = resolve_output_dir(dir.path()).unwrap();
        assert!(location.freshly_created);
        assert_eq!(location.path, dir.path().join("pdf"));
    }

    #[test]
    fn test_ambiguous_picks_first_in_walk_order() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pdfs")).unwrap();
        fs::create_dir(dir.path().join("pdf")).unwrap();

        let location = resolve_output_dir(dir.path()).unwrap();
        assert!(location.is_ambiguous());
        assert_eq!(location.path, dir.path().join("pdf"));
        assert_eq!(
            location.candidates,
            vec![dir.path().join("pdf"), dir.path().join("pdfs")]
        );
        assert!(!location.freshly_created);
    }

    #[test]
    fn test_direct_child_beats_nested_match() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Parts").join("pdf")).unwrap();
        fs::create_dir(dir.path().join("pdfs")).unwrap();

        let location = resolve_output_dir(dir.path()).unwrap();
        assert_eq!(location.path, dir.path().join("pdfs"));
        assert_eq!(
            location.candidates,
            vec![dir.path().join("pdfs"), dir.path().join("Parts").join("pdf")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_pdf_dir_is_used() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("shared-output");
        let song_dir = dir.path().join("SongA");
        fs::create_dir(&target).unwrap();
        fs::create_dir(&song_dir).unwrap();
        std::os::unix::fs::symlink(&target, song_dir.join("pdf")).unwrap();

        let location = resolve_output_dir(&song_dir).unwrap();
        assert_eq!(location.path, song_dir.join("pdf"));
        assert!(!location.freshly_created);
    }

    #[test]
    fn test_missing_song_dir_is_error() {
        let dir = tempdir().unwrap();
        let err = resolve_output_dir(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, Error::OutputDir { .. }));
    }
}
