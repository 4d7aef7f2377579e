//! Module to list acquired tracks in a destination directory

use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::storage::error::StorageError;

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac", "opus"];

pub fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MUSIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists music files directly inside `dir`, sorted by file name.
///
/// Because file names start with the zero-padded order index, this is also
/// playback order.
pub fn list_tracks(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut paths = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|e| e.map_err(|err| StorageError::Walk(dir.to_path_buf(), err)))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| is_music_file(p))
        .collect::<Vec<PathBuf>>();

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::storage::fs::{is_music_file, list_tracks};

    #[test]
    fn lists_only_music_files_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        std::fs::write(root.join("10. Ten.mp3"), b"a").unwrap();
        std::fs::write(root.join("02. Two.mp3"), b"b").unwrap();
        std::fs::write(root.join("01. One.flac"), b"c").unwrap();
        std::fs::write(root.join("manifest.json"), b"{}").unwrap();
        std::fs::write(root.join("notes.txt"), b"d").unwrap();
        std::fs::create_dir(root.join("03. Not a file.mp3")).unwrap();

        let sub = root.join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("00. Deep.mp3"), b"e").unwrap();

        let names: Vec<_> = list_tracks(root)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["01. One.flac", "02. Two.mp3", "10. Ten.mp3"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(list_tracks(&tmp.path().join("absent")).is_err());
    }

    #[test]
    fn music_extension_check_ignores_case() {
        assert!(is_music_file(std::path::Path::new("01. Song.MP3")));
        assert!(!is_music_file(std::path::Path::new("01. Song.webm")));
    }
}
