use std::path::{Path, PathBuf};

/// Per-run values every stage needs, passed explicitly instead of
/// living in globals.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub working_dir: PathBuf,
    /// folder under the working dir, the artist unless overridden
    pub folder: String,
    pub album: Option<String>,
    pub total_count: usize,
}

impl RunContext {
    /// `<working_dir>/<folder>[/<album>]`
    pub fn track_dir(&self) -> PathBuf {
        let dir = self.working_dir.join(&self.folder);
        match &self.album {
            Some(album) => dir.join(album),
            None => dir,
        }
    }
}

/// Number of digits needed to print `total`, i.e. ceil(log10(total + 1)).
pub fn pad_width(total: usize) -> usize {
    total.to_string().len()
}

/// `NN. <title>.<ext>`
pub fn track_file_name(order_index: usize, total: usize, title: &str, extension: &str) -> String {
    format!(
        "{:0width$}. {title}.{extension}",
        order_index,
        width = pad_width(total)
    )
}

pub fn common_parent(files: &[PathBuf]) -> Option<&Path> {
    let first = files.first()?.parent()?;
    files
        .iter()
        .all(|f| f.parent() == Some(first))
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn pad_width_matches_digit_count() {
        assert_eq!(pad_width(1), 1);
        assert_eq!(pad_width(9), 1);
        assert_eq!(pad_width(10), 2);
        assert_eq!(pad_width(99), 2);
        assert_eq!(pad_width(100), 3);
    }

    #[test]
    fn file_names_sort_in_playback_order() {
        let total = 12;
        let mut names: Vec<String> = (1..=total)
            .rev()
            .map(|i| track_file_name(i, total, "Song", "mp3"))
            .collect();
        names.sort();

        let expected: Vec<String> = (1..=total)
            .map(|i| track_file_name(i, total, "Song", "mp3"))
            .collect();
        assert_eq!(names, expected);
        assert_eq!(names[0], "01. Song.mp3");
        assert_eq!(names[11], "12. Song.mp3");
    }

    #[test]
    fn track_dir_appends_album() {
        let ctx = RunContext {
            working_dir: PathBuf::from("/music"),
            folder: "The Beatles".into(),
            album: Some("Abbey Road".into()),
            total_count: 17,
        };
        assert_eq!(ctx.track_dir(), PathBuf::from("/music/The Beatles/Abbey Road"));
        assert_eq!(pad_width(ctx.total_count), 2);
    }

    #[test]
    fn common_parent_requires_same_directory() {
        let same = vec![PathBuf::from("/a/1.mp3"), PathBuf::from("/a/2.mp3")];
        assert_eq!(common_parent(&same), Some(std::path::Path::new("/a")));

        let mixed = vec![PathBuf::from("/a/1.mp3"), PathBuf::from("/b/2.mp3")];
        assert_eq!(common_parent(&mixed), None);
        assert_eq!(common_parent(&[]), None);
    }
}
