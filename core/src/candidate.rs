use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lowercase file extensions treated as images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageExtensions(Vec<String>);

impl ImageExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn is_image(&self, file_name: impl AsRef<Path>) -> bool {
        lowercase_extension(file_name.as_ref())
            .map(|ext| self.0.iter().any(|candidate| candidate == &ext))
            .unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::new([
            "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp",
        ])
    }
}

/// An image file queued for classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageCandidate {
    pub path: PathBuf,
    pub extension: String,
}

impl ImageCandidate {
    /// Returns `None` when the path has no usable extension.
    pub fn new(path: PathBuf) -> Option<Self> {
        let extension = lowercase_extension(&path)?;
        Some(Self { path, extension })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lists the images directly inside `source`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that cannot be read are
/// logged and left out.
pub fn list_candidates(source: &Path, extensions: &ImageExtensions) -> Vec<ImageCandidate> {
    WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.path().is_file() && extensions.is_image(entry.file_name()))
        .filter_map(|entry| ImageCandidate::new(entry.into_path()))
        .collect()
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn matches_extensions_case_insensitively() {
        let extensions = ImageExtensions::default();
        assert!(extensions.is_image("scan.JPG"));
        assert!(extensions.is_image("plate.tiff"));
        assert!(!extensions.is_image("notes.txt"));
        assert!(!extensions.is_image("jpg"));
    }

    #[test]
    fn normalizes_configured_extensions() {
        let extensions = ImageExtensions::new([".PNG", "", "Jpg"]);
        assert_eq!(extensions.as_slice(), ["png", "jpg"]);
    }

    #[test]
    fn candidate_extension_is_lowercase() {
        let candidate = ImageCandidate::new(PathBuf::from("/tmp/IMG_01.JPEG")).unwrap();
        assert_eq!(candidate.extension, "jpeg");
        assert_eq!(candidate.file_name(), "IMG_01.JPEG");
        assert!(ImageCandidate::new(PathBuf::from("/tmp/README")).is_none());
    }

    #[test]
    fn lists_only_top_level_images_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"b").unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.jpg"), b"c").unwrap();

        let names: Vec<_> = list_candidates(dir.path(), &ImageExtensions::default())
            .iter()
            .map(ImageCandidate::file_name)
            .collect();
        assert_eq!(names, vec![String::from("a.jpg"), String::from("b.png")]);
    }
}
