//! Collision-free file names inside the target directory.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Longest stem, in bytes, the allocator will produce. Leaves room for the
/// counter suffix and extension within the usual 255-byte name limit.
pub const MAX_STEM_BYTES: usize = 200;

const REPLACEMENT: char = '_';
const RESERVED: [char; 9] = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Hands out file names in one target directory for the duration of a run.
///
/// A name is taken if it exists on disk or was already handed out by this
/// allocator, even when the copy that was meant to use it has not happened
/// yet (or failed).
#[derive(Debug)]
pub struct FilenameAllocator {
    target_dir: PathBuf,
    allocated: HashSet<OsString>,
}

impl FilenameAllocator {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            allocated: HashSet::new(),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Reserves and returns a free path for `base.extension`.
    ///
    /// `base` is sanitized with [`sanitize_component`]. On collision a counter
    /// is inserted before the extension: `name (1).jpg`, `name (2).jpg`, ...
    pub fn allocate(&mut self, base: &str, extension: &str) -> PathBuf {
        let stem = sanitize_component(base);
        let mut index = 0usize;
        loop {
            let name = numbered_name(&stem, index, extension);
            if self.is_free(&name) {
                let path = self.target_dir.join(&name);
                self.allocated.insert(OsString::from(name));
                return path;
            }
            index += 1;
        }
    }

    /// Marks `file_name` as used without checking it.
    pub fn reserve(&mut self, file_name: impl AsRef<OsStr>) {
        self.allocated.insert(file_name.as_ref().to_os_string());
    }

    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    fn is_free(&self, name: &str) -> bool {
        !self.allocated.contains(OsStr::new(name)) && !occupied(&self.target_dir.join(name))
    }
}

/// Returns the first of `name`, `name (1)`, `name (2)`, ... under `parent`
/// that does not exist yet. Nothing is created.
pub fn unique_directory(parent: &Path, name: &str) -> PathBuf {
    let stem = sanitize_component(name);
    let mut index = 0usize;
    loop {
        let candidate = parent.join(numbered_name(&stem, index, ""));
        if !occupied(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Makes decoded text usable as a single path component.
///
/// - path separators, characters reserved on Windows and control characters
///   become `_`
/// - surrounding whitespace and trailing dots are removed
/// - the result is cut to [`MAX_STEM_BYTES`] on a character boundary
/// - an empty result becomes `_`
pub fn sanitize_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED.contains(&c) {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect();

    let mut cleaned = replaced
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();
    if cleaned.len() > MAX_STEM_BYTES {
        let mut cut = MAX_STEM_BYTES;
        while !cleaned.is_char_boundary(cut) {
            cut -= 1;
        }
        cleaned.truncate(cut);
    }

    if cleaned.is_empty() {
        REPLACEMENT.to_string()
    } else {
        cleaned
    }
}

fn numbered_name(stem: &str, index: usize, extension: &str) -> String {
    let mut name = if index == 0 {
        stem.to_string()
    } else {
        format!("{} ({})", stem, index)
    };
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    name
}

// Dangling symlinks count as taken.
fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn free_name_is_used_verbatim() {
        let dir = tempdir().unwrap();
        let mut allocator = FilenameAllocator::new(dir.path());
        assert_eq!(
            allocator.allocate("ABC123", "jpg"),
            dir.path().join("ABC123.jpg")
        );
    }

    #[test]
    fn repeated_names_in_one_run_are_numbered() {
        let dir = tempdir().unwrap();
        let mut allocator = FilenameAllocator::new(dir.path());
        let first = allocator.allocate("X", "jpg");
        let second = allocator.allocate("X", "jpg");
        let third = allocator.allocate("X", "jpg");
        assert_eq!(first, dir.path().join("X.jpg"));
        assert_eq!(second, dir.path().join("X (1).jpg"));
        assert_eq!(third, dir.path().join("X (2).jpg"));
        assert_eq!(allocator.allocated_count(), 3);
        assert!(!first.exists());
    }

    #[test]
    fn existing_files_are_never_reused() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("X.jpg"), b"old").unwrap();
        fs::write(dir.path().join("X (1).jpg"), b"old").unwrap();
        let mut allocator = FilenameAllocator::new(dir.path());
        assert_eq!(
            allocator.allocate("X", "jpg"),
            dir.path().join("X (2).jpg")
        );
    }

    #[test]
    fn same_stem_with_other_extension_is_free() {
        let dir = tempdir().unwrap();
        let mut allocator = FilenameAllocator::new(dir.path());
        allocator.allocate("X", "jpg");
        assert_eq!(allocator.allocate("X", "png"), dir.path().join("X.png"));
    }

    #[test]
    fn reserved_names_are_skipped() {
        let dir = tempdir().unwrap();
        let mut allocator = FilenameAllocator::new(dir.path());
        allocator.reserve("c.jpg");
        assert_eq!(allocator.allocate("c", "jpg"), dir.path().join("c (1).jpg"));
    }

    #[test]
    fn sanitizes_unsafe_payloads() {
        assert_eq!(sanitize_component("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_component("line\nbreak\0"), "line_break_");
        assert_eq!(sanitize_component("what?*"), "what__");
        assert_eq!(sanitize_component("  padded. . "), "padded");
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component(""), "_");
        assert_eq!(sanitize_component("ABC-123 x"), "ABC-123 x");
    }

    #[test]
    fn long_payloads_are_cut_on_char_boundary() {
        let long = "é".repeat(150);
        let cleaned = sanitize_component(&long);
        assert!(cleaned.len() <= MAX_STEM_BYTES);
        assert_eq!(cleaned.chars().count(), MAX_STEM_BYTES / 2);
    }

    #[test]
    fn unique_directory_skips_existing() {
        let dir = tempdir().unwrap();
        assert_eq!(
            unique_directory(dir.path(), "renamed"),
            dir.path().join("renamed")
        );
        fs::create_dir(dir.path().join("renamed")).unwrap();
        assert_eq!(
            unique_directory(dir.path(), "renamed"),
            dir.path().join("renamed (1)")
        );
    }
}
