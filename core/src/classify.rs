//! The classification loop.
//!
//! For every image in the source directory:
//!
//! ```text
//! decode ─┬─ Found ──────────────► name ─► allocate ─► copy
//!         └─ NotFound / Failed ──► missing policy (skip or copy as-is)
//! ```
//!
//! Images are processed one at a time in file-name order. Failures for a
//! single image never stop the run; they end up in
//! [`RunResult::unresolved`]. Only an unusable target directory aborts a run,
//! and it does so before any image is touched.

use crate::allocator::FilenameAllocator;
use crate::candidate::{list_candidates, ImageCandidate};
use crate::config::RunConfiguration;
use crate::decode::{decode, DecodeOutcome, ImageLoader, SymbolDecoder};
use crate::missing::{handle_missing, MissingOutcome};
use crate::naming::resolve_name;
use crate::operations::copy_no_clobber;
use crate::progress::ProgressObserver;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub const TASK_TITLE: &str = "Renaming images";

/// An image copied under a name derived from its symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub payloads: Vec<String>,
}

/// Why an image was not classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// The image was read but contained no usable symbol.
    NoSymbol,
    /// The image could not be loaded or the decoder failed.
    DecodeFailed(String),
    /// Symbols were found but the renamed copy could not be written.
    CopyFailed(String),
}

impl Display for UnresolvedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSymbol => write!(f, "no symbol found"),
            Self::DecodeFailed(message) => write!(f, "decode failed: {}", message),
            Self::CopyFailed(message) => write!(f, "copy failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedFile {
    pub path: PathBuf,
    pub reason: UnresolvedReason,
    /// Set when the missing-symbol policy copied the file as-is.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub copied_to: Option<PathBuf>,
    /// Set when the missing-symbol policy tried to copy the file and failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub copy_error: Option<String>,
}

impl UnresolvedFile {
    fn new(path: PathBuf, reason: UnresolvedReason) -> Self {
        Self {
            path,
            reason,
            copied_to: None,
            copy_error: None,
        }
    }
}

/// Summary of one run, suitable for serialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Images found in the source directory.
    pub total: usize,
    /// Images handled before the run ended.
    pub processed: usize,
    pub canceled: bool,
    pub classified: Vec<ClassifiedFile>,
    /// Images without a classification, in processing order.
    pub unresolved: Vec<UnresolvedFile>,
}

impl RunResult {
    pub fn unresolved_paths(&self) -> impl Iterator<Item = &Path> {
        self.unresolved.iter().map(|file| file.path.as_path())
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

#[derive(Debug)]
pub enum RunError {
    SourceDirectory(PathBuf),
    TargetDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceDirectory(path) => {
                write!(f, "source directory {} is not readable", path.display())
            }
            Self::TargetDirectory { path, source } => write!(
                f,
                "failed to create target directory {}: {}",
                path.display(),
                source
            ),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TargetDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Classifies the images of one [`RunConfiguration`].
pub struct Classifier<L, D> {
    config: RunConfiguration,
    loader: L,
    decoder: D,
}

#[cfg(feature = "rxing")]
impl Classifier<crate::decode::ImageCrateLoader, crate::decode::RxingDecoder> {
    /// Classifier using the `image` crate for pixels and `rxing` for symbols.
    pub fn with_defaults(config: RunConfiguration) -> Self {
        Self::new(
            config,
            crate::decode::ImageCrateLoader,
            crate::decode::RxingDecoder,
        )
    }
}

impl<L, D> Classifier<L, D>
where
    L: ImageLoader,
    D: SymbolDecoder,
{
    pub fn new(config: RunConfiguration, loader: L, decoder: D) -> Self {
        Self {
            config,
            loader,
            decoder,
        }
    }

    /// Processes every image once, or until `observer` asks to cancel.
    ///
    /// Cancellation is checked before each image; images already copied
    /// stay where they are.
    pub fn run(&self, observer: &dyn ProgressObserver) -> Result<RunResult, RunError> {
        let source_dir = &self.config.source_dir;
        let target_dir = &self.config.target_dir;

        if !source_dir.is_dir() {
            return Err(RunError::SourceDirectory(source_dir.clone()));
        }
        fs::create_dir_all(target_dir).map_err(|source| RunError::TargetDirectory {
            path: target_dir.clone(),
            source,
        })?;

        let candidates = list_candidates(source_dir, &self.config.extensions);
        tracing::info!(
            source = %source_dir.display(),
            target = %target_dir.display(),
            images = candidates.len(),
            "starting classification run"
        );

        let mut allocator = FilenameAllocator::new(target_dir);
        let mut result = RunResult {
            source_dir: source_dir.clone(),
            target_dir: target_dir.clone(),
            total: candidates.len(),
            ..RunResult::default()
        };

        observer.begin_task(TASK_TITLE, candidates.len() as u64);
        for (index, candidate) in candidates.iter().enumerate() {
            if observer.is_canceled() {
                tracing::info!(processed = result.processed, "classification canceled");
                result.canceled = true;
                break;
            }
            observer.sub_task(&format!("Renaming image {}", index + 1));
            self.process(candidate, &mut allocator, &mut result);
            result.processed += 1;
            observer.worked(1);
        }
        if !result.canceled && observer.is_canceled() {
            tracing::info!(processed = result.processed, "classification canceled");
            result.canceled = true;
        }
        observer.done();

        tracing::info!(
            processed = result.processed,
            classified = result.classified.len(),
            unresolved = result.unresolved.len(),
            "classification run finished"
        );
        Ok(result)
    }

    fn process(
        &self,
        candidate: &ImageCandidate,
        allocator: &mut FilenameAllocator,
        result: &mut RunResult,
    ) {
        let outcome = decode(
            &self.loader,
            &self.decoder,
            candidate,
            self.config.format_restriction,
            self.config.high_effort,
        );

        match outcome {
            DecodeOutcome::Found(symbols) => {
                let base = resolve_name(&symbols, self.config.duplicate_policy);
                let destination = allocator.allocate(&base, &candidate.extension);
                match copy_no_clobber(&candidate.path, &destination) {
                    Ok(_) => {
                        tracing::debug!(
                            source = %candidate.path.display(),
                            destination = %destination.display(),
                            "classified"
                        );
                        result.classified.push(ClassifiedFile {
                            source: candidate.path.clone(),
                            destination,
                            payloads: symbols.into_iter().map(|symbol| symbol.payload).collect(),
                        });
                    }
                    Err(error) => {
                        tracing::warn!(path = %candidate.path.display(), %error, "copy failed");
                        result.unresolved.push(UnresolvedFile::new(
                            candidate.path.clone(),
                            UnresolvedReason::CopyFailed(error.to_string()),
                        ));
                    }
                }
            }
            DecodeOutcome::NotFound => {
                tracing::debug!(path = %candidate.path.display(), "no symbol found");
                self.unresolved(candidate, UnresolvedReason::NoSymbol, allocator, result);
            }
            DecodeOutcome::DecodeFailed(error) => {
                tracing::warn!(path = %candidate.path.display(), %error, "decode failed");
                let reason = UnresolvedReason::DecodeFailed(error.to_string());
                self.unresolved(candidate, reason, allocator, result);
            }
        }
    }

    fn unresolved(
        &self,
        candidate: &ImageCandidate,
        reason: UnresolvedReason,
        allocator: &mut FilenameAllocator,
        result: &mut RunResult,
    ) {
        let mut entry = UnresolvedFile::new(candidate.path.clone(), reason);
        match handle_missing(candidate, self.config.missing_policy, allocator.target_dir()) {
            Ok(MissingOutcome::Skipped) => {}
            Ok(MissingOutcome::Copied(destination)) => {
                if let Some(name) = destination.file_name() {
                    allocator.reserve(name);
                }
                entry.copied_to = Some(destination);
            }
            Err(error) => {
                tracing::warn!(path = %candidate.path.display(), %error, "copy of unresolved image failed");
                entry.copy_error = Some(error.to_string());
            }
        }
        result.unresolved.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingPolicy;
    use crate::decode::{DecodeError, DecodeHints, DecoderSignal, LumaImage};
    use crate::symbol::{DecodedSymbol, SymbolFormat};
    use std::cell::Cell;
    use tempfile::tempdir;

    /// Hands the raw file bytes to the decoder as pixels.
    struct BytesLoader;

    impl ImageLoader for BytesLoader {
        fn load(&self, path: &Path) -> Result<LumaImage, DecodeError> {
            let pixels = fs::read(path).map_err(|error| DecodeError::Load {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(error),
            })?;
            Ok(LumaImage {
                width: pixels.len() as u32,
                height: 1,
                pixels,
            })
        }
    }

    /// Reads the "pixels" as a comma separated list of QR payloads.
    struct TextDecoder;

    impl SymbolDecoder for TextDecoder {
        fn decode_all(
            &self,
            image: &LumaImage,
            _hints: DecodeHints,
        ) -> Result<Vec<DecodedSymbol>, DecoderSignal> {
            let text = String::from_utf8_lossy(&image.pixels);
            if text.is_empty() {
                return Err(DecoderSignal::NotFound);
            }
            Ok(text
                .split(',')
                .map(|payload| DecodedSymbol::new(payload, SymbolFormat::QrCode))
                .collect())
        }
    }

    struct CancelAfter {
        limit: u64,
        worked: Cell<u64>,
    }

    impl ProgressObserver for CancelAfter {
        fn begin_task(&self, _name: &str, _total: u64) {}
        fn sub_task(&self, _description: &str) {}
        fn worked(&self, units: u64) {
            self.worked.set(self.worked.get() + units);
        }
        fn is_canceled(&self) -> bool {
            self.worked.get() >= self.limit
        }
    }

    #[test]
    fn creates_missing_target_directory() {
        let source = tempdir().unwrap();
        fs::write(source.path().join("a.jpg"), b"A").unwrap();
        let target = source.path().join("out").join("deeper");
        let config =
            RunConfiguration::new(source.path().to_path_buf(), Some(target.clone())).unwrap();

        let result = Classifier::new(config, BytesLoader, TextDecoder)
            .run(&crate::progress::NullObserver)
            .unwrap();
        assert!(target.join("A.jpg").exists());
        assert_eq!(result.processed, 1);
        assert_eq!(result.total, 1);
        assert!(!result.canceled);
    }

    #[test]
    fn unusable_target_aborts_before_processing() {
        let source = tempdir().unwrap();
        fs::write(source.path().join("a.jpg"), b"A").unwrap();
        let blocker = source.path().join("blocker");
        let config =
            RunConfiguration::new(source.path().to_path_buf(), Some(blocker.join("out")))
                .unwrap();
        fs::write(&blocker, b"file, not a directory").unwrap();

        let error = Classifier::new(config, BytesLoader, TextDecoder)
            .run(&crate::progress::NullObserver)
            .unwrap_err();
        assert!(matches!(error, RunError::TargetDirectory { .. }));
    }

    #[test]
    fn cancellation_stops_before_next_image() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        for name in ["a", "b", "c", "d"] {
            fs::write(source.path().join(format!("{}.jpg", name)), name.to_uppercase()).unwrap();
        }
        let config = RunConfiguration::new(
            source.path().to_path_buf(),
            Some(target.path().to_path_buf()),
        )
        .unwrap();
        let observer = CancelAfter {
            limit: 2,
            worked: Cell::new(0),
        };

        let result = Classifier::new(config, BytesLoader, TextDecoder)
            .run(&observer)
            .unwrap();
        assert!(result.canceled);
        assert_eq!(result.processed, 2);
        assert_eq!(result.total, 4);
        assert!(target.path().join("A.jpg").exists());
        assert!(target.path().join("B.jpg").exists());
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 2);
    }

    #[test]
    fn missing_copy_collision_is_reported_on_the_file() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("c.jpg"), b"").unwrap();
        fs::write(target.path().join("c.jpg"), b"existing").unwrap();
        let config = RunConfiguration::new(
            source.path().to_path_buf(),
            Some(target.path().to_path_buf()),
        )
        .unwrap()
        .with_missing_policy(MissingPolicy::Copy);

        let result = Classifier::new(config, BytesLoader, TextDecoder)
            .run(&crate::progress::NullObserver)
            .unwrap();
        assert_eq!(result.unresolved.len(), 1);
        let entry = &result.unresolved[0];
        assert_eq!(entry.reason, UnresolvedReason::NoSymbol);
        assert!(entry.copied_to.is_none());
        assert!(entry.copy_error.as_deref().unwrap().contains("already exists"));
        assert_eq!(fs::read(target.path().join("c.jpg")).unwrap(), b"existing");
    }
}
