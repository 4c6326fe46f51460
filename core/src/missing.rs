//! Handling of images without a usable symbol.

use crate::candidate::ImageCandidate;
use crate::config::MissingPolicy;
use crate::operations::{copy_no_clobber, CopyError};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingOutcome {
    Skipped,
    Copied(PathBuf),
}

/// Applies `policy` to an image that could not be classified.
///
/// `Copy` keeps the original file name and does not go through the
/// [`FilenameAllocator`](crate::allocator::FilenameAllocator): an existing
/// file of that name in `target_dir` is reported as
/// [`CopyError::AlreadyExists`] rather than renamed or overwritten.
///
/// Either way the caller still lists the image as unresolved.
pub fn handle_missing(
    candidate: &ImageCandidate,
    policy: MissingPolicy,
    target_dir: &Path,
) -> Result<MissingOutcome, CopyError> {
    match policy {
        MissingPolicy::Skip => Ok(MissingOutcome::Skipped),
        MissingPolicy::Copy => {
            let destination = match candidate.path.file_name() {
                Some(name) => target_dir.join(name),
                None => return Ok(MissingOutcome::Skipped),
            };
            copy_no_clobber(&candidate.path, &destination)?;
            Ok(MissingOutcome::Copied(destination))
        }
    }
}
