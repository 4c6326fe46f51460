use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CopyError {
    /// The destination already exists and was left untouched.
    AlreadyExists(PathBuf),
    Io {
        source: io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

impl Display for CopyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(path) => write!(f, "{} already exists", path.display()),
            Self::Io { source, from, to } => write!(
                f,
                "failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Copies `from` to `to`, refusing to replace an existing file.
///
/// The destination is opened with `create_new`, so the check and the create
/// are one filesystem operation. A partially written destination is removed
/// when the copy fails.
pub fn copy_no_clobber(from: &Path, to: &Path) -> Result<u64, CopyError> {
    let io_error = |source| CopyError::Io {
        source,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    };

    let mut reader = BufReader::new(File::open(from).map_err(io_error)?);
    let file = match OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CopyError::AlreadyExists(to.to_path_buf()))
        }
        Err(error) => return Err(io_error(error)),
    };

    let mut writer = BufWriter::new(file);
    let copied = io::copy(&mut reader, &mut writer).and_then(|copied| {
        writer.flush()?;
        Ok(copied)
    });

    match copied {
        Ok(copied) => Ok(copied),
        Err(error) => {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(to) {
                tracing::warn!(path = %to.display(), error = %cleanup, "could not remove partial copy");
            }
            Err(io_error(error))
        }
    }
}
