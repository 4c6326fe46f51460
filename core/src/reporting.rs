//! Hand-off of a finished [`RunResult`] to whoever shows it to the user.

use crate::classify::RunResult;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const REPORT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum ReportingError {
    Io {
        source: io::Error,
        path: Option<PathBuf>,
    },
    Serialization(serde_json::Error),
}

impl Display for ReportingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io {
                source,
                path: Some(path),
            } => write!(f, "io error for {}: {}", path.display(), source),
            Self::Io { source, path: None } => write!(f, "io error: {}", source),
            Self::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl Error for ReportingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization(error) => Some(error),
        }
    }
}

/// Receives the result of a run once it has finished or was canceled.
pub trait UnresolvedReporter {
    fn report(&mut self, result: &RunResult) -> Result<(), ReportingError>;
}

/// Prints classified and unresolved images to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl UnresolvedReporter for ConsoleReporter {
    fn report(&mut self, result: &RunResult) -> Result<(), ReportingError> {
        let stdout = io::stdout();
        write_summary(result, &mut stdout.lock())
            .map_err(|source| ReportingError::Io { source, path: None })
    }
}

/// Writes the whole result as pretty-printed JSON.
#[derive(Clone, Debug)]
pub struct JsonReporter {
    output: PathBuf,
}

impl JsonReporter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl UnresolvedReporter for JsonReporter {
    fn report(&mut self, result: &RunResult) -> Result<(), ReportingError> {
        write_json(result, &self.output)
    }
}

/// Writes the absolute paths of unresolved images, one per line.
#[derive(Clone, Debug)]
pub struct PathListReporter {
    output: PathBuf,
}

impl PathListReporter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl UnresolvedReporter for PathListReporter {
    fn report(&mut self, result: &RunResult) -> Result<(), ReportingError> {
        let mut text = unresolved_path_list(result);
        if !text.is_empty() {
            text.push('\n');
        }
        std::fs::write(&self.output, text).map_err(|source| ReportingError::Io {
            source,
            path: Some(self.output.clone()),
        })
    }
}

/// Absolute paths of the unresolved images joined by newlines, in the form a
/// user would paste into a file manager or shell.
pub fn unresolved_path_list(result: &RunResult) -> String {
    result
        .unresolved_paths()
        .map(|path| absolute(path).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_summary(result: &RunResult, out: &mut impl Write) -> io::Result<()> {
    for file in &result.classified {
        writeln!(
            out,
            "{} -> {}",
            file.source.display(),
            file.destination.display()
        )?;
    }

    if result.has_unresolved() {
        writeln!(out)?;
        writeln!(out, "Images without a barcode:")?;
        for file in &result.unresolved {
            write!(out, "  {} ({})", file.path.display(), file.reason)?;
            if let Some(copied) = &file.copied_to {
                write!(out, ", copied to {}", copied.display())?;
            }
            if let Some(error) = &file.copy_error {
                write!(out, ", {}", error)?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} of {} images processed, {} renamed, {} unresolved{}",
        result.processed,
        result.total,
        result.classified.len(),
        result.unresolved.len(),
        if result.canceled { " (canceled)" } else { "" }
    )
}

#[derive(Serialize)]
struct RunReport<'a> {
    version: u32,
    generated_at: String,
    #[serde(flatten)]
    result: &'a RunResult,
}

pub fn write_json(result: &RunResult, output_path: &Path) -> Result<(), ReportingError> {
    let report = RunReport {
        version: REPORT_VERSION,
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
        result,
    };

    let file = File::create(output_path).map_err(|source| ReportingError::Io {
        source,
        path: Some(output_path.to_path_buf()),
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report).map_err(ReportingError::Serialization)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
