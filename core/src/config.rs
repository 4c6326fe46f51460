//! Run configuration and persisted preferences.
//!
//! [`Preferences`] is what a user stores between runs (a TOML file):
//!
//! ```toml
//! duplicate_policy = "pick-first"
//! missing_policy = "copy"
//! format_restriction = "qr-code"
//! try_harder = true
//! ```
//!
//! A [`RunConfiguration`] is built from preferences plus the source and
//! target directories for one run. It is validated once, when it is built,
//! and not changed afterwards.

use crate::allocator::unique_directory;
use crate::candidate::ImageExtensions;
use crate::symbol::SymbolFormat;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default preferences file name.
pub const DEFAULT_CONFIG_FILE: &str = "codesort.toml";

/// Directory created inside the source when no target is given.
pub const DEFAULT_TARGET_NAME: &str = "renamed";

/// What to name an image that contains more than one symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Use the first symbol the decoder reported.
    PickFirst,
    /// Join every payload with `-`.
    #[default]
    Concatenate,
}

/// What to do with an image that has no usable symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    #[default]
    Skip,
    /// Copy under the original file name.
    Copy,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "pick-first" | "first" => Ok(Self::PickFirst),
            "concatenate" | "concat" => Ok(Self::Concatenate),
            _ => Err(ConfigError::InvalidValue {
                field: "duplicate policy",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for MissingPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "copy" => Ok(Self::Copy),
            _ => Err(ConfigError::InvalidValue {
                field: "missing policy",
                value: value.to_string(),
            }),
        }
    }
}

/// Everything a classification run needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfiguration {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Only symbols of this format are used for naming.
    pub format_restriction: Option<SymbolFormat>,
    pub high_effort: bool,
    pub duplicate_policy: DuplicatePolicy,
    pub missing_policy: MissingPolicy,
    pub extensions: ImageExtensions,
}

impl RunConfiguration {
    /// Validates the directories and applies default policies.
    ///
    /// Without a `target_dir`, the first free `renamed`, `renamed (1)`, ...
    /// directory inside `source_dir` is used. The target is not created here.
    pub fn new(source_dir: PathBuf, target_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        if !source_dir.exists() {
            return Err(ConfigError::SourceMissing(source_dir));
        }
        if !source_dir.is_dir() {
            return Err(ConfigError::SourceNotDirectory(source_dir));
        }

        let target_dir =
            target_dir.unwrap_or_else(|| unique_directory(&source_dir, DEFAULT_TARGET_NAME));
        if target_dir.exists() {
            if !target_dir.is_dir() {
                return Err(ConfigError::TargetNotDirectory(target_dir));
            }
            if same_directory(&source_dir, &target_dir) {
                return Err(ConfigError::TargetIsSource(target_dir));
            }
        }

        Ok(Self {
            source_dir,
            target_dir,
            format_restriction: None,
            high_effort: false,
            duplicate_policy: DuplicatePolicy::default(),
            missing_policy: MissingPolicy::default(),
            extensions: ImageExtensions::default(),
        })
    }

    pub fn with_format_restriction(mut self, restriction: Option<SymbolFormat>) -> Self {
        self.format_restriction = restriction;
        self
    }

    pub fn with_high_effort(mut self, enabled: bool) -> Self {
        self.high_effort = enabled;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn with_extensions(mut self, extensions: ImageExtensions) -> Self {
        self.extensions = extensions;
        self
    }
}

fn same_directory(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => left == right,
    }
}

/// User preferences persisted between runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub duplicate_policy: DuplicatePolicy,
    pub missing_policy: MissingPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_restriction: Option<SymbolFormat>,
    /// Slower, more thorough symbol search.
    pub try_harder: bool,
    /// File extensions treated as images.
    pub extensions: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            missing_policy: MissingPolicy::default(),
            format_restriction: None,
            try_harder: false,
            extensions: ImageExtensions::default().as_slice().to_vec(),
        }
    }
}

impl Preferences {
    /// Load preferences from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the first existing file in [`Preferences::default_locations`],
    /// falling back to defaults.
    ///
    /// A file that exists but cannot be parsed is logged and skipped.
    pub fn load_or_default() -> Self {
        for path in Self::default_locations() {
            if !path.is_file() {
                continue;
            }
            match Self::load(&path) {
                Ok(preferences) => {
                    tracing::debug!(path = %path.display(), "loaded preferences");
                    return preferences;
                }
                Err(error) => tracing::warn!(%error, "ignoring preferences file"),
            }
        }
        Self::default()
    }

    /// `./codesort.toml`, then `<config dir>/codesort/codesort.toml`.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(mut dir) = dirs::config_dir() {
            dir.push("codesort");
            dir.push(DEFAULT_CONFIG_FILE);
            locations.push(dir);
        }
        locations
    }

    /// Save preferences to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn into_run_configuration(
        self,
        source_dir: PathBuf,
        target_dir: Option<PathBuf>,
    ) -> Result<RunConfiguration, ConfigError> {
        let extensions = if self.extensions.is_empty() {
            ImageExtensions::default()
        } else {
            ImageExtensions::new(&self.extensions)
        };
        Ok(RunConfiguration::new(source_dir, target_dir)?
            .with_duplicate_policy(self.duplicate_policy)
            .with_missing_policy(self.missing_policy)
            .with_format_restriction(self.format_restriction)
            .with_high_effort(self.try_harder)
            .with_extensions(extensions))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    SourceMissing(PathBuf),
    SourceNotDirectory(PathBuf),
    TargetNotDirectory(PathBuf),
    TargetIsSource(PathBuf),
    InvalidValue {
        field: &'static str,
        value: String,
    },
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize(toml::ser::Error),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing(path) => {
                write!(f, "source directory {} does not exist", path.display())
            }
            Self::SourceNotDirectory(path) => write!(f, "{} is not a directory", path.display()),
            Self::TargetNotDirectory(path) => {
                write!(f, "target {} exists and is not a directory", path.display())
            }
            Self::TargetIsSource(path) => write!(
                f,
                "target directory {} is the source directory",
                path.display()
            ),
            Self::InvalidValue { field, value } => write!(f, "invalid {}: {}", field, value),
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "invalid preferences in {}: {}", path.display(), source)
            }
            Self::Serialize(error) => write!(f, "failed to serialize preferences: {}", error),
            Self::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(error) => Some(error),
            _ => None,
        }
    }
}
