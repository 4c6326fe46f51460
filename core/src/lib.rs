//! Core engine for codesort.
//!
//! Scans a directory of images, decodes the barcodes and 2D symbols in each
//! one, and copies every image into a target directory named after what it
//! found. Images without a usable symbol are skipped or copied as-is, and are
//! always listed in the run's [`RunResult`].
//!
//! The public API is split the way a run flows: [`decode`] an image, choose a
//! name with [`resolve_name`], make it unique with a [`FilenameAllocator`],
//! and let a [`Classifier`] drive all of that over a directory while
//! reporting to a [`ProgressObserver`].

pub mod allocator;
pub mod candidate;
pub mod classify;
pub mod config;
pub mod decode;
pub mod missing;
pub mod naming;
pub mod operations;
pub mod progress;
pub mod reporting;
pub mod symbol;

pub use allocator::{sanitize_component, unique_directory, FilenameAllocator};
pub use candidate::{list_candidates, ImageCandidate, ImageExtensions};
pub use classify::{
    ClassifiedFile, Classifier, RunError, RunResult, UnresolvedFile, UnresolvedReason,
};
pub use config::{
    ConfigError, DuplicatePolicy, MissingPolicy, Preferences, RunConfiguration,
    DEFAULT_CONFIG_FILE,
};
pub use decode::{
    decode, DecodeError, DecodeHints, DecodeOutcome, DecoderSignal, ImageCrateLoader,
    ImageLoader, LumaImage, SymbolDecoder,
};
#[cfg(feature = "rxing")]
pub use decode::RxingDecoder;
pub use missing::{handle_missing, MissingOutcome};
pub use naming::resolve_name;
pub use operations::{copy_no_clobber, CopyError};
pub use progress::{BarObserver, CancelFlag, NullObserver, ProgressObserver};
pub use reporting::{
    unresolved_path_list, write_json, write_summary, ConsoleReporter, JsonReporter,
    PathListReporter, ReportingError, UnresolvedReporter,
};
pub use symbol::{DecodedSymbol, SymbolFormat, UnknownFormat};
