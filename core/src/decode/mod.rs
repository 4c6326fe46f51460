//! Symbol decoding for a single image.
//!
//! Pixel loading and symbol recognition are both delegated through traits so
//! the classification loop never depends on a particular image or barcode
//! library:
//!
//! - [`ImageLoader`] turns a file into an 8-bit luminance buffer. The default
//!   [`ImageCrateLoader`] uses the `image` crate.
//! - [`SymbolDecoder`] finds every symbol in that buffer. The default
//!   `RxingDecoder` (feature `rxing`) wraps ZXing's generic multiple-barcode
//!   reader.
//!
//! [`decode`] combines the two and normalises the answer into a
//! [`DecodeOutcome`].

mod loader;
#[cfg(feature = "rxing")]
mod rxing;

pub use loader::ImageCrateLoader;
#[cfg(feature = "rxing")]
pub use self::rxing::RxingDecoder;

use crate::candidate::ImageCandidate;
use crate::symbol::{DecodedSymbol, SymbolFormat};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Grayscale pixels, one byte per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeHints {
    /// Spend more time looking for symbols (rotations, denser sampling).
    pub try_harder: bool,
}

/// Non-success answers from a [`SymbolDecoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecoderSignal {
    /// The image contains no recognisable symbol. This is an expected outcome.
    NotFound,
    Failed(String),
}

pub trait ImageLoader {
    fn load(&self, path: &std::path::Path) -> Result<LumaImage, DecodeError>;
}

pub trait SymbolDecoder {
    /// Returns every symbol found, in the order the decoder reports them.
    fn decode_all(
        &self,
        image: &LumaImage,
        hints: DecodeHints,
    ) -> Result<Vec<DecodedSymbol>, DecoderSignal>;
}

#[derive(Debug)]
pub enum DecodeError {
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    Decoder {
        path: PathBuf,
        message: String,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load { path, source } => {
                write!(f, "failed to load {}: {}", path.display(), source)
            }
            Self::Decoder { path, message } => {
                write!(f, "failed to decode {}: {}", path.display(), message)
            }
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load { source, .. } => Some(source),
            Self::Decoder { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum DecodeOutcome {
    /// At least one symbol survived the format restriction.
    Found(Vec<DecodedSymbol>),
    NotFound,
    DecodeFailed(DecodeError),
}

/// Loads `candidate`, decodes every symbol in it and keeps those matching
/// `restriction`.
///
/// An empty list after filtering is reported as [`DecodeOutcome::NotFound`],
/// so a restriction alone can turn a readable image into a missing one.
pub fn decode<L, D>(
    loader: &L,
    decoder: &D,
    candidate: &ImageCandidate,
    restriction: Option<SymbolFormat>,
    high_effort: bool,
) -> DecodeOutcome
where
    L: ImageLoader + ?Sized,
    D: SymbolDecoder + ?Sized,
{
    let image = match loader.load(&candidate.path) {
        Ok(image) => image,
        Err(error) => return DecodeOutcome::DecodeFailed(error),
    };

    let hints = DecodeHints {
        try_harder: high_effort,
    };
    let symbols = match decoder.decode_all(&image, hints) {
        Ok(symbols) => symbols,
        Err(DecoderSignal::NotFound) => return DecodeOutcome::NotFound,
        Err(DecoderSignal::Failed(message)) => {
            return DecodeOutcome::DecodeFailed(DecodeError::Decoder {
                path: candidate.path.clone(),
                message,
            })
        }
    };

    let symbols: Vec<DecodedSymbol> = match restriction {
        Some(format) => symbols
            .into_iter()
            .filter(|symbol| symbol.format == format)
            .collect(),
        None => symbols,
    };

    if symbols.is_empty() {
        DecodeOutcome::NotFound
    } else {
        DecodeOutcome::Found(symbols)
    }
}
