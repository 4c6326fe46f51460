//! Decoded symbols and the symbol formats they are tagged with.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Machine-readable symbol formats a decoder can report.
///
/// Names are kebab-case (`qr-code`, `code-128`) in configuration files, on
/// the command line, and in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolFormat {
    #[serde(rename = "aztec")]
    Aztec,
    #[serde(rename = "codabar")]
    Codabar,
    #[serde(rename = "code-39")]
    Code39,
    #[serde(rename = "code-93")]
    Code93,
    #[serde(rename = "code-128")]
    Code128,
    #[serde(rename = "data-matrix")]
    DataMatrix,
    #[serde(rename = "ean-8")]
    Ean8,
    #[serde(rename = "ean-13")]
    Ean13,
    #[serde(rename = "itf")]
    Itf,
    #[serde(rename = "maxicode")]
    MaxiCode,
    #[serde(rename = "pdf-417")]
    Pdf417,
    #[serde(rename = "qr-code")]
    QrCode,
    #[serde(rename = "micro-qr-code")]
    MicroQrCode,
    #[serde(rename = "rss-14")]
    Rss14,
    #[serde(rename = "rss-expanded")]
    RssExpanded,
    #[serde(rename = "upc-a")]
    UpcA,
    #[serde(rename = "upc-e")]
    UpcE,
    #[serde(rename = "upc-ean-extension")]
    UpcEanExtension,
    /// Anything the decoder reports that has no dedicated variant.
    #[serde(rename = "other")]
    Other,
}

impl SymbolFormat {
    pub const ALL: [SymbolFormat; 19] = [
        SymbolFormat::Aztec,
        SymbolFormat::Codabar,
        SymbolFormat::Code39,
        SymbolFormat::Code93,
        SymbolFormat::Code128,
        SymbolFormat::DataMatrix,
        SymbolFormat::Ean8,
        SymbolFormat::Ean13,
        SymbolFormat::Itf,
        SymbolFormat::MaxiCode,
        SymbolFormat::Pdf417,
        SymbolFormat::QrCode,
        SymbolFormat::MicroQrCode,
        SymbolFormat::Rss14,
        SymbolFormat::RssExpanded,
        SymbolFormat::UpcA,
        SymbolFormat::UpcE,
        SymbolFormat::UpcEanExtension,
        SymbolFormat::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aztec => "aztec",
            Self::Codabar => "codabar",
            Self::Code39 => "code-39",
            Self::Code93 => "code-93",
            Self::Code128 => "code-128",
            Self::DataMatrix => "data-matrix",
            Self::Ean8 => "ean-8",
            Self::Ean13 => "ean-13",
            Self::Itf => "itf",
            Self::MaxiCode => "maxicode",
            Self::Pdf417 => "pdf-417",
            Self::QrCode => "qr-code",
            Self::MicroQrCode => "micro-qr-code",
            Self::Rss14 => "rss-14",
            Self::RssExpanded => "rss-expanded",
            Self::UpcA => "upc-a",
            Self::UpcE => "upc-e",
            Self::UpcEanExtension => "upc-ean-extension",
            Self::Other => "other",
        }
    }
}

impl Display for SymbolFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolFormat {
    type Err = UnknownFormat;

    /// Accepts the kebab-case names as well as ZXing style constants such as
    /// `QR_CODE` or `CODE_128`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|format| {
                format.as_str() == normalized
                    || format.as_str().replace('-', "") == normalized.replace('-', "")
            })
            .ok_or_else(|| UnknownFormat(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl Display for UnknownFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown symbol format: {}", self.0)
    }
}

impl Error for UnknownFormat {}

/// One symbol found in an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSymbol {
    pub payload: String,
    pub format: SymbolFormat,
}

impl DecodedSymbol {
    pub fn new(payload: impl Into<String>, format: SymbolFormat) -> Self {
        Self {
            payload: payload.into(),
            format,
        }
    }
}
