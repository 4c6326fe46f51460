use super::{DecodeHints, DecoderSignal, LumaImage, SymbolDecoder};
use crate::symbol::{DecodedSymbol, SymbolFormat};
use ::rxing::{BarcodeFormat, DecodeHintType, DecodeHintValue, DecodingHintDictionary, Exceptions};

/// Multi-symbol decoding backed by `rxing`, a Rust port of ZXing.
#[derive(Clone, Copy, Debug, Default)]
pub struct RxingDecoder;

impl SymbolDecoder for RxingDecoder {
    fn decode_all(
        &self,
        image: &LumaImage,
        hints: DecodeHints,
    ) -> Result<Vec<DecodedSymbol>, DecoderSignal> {
        let mut dictionary = hint_dictionary(hints);
        let results = ::rxing::helpers::detect_multiple_in_luma_with_hints(
            image.pixels.clone(),
            image.width,
            image.height,
            &mut dictionary,
        );

        match results {
            Ok(results) => Ok(results
                .iter()
                .map(|result| {
                    DecodedSymbol::new(result.getText(), map_format(result.getBarcodeFormat()))
                })
                .collect()),
            Err(Exceptions::NotFoundException(_)) => Err(DecoderSignal::NotFound),
            Err(error) => Err(DecoderSignal::Failed(error.to_string())),
        }
    }
}

/// TRY_HARDER is always present: the rxing helper enables it when the key
/// is missing.
fn hint_dictionary(hints: DecodeHints) -> DecodingHintDictionary {
    let mut dictionary = DecodingHintDictionary::new();
    dictionary.insert(
        DecodeHintType::TRY_HARDER,
        DecodeHintValue::TryHarder(hints.try_harder),
    );
    dictionary
}

fn map_format(format: &BarcodeFormat) -> SymbolFormat {
    match format {
        BarcodeFormat::AZTEC => SymbolFormat::Aztec,
        BarcodeFormat::CODABAR => SymbolFormat::Codabar,
        BarcodeFormat::CODE_39 => SymbolFormat::Code39,
        BarcodeFormat::CODE_93 => SymbolFormat::Code93,
        BarcodeFormat::CODE_128 => SymbolFormat::Code128,
        BarcodeFormat::DATA_MATRIX => SymbolFormat::DataMatrix,
        BarcodeFormat::EAN_8 => SymbolFormat::Ean8,
        BarcodeFormat::EAN_13 => SymbolFormat::Ean13,
        BarcodeFormat::ITF => SymbolFormat::Itf,
        BarcodeFormat::MAXICODE => SymbolFormat::MaxiCode,
        BarcodeFormat::PDF_417 => SymbolFormat::Pdf417,
        BarcodeFormat::QR_CODE => SymbolFormat::QrCode,
        BarcodeFormat::MICRO_QR_CODE => SymbolFormat::MicroQrCode,
        BarcodeFormat::RSS_14 => SymbolFormat::Rss14,
        BarcodeFormat::RSS_EXPANDED => SymbolFormat::RssExpanded,
        BarcodeFormat::UPC_A => SymbolFormat::UpcA,
        BarcodeFormat::UPC_E => SymbolFormat::UpcE,
        BarcodeFormat::UPC_EAN_EXTENSION => SymbolFormat::UpcEanExtension,
        _ => SymbolFormat::Other,
    }
}
