//! Turns the symbols found in one image into a base file name.

use crate::config::DuplicatePolicy;
use crate::symbol::DecodedSymbol;

pub const CONCATENATE_SEPARATOR: &str = "-";

/// Builds the base name for an image from its decoded symbols.
///
/// Symbols are used in decoder order. `PickFirst` therefore depends on the
/// decoder reporting symbols in a stable order; a decoder that scans in a
/// different order between runs yields different names for the same image.
///
/// No escaping is applied here. Payloads are sanitized when the
/// [`FilenameAllocator`](crate::allocator::FilenameAllocator) builds the
/// final file name.
pub fn resolve_name(symbols: &[DecodedSymbol], policy: DuplicatePolicy) -> String {
    match policy {
        DuplicatePolicy::PickFirst => symbols
            .first()
            .map(|symbol| symbol.payload.clone())
            .unwrap_or_default(),
        DuplicatePolicy::Concatenate => symbols
            .iter()
            .map(|symbol| symbol.payload.as_str())
            .collect::<Vec<_>>()
            .join(CONCATENATE_SEPARATOR),
    }
}
