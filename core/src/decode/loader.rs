use super::{DecodeError, ImageLoader, LumaImage};
use std::path::Path;

/// Reads any format the `image` crate was built with and converts it to
/// 8-bit grayscale.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateLoader;

impl ImageLoader for ImageCrateLoader {
    fn load(&self, path: &Path) -> Result<LumaImage, DecodeError> {
        let image = image::open(path).map_err(|source| DecodeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        Ok(LumaImage {
            width,
            height,
            pixels: luma.into_raw(),
        })
    }
}
