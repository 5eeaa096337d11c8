//! Seams for the image acquisition and format conversion collaborators.

use alloc::vec::Vec;

use crate::it8951::BitsPerPixel;

/// Acquires the source image, typically over the network.
///
/// The pipeline asks for exactly the usable frame dimensions so the remote
/// side can render to fit; see [crate::layout::compute].
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    type Error: core::error::Error;

    /// Fetches and decodes an image of the given dimensions, returning the
    /// decoded bytes.
    async fn fetch(&mut self, width: u16, height: u16) -> Result<Vec<u8>, Self::Error>;
}

/// Converts a decoded source image into the controller's packed raster
/// format at the requested pixel depth.
pub trait RasterConverter {
    type Error: core::error::Error;

    fn convert(&mut self, image: &[u8], depth: BitsPerPixel) -> Result<Vec<u8>, Self::Error>;
}
