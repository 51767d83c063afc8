use std::sync::Arc;

use geopatch_datatypes::error::BoxedError;
use geopatch_datatypes::primitives::BoundingRegion;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::util::Result;

/// The image encodings the tile service can deliver
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
pub enum MimeType {
    #[default]
    #[serde(rename = "image/png")]
    #[strum(serialize = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/tiff")]
    #[strum(serialize = "image/tiff")]
    Tiff,
}

impl MimeType {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            MimeType::Png => image::ImageFormat::Png,
            MimeType::Jpeg => image::ImageFormat::Jpeg,
            MimeType::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// A request for the raster tile of a remote layer
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    pub layer: String,
    pub theme: String,
    /// the requested extent in the native projection of the service
    pub bbox: BoundingRegion,
    pub width: u32,
    pub height: u32,
    pub image_format: MimeType,
}

/// A decoded RGBA tile that covers `bbox`
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    pub bbox: BoundingRegion,
    pub image: RgbaImage,
}

impl RasterTile {
    pub fn new(bbox: BoundingRegion, image: RgbaImage) -> Self {
        Self { bbox, image }
    }

    /// Decodes an encoded image into an RGBA tile
    pub fn decode(bbox: BoundingRegion, bytes: &[u8], format: MimeType) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, format.image_format())?;

        Ok(Self::new(bbox, image.into_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Fetches raster tiles from the remote service
pub trait TileRequestClient {
    fn request_tiles(&self, request: &TileRequest) -> Result<Vec<RasterTile>, BoxedError>;
}

impl<T> TileRequestClient for &T
where
    T: TileRequestClient + ?Sized,
{
    fn request_tiles(&self, request: &TileRequest) -> Result<Vec<RasterTile>, BoxedError> {
        (**self).request_tiles(request)
    }
}

impl<T> TileRequestClient for Arc<T>
where
    T: TileRequestClient + ?Sized,
{
    fn request_tiles(&self, request: &TileRequest) -> Result<Vec<RasterTile>, BoxedError> {
        (**self).request_tiles(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopatch_datatypes::spatial_reference::SpatialReference;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn mime_type_names() {
        assert_eq!(MimeType::Png.to_string(), "image/png");
        assert_eq!(
            serde_json::from_str::<MimeType>("\"image/jpeg\"").unwrap(),
            MimeType::Jpeg
        );
        assert_eq!(MimeType::default(), MimeType::Png);
    }

    #[test]
    fn decode_png() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();

        let bbox =
            BoundingRegion::from_bounds([0., 0., 3., 2.], SpatialReference::web_mercator())
                .unwrap();
        let tile = RasterTile::decode(bbox, bytes.get_ref(), MimeType::Png).unwrap();

        assert_eq!((tile.width(), tile.height()), (3, 2));
        assert_eq!(tile.image.get_pixel(1, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(tile.image.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn decode_garbage() {
        let bbox =
            BoundingRegion::from_bounds([0., 0., 1., 1.], SpatialReference::web_mercator())
                .unwrap();

        assert!(matches!(
            RasterTile::decode(bbox, b"not an image", MimeType::Png),
            Err(crate::error::Error::ImageDecoding { .. })
        ));
    }
}
