use std::sync::{Arc, Mutex};

use geopatch_datatypes::error::BoxedError;
use image::{Rgba, RgbaImage};

use crate::source::{RasterTile, TileRequest, TileRequestClient};
use crate::util::{Result, safe_lock_mutex};

#[derive(Debug, Clone)]
enum MockTileResponse {
    /// one tile with the requested extent, resized to the requested size
    Color(Rgba<u8>),
    /// one tile with the requested extent
    Image(RgbaImage),
    Tiles(Vec<RasterTile>),
    Error(String),
}

/// A `TileRequestClient` that answers from memory and records all requests
#[derive(Debug, Clone)]
pub struct MockTileClient {
    response: MockTileResponse,
    requests: Arc<Mutex<Vec<TileRequest>>>,
}

impl MockTileClient {
    fn new(response: MockTileResponse) -> Self {
        Self {
            response,
            requests: Arc::default(),
        }
    }

    /// Answers every request with a single tile of the requested size in one color
    pub fn with_color(color: Rgba<u8>) -> Self {
        Self::new(MockTileResponse::Color(color))
    }

    /// Answers every request with a single tile that holds `image`
    pub fn with_image(image: RgbaImage) -> Self {
        Self::new(MockTileResponse::Image(image))
    }

    /// Answers every request with `tiles`
    pub fn with_tiles(tiles: Vec<RasterTile>) -> Self {
        Self::new(MockTileResponse::Tiles(tiles))
    }

    /// Fails every request with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockTileResponse::Error(message.into()))
    }

    /// All requests so far
    pub fn requests(&self) -> Vec<TileRequest> {
        safe_lock_mutex(&self.requests).clone()
    }
}

impl TileRequestClient for MockTileClient {
    fn request_tiles(&self, request: &TileRequest) -> Result<Vec<RasterTile>, BoxedError> {
        safe_lock_mutex(&self.requests).push(request.clone());

        match &self.response {
            MockTileResponse::Color(color) => Ok(vec![RasterTile::new(
                request.bbox,
                RgbaImage::from_pixel(request.width, request.height, *color),
            )]),
            MockTileResponse::Image(image) => {
                Ok(vec![RasterTile::new(request.bbox, image.clone())])
            }
            MockTileResponse::Tiles(tiles) => Ok(tiles.clone()),
            MockTileResponse::Error(message) => Err(message.clone().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MimeType;
    use geopatch_datatypes::primitives::BoundingRegion;
    use geopatch_datatypes::spatial_reference::SpatialReference;

    fn request() -> TileRequest {
        TileRequest {
            layer: "ttl1904".to_string(),
            theme: "1".to_string(),
            bbox: BoundingRegion::from_bounds(
                [0., 0., 10., 10.],
                SpatialReference::web_mercator(),
            )
            .unwrap(),
            width: 4,
            height: 3,
            image_format: MimeType::Png,
        }
    }

    #[test]
    fn records_requests() {
        let client = MockTileClient::with_color(Rgba([1, 2, 3, 4]));

        let tiles = client.request_tiles(&request()).unwrap();

        assert_eq!(tiles.len(), 1);
        assert_eq!((tiles[0].width(), tiles[0].height()), (4, 3));
        assert_eq!(tiles[0].bbox, request().bbox);
        assert_eq!(client.requests(), vec![request()]);
    }

    #[test]
    fn failing() {
        let client = MockTileClient::failing("service unavailable");

        let error = client.request_tiles(&request()).unwrap_err();

        assert_eq!(error.to_string(), "service unavailable");
        assert_eq!(client.requests().len(), 1);
    }
}
