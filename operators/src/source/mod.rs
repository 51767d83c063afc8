mod feature_client;
mod tile_client;

pub use self::feature_client::{
    FeatureIter, FeatureIterationClient, FeatureQuery, ServiceAccessConfig,
};
pub use self::tile_client::{MimeType, RasterTile, TileRequest, TileRequestClient};
