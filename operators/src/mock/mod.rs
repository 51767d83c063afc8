mod mock_feature_client;
mod mock_tile_client;

pub use mock_feature_client::*;
pub use mock_tile_client::*;
