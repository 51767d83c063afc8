pub use self::data_type::{Pixel, RasterDataType, StaticRasterDataType};
pub use self::geo_transform::{GeoTransform, GridIdx2D};
pub use self::typed_array::{TypedArray, TypedArrayConversion};

mod data_type;
mod geo_transform;
mod typed_array;
