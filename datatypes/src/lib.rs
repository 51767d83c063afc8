pub mod collections;
pub mod error;
pub mod operations;
pub mod patch;
pub mod primitives;
pub mod raster;
pub mod spatial_reference;
pub mod util;
