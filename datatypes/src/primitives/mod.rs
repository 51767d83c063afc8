mod bounding_box;
mod bounding_region;
mod coordinate;

pub use bounding_box::BoundingBox2D;
pub use bounding_region::BoundingRegion;
pub use coordinate::Coordinate2D;
