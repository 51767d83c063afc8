pub mod raster_overlay;
pub mod raster_reprojection;
pub mod vector_overlay;

pub use raster_overlay::{RasterOverlayImporter, RasterOverlayParams};
pub use vector_overlay::{VectorOverlayImporter, VectorOverlayParams};
