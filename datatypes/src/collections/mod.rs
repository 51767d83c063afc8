mod vector_layer;

pub use vector_layer::{GeoFeature, VectorLayer};
