use snafu::Snafu;

use crate::patch::FeatureType;
use crate::primitives::Coordinate2D;
use crate::raster::RasterDataType;
use crate::spatial_reference::SpatialReference;

/// The error type of remote collaborators, e.g. tile or feature clients
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    #[snafu(display(
        "The conditions ll.x <= ur.x && ll.y <= ur.y are not met by ll:{} ur:{}",
        lower_left_coordinate,
        upper_right_coordinate
    ))]
    InvalidBoundingBox {
        lower_left_coordinate: Coordinate2D,
        upper_right_coordinate: Coordinate2D,
    },

    #[snafu(display("Cannot build a bounding box from an empty set of coordinates"))]
    EmptyCoordinateSet,

    #[snafu(display("InvalidSpatialReferenceString: {}", spatial_reference_string))]
    InvalidSpatialReferenceString {
        spatial_reference_string: String,
    },

    #[snafu(display("ParseU32: {}", source))]
    ParseU32 {
        source: <u32 as std::str::FromStr>::Err,
    },

    #[snafu(display("No CoordinateProjector available for: {} --> {}", from, to))]
    NoCoordinateProjector {
        from: SpatialReference,
        to: SpatialReference,
    },

    #[snafu(display("ProjInternal: {}", source))]
    ProjInternal {
        source: proj::ProjError,
    },

    #[snafu(display("Invalid GeoJSON geometry: {}", source))]
    GeoJsonGeometry {
        source: Box<geojson::Error>,
    },

    #[snafu(display(
        "Layer `{}` must have {} dimensions, but has shape {:?}",
        feature,
        expected_ndim,
        shape
    ))]
    InvalidLayerShape {
        feature: String,
        expected_ndim: usize,
        shape: Vec<usize>,
    },

    #[snafu(display(
        "Layer `{}` has a spatial size of {:?}, but the rasters of the patch have {:?}",
        feature,
        found,
        expected
    ))]
    SpatialSizeMismatch {
        feature: String,
        found: [usize; 2],
        expected: [usize; 2],
    },

    #[snafu(display("Feature type {} cannot hold {} data", feature_type, expected))]
    InvalidFeatureType {
        feature_type: FeatureType,
        expected: &'static str,
    },

    #[snafu(display(
        "Cannot convert a typed array of type {:?} into {:?}",
        found,
        expected
    ))]
    InvalidTypedArrayConversion {
        expected: RasterDataType,
        found: RasterDataType,
    },
}

impl From<proj::ProjError> for Error {
    fn from(source: proj::ProjError) -> Self {
        Error::ProjInternal { source }
    }
}
