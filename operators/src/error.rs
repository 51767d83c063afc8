use geopatch_datatypes::error::BoxedError;
use geopatch_datatypes::patch::FeatureKey;
use geopatch_datatypes::raster::RasterDataType;
use geopatch_datatypes::spatial_reference::SpatialReference;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    #[snafu(display("A bounding region is required to {}", operation))]
    MissingBoundingRegion {
        operation: &'static str,
    },

    #[snafu(display("The layer `{}` is required to {}", feature, operation))]
    MissingPrerequisiteLayer {
        feature: FeatureKey,
        operation: &'static str,
    },

    #[snafu(display("Expected exactly one tile from the service, found {}", found))]
    UnexpectedResponse {
        found: usize,
    },

    #[snafu(display(
        "Expected a tile of {}x{} pixels, found {}x{}",
        expected[0],
        expected[1],
        found[0],
        found[1]
    ))]
    UnexpectedTileSize {
        expected: [u32; 2],
        found: [u32; 2],
    },

    #[snafu(display("The table `{}` contains no feature with a geometry", table))]
    EmptyDataset {
        table: String,
    },

    #[snafu(display(
        "The geometry of the first feature of table `{}` does not declare a valid CRS",
        table
    ))]
    MissingDatasetCrs {
        table: String,
    },

    #[snafu(display(
        "To clip, the layer ({}) must be in the CRS of the bounding region ({})",
        layer,
        region
    ))]
    CrsMismatch {
        layer: SpatialReference,
        region: SpatialReference,
    },

    #[snafu(display("UnsupportedConfiguration: {}", reason))]
    UnsupportedConfiguration {
        reason: String,
    },

    #[snafu(display(
        "The existing layer `{}` is of type {}, but {} is configured",
        feature,
        found,
        expected
    ))]
    LayerDataTypeMismatch {
        feature: FeatureKey,
        expected: RasterDataType,
        found: RasterDataType,
    },

    #[snafu(display("InvalidGeometry: {}", source))]
    InvalidGeometry {
        source: geopatch_datatypes::error::Error,
    },

    #[snafu(display("Tile request failed: {}", source))]
    TileRequest {
        source: BoxedError,
    },

    #[snafu(display("Feature request failed: {}", source))]
    FeatureRequest {
        source: BoxedError,
    },

    #[snafu(display("ImageDecoding: {}", source))]
    ImageDecoding {
        source: image::ImageError,
    },

    #[snafu(display("Config: {}", source))]
    Config {
        source: config::ConfigError,
    },

    #[snafu(display("The settings could not be loaded: {}", reason))]
    ConfigInit {
        reason: String,
    },

    ConfigLockFailed,

    #[snafu(display("Could not determine the working directory: {}", source))]
    MissingWorkingDirectory {
        source: std::io::Error,
    },

    #[snafu(display("InvalidLogSpec: {}", source))]
    InvalidLogSpec {
        source: tracing_subscriber::filter::ParseError,
    },

    #[snafu(display("DataTypeError: {}", source))]
    DataType {
        source: geopatch_datatypes::error::Error,
    },
}

impl From<geopatch_datatypes::error::Error> for Error {
    fn from(datatype_error: geopatch_datatypes::error::Error) -> Self {
        Self::DataType {
            source: datatype_error,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(source: image::ImageError) -> Self {
        Self::ImageDecoding { source }
    }
}
