use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::collections::VectorLayer;
use crate::error;
use crate::primitives::BoundingRegion;
use crate::raster::TypedArray;
use crate::util::Result;

/// The category of a patch layer. It determines the kind of data and, for rasters, the axes.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    /// raster time series with axes `(time, height, width, channels)`
    Data,
    /// raster time series with axes `(time, height, width, channels)`
    Mask,
    /// raster with axes `(height, width, channels)`
    DataTimeless,
    /// raster with axes `(height, width, channels)`
    MaskTimeless,
    Vector,
    VectorTimeless,
}

impl FeatureType {
    pub fn is_raster(self) -> bool {
        matches!(
            self,
            FeatureType::Data
                | FeatureType::Mask
                | FeatureType::DataTimeless
                | FeatureType::MaskTimeless
        )
    }

    pub fn is_vector(self) -> bool {
        matches!(self, FeatureType::Vector | FeatureType::VectorTimeless)
    }

    pub fn is_timeless(self) -> bool {
        matches!(
            self,
            FeatureType::DataTimeless | FeatureType::MaskTimeless | FeatureType::VectorTimeless
        )
    }

    /// The number of axes a raster of this type has, or `None` for vector types
    pub fn raster_ndim(self) -> Option<usize> {
        match self {
            FeatureType::Data | FeatureType::Mask => Some(4),
            FeatureType::DataTimeless | FeatureType::MaskTimeless => Some(3),
            FeatureType::Vector | FeatureType::VectorTimeless => None,
        }
    }

    /// Extracts `[height, width]` from the shape of a raster of this type
    pub fn spatial_shape(self, shape: &[usize]) -> Option<[usize; 2]> {
        match (self.raster_ndim()?, shape) {
            (4, &[_, height, width, _]) | (3, &[height, width, _]) => Some([height, width]),
            _ => None,
        }
    }
}

/// Identifies a layer of a patch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureKey {
    pub feature_type: FeatureType,
    pub name: String,
}

impl FeatureKey {
    pub fn new(feature_type: FeatureType, name: impl Into<String>) -> Self {
        Self {
            feature_type,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.feature_type, self.name)
    }
}

/// A container of spatially aligned raster and vector layers with an optional bounding region.
///
/// All raster layers share the same `[height, width]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    rasters: BTreeMap<FeatureKey, TypedArray>,
    vectors: BTreeMap<FeatureKey, VectorLayer>,
    bounding_region: Option<BoundingRegion>,
}

impl Patch {
    pub fn new(bounding_region: Option<BoundingRegion>) -> Self {
        Self {
            bounding_region,
            ..Default::default()
        }
    }

    pub fn bounding_region(&self) -> Option<BoundingRegion> {
        self.bounding_region
    }

    pub fn set_bounding_region(&mut self, bounding_region: BoundingRegion) {
        self.bounding_region = Some(bounding_region);
    }

    pub fn raster(&self, key: &FeatureKey) -> Option<&TypedArray> {
        self.rasters.get(key)
    }

    pub fn vector(&self, key: &FeatureKey) -> Option<&VectorLayer> {
        self.vectors.get(key)
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.rasters.contains_key(key) || self.vectors.contains_key(key)
    }

    pub fn raster_keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.rasters.keys()
    }

    pub fn vector_keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.vectors.keys()
    }

    /// The `[height, width]` of the raster at `key`
    pub fn raster_spatial_shape(&self, key: &FeatureKey) -> Option<[usize; 2]> {
        key.feature_type.spatial_shape(self.raster(key)?.shape())
    }

    /// The `[height, width]` shared by all raster layers, or `None` if there is no raster
    pub fn spatial_shape(&self) -> Option<[usize; 2]> {
        self.rasters
            .iter()
            .find_map(|(key, raster)| key.feature_type.spatial_shape(raster.shape()))
    }

    /// Inserts a raster layer and returns the replaced one
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a raster type, if the raster does not have the axes of its type or
    /// if its spatial size differs from the other raster layers
    pub fn insert_raster(
        &mut self,
        key: FeatureKey,
        raster: TypedArray,
    ) -> Result<Option<TypedArray>> {
        let feature_type = key.feature_type;

        ensure!(
            feature_type.is_raster(),
            error::InvalidFeatureType {
                feature_type,
                expected: "raster",
            }
        );

        let spatial_shape = feature_type.spatial_shape(raster.shape()).ok_or_else(|| {
            error::Error::InvalidLayerShape {
                feature: key.to_string(),
                expected_ndim: feature_type.raster_ndim().unwrap_or_default(),
                shape: raster.shape().to_vec(),
            }
        })?;

        let existing = self
            .rasters
            .iter()
            .filter(|(other, _)| **other != key)
            .find_map(|(other, raster)| other.feature_type.spatial_shape(raster.shape()));

        if let Some(expected) = existing {
            ensure!(
                expected == spatial_shape,
                error::SpatialSizeMismatch {
                    feature: key.to_string(),
                    found: spatial_shape,
                    expected,
                }
            );
        }

        tracing::trace!(feature = %key, shape = ?raster.shape(), "insert raster layer");

        Ok(self.rasters.insert(key, raster))
    }

    /// Inserts a vector layer and returns the replaced one
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a vector type
    pub fn insert_vector(
        &mut self,
        key: FeatureKey,
        layer: VectorLayer,
    ) -> Result<Option<VectorLayer>> {
        let feature_type = key.feature_type;

        ensure!(
            feature_type.is_vector(),
            error::InvalidFeatureType {
                feature_type,
                expected: "vector",
            }
        );

        tracing::trace!(feature = %key, features = layer.len(), "insert vector layer");

        Ok(self.vectors.insert(key, layer))
    }

    pub fn remove_raster(&mut self, key: &FeatureKey) -> Option<TypedArray> {
        self.rasters.remove(key)
    }

    pub fn remove_vector(&mut self, key: &FeatureKey) -> Option<VectorLayer> {
        self.vectors.remove(key)
    }
}
