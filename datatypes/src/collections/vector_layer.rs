use geo::BoundingRect;
use serde_json::{Map, Value};
use snafu::ResultExt;

use crate::error;
use crate::operations::reproject::{CoordinateProjection, CoordinateProjector, Reproject};
use crate::primitives::BoundingBox2D;
use crate::spatial_reference::SpatialReference;
use crate::util::Result;

/// A single record of a vector layer
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub geometry: Option<geo::Geometry<f64>>,
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    pub fn new(geometry: Option<geo::Geometry<f64>>, properties: Map<String, Value>) -> Self {
        Self {
            geometry,
            properties,
        }
    }
}

impl TryFrom<geojson::Feature> for GeoFeature {
    type Error = error::Error;

    fn try_from(feature: geojson::Feature) -> Result<Self> {
        let geometry = feature
            .geometry
            .map(|geometry| geo::Geometry::<f64>::try_from(geometry.value))
            .transpose()
            .map_err(Box::new)
            .context(error::GeoJsonGeometry)?;

        Ok(Self {
            geometry,
            properties: feature.properties.unwrap_or_default(),
        })
    }
}

/// An ordered sequence of features whose geometries share one spatial reference
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    features: Vec<GeoFeature>,
    spatial_reference: SpatialReference,
}

impl VectorLayer {
    pub fn new(features: Vec<GeoFeature>, spatial_reference: SpatialReference) -> Self {
        Self {
            features,
            spatial_reference,
        }
    }

    /// Converts GeoJSON features into a layer in the given spatial reference
    ///
    /// # Errors
    ///
    /// Fails if a geometry cannot be represented as a `geo` geometry
    pub fn try_from_geojson_features<I>(
        features: I,
        spatial_reference: SpatialReference,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = geojson::Feature>,
    {
        let features = features
            .into_iter()
            .map(GeoFeature::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(features, spatial_reference))
    }

    /// Reads the spatial reference that a service embeds into a GeoJSON geometry as
    /// `"crs": {"type": "name", "properties": {"name": "..."}}`
    pub fn embedded_spatial_reference(geometry: &geojson::Geometry) -> Option<SpatialReference> {
        let name = geometry
            .foreign_members
            .as_ref()?
            .get("crs")?
            .get("properties")?
            .get("name")?
            .as_str()?;

        SpatialReference::from_crs_name(name).ok()
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<GeoFeature> {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    /// The bounds of all geometries, or `None` if there is no geometry with coordinates
    pub fn bounding_box(&self) -> Option<BoundingBox2D> {
        self.features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref()?.bounding_rect())
            .map(BoundingBox2D::from)
            .reduce(|a, b| a.union(&b))
    }

    /// Transforms all geometries into the `target` spatial reference
    pub fn reproject_to(&self, target: SpatialReference) -> Result<Self> {
        if self.spatial_reference == target {
            return Ok(self.clone());
        }

        let projector = CoordinateProjector::from_known_srs(self.spatial_reference, target)?;

        self.reproject(&projector)
    }

    /// Replaces every geometry by the output of `f`. Features for which `f` returns `None`
    /// and features without geometry are removed.
    #[must_use]
    pub fn filter_map_geometries<F>(self, mut f: F) -> Self
    where
        F: FnMut(geo::Geometry<f64>) -> Option<geo::Geometry<f64>>,
    {
        let features = self
            .features
            .into_iter()
            .filter_map(|feature| {
                let geometry = f(feature.geometry?)?;
                Some(GeoFeature::new(Some(geometry), feature.properties))
            })
            .collect();

        Self::new(features, self.spatial_reference)
    }
}

impl<P> Reproject<P> for VectorLayer
where
    P: CoordinateProjection,
{
    type Out = VectorLayer;

    fn reproject(&self, projector: &P) -> Result<Self::Out> {
        let features = self
            .features
            .iter()
            .map(|feature| {
                let geometry = feature
                    .geometry
                    .as_ref()
                    .map(|geometry| geometry.reproject(projector))
                    .transpose()?;

                Ok(GeoFeature::new(geometry, feature.properties.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(VectorLayer::new(features, projector.target_srs()))
    }
}
