mod clip;

pub use clip::clip_geometry;

use geopatch_datatypes::collections::VectorLayer;
use geopatch_datatypes::patch::{FeatureKey, Patch};
use geopatch_datatypes::primitives::BoundingRegion;
use geopatch_datatypes::spatial_reference::SpatialReference;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, ensure};
use tracing::{Dispatch, instrument};

use crate::error;
use crate::source::{FeatureIterationClient, FeatureQuery, ServiceAccessConfig};
use crate::util::Result;

/// Parameters of the `VectorOverlayImporter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorOverlayParams {
    /// the vector layer that receives the features
    pub feature: FeatureKey,
    pub table: String,
    /// transform the features into the CRS of the bounding region
    #[serde(default = "default_true")]
    pub reproject: bool,
    /// clip the features to the bounding region
    #[serde(default)]
    pub clip: bool,
    /// defaults to the `[service_access]` settings
    #[serde(default)]
    pub config: Option<ServiceAccessConfig>,
    #[serde(default)]
    pub extra_params: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl VectorOverlayParams {
    pub fn new(feature: FeatureKey, table: impl Into<String>) -> Self {
        Self {
            feature,
            table: table.into(),
            reproject: true,
            clip: false,
            config: None,
            extra_params: Map::new(),
        }
    }
}

/// Adds the features of a remote table to the vector layers of a patch.
///
/// The service is queried in Web Mercator. The features are read in the CRS that the service
/// declares on the first geometry and optionally reprojected and clipped to the bounding region.
pub struct VectorOverlayImporter<C> {
    params: VectorOverlayParams,
    config: ServiceAccessConfig,
    client: C,
    dispatch: Option<Dispatch>,
}

impl<C> VectorOverlayImporter<C>
where
    C: FeatureIterationClient,
{
    pub fn new(params: VectorOverlayParams, client: C) -> Result<Self> {
        if !params.feature.feature_type.is_vector() {
            return Err(geopatch_datatypes::error::Error::InvalidFeatureType {
                feature_type: params.feature.feature_type,
                expected: "vector",
            }
            .into());
        }

        let config = match &params.config {
            Some(config) => config.clone(),
            None => ServiceAccessConfig::from_settings()?,
        };

        Ok(Self {
            params,
            config,
            client,
            dispatch: None,
        })
    }

    /// Emits all logs of `execute` to `dispatch` instead of the current default
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn params(&self) -> &VectorOverlayParams {
        &self.params
    }

    /// Fetches the features and writes them into `patch`, or into a new patch if there is none.
    ///
    /// `bounding_region` takes precedence over the bounding region of the patch. Without any
    /// region the whole table is fetched.
    pub fn execute(
        &self,
        patch: Option<Patch>,
        bounding_region: Option<BoundingRegion>,
    ) -> Result<Patch> {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || {
                self.execute_on_patch(patch, bounding_region)
            }),
            None => self.execute_on_patch(patch, bounding_region),
        }
    }

    #[instrument(skip_all, fields(feature = %self.params.feature, table = %self.params.table))]
    fn execute_on_patch(
        &self,
        patch: Option<Patch>,
        bounding_region: Option<BoundingRegion>,
    ) -> Result<Patch> {
        let region =
            bounding_region.or_else(|| patch.as_ref().and_then(Patch::bounding_region));

        let query_region = region
            .map(|region| region.transform_bounds(SpatialReference::web_mercator()))
            .transpose()?;

        let mut layer = self.fetch_layer(query_region)?;

        if self.params.reproject {
            let region = region.context(error::MissingBoundingRegion {
                operation: "reproject the features",
            })?;

            layer = layer.reproject_to(region.spatial_reference())?;
        }

        if self.params.clip {
            let region = region.context(error::MissingBoundingRegion {
                operation: "clip the features",
            })?;

            layer = clip_layer(layer, &region)?;
        }

        let region = region.or_else(|| {
            layer
                .bounding_box()
                .map(|bbox| BoundingRegion::new(bbox, layer.spatial_reference()))
        });

        tracing::debug!(
            features = layer.len(),
            crs = %layer.spatial_reference(),
            "import vector layer"
        );

        let mut patch = match patch {
            Some(mut patch) => {
                if let (None, Some(region)) = (patch.bounding_region(), region) {
                    patch.set_bounding_region(region);
                }
                patch
            }
            None => Patch::new(region),
        };

        patch.insert_vector(self.params.feature.clone(), layer)?;

        Ok(patch)
    }

    /// Reads all pages of the table into a layer in the CRS of the dataset
    fn fetch_layer(&self, query_region: Option<BoundingRegion>) -> Result<VectorLayer> {
        let query = FeatureQuery {
            table: self.params.table.clone(),
            bbox: query_region,
            offset: 0,
            config: self.config.clone(),
            extra_params: self.params.extra_params.clone(),
        };

        tracing::debug!(bbox = ?query.bbox, "iterate features");

        let features = self
            .client
            .iterate_features(&query)
            .context(error::FeatureRequest)?
            .collect::<Result<Vec<geojson::Feature>, _>>()
            .context(error::FeatureRequest)?;

        let first_geometry = features
            .first()
            .and_then(|feature| feature.geometry.as_ref())
            .context(error::EmptyDataset {
                table: self.params.table.clone(),
            })?;

        let spatial_reference = VectorLayer::embedded_spatial_reference(first_geometry).context(
            error::MissingDatasetCrs {
                table: self.params.table.clone(),
            },
        )?;

        VectorLayer::try_from_geojson_features(features, spatial_reference)
            .context(error::InvalidGeometry)
    }
}

/// Clips all geometries to the extent of `region` and drops the features with nothing left inside
fn clip_layer(layer: VectorLayer, region: &BoundingRegion) -> Result<VectorLayer> {
    ensure!(
        layer.spatial_reference() == region.spatial_reference(),
        error::CrsMismatch {
            layer: layer.spatial_reference(),
            region: region.spatial_reference(),
        }
    );

    let bbox = region.bbox();
    let count = layer.len();

    let clipped = layer.filter_map_geometries(|geometry| clip_geometry(geometry, &bbox));

    tracing::trace!(region = %region, dropped = count - clipped.len(), "clip features");

    Ok(clipped)
}
