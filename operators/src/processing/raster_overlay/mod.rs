mod class_spec;
mod classification;

pub use class_spec::{BinaryClass, ClassDefinition, ClassSpec, MulticlassMap};
pub use classification::{classify, classify_binary, classify_multiclass};

use geopatch_datatypes::call_with_pixel_type;
use geopatch_datatypes::patch::{FeatureKey, FeatureType, Patch};
use geopatch_datatypes::primitives::BoundingRegion;
use geopatch_datatypes::raster::{Pixel, RasterDataType, TypedArray};
use geopatch_datatypes::spatial_reference::SpatialReference;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use tracing::{Dispatch, instrument};

use crate::config::{RasterOverlayDefaults, get_config_element};
use crate::error::{self, Error};
use crate::processing::raster_reprojection::reproject_raster;
use crate::source::{MimeType, RasterTile, TileRequest, TileRequestClient};
use crate::util::Result;

/// Parameters of the `RasterOverlayImporter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterOverlayParams {
    /// the raster layer that receives the overlay
    pub feature: FeatureKey,
    pub layer: String,
    pub theme: String,
    pub raster_value: ClassSpec,
    #[serde(default)]
    pub raster_dtype: RasterDataType,
    #[serde(default)]
    pub no_data_value: f64,
    /// defaults to the `[raster_overlay_defaults]` settings
    #[serde(default)]
    pub image_format: Option<MimeType>,
    /// defaults to the `[raster_overlay_defaults]` settings
    #[serde(default)]
    pub mean_abs_difference: Option<f64>,
    /// the layer that determines the size of the raster
    #[serde(default = "default_mask_feature")]
    pub mask_feature: FeatureKey,
}

fn default_mask_feature() -> FeatureKey {
    FeatureKey::new(FeatureType::Mask, "IS_DATA")
}

impl RasterOverlayParams {
    pub fn new(
        feature: FeatureKey,
        layer: impl Into<String>,
        theme: impl Into<String>,
        raster_value: ClassSpec,
    ) -> Self {
        Self {
            feature,
            layer: layer.into(),
            theme: theme.into(),
            raster_value,
            raster_dtype: RasterDataType::default(),
            no_data_value: 0.,
            image_format: None,
            mean_abs_difference: None,
            mask_feature: default_mask_feature(),
        }
    }
}

/// Adds a layer of a remote tile service to the raster layers of a patch.
///
/// The service only serves Web Mercator tiles, so the tile is requested for the transformed
/// region of the patch, classified and then resampled onto the grid of the patch.
pub struct RasterOverlayImporter<C> {
    params: RasterOverlayParams,
    image_format: MimeType,
    mean_abs_difference: f64,
    client: C,
    dispatch: Option<Dispatch>,
}

impl<C> RasterOverlayImporter<C>
where
    C: TileRequestClient,
{
    /// Validates the parameters and fills the missing ones from the settings
    pub fn new(params: RasterOverlayParams, client: C) -> Result<Self> {
        for feature in [&params.feature, &params.mask_feature] {
            if !feature.feature_type.is_raster() {
                return Err(geopatch_datatypes::error::Error::InvalidFeatureType {
                    feature_type: feature.feature_type,
                    expected: "raster",
                }
                .into());
            }
        }

        let (image_format, mean_abs_difference) =
            match (params.image_format, params.mean_abs_difference) {
                (Some(image_format), Some(mean_abs_difference)) => {
                    (image_format, mean_abs_difference)
                }
                (image_format, mean_abs_difference) => {
                    let defaults: RasterOverlayDefaults = get_config_element()?;
                    (
                        image_format.unwrap_or(defaults.image_format),
                        mean_abs_difference.unwrap_or(defaults.mean_abs_difference),
                    )
                }
            };

        let dtype = params.raster_dtype;

        ensure!(
            dtype.is_valid(params.no_data_value),
            error::UnsupportedConfiguration {
                reason: format!(
                    "the no-data value {} cannot be stored as {dtype}",
                    params.no_data_value
                ),
            }
        );

        if let Some(label) = params
            .raster_value
            .labels()
            .into_iter()
            .find(|&label| !dtype.is_valid(label))
        {
            return Err(Error::UnsupportedConfiguration {
                reason: format!("the label {label} cannot be stored as {dtype}"),
            });
        }

        ensure!(
            mean_abs_difference > 0.,
            error::UnsupportedConfiguration {
                reason: format!(
                    "the mean absolute difference {mean_abs_difference} is not positive"
                ),
            }
        );

        Ok(Self {
            params,
            image_format,
            mean_abs_difference,
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

    pub fn params(&self) -> &RasterOverlayParams {
        &self.params
    }

    /// Fetches, classifies and resamples the remote layer and merges it into the target layer
    pub fn execute(&self, patch: Patch) -> Result<Patch> {
        match &self.dispatch {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || self.execute_on_patch(patch))
            }
            None => self.execute_on_patch(patch),
        }
    }

    #[instrument(skip_all, fields(feature = %self.params.feature, layer = %self.params.layer))]
    fn execute_on_patch(&self, mut patch: Patch) -> Result<Patch> {
        let mask_feature = &self.params.mask_feature;

        let [height, width] = patch.raster_spatial_shape(mask_feature).context(
            error::MissingPrerequisiteLayer {
                feature: mask_feature.clone(),
                operation: "determine the size of the raster overlay",
            },
        )?;

        let region = patch
            .bounding_region()
            .context(error::MissingBoundingRegion {
                operation: "request a raster overlay",
            })?;

        let native_region = region.transform(SpatialReference::web_mercator())?;

        let tile = self.request_tile(native_region, width, height)?;

        let raster = call_with_pixel_type!(self.params.raster_dtype, T => {
            self.overlay::<T>(&patch, &tile, &region, [height, width])?
        });

        let feature = self.params.feature.clone();
        let raster = if feature.feature_type.is_timeless() {
            raster.insert_axis(2)
        } else {
            raster.insert_axis(2).insert_axis(0)
        };

        patch.insert_raster(feature, raster)?;

        Ok(patch)
    }

    fn request_tile(
        &self,
        native_region: BoundingRegion,
        width: usize,
        height: usize,
    ) -> Result<RasterTile> {
        let expected = [width as u32, height as u32];

        let request = TileRequest {
            layer: self.params.layer.clone(),
            theme: self.params.theme.clone(),
            bbox: native_region,
            width: expected[0],
            height: expected[1],
            image_format: self.image_format,
        };

        tracing::debug!(
            bbox = %request.bbox,
            width = request.width,
            height = request.height,
            "request tile"
        );

        let mut tiles = self
            .client
            .request_tiles(&request)
            .context(error::TileRequest)?;

        ensure!(
            tiles.len() == 1,
            error::UnexpectedResponse { found: tiles.len() }
        );

        let tile = tiles.remove(0);
        let found = [tile.width(), tile.height()];

        ensure!(found == expected, error::UnexpectedTileSize { expected, found });

        Ok(tile)
    }

    /// Classifies the tile, resamples it onto the grid of `region` and merges it with the
    /// target layer
    fn overlay<T: Pixel>(
        &self,
        patch: &Patch,
        tile: &RasterTile,
        region: &BoundingRegion,
        grid: [usize; 2],
    ) -> Result<TypedArray> {
        let no_data_value = T::from_f64(self.params.no_data_value);

        let classified = classify::<T>(
            &tile.image,
            &self.params.raster_value,
            no_data_value,
            self.mean_abs_difference,
        );

        let reprojected = reproject_raster(&classified, &tile.bbox, region, no_data_value)?;

        let raster = match &self.params.raster_value {
            ClassSpec::Binary(_) => {
                let mut base = self.base_raster::<T>(patch, grid)?;
                merge_nonzero(&mut base, &reprojected);
                base
            }
            ClassSpec::Multiclass(_) => reprojected,
        };

        Ok(T::into_typed_array(raster.into_dyn()))
    }

    /// The existing target layer as a grid, or a grid filled with the no-data value
    fn base_raster<T: Pixel>(&self, patch: &Patch, grid: [usize; 2]) -> Result<Array2<T>> {
        let feature = &self.params.feature;

        let Some(existing) = patch.raster(feature) else {
            return Ok(Array2::from_elem(
                (grid[0], grid[1]),
                T::from_f64(self.params.no_data_value),
            ));
        };

        ensure!(
            existing.data_type() == T::TYPE,
            error::LayerDataTypeMismatch {
                feature: feature.clone(),
                expected: T::TYPE,
                found: existing.data_type(),
            }
        );

        tracing::debug!(feature = %feature, "merge into existing layer");

        Ok(existing
            .clone()
            .into_grid::<T>(grid, &feature.to_string())?)
    }
}

/// Overwrites the cells of `base` where `update` is nonzero
fn merge_nonzero<T: Pixel>(base: &mut Array2<T>, update: &Array2<T>) {
    Zip::from(base).and(update).for_each(|base, &update| {
        if !update.is_zero() {
            *base = update;
        }
    });
}
