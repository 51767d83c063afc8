use serde::{Deserialize, Serialize};

use super::{BoundingBox2D, Coordinate2D};
use crate::error;
use crate::operations::reproject::{CoordinateProjection, CoordinateProjector, Reproject};
use crate::spatial_reference::SpatialReference;
use crate::util::Result;

/// An axis-aligned extent together with the spatial reference its coordinates are given in
#[derive(Copy, Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    bbox: BoundingBox2D,
    spatial_reference: SpatialReference,
}

impl BoundingRegion {
    pub fn new(bbox: BoundingBox2D, spatial_reference: SpatialReference) -> Self {
        Self {
            bbox,
            spatial_reference,
        }
    }

    /// Creates a new region from its bounds in the order `min_x, min_y, max_x, max_y`
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::primitives::BoundingRegion;
    /// use geopatch_datatypes::spatial_reference::SpatialReference;
    ///
    /// let region =
    ///     BoundingRegion::from_bounds([0.0, 0.0, 10.0, 10.0], SpatialReference::epsg_4326())
    ///         .unwrap();
    ///
    /// assert_eq!(region.bbox().size_x(), 10.0);
    /// ```
    pub fn from_bounds(bounds: [f64; 4], spatial_reference: SpatialReference) -> Result<Self> {
        Ok(Self::new(
            BoundingBox2D::from_bounds(bounds)?,
            spatial_reference,
        ))
    }

    pub fn bbox(&self) -> BoundingBox2D {
        self.bbox
    }

    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    /// Transforms the lower left and the upper right corner into the `target` spatial reference.
    ///
    /// This keeps the pixel grid of rasters aligned with the corners of the region,
    /// but the result does not necessarily cover the whole region.
    pub fn transform(&self, target: SpatialReference) -> Result<Self> {
        self.transform_with::<CoordinateProjector>(target)
    }

    pub fn transform_with<P: CoordinateProjection>(
        &self,
        target: SpatialReference,
    ) -> Result<Self> {
        if self.spatial_reference == target {
            return Ok(*self);
        }

        let projector = P::from_known_srs(self.spatial_reference, target)?;

        let corners = projector
            .project_coordinates([self.bbox.lower_left(), self.bbox.upper_right()])?;

        let bbox =
            BoundingBox2D::from_coord_iter(corners.into_iter().filter(Coordinate2D::is_finite))
                .ok_or(error::Error::EmptyCoordinateSet)?;

        Ok(Self::new(bbox, target))
    }

    /// Transforms the densified outline of the region into the `target` spatial reference
    /// and returns a region covering all of it.
    pub fn transform_bounds(&self, target: SpatialReference) -> Result<Self> {
        self.transform_bounds_with::<CoordinateProjector>(target)
    }

    pub fn transform_bounds_with<P: CoordinateProjection>(
        &self,
        target: SpatialReference,
    ) -> Result<Self> {
        if self.spatial_reference == target {
            return Ok(*self);
        }

        let projector = P::from_known_srs(self.spatial_reference, target)?;

        Ok(Self::new(self.bbox.reproject(&projector)?, target))
    }
}

impl std::fmt::Display for BoundingRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [min_x, min_y, max_x, max_y] = self.bbox.bounds();
        write!(
            f,
            "[{min_x}, {min_y}, {max_x}, {max_y}] ({})",
            self.spatial_reference
        )
    }
}
