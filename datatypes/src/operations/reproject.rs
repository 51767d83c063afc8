use geo::MapCoords;

use crate::{
    primitives::{BoundingBox2D, Coordinate2D},
    spatial_reference::SpatialReference,
    util::{Result, proj_projector::ProjCoordinateProjector},
};

/// The number of points sampled per edge when reprojecting the outline of a bounding box
pub const OUTLINE_POINTS_PER_EDGE: usize = 21;

pub trait CoordinateProjection {
    fn from_known_srs(from: SpatialReference, to: SpatialReference) -> Result<Self>
    where
        Self: Sized;
    fn project_coordinate(&self, c: Coordinate2D) -> Result<Coordinate2D>;
    fn project_coordinates<A: AsRef<[Coordinate2D]>>(&self, coords: A)
    -> Result<Vec<Coordinate2D>>;
    fn source_srs(&self) -> SpatialReference;
    fn target_srs(&self) -> SpatialReference;
}

/// The projector that is used throughout the crate
pub type CoordinateProjector = ProjCoordinateProjector;

pub trait Reproject<P: CoordinateProjection> {
    type Out;
    fn reproject(&self, projector: &P) -> Result<Self::Out>;
}

impl<P> Reproject<P> for Coordinate2D
where
    P: CoordinateProjection,
{
    type Out = Coordinate2D;

    fn reproject(&self, projector: &P) -> Result<Self::Out> {
        projector.project_coordinate(*self)
    }
}

/// Reprojects the densified outline of the bounding box and returns the bounds of the result.
impl<P> Reproject<P> for BoundingBox2D
where
    P: CoordinateProjection,
{
    type Out = BoundingBox2D;

    fn reproject(&self, projector: &P) -> Result<Self::Out> {
        let outline = self.outline_coordinates(OUTLINE_POINTS_PER_EDGE);
        let projected = projector.project_coordinates(&outline)?;

        BoundingBox2D::from_coord_iter(projected.into_iter().filter(Coordinate2D::is_finite))
            .ok_or(crate::error::Error::EmptyCoordinateSet)
    }
}

impl<P> Reproject<P> for geo::Geometry<f64>
where
    P: CoordinateProjection,
{
    type Out = geo::Geometry<f64>;

    fn reproject(&self, projector: &P) -> Result<Self::Out> {
        self.try_map_coords(|coord| {
            projector
                .project_coordinate(coord.into())
                .map(geo::Coord::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::line_string;

    /// Swaps x and y, which allows testing without a PROJ database
    struct AxisSwapProjector {
        from: SpatialReference,
        to: SpatialReference,
    }

    impl CoordinateProjection for AxisSwapProjector {
        fn from_known_srs(from: SpatialReference, to: SpatialReference) -> Result<Self> {
            Ok(Self { from, to })
        }

        fn project_coordinate(&self, c: Coordinate2D) -> Result<Coordinate2D> {
            Ok(Coordinate2D::new(c.y, c.x))
        }

        fn project_coordinates<A: AsRef<[Coordinate2D]>>(
            &self,
            coords: A,
        ) -> Result<Vec<Coordinate2D>> {
            coords
                .as_ref()
                .iter()
                .map(|&c| self.project_coordinate(c))
                .collect()
        }

        fn source_srs(&self) -> SpatialReference {
            self.from
        }

        fn target_srs(&self) -> SpatialReference {
            self.to
        }
    }

    #[test]
    fn reproject_bbox_outline() {
        let projector = AxisSwapProjector::from_known_srs(
            SpatialReference::epsg_4326(),
            SpatialReference::web_mercator(),
        )
        .unwrap();

        let bbox = BoundingBox2D::from_bounds([1.0, 2.0, 3.0, 6.0]).unwrap();

        assert_eq!(
            bbox.reproject(&projector).unwrap().bounds(),
            [2.0, 1.0, 6.0, 3.0]
        );
    }

    #[test]
    fn reproject_geometry() {
        let projector = AxisSwapProjector::from_known_srs(
            SpatialReference::epsg_4326(),
            SpatialReference::web_mercator(),
        )
        .unwrap();

        let line = geo::Geometry::LineString(geo::line_string![(x: 1., y: 2.), (x: 3., y: 4.)]);

        assert_eq!(
            line.reproject(&projector).unwrap(),
            geo::Geometry::LineString(geo::line_string![(x: 2., y: 1.), (x: 4., y: 3.)])
        );
    }

    #[test]
    fn reproject_wgs84_to_web_mercator() {
        let projector = CoordinateProjector::from_known_srs(
            SpatialReference::epsg_4326(),
            SpatialReference::web_mercator(),
        )
        .unwrap();

        let projected = Coordinate2D::new(180.0, 0.0).reproject(&projector).unwrap();

        assert_abs_diff_eq!(projected.x, 20_037_508.342_789_244, epsilon = 1e-6);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-6);
    }
}
