use geopatch_datatypes::operations::reproject::{CoordinateProjection, CoordinateProjector};
use geopatch_datatypes::primitives::{BoundingRegion, Coordinate2D};
use geopatch_datatypes::raster::{GeoTransform, Pixel};
use ndarray::Array2;
use tracing::instrument;

use crate::util::Result;

/// Resamples `source`, which covers `source_region`, onto a grid of the same size that covers
/// `target_region`.
///
/// Every target pixel center is projected into the source grid and takes the value of the pixel
/// it falls into. Target pixels outside of the source grid, and pixels that hit a source value of
/// `0`, are set to `no_data_value`.
pub fn reproject_raster<T: Pixel>(
    source: &Array2<T>,
    source_region: &BoundingRegion,
    target_region: &BoundingRegion,
    no_data_value: T,
) -> Result<Array2<T>> {
    reproject_raster_with::<T, CoordinateProjector>(
        source,
        source_region,
        target_region,
        no_data_value,
    )
}

#[instrument(skip(source, no_data_value), fields(shape = ?source.dim()))]
pub fn reproject_raster_with<T, P>(
    source: &Array2<T>,
    source_region: &BoundingRegion,
    target_region: &BoundingRegion,
    no_data_value: T,
) -> Result<Array2<T>>
where
    T: Pixel,
    P: CoordinateProjection,
{
    let (height, width) = source.dim();

    let source_transform = GeoTransform::from_bounds(source_region.bbox(), width, height);
    let target_transform = GeoTransform::from_bounds(target_region.bbox(), width, height);

    let target_centers: Vec<Coordinate2D> = (0..height)
        .flat_map(|y| (0..width).map(move |x| [y as isize, x as isize]))
        .map(|idx| target_transform.grid_idx_to_center_coordinate_2d(idx))
        .collect();

    let source_centers = if source_region.spatial_reference() == target_region.spatial_reference()
    {
        target_centers
    } else {
        let projector = P::from_known_srs(
            target_region.spatial_reference(),
            source_region.spatial_reference(),
        )?;
        projector.project_coordinates(&target_centers)?
    };

    let lookup = |coordinate: Coordinate2D| -> Option<T> {
        if !coordinate.is_finite() {
            return None;
        }

        let [y, x] = source_transform.coordinate_to_grid_idx_2d(coordinate);
        let y = usize::try_from(y).ok()?;
        let x = usize::try_from(x).ok()?;

        source.get((y, x)).copied().filter(|value| !value.is_zero())
    };

    Ok(Array2::from_shape_fn((height, width), |(y, x)| {
        source_centers
            .get(y * width + x)
            .copied()
            .and_then(lookup)
            .unwrap_or(no_data_value)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopatch_datatypes::spatial_reference::SpatialReference;
    use ndarray::array;

    /// Shifts by `+1` in x, which allows testing without a PROJ database
    struct ShiftProjector {
        from: SpatialReference,
        to: SpatialReference,
    }

    impl CoordinateProjection for ShiftProjector {
        fn from_known_srs(
            from: SpatialReference,
            to: SpatialReference,
        ) -> Result<Self, geopatch_datatypes::error::Error> {
            Ok(Self { from, to })
        }

        fn project_coordinate(
            &self,
            c: Coordinate2D,
        ) -> Result<Coordinate2D, geopatch_datatypes::error::Error> {
            Ok(Coordinate2D::new(c.x + 1., c.y))
        }

        fn project_coordinates<A: AsRef<[Coordinate2D]>>(
            &self,
            coords: A,
        ) -> Result<Vec<Coordinate2D>, geopatch_datatypes::error::Error> {
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

    fn region(bounds: [f64; 4], spatial_reference: SpatialReference) -> BoundingRegion {
        BoundingRegion::from_bounds(bounds, spatial_reference).unwrap()
    }

    #[test]
    fn identity_for_equal_grids() {
        let source = array![[1_u8, 2, 3], [4, 5, 6]];
        let region = region([0., 0., 3., 2.], SpatialReference::web_mercator());

        let target = reproject_raster(&source, &region, &region, 0).unwrap();

        assert_eq!(target, source);
    }

    #[test]
    fn source_zero_becomes_no_data() {
        let source = array![[1_u8, 0], [0, 4]];
        let region = region([0., 0., 2., 2.], SpatialReference::web_mercator());

        let target = reproject_raster(&source, &region, &region, 255).unwrap();

        assert_eq!(target, array![[1, 255], [255, 4]]);
    }

    #[test]
    fn outside_of_source_becomes_no_data() {
        let source = array![[1_u8, 2], [3, 4]];
        let source_region = region([0., 0., 2., 2.], SpatialReference::web_mercator());
        // shifted by one pixel to the right
        let target_region = region([1., 0., 3., 2.], SpatialReference::web_mercator());

        let target = reproject_raster(&source, &source_region, &target_region, 9).unwrap();

        assert_eq!(target, array![[2, 9], [4, 9]]);
    }

    #[test]
    fn uses_projection_between_crs() {
        let source = array![[1_i16, 2, 3], [4, 5, 6]];
        let source_region = region([0., 0., 3., 2.], SpatialReference::web_mercator());
        let target_region = region([0., 0., 3., 2.], SpatialReference::epsg_4326());

        // every target center maps one pixel to the right in the source grid
        let target = reproject_raster_with::<i16, ShiftProjector>(
            &source,
            &source_region,
            &target_region,
            -1,
        )
        .unwrap();

        assert_eq!(target, array![[2, 3, -1], [5, 6, -1]]);
    }

    #[test]
    fn web_mercator_to_wgs84_keeps_coverage() {
        let source = Array2::from_elem((10, 10), 1_u8);
        let target_region = region([14.0, 46.0, 14.1, 46.1], SpatialReference::epsg_4326());
        let source_region = target_region
            .transform(SpatialReference::web_mercator())
            .unwrap();

        let target = reproject_raster(&source, &source_region, &target_region, 0).unwrap();

        assert!(target.iter().all(|&v| v == 1));
    }
}
