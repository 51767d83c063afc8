use crate::primitives::{BoundingBox2D, Coordinate2D};
use serde::{Deserialize, Serialize};

/// A grid index in `[row, column]` ~ `[y, x]` order. It may lie outside of a grid.
pub type GridIdx2D = [isize; 2];

/// A north-up affine transformation between grid indices and coordinates of a spatial reference
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_coordinate: Coordinate2D,
    pub x_pixel_size: f64,
    pub y_pixel_size: f64,
}

impl GeoTransform {
    /// Generates a new `GeoTransform`
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::raster::GeoTransform;
    ///
    /// let geo_transform = GeoTransform::new((0.0, 0.0).into(), 1.0, -1.0);
    /// ```
    ///
    pub fn new(origin_coordinate: Coordinate2D, x_pixel_size: f64, y_pixel_size: f64) -> Self {
        Self {
            origin_coordinate,
            x_pixel_size,
            y_pixel_size,
        }
    }

    /// Generates the north-up `GeoTransform` of a grid with `width` columns and `height` rows
    /// that exactly covers `bbox`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::primitives::BoundingBox2D;
    /// use geopatch_datatypes::raster::GeoTransform;
    ///
    /// let bbox = BoundingBox2D::from_bounds([0.0, 0.0, 10.0, 5.0]).unwrap();
    /// let geo_transform = GeoTransform::from_bounds(bbox, 20, 10);
    ///
    /// assert_eq!(geo_transform.origin_coordinate, (0.0, 5.0).into());
    /// assert_eq!(geo_transform.x_pixel_size, 0.5);
    /// assert_eq!(geo_transform.y_pixel_size, -0.5);
    /// ```
    pub fn from_bounds(bbox: BoundingBox2D, width: usize, height: usize) -> Self {
        Self::new(
            bbox.upper_left(),
            bbox.size_x() / width as f64,
            -bbox.size_y() / height as f64,
        )
    }

    /// Transforms a grid coordinate (row, column) ~ (y, x) into a SRS coordinate (x,y) of the
    /// upper left edge of the pixel
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::raster::GeoTransform;
    ///
    /// let geo_transform = GeoTransform::new((0.0, 0.0).into(), 1.0, -1.0);
    /// assert_eq!(geo_transform.grid_idx_to_coordinate_2d([0, 0]), (0.0, 0.0).into())
    /// ```
    ///
    pub fn grid_idx_to_coordinate_2d(&self, grid_index: GridIdx2D) -> Coordinate2D {
        let [grid_index_y, grid_index_x] = grid_index;
        let coord_x = self.origin_coordinate.x + (grid_index_x as f64) * self.x_pixel_size;
        let coord_y = self.origin_coordinate.y + (grid_index_y as f64) * self.y_pixel_size;
        Coordinate2D::new(coord_x, coord_y)
    }

    /// Transforms a grid coordinate (row, column) ~ (y, x) into the SRS coordinate of the
    /// pixel center
    pub fn grid_idx_to_center_coordinate_2d(&self, grid_index: GridIdx2D) -> Coordinate2D {
        let [grid_index_y, grid_index_x] = grid_index;
        let coord_x = self.origin_coordinate.x + (grid_index_x as f64 + 0.5) * self.x_pixel_size;
        let coord_y = self.origin_coordinate.y + (grid_index_y as f64 + 0.5) * self.y_pixel_size;
        Coordinate2D::new(coord_x, coord_y)
    }

    /// Transforms an SRS coordinate (x,y) into the grid coordinate (row, column) ~ (y, x) of the
    /// pixel that contains it
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::raster::GeoTransform;
    ///
    /// let geo_transform = GeoTransform::new((0.0, 0.0).into(), 1.0, -1.0);
    /// assert_eq!(geo_transform.coordinate_to_grid_idx_2d((0.5, -0.5).into()), [0, 0]);
    /// assert_eq!(geo_transform.coordinate_to_grid_idx_2d((-0.5, 0.5).into()), [-1, -1]);
    /// ```
    ///
    pub fn coordinate_to_grid_idx_2d(&self, coord: Coordinate2D) -> GridIdx2D {
        let grid_x_index =
            ((coord.x - self.origin_coordinate.x) / self.x_pixel_size).floor() as isize;
        let grid_y_index =
            ((coord.y - self.origin_coordinate.y) / self.y_pixel_size).floor() as isize;
        [grid_y_index, grid_x_index]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        GeoTransform::new((0.0, 0.0).into(), 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn geo_transform_from_bounds() {
        let bbox = BoundingBox2D::from_bounds([-10.0, 20.0, 30.0, 40.0]).unwrap();
        let geo_transform = GeoTransform::from_bounds(bbox, 4, 2);

        assert_eq!(geo_transform.origin_coordinate, (-10.0, 40.0).into());
        assert_eq!(geo_transform.x_pixel_size, 10.0);
        assert_eq!(geo_transform.y_pixel_size, -10.0);

        assert_eq!(
            geo_transform.grid_idx_to_coordinate_2d([2, 4]),
            (30.0, 20.0).into()
        );
    }

    #[test]
    fn pixel_centers_map_back_to_indices() {
        let bbox = BoundingBox2D::from_bounds([0.0, 0.0, 7.0, 3.0]).unwrap();
        let geo_transform = GeoTransform::from_bounds(bbox, 13, 11);

        for y in 0..11 {
            for x in 0..13 {
                let center = geo_transform.grid_idx_to_center_coordinate_2d([y, x]);
                assert_eq!(geo_transform.coordinate_to_grid_idx_2d(center), [y, x]);
            }
        }
    }

    #[test]
    fn outside_coordinates_have_negative_indices() {
        let geo_transform = GeoTransform::new((0.0, 10.0).into(), 1.0, -1.0);

        assert_eq!(
            geo_transform.coordinate_to_grid_idx_2d((-0.1, 10.1).into()),
            [-1, -1]
        );
        assert_eq!(
            geo_transform.coordinate_to_grid_idx_2d((2.5, 7.5).into()),
            [2, 2]
        );
    }
}
