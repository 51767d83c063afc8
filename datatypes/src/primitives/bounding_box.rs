use super::Coordinate2D;
use crate::error;
use crate::util::Result;
use serde::{Deserialize, Serialize};
use snafu::ensure;

#[derive(Copy, Clone, Serialize, Deserialize, PartialEq, Debug)]
#[repr(C)]
/// The bounding box of a geometry.
/// Note: may degenerate to a point!
pub struct BoundingBox2D {
    lower_left_coordinate: Coordinate2D,
    upper_right_coordinate: Coordinate2D,
}

impl BoundingBox2D {
    /// Creates a new bounding box
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::primitives::{Coordinate2D, BoundingBox2D};
    ///
    /// let ll = Coordinate2D::new(1.0, 1.0);
    /// let ur = Coordinate2D::new(2.0, 2.0);
    /// let bbox = BoundingBox2D::new(ll, ur).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// This constructor fails if the coordinate's values are not in order
    ///
    pub fn new(
        lower_left_coordinate: Coordinate2D,
        upper_right_coordinate: Coordinate2D,
    ) -> Result<Self> {
        ensure!(
            lower_left_coordinate.x <= upper_right_coordinate.x
                && lower_left_coordinate.y <= upper_right_coordinate.y,
            error::InvalidBoundingBox {
                lower_left_coordinate,
                upper_right_coordinate
            }
        );
        Ok(Self {
            lower_left_coordinate,
            upper_right_coordinate,
        })
    }

    /// Creates a new bounding box unchecked
    pub fn new_unchecked(
        lower_left_coordinate: Coordinate2D,
        upper_right_coordinate: Coordinate2D,
    ) -> Self {
        Self {
            lower_left_coordinate,
            upper_right_coordinate,
        }
    }

    /// Creates a new bounding box from its bounds in the order `min_x, min_y, max_x, max_y`
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::primitives::BoundingBox2D;
    ///
    /// let bbox = BoundingBox2D::from_bounds([0.0, 0.0, 10.0, 5.0]).unwrap();
    ///
    /// assert_eq!(bbox.size_x(), 10.0);
    /// assert_eq!(bbox.size_y(), 5.0);
    /// ```
    ///
    pub fn from_bounds(bounds: [f64; 4]) -> Result<Self> {
        let [min_x, min_y, max_x, max_y] = bounds;
        Self::new((min_x, min_y).into(), (max_x, max_y).into())
    }

    /// Returns the bounds in the order `min_x, min_y, max_x, max_y`
    pub fn bounds(&self) -> [f64; 4] {
        [
            self.lower_left_coordinate.x,
            self.lower_left_coordinate.y,
            self.upper_right_coordinate.x,
            self.upper_right_coordinate.y,
        ]
    }

    /// Returns the `Coordnate2D` representing the lower left edge of the bounding box
    pub fn lower_left(&self) -> Coordinate2D {
        self.lower_left_coordinate
    }

    /// Returns the `Coordnate2D` representing the upper right edge of the bounding box
    pub fn upper_right(&self) -> Coordinate2D {
        self.upper_right_coordinate
    }

    /// Returns the `Coordnate2D` representing the upper left edge of the bounding box
    pub fn upper_left(&self) -> Coordinate2D {
        (self.lower_left_coordinate.x, self.upper_right_coordinate.y).into()
    }

    /// Returns the `Coordnate2D` representing the lower right edge of the bounding box
    pub fn lower_right(&self) -> Coordinate2D {
        (self.upper_right_coordinate.x, self.lower_left_coordinate.y).into()
    }

    /// Returns the width of the bounding box
    pub fn size_x(&self) -> f64 {
        self.upper_right_coordinate.x - self.lower_left_coordinate.x
    }

    /// Returns the height of the bounding box
    pub fn size_y(&self) -> f64 {
        self.upper_right_coordinate.y - self.lower_left_coordinate.y
    }

    /// Checks if a coordinate is located inside the bounding box
    ///
    /// # Examples
    ///
    /// ```
    /// use geopatch_datatypes::primitives::{Coordinate2D, BoundingBox2D};
    ///
    /// let ll = Coordinate2D::new(1.0, 1.0);
    /// let ur = Coordinate2D::new(2.0, 2.0);
    /// let bbox = BoundingBox2D::new(ll, ur).unwrap();
    ///
    /// assert!(bbox.contains_coordinate(&(1.5, 1.5).into()));
    /// ```
    ///
    pub fn contains_coordinate(&self, coordinate: &Coordinate2D) -> bool {
        coordinate.x >= self.lower_left_coordinate.x
            && coordinate.y >= self.lower_left_coordinate.y
            && coordinate.x <= self.upper_right_coordinate.x
            && coordinate.y <= self.upper_right_coordinate.y
    }

    pub fn extend_with_coord(&mut self, coord: Coordinate2D) {
        self.lower_left_coordinate = self.lower_left_coordinate.min_elements(coord);
        self.upper_right_coordinate = self.upper_right_coordinate.max_elements(coord);
    }

    #[must_use]
    pub fn union(&self, other_bbox: &Self) -> Self {
        BoundingBox2D::new_unchecked(
            self.lower_left_coordinate
                .min_elements(other_bbox.lower_left_coordinate),
            self.upper_right_coordinate
                .max_elements(other_bbox.upper_right_coordinate),
        )
    }

    pub fn from_coord_iter<I: IntoIterator<Item = Coordinate2D>>(iter: I) -> Option<Self> {
        let mut iterator = iter.into_iter();

        let first = iterator.next().map(|c| BoundingBox2D::new_unchecked(c, c));

        first.map(|mut f| {
            for c in iterator {
                f.extend_with_coord(c);
            }
            f
        })
    }

    /// Samples `points_per_edge` coordinates along each edge, starting at the upper left corner
    /// and going clockwise. The corners are part of the outline.
    pub fn outline_coordinates(&self, points_per_edge: usize) -> Vec<Coordinate2D> {
        let points_per_edge = points_per_edge.max(2);
        let corners = [
            self.upper_left(),
            self.upper_right(),
            self.lower_right(),
            self.lower_left(),
        ];

        let mut outline = Vec::with_capacity(4 * (points_per_edge - 1));
        for (i, &start) in corners.iter().enumerate() {
            let end = corners[(i + 1) % corners.len()];
            let step = (end - start) / (points_per_edge - 1) as f64;

            // the end point of an edge is the start point of the next one
            for j in 0..points_per_edge - 1 {
                outline.push(start + step * j as f64);
            }
        }
        outline
    }
}

impl From<BoundingBox2D> for geo::Rect<f64> {
    fn from(bbox: BoundingBox2D) -> geo::Rect<f64> {
        Self::from(&bbox)
    }
}

impl From<&BoundingBox2D> for geo::Rect<f64> {
    fn from(bbox: &BoundingBox2D) -> geo::Rect<f64> {
        geo::Rect::new(bbox.lower_left_coordinate, bbox.upper_right_coordinate)
    }
}

impl From<geo::Rect<f64>> for BoundingBox2D {
    fn from(rect: geo::Rect<f64>) -> BoundingBox2D {
        // `geo::Rect` normalizes its corners
        BoundingBox2D::new_unchecked(rect.min().into(), rect.max().into())
    }
}

impl From<&BoundingBox2D> for geo::Polygon<f64> {
    fn from(bbox: &BoundingBox2D) -> geo::Polygon<f64> {
        geo::Rect::from(bbox).to_polygon()
    }
}
