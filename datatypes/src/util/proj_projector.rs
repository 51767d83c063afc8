use proj::Proj;
use snafu::ResultExt;
use tracing::instrument;

use crate::{
    error,
    operations::reproject::CoordinateProjection,
    primitives::Coordinate2D,
    spatial_reference::SpatialReference,
    util::Result,
};

/// A `CoordinateProjection` backed by PROJ.
///
/// The axis order is normalized for visualization, i.e. `x` is always the easting/longitude
/// and `y` the northing/latitude, regardless of the CRS definition.
pub struct ProjCoordinateProjector {
    pub from: SpatialReference,
    pub to: SpatialReference,
    p: Proj,
}

impl CoordinateProjection for ProjCoordinateProjector {
    #[instrument]
    fn from_known_srs(from: SpatialReference, to: SpatialReference) -> Result<Self> {
        let start_time = std::time::Instant::now();

        let p = Proj::new_known_crs(&from.srs_string(), &to.srs_string(), None)
            .map_err(|_| error::Error::NoCoordinateProjector { from, to })?;

        tracing::trace!(
            "CoordinateProjection::from_known_srs Proj new_known_crs took {}",
            start_time.elapsed().as_nanos()
        );

        Ok(ProjCoordinateProjector { from, to, p })
    }

    fn project_coordinate(&self, c: Coordinate2D) -> Result<Coordinate2D> {
        self.p
            .convert((c.x, c.y))
            .map(Coordinate2D::from)
            .context(error::ProjInternal)
    }

    #[instrument(skip_all)]
    fn project_coordinates<A: AsRef<[Coordinate2D]>>(
        &self,
        coords: A,
    ) -> Result<Vec<Coordinate2D>> {
        let mut cc: Vec<(f64, f64)> = coords.as_ref().iter().map(|&c| c.into()).collect();

        self.p
            .convert_array(cc.as_mut_slice())
            .context(error::ProjInternal)?;

        Ok(cc.into_iter().map(Coordinate2D::from).collect())
    }

    fn source_srs(&self) -> SpatialReference {
        self.from
    }

    fn target_srs(&self) -> SpatialReference {
        self.to
    }
}

impl std::fmt::Debug for ProjCoordinateProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjCoordinateProjector")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn web_mercator_roundtrip() {
        let forward = ProjCoordinateProjector::from_known_srs(
            SpatialReference::epsg_4326(),
            SpatialReference::web_mercator(),
        )
        .unwrap();
        let backward = ProjCoordinateProjector::from_known_srs(
            SpatialReference::web_mercator(),
            SpatialReference::epsg_4326(),
        )
        .unwrap();

        let coordinates = vec![Coordinate2D::new(14.5, 46.0), Coordinate2D::new(-3.7, 40.4)];

        let projected = forward.project_coordinates(&coordinates).unwrap();
        let back = backward.project_coordinates(&projected).unwrap();

        for (original, roundtrip) in coordinates.iter().zip(back) {
            assert_abs_diff_eq!(original.x, roundtrip.x, epsilon = 1e-8);
            assert_abs_diff_eq!(original.y, roundtrip.y, epsilon = 1e-8);
        }

        // longitude first, regardless of the EPSG axis order of 4326
        assert!(projected[0].x > 1_000_000.0);
        assert!(projected[0].y > 5_000_000.0);
    }
}
