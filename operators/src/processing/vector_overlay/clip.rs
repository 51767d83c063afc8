use geo::{
    BooleanOps, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use geopatch_datatypes::primitives::{BoundingBox2D, Coordinate2D};

/// Clips `geometry` to `bbox`.
///
/// The result has the same geometry family as the input. Points stay points, lines stay
/// lines and polygons stay polygons; a single part is returned as the single variant, several
/// parts as the multi variant. Returns `None` if nothing is left inside of `bbox`.
pub fn clip_geometry(geometry: Geometry<f64>, bbox: &BoundingBox2D) -> Option<Geometry<f64>> {
    let clip_polygon = Polygon::from(bbox);

    clip_with(geometry, bbox, &clip_polygon)
}

fn clip_with(
    geometry: Geometry<f64>,
    bbox: &BoundingBox2D,
    clip_polygon: &Polygon<f64>,
) -> Option<Geometry<f64>> {
    match geometry {
        Geometry::Point(point) => clip_points(vec![point], bbox, false),
        Geometry::MultiPoint(points) => clip_points(points.0, bbox, true),
        Geometry::Line(line) => clip_lines(
            MultiLineString::new(vec![LineString::from(line)]),
            clip_polygon,
            false,
        ),
        Geometry::LineString(line_string) => clip_lines(
            MultiLineString::new(vec![line_string]),
            clip_polygon,
            false,
        ),
        Geometry::MultiLineString(line_strings) => clip_lines(line_strings, clip_polygon, true),
        Geometry::Polygon(polygon) => clip_polygons(&polygon, clip_polygon, false),
        Geometry::Rect(rect) => clip_polygons(&rect.to_polygon(), clip_polygon, false),
        Geometry::Triangle(triangle) => clip_polygons(&triangle.to_polygon(), clip_polygon, false),
        Geometry::MultiPolygon(polygons) => clip_polygons(&polygons, clip_polygon, true),
        Geometry::GeometryCollection(collection) => {
            let parts: Vec<Geometry<f64>> = collection
                .into_iter()
                .filter_map(|part| clip_with(part, bbox, clip_polygon))
                .collect();

            (!parts.is_empty()).then(|| Geometry::GeometryCollection(GeometryCollection::new_from(parts)))
        }
    }
}

fn clip_points(
    points: Vec<Point<f64>>,
    bbox: &BoundingBox2D,
    keep_multi: bool,
) -> Option<Geometry<f64>> {
    let mut inside: Vec<Point<f64>> = points
        .into_iter()
        .filter(|&point| bbox.contains_coordinate(&Coordinate2D::from(point)))
        .collect();

    match (inside.len(), keep_multi) {
        (0, _) => None,
        (1, false) => inside.pop().map(Geometry::Point),
        _ => Some(MultiPoint::new(inside).into()),
    }
}

fn clip_lines(
    line_strings: MultiLineString<f64>,
    clip_polygon: &Polygon<f64>,
    keep_multi: bool,
) -> Option<Geometry<f64>> {
    let mut clipped = clip_polygon.clip(&line_strings, false);
    clipped.0.retain(|line_string| line_string.0.len() > 1);

    match (clipped.0.len(), keep_multi) {
        (0, _) => None,
        (1, false) => clipped.0.pop().map(Geometry::LineString),
        _ => Some(clipped.into()),
    }
}

fn clip_polygons<B>(
    polygons: &B,
    clip_polygon: &Polygon<f64>,
    keep_multi: bool,
) -> Option<Geometry<f64>>
where
    B: BooleanOps<Scalar = f64>,
{
    let mut clipped: MultiPolygon<f64> = polygons.intersection(clip_polygon);

    match (clipped.0.len(), keep_multi) {
        (0, _) => None,
        (1, false) => clipped.0.pop().map(Geometry::Polygon),
        _ => Some(clipped.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, line_string, point, polygon};

    fn bbox() -> BoundingBox2D {
        BoundingBox2D::from_bounds([0., 0., 10., 10.]).unwrap()
    }

    #[test]
    fn points() {
        assert_eq!(
            clip_geometry(point!(x: 5., y: 5.).into(), &bbox()),
            Some(point!(x: 5., y: 5.).into())
        );
        assert_eq!(
            clip_geometry(point!(x: 10., y: 0.).into(), &bbox()),
            Some(point!(x: 10., y: 0.).into())
        );
        assert_eq!(clip_geometry(point!(x: 11., y: 5.).into(), &bbox()), None);
    }

    #[test]
    fn multi_points() {
        let points = MultiPoint::new(vec![
            point!(x: 1., y: 1.),
            point!(x: -1., y: 1.),
            point!(x: 2., y: 2.),
        ]);

        assert_eq!(
            clip_geometry(points.into(), &bbox()),
            Some(MultiPoint::new(vec![point!(x: 1., y: 1.), point!(x: 2., y: 2.)]).into())
        );

        let outside = MultiPoint::new(vec![point!(x: -1., y: 1.)]);
        assert_eq!(clip_geometry(outside.into(), &bbox()), None);
    }

    #[test]
    fn line_string_stays_line_string() {
        let line = line_string![(x: -5., y: 5.), (x: 5., y: 5.)];

        let Some(Geometry::LineString(clipped)) = clip_geometry(line.into(), &bbox()) else {
            panic!("expected a line string");
        };

        assert!(clipped.0.len() >= 2);
        assert!(
            clipped
                .coords()
                .all(|c| c.x > -1e-9 && c.x < 10. + 1e-9 && (c.y - 5.).abs() < 1e-9)
        );
    }

    #[test]
    fn line_string_split_into_parts() {
        // leaves the box and comes back
        let line = line_string![
            (x: 2., y: 5.),
            (x: 2., y: 15.),
            (x: 8., y: 15.),
            (x: 8., y: 5.),
        ];

        let clipped = clip_geometry(line.into(), &bbox());

        assert!(matches!(
            clipped,
            Some(Geometry::MultiLineString(ref lines)) if lines.0.len() == 2
        ));
    }

    #[test]
    fn line_string_outside() {
        let line = line_string![(x: 20., y: 20.), (x: 30., y: 30.)];

        assert_eq!(clip_geometry(line.into(), &bbox()), None);
    }

    #[test]
    fn polygon_stays_polygon() {
        let polygon = polygon![
            (x: 5., y: 5.),
            (x: 15., y: 5.),
            (x: 15., y: 15.),
            (x: 5., y: 15.),
            (x: 5., y: 5.),
        ];

        let Some(Geometry::Polygon(clipped)) = clip_geometry(polygon.into(), &bbox()) else {
            panic!("expected a polygon");
        };

        assert!(float_cmp::approx_eq!(
            f64,
            clipped.unsigned_area(),
            25.,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn polygon_outside() {
        let polygon = polygon![
            (x: 20., y: 20.),
            (x: 30., y: 20.),
            (x: 30., y: 30.),
            (x: 20., y: 20.),
        ];

        assert_eq!(clip_geometry(polygon.into(), &bbox()), None);
    }

    #[test]
    fn multi_polygon_stays_multi() {
        let polygons = MultiPolygon::new(vec![
            polygon![(x: 1., y: 1.), (x: 2., y: 1.), (x: 2., y: 2.), (x: 1., y: 1.)],
            polygon![(x: 20., y: 20.), (x: 30., y: 20.), (x: 30., y: 30.), (x: 20., y: 20.)],
        ]);

        let clipped = clip_geometry(polygons.into(), &bbox());

        assert!(matches!(
            clipped,
            Some(Geometry::MultiPolygon(ref polygons)) if polygons.0.len() == 1
        ));
    }

    #[test]
    fn geometry_collection() {
        let collection = GeometryCollection::new_from(vec![
            point!(x: 1., y: 1.).into(),
            point!(x: 20., y: 20.).into(),
        ]);

        assert_eq!(
            clip_geometry(Geometry::GeometryCollection(collection), &bbox()),
            Some(Geometry::GeometryCollection(GeometryCollection::new_from(vec![point!(x: 1., y: 1.).into()])))
        );

        let outside = GeometryCollection::new_from(vec![point!(x: 20., y: 20.).into()]);
        assert_eq!(clip_geometry(Geometry::GeometryCollection(outside), &bbox()), None);
    }
}
