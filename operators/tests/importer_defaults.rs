use geopatch_datatypes::patch::{FeatureKey, FeatureType, Patch};
use geopatch_datatypes::primitives::BoundingRegion;
use geopatch_datatypes::raster::{RasterDataType, TypedArray};
use geopatch_datatypes::spatial_reference::SpatialReference;
use geopatch_operators::mock::{MockFeatureClient, MockTileClient};
use geopatch_operators::processing::raster_overlay::ClassSpec;
use geopatch_operators::processing::{
    RasterOverlayImporter, RasterOverlayParams, VectorOverlayImporter, VectorOverlayParams,
};
use geopatch_operators::source::MimeType;
use image::Rgba;
use serde_json::json;

#[test]
fn raster_importer_uses_built_in_defaults() {
    let client = MockTileClient::with_color(Rgba([10, 20, 30, 255]));
    let params = RasterOverlayParams::new(
        FeatureKey::new(FeatureType::MaskTimeless, "OVERLAY"),
        "ttl1904",
        "1",
        ClassSpec::binary(1.),
    );

    let importer = RasterOverlayImporter::new(params, &client).unwrap();

    let region =
        BoundingRegion::from_bounds([0., 0., 100., 100.], SpatialReference::web_mercator())
            .unwrap();
    let mut patch = Patch::new(Some(region));
    patch
        .insert_raster(
            FeatureKey::new(FeatureType::Mask, "IS_DATA"),
            TypedArray::filled(RasterDataType::U8, &[1, 4, 4, 1], 1.),
        )
        .unwrap();

    importer.execute(patch).unwrap();

    assert_eq!(client.requests()[0].image_format, MimeType::Png);
}

#[test]
fn vector_importer_uses_built_in_service_access() {
    let mut geometry = geojson::Geometry::new(geojson::Value::Point(vec![1., 2.]));
    let mut crs = serde_json::Map::new();
    crs.insert(
        "crs".to_string(),
        json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}),
    );
    geometry.foreign_members = Some(crs);

    let client = MockFeatureClient::new(vec![geojson::Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: None,
        foreign_members: None,
    }]);

    let params = VectorOverlayParams {
        reproject: false,
        ..VectorOverlayParams::new(FeatureKey::new(FeatureType::VectorTimeless, "POINTS"), "1749")
    };

    let importer = VectorOverlayImporter::new(params, &client).unwrap();
    importer.execute(None, None).unwrap();

    let query = &client.queries()[0];
    assert_eq!(
        query.config.base_url.as_str(),
        "https://service.geopedia.world/"
    );
    assert_eq!(query.config.timeout_seconds, 60);
}
