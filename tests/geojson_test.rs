//! Integration tests for GeoJSON feature building

use formcast::adapters::filesystem::XmlSubmissionParser;
use formcast::adapters::{SubmissionFile, SubmissionParser};
use formcast::core::geojson::{build_features, write_geojson, Geometry};
use formcast::domain::{FieldSpec, FormSchema, Submission, ValueKind};
use serde_json::{json, Value};
use tempfile::TempDir;
use test_case::test_case;

fn schema() -> FormSchema {
    let mut schema = FormSchema::new("data");
    let root = schema.root();
    schema.add_field(root, FieldSpec::new("home", ValueKind::Geopoint));
    schema.add_field(root, FieldSpec::new("route", ValueKind::Geotrace));
    let plots = schema.add_field(root, FieldSpec::repeat("plots"));
    schema.add_field(plots, FieldSpec::new("area", ValueKind::Geoshape));
    schema
}

fn parse(dir: &TempDir, body: &str) -> Submission {
    let path = dir.path().join("submission.xml");
    std::fs::write(
        &path,
        format!("<data>{body}<meta><instanceID>uuid:1</instanceID></meta></data>"),
    )
    .unwrap();
    let file = SubmissionFile {
        path,
        working_dir: dir.path().to_path_buf(),
        submission_date: None,
    };
    XmlSubmissionParser::new().parse(&file, false, None).unwrap()
}

#[test_case(ValueKind::Geopoint, "1 2 3", json!({"type": "Point", "coordinates": [2.0, 1.0, 3.0]}) ; "point with altitude")]
#[test_case(ValueKind::Geopoint, "1 2 3 4", json!({"type": "Point", "coordinates": [2.0, 1.0, 3.0]}) ; "accuracy dropped")]
#[test_case(ValueKind::Geotrace, "1 2;3 4", json!({"type": "LineString", "coordinates": [[2.0, 1.0], [4.0, 3.0]]}) ; "trace")]
#[test_case(
    ValueKind::Geoshape,
    "1 2;3 4;5 6;1 2",
    json!({"type": "Polygon", "coordinates": [[[2.0, 1.0], [4.0, 3.0], [6.0, 5.0], [2.0, 1.0]]]})
    ; "closed shape"
)]
fn test_valid_geometries(kind: ValueKind, raw: &str, expected: Value) {
    let geometry = Geometry::from_value(kind, raw).unwrap();
    assert_eq!(serde_json::to_value(geometry).unwrap(), expected);
}

#[test_case(ValueKind::Geoshape, "1 2;3 4;5 6;7 8" ; "unclosed shape")]
#[test_case(ValueKind::Geotrace, "1 2" ; "single point trace")]
#[test_case(ValueKind::Geopoint, "1 2;3 4" ; "two points")]
#[test_case(ValueKind::Geopoint, "95 2" ; "latitude out of range")]
fn test_invalid_geometries(kind: ValueKind, raw: &str) {
    assert!(Geometry::from_value(kind, raw).is_none());
}

#[test]
fn test_features_from_parsed_submission() {
    let dir = TempDir::new().unwrap();
    let submission = parse(
        &dir,
        "<home>1 2</home><route/>\
         <plots><area>1 2;3 4;5 6;1 2</area></plots>\
         <plots><area>1 2;3 4;5 6;7 8</area></plots>",
    );

    let features = build_features(&schema(), &submission);
    let summary: Vec<_> = features
        .iter()
        .map(|f| {
            (
                f.properties.key.as_str(),
                f.properties.field.as_str(),
                f.properties.empty,
                f.properties.valid,
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("uuid:1", "home", "no", "yes"),
            ("uuid:1", "route", "yes", "no"),
            ("uuid:1/plots[1]", "plots-area", "no", "yes"),
            ("uuid:1/plots[2]", "plots-area", "no", "no"),
        ]
    );
}

#[tokio::test]
async fn test_write_geojson_document() {
    let dir = TempDir::new().unwrap();
    let submission = parse(&dir, "<home>10 20</home>");
    let features = build_features(&schema(), &submission);

    let path = dir.path().join("out/Form.geojson");
    let count = write_geojson(&path, features).await.unwrap();
    assert_eq!(count, 2);

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["type"], "FeatureCollection");
    assert_eq!(document["features"][0]["geometry"]["coordinates"], json!([20.0, 10.0]));
    assert_eq!(document["features"][1]["properties"]["empty"], "yes");
}
