//! Runs the postprocessors on a small two-tile scene described in JSON.

use detmerge::{BBox, ObjectPrediction, OverlapMetric, PostprocessConfig, PostprocessKind, Postprocessor};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    bbox: [f32; 4],
    score: f32,
    category_id: u32,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    kind: String,
    metric: String,
    threshold: f32,
    class_agnostic: bool,
    expected_scores: Vec<f32>,
    #[serde(default)]
    expected_first_bbox: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    detections: Vec<DetectionRecord>,
    cases: Vec<Case>,
}

fn load_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/two_tiles.json");
    let text = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn fixture_cases_produce_expected_predictions() {
    let fixture = load_fixture();
    let predictions: Vec<ObjectPrediction> = fixture
        .detections
        .iter()
        .map(|d| {
            let [x1, y1, x2, y2] = d.bbox;
            ObjectPrediction::new(BBox::new(x1, y1, x2, y2).unwrap(), d.score, d.category_id)
        })
        .collect();

    for case in &fixture.cases {
        let kind: PostprocessKind = case.kind.parse().unwrap();
        let metric: OverlapMetric = case.metric.parse().unwrap();
        let post = Postprocessor::new(
            kind,
            PostprocessConfig {
                metric,
                threshold: case.threshold,
                class_agnostic: case.class_agnostic,
                parallel: false,
            },
        )
        .unwrap();

        let out = post.run(&predictions, None);
        let scores: Vec<f32> = out.iter().map(|p| p.score).collect();
        assert_eq!(scores, case.expected_scores, "case {}", case.name);

        if let Some([x1, y1, x2, y2]) = case.expected_first_bbox {
            assert_eq!(out[0].bbox, BBox::new(x1, y1, x2, y2).unwrap(), "case {}", case.name);
        }
    }
}

#[test]
fn unknown_metric_in_fixture_style_config_is_reported() {
    let err = "giou".parse::<OverlapMetric>().unwrap_err();
    assert_eq!(err, detmerge::DetMergeError::UnknownMetric("giou".to_owned()));
}
