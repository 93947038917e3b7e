use detmerge::{
    greedy_nmm, nmm, nms, origin_nms, overlap, BBox, Detection, MatchParams, MergeGroup,
    OverlapMetric,
};

fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Detection {
    Detection::new(BBox::new(x1, y1, x2, y2).unwrap(), score, 0)
}

#[test]
fn identical_boxes_keep_or_merge_into_the_best() {
    let rows = vec![det(10.0, 10.0, 50.0, 50.0, 0.9), det(10.0, 10.0, 50.0, 50.0, 0.6)];
    let params = MatchParams::new(OverlapMetric::Iou, 0.5).unwrap();

    assert_eq!(nms(&rows, params), vec![0]);
    assert_eq!(
        nmm(&rows, params),
        vec![MergeGroup {
            keep: 0,
            merge: vec![1],
        }]
    );
}

#[test]
fn disjoint_boxes_survive_any_threshold() {
    let rows = vec![
        det(0.0, 0.0, 10.0, 10.0, 0.5),
        det(20.0, 0.0, 30.0, 10.0, 0.7),
        det(40.0, 0.0, 50.0, 10.0, 0.6),
    ];
    for threshold in [0.01, 0.3, 0.5, 1.0] {
        for metric in [OverlapMetric::Iou, OverlapMetric::Ios] {
            let params = MatchParams::new(metric, threshold).unwrap();
            assert_eq!(nms(&rows, params), vec![1, 2, 0]);
            let groups = nmm(&rows, params);
            assert_eq!(groups.len(), 3);
            assert!(groups.iter().all(|g| g.merge.is_empty()));
            assert_eq!(greedy_nmm(&rows, params).len(), 3);
        }
    }
}

#[test]
fn original_detection_outlives_a_stronger_new_one() {
    let rows = vec![det(0.0, 0.0, 20.0, 20.0, 0.95), det(1.0, 1.0, 20.0, 20.0, 0.3)];
    let params = MatchParams::new(OverlapMetric::Iou, 0.5).unwrap();

    assert!(!nms(&rows, params).contains(&1));
    assert!(origin_nms(&rows, 1, params).contains(&1));
}

#[test]
fn ios_treats_nested_boxes_as_a_match() {
    let outer = det(0.0, 0.0, 20.0, 20.0, 0.9);
    let inner = det(5.0, 5.0, 15.0, 15.0, 0.8);

    assert_eq!(overlap(&outer.bbox, &inner.bbox, OverlapMetric::Ios), 1.0);
    assert!((overlap(&outer.bbox, &inner.bbox, OverlapMetric::Iou) - 0.25).abs() < 1e-6);

    let rows = vec![outer, inner];
    let ios = MatchParams::new(OverlapMetric::Ios, 0.5).unwrap();
    let iou = MatchParams::new(OverlapMetric::Iou, 0.5).unwrap();
    assert_eq!(nms(&rows, ios), vec![0]);
    assert_eq!(nms(&rows, iou), vec![0, 1]);
}

#[test]
fn metric_names_round_trip_and_reject_unknown() {
    for metric in [OverlapMetric::Iou, OverlapMetric::Ios] {
        assert_eq!(metric.to_string().parse::<OverlapMetric>().unwrap(), metric);
    }
    let err = "DIOU".parse::<OverlapMetric>().unwrap_err();
    assert!(err.to_string().contains("DIOU"));
}
