#![cfg(feature = "rayon")]

use detmerge::{
    batched_greedy_nmm, batched_nmm, batched_nms, batched_origin_nms, BBox, Detection,
    MatchParams, OverlapMetric,
};

fn make_rows(count: usize, categories: u32) -> Vec<Detection> {
    (0..count)
        .map(|i| {
            let x1 = ((i * 37) % 97) as f32;
            let y1 = ((i * 53) % 89) as f32;
            let w = 8.0 + ((i * 7) % 13) as f32;
            let h = 8.0 + ((i * 11) % 17) as f32;
            let score = ((i * 29) % 101) as f32 / 100.0;
            Detection::new(
                BBox::new(x1, y1, x1 + w, y1 + h).unwrap(),
                score,
                (i as u32 * 5) % categories,
            )
        })
        .collect()
}

#[test]
fn parallel_batching_matches_sequential() {
    let rows = make_rows(400, 9);
    for metric in [OverlapMetric::Iou, OverlapMetric::Ios] {
        let params = MatchParams::new(metric, 0.4).unwrap();

        assert_eq!(batched_nms(&rows, params, false), batched_nms(&rows, params, true));
        assert_eq!(
            batched_origin_nms(&rows, 150, params, false),
            batched_origin_nms(&rows, 150, params, true)
        );
        assert_eq!(batched_nmm(&rows, params, false), batched_nmm(&rows, params, true));
        assert_eq!(
            batched_greedy_nmm(&rows, params, false),
            batched_greedy_nmm(&rows, params, true)
        );
    }
}
