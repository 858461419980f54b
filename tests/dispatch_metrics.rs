use std::collections::HashSet;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;
use tokio::sync::oneshot;

use tilebridge::{
    dispatch::Dispatcher,
    domain::Map,
    render::{RenderError, RenderedTile, TileRenderer},
};

struct SmallTileRenderer;

impl TileRenderer for SmallTileRenderer {
    fn render(&self, _map: &Map) -> Result<RenderedTile, RenderError> {
        Ok(RenderedTile::new(vec![1u8; 64], 16))
    }
}

struct BrokenRenderer;

impl TileRenderer for BrokenRenderer {
    fn render(&self, _map: &Map) -> Result<RenderedTile, RenderError> {
        Err(RenderError::backend("backend unavailable"))
    }
}

#[tokio::test]
async fn dispatch_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Submitted + completed.
    let bridge = Dispatcher::new(Arc::new(SmallTileRenderer));
    let (tx, rx) = oneshot::channel();
    bridge
        .submit_render(
            Arc::new(Map::new("ok")),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .expect("submission should be accepted");
    rx.await
        .expect("completion should deliver")
        .expect("render should succeed");

    // Failed.
    let failing = Dispatcher::new(Arc::new(BrokenRenderer));
    let (tx, rx) = oneshot::channel();
    failing
        .submit_render(
            Arc::new(Map::new("broken")),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .expect("submission should be accepted");
    rx.await
        .expect("completion should deliver")
        .expect_err("render should fail");

    // Rejected: hold the engagement slot externally and submit against it.
    let map = Arc::new(Map::new("held"));
    let _slot = bridge
        .engagements()
        .acquire(map.id)
        .expect("slot should be free");
    bridge
        .submit_render(Arc::clone(&map), Box::new(|_| {}))
        .expect_err("engaged map should be rejected");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "tilebridge_jobs_submitted_total",
        "tilebridge_jobs_rejected_total",
        "tilebridge_jobs_completed_total",
        "tilebridge_jobs_failed_total",
        "tilebridge_render_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
