//! Integration tests for stale-response suppression across generations.

mod common;

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use common::{RecordingSink, ScriptedTransport, client_for, single_ingredient_body, upload};
use ingredient_scan_app::{Phase, RequestCoordinator, Resolution};
use ingredient_scan_core::Generation;
use ingredient_scan_upload::ClassifierClient;
use ingredient_scan_ui::{RenderOutcome, SharedRenderState};

fn two_image_client() -> ClassifierClient {
    client_for(Arc::new(
        ScriptedTransport::new()
            .reply("first.png", 200, single_ingredient_body("Talc", true))
            .reply("second.png", 200, single_ingredient_body("Glycerin", false)),
    ))
}

fn rendered_text(state: &SharedRenderState) -> String {
    state
        .snapshot()
        .report
        .expect("a report should be rendered")
        .extracted_text
}

#[test]
fn stale_suppression_tests_in_order_replies_render_only_latest() {
    let client = two_image_client();
    let sink = Arc::new(RecordingSink::default());
    let coordinator = RequestCoordinator::new(sink.clone());
    let (first, second) = (upload("first.png"), upload("second.png"));

    let g1 = coordinator.begin(Some(&first)).expect("first ticket");
    let g2 = coordinator.begin(Some(&second)).expect("second ticket");

    assert_eq!(
        coordinator.resolve(g1, client.analyze(&first)),
        Resolution::Stale(Generation(1))
    );
    assert_eq!(coordinator.phase(), Phase::Submitting);
    assert!(sink.deliveries().is_empty());

    assert_eq!(
        coordinator.resolve(g2, client.analyze(&second)),
        Resolution::Rendered(Generation(2))
    );
    assert_eq!(coordinator.phase(), Phase::Succeeded);

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, Generation(2));
    match &deliveries[0].1 {
        RenderOutcome::Report(report) => assert_eq!(report.extracted_text, "Glycerin"),
        other => panic!("expected report, got {other:?}"),
    }
}

#[test]
fn stale_suppression_tests_reply_order_does_not_change_final_state() {
    let client = two_image_client();
    let (first, second) = (upload("first.png"), upload("second.png"));

    let forward = Arc::new(SharedRenderState::new("test"));
    let coordinator = RequestCoordinator::new(forward.clone());
    let g1 = coordinator.begin(Some(&first)).expect("first ticket");
    let g2 = coordinator.begin(Some(&second)).expect("second ticket");
    let _ = coordinator.resolve(g1, client.analyze(&first));
    let _ = coordinator.resolve(g2, client.analyze(&second));

    let reversed = Arc::new(SharedRenderState::new("test"));
    let coordinator = RequestCoordinator::new(reversed.clone());
    let g1 = coordinator.begin(Some(&first)).expect("first ticket");
    let g2 = coordinator.begin(Some(&second)).expect("second ticket");
    let _ = coordinator.resolve(g2, client.analyze(&second));
    let _ = coordinator.resolve(g1, client.analyze(&first));

    assert_eq!(forward.snapshot(), reversed.snapshot());
    assert_eq!(rendered_text(&forward), "Glycerin");
    assert!(!forward.snapshot().loading);
}

#[test]
fn stale_suppression_tests_late_reply_from_overlapping_thread_is_dropped() {
    let (release_tx, release_rx) = mpsc::channel();
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("first.png", 200, single_ingredient_body("Talc", true))
            .reply("second.png", 200, single_ingredient_body("Glycerin", false))
            .hold("first.png", release_rx),
    );
    let client = client_for(transport);
    let state = Arc::new(SharedRenderState::new("test"));
    let coordinator = Arc::new(RequestCoordinator::new(state.clone()));

    let slow = {
        let client = client.clone();
        let coordinator = coordinator.clone();
        std::thread::spawn(move || coordinator.submit(&client, Some(&upload("first.png"))))
    };

    while coordinator.latest_generation() != Some(Generation(1)) {
        std::thread::sleep(Duration::from_millis(1));
    }

    let fast = coordinator.submit(&client, Some(&upload("second.png")));
    assert_eq!(fast, Resolution::Rendered(Generation(2)));

    release_tx.send(()).expect("slow call should be waiting");
    let slow = slow.join().expect("slow thread should finish");
    assert_eq!(slow, Resolution::Stale(Generation(1)));

    let snapshot = state.snapshot();
    assert_eq!(rendered_text(&state), "Glycerin");
    assert_eq!(snapshot.rendered_generation, Some(Generation(2)));
    assert!(!snapshot.loading);
}
