use std::time::Duration;

use pairdash::{DashError, Lifecycle, RefreshPolicy, Theme};
use pairdash_mock::{MemoryStore, MockBehavior};

use crate::helpers::{
    BTC, ETH, bar_requests, bars, confidences, harness, harness_with, pair, pairs, prediction,
    serve_pair,
};

#[tokio::test]
async fn populated_chart_has_candles_line_and_markers() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    assert_eq!(
        h.manager.session(&pair(BTC)).map(|s| s.lifecycle()),
        Some(Lifecycle::Loading)
    );
    h.manager.settle().await;

    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert_eq!(w.series.len(), 2);
    assert_eq!(
        w.bars.iter().map(|b| b.time).collect::<Vec<_>>(),
        vec![100, 200, 300]
    );
    assert_eq!(w.line.iter().map(|p| p.time).collect::<Vec<_>>(), vec![400, 500]);
    assert_eq!(w.markers.len(), 2);
    assert!(w.markers.iter().all(|m| m.color == "black"));
    assert_eq!(w.options.background, "#fafafa");
    assert_eq!(
        h.manager.session(&pair(BTC)).map(|s| s.lifecycle()),
        Some(Lifecycle::Populated)
    );
}

#[tokio::test]
async fn failed_bars_leave_other_feeds_applied_and_session_loading() {
    let mut h = harness_with(MemoryStore::new(), RefreshPolicy::Incremental, &[BTC]).await;
    h.controller
        .set_bars_behavior(pair(BTC), MockBehavior::Fail(DashError::Other("boom".into())))
        .await;
    h.manager.initialize(pairs(&[BTC]));
    h.manager.toggle_selection(&pair(BTC));
    h.manager.settle().await;

    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert!(w.bars.is_empty());
    assert_eq!(w.line.len(), 2);
    assert_eq!(w.markers.len(), 2);
    assert_eq!(
        h.manager.session(&pair(BTC)).map(|s| s.lifecycle()),
        Some(Lifecycle::Loading)
    );

    // Serving the bars again and reloading recovers the chart.
    serve_pair(&h.controller, BTC).await;
    let session = h.manager.session_mut(&pair(BTC)).expect("session");
    session.reload();
    session.settle().await;
    assert_eq!(session.lifecycle(), Lifecycle::Populated);
    assert_eq!(h.probe.widget(&pair(BTC)).expect("widget").bars.len(), 3);
    assert_eq!(bar_requests(&h.controller).await, 2);
}

#[tokio::test]
async fn failed_reload_keeps_a_populated_chart_populated() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.settle().await;

    h.controller
        .set_bars_behavior(pair(BTC), MockBehavior::Fail(DashError::Other("boom".into())))
        .await;
    let session = h.manager.session_mut(&pair(BTC)).expect("session");
    session.reload();
    assert_eq!(session.lifecycle(), Lifecycle::Populated);
    session.settle().await;

    assert_eq!(session.lifecycle(), Lifecycle::Populated);
    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert_eq!(w.bars.len(), 3);
    assert_eq!(w.markers.len(), 2);
    assert_eq!(bar_requests(&h.controller).await, 2);

    // Markers kept across the reload still follow the theme.
    h.manager
        .session_mut(&pair(BTC))
        .expect("session")
        .apply_theme(Theme::Dark);
    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert!(w.markers.iter().all(|m| m.color == "white"));
}

#[tokio::test]
async fn empty_confidence_history_leaves_markers_untouched() {
    let mut h = harness_with(MemoryStore::new(), RefreshPolicy::Incremental, &[BTC]).await;
    h.controller
        .set_confidences_behavior(pair(BTC), MockBehavior::Return(Vec::new()))
        .await;
    h.manager.initialize(pairs(&[BTC]));
    h.manager.toggle_selection(&pair(BTC));
    h.manager.settle().await;

    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert_eq!(w.marker_sets, 0);
    assert!(h.manager.session(&pair(BTC)).expect("session").markers().is_empty());
    assert_eq!(w.bars.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn late_responses_after_dispose_are_dropped() {
    let mut h = harness_with(MemoryStore::new(), RefreshPolicy::Incremental, &[]).await;
    let slow = Duration::from_secs(10);
    h.controller
        .set_bars_behavior(pair(ETH), MockBehavior::Delay(slow, bars(&[100])))
        .await;
    h.controller
        .set_prediction_behavior(pair(ETH), MockBehavior::Delay(slow, prediction(&[200])))
        .await;
    h.controller
        .set_confidences_behavior(pair(ETH), MockBehavior::Delay(slow, confidences(&[100.0])))
        .await;
    h.manager.initialize(pairs(&[BTC, ETH]));

    h.manager.toggle_selection(&pair(ETH));
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.manager.toggle_selection(&pair(ETH));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.manager.pump(), 0);

    let w = h.probe.widget(&pair(ETH)).expect("widget");
    assert!(w.destroyed);
    assert!(w.bars.is_empty());
    assert!(w.line.is_empty());
    assert_eq!(w.marker_sets, 0);
}

#[tokio::test]
async fn load_only_acts_once() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    {
        let session = h.manager.session_mut(&pair(BTC)).expect("session");
        session.load();
        session.settle().await;
        session.load();
        session.settle().await;
    }
    assert_eq!(h.controller.requests().await.len(), 3);
    assert_eq!(bar_requests(&h.controller).await, 1);
}

#[tokio::test]
async fn theme_change_restyles_without_refetching() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.settle().await;
    let before = h.controller.requests().await.len();

    h.manager.set_theme(Theme::Dark);

    let w = h.probe.widget(&pair(BTC)).expect("widget");
    assert_eq!(w.options.background, "#2c2c2c");
    assert_eq!(w.option_updates, 1);
    assert_eq!(w.marker_sets, 2);
    assert!(w.markers.iter().all(|m| m.color == "white"));
    assert_eq!(h.controller.requests().await.len(), before);
    assert_eq!(h.store.raw("theme").as_deref(), Some("dark"));
    assert_eq!(h.manager.theme(), Theme::Dark);
}

#[tokio::test]
async fn new_charts_pick_up_the_current_theme() {
    let mut h = harness().await;
    h.manager.set_theme(Theme::Dark);
    h.manager.toggle_selection(&pair(ETH));
    h.manager.settle().await;

    let w = h.probe.widget(&pair(ETH)).expect("widget");
    assert_eq!(w.options.background, "#2c2c2c");
    assert_eq!(w.option_updates, 0);
    assert!(w.markers.iter().all(|m| m.color == "white"));
}

#[tokio::test]
async fn persisted_theme_is_restored() {
    let store = MemoryStore::with_entry("theme", "dark");
    let h = harness_with(store, RefreshPolicy::Incremental, &[]).await;
    assert_eq!(h.manager.theme(), Theme::Dark);

    let store = MemoryStore::with_entry("theme", "solarized");
    let h = harness_with(store, RefreshPolicy::Incremental, &[]).await;
    assert_eq!(h.manager.theme(), Theme::Light);
}

#[tokio::test]
async fn dispose_is_idempotent() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.settle().await;
    let session = h.manager.session_mut(&pair(BTC)).expect("session");
    assert!(session.dispose());
    assert!(!session.dispose());
    assert_eq!(session.lifecycle(), Lifecycle::Disposed);

    // Disposed sessions ignore further work.
    session.reload();
    session.load();
    assert_eq!(session.lifecycle(), Lifecycle::Disposed);
    assert_eq!(bar_requests(&h.controller).await, 1);
}
