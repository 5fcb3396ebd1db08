use pairdash::{DashError, Lifecycle, RefreshPolicy, SelectionChange};
use pairdash_mock::{MemoryStore, MockBehavior};

use crate::helpers::{BTC, ETH, SOL, harness, harness_with, pair, pairs};

#[tokio::test]
async fn display_order_follows_catalog_not_toggle_order() {
    let mut h = harness().await;
    for p in [SOL, ETH, BTC] {
        assert_eq!(h.manager.toggle_selection(&pair(p)), SelectionChange::Selected);
    }

    assert_eq!(h.manager.selection().pairs(), pairs(&[SOL, ETH, BTC]).as_slice());
    assert_eq!(h.manager.display_order(), pairs(&[BTC, ETH, SOL]));
    assert_eq!(h.probe.container_order(), pairs(&[BTC, ETH, SOL]));
}

#[tokio::test]
async fn two_pairs_render_in_catalog_order_either_way() {
    for order in [[BTC, ETH], [ETH, BTC]] {
        let mut h = harness().await;
        for p in order {
            h.manager.toggle_selection(&pair(p));
        }
        assert_eq!(h.probe.container_order(), pairs(&[BTC, ETH]));
    }
}

#[tokio::test]
async fn double_toggle_restores_selection_without_leaking_widgets() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    let before = h.manager.selection().clone();

    assert_eq!(h.manager.toggle_selection(&pair(ETH)), SelectionChange::Selected);
    assert_eq!(h.manager.toggle_selection(&pair(ETH)), SelectionChange::Deselected);

    assert_eq!(h.manager.selection(), &before);
    assert_eq!(h.manager.session_count(), 1);
    let live = h.probe.live_widgets();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].pair, pair(BTC));
    assert_eq!(h.probe.container_order(), pairs(&[BTC]));
}

#[tokio::test]
async fn every_toggle_is_persisted() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(ETH));
    assert_eq!(h.store.raw("selectedPairs").as_deref(), Some(r#"["ETHUSD"]"#));
    h.manager.toggle_selection(&pair(BTC));
    assert_eq!(
        h.store.raw("selectedPairs").as_deref(),
        Some(r#"["ETHUSD","BTCUSD"]"#)
    );
    h.manager.toggle_selection(&pair(ETH));
    assert_eq!(h.store.raw("selectedPairs").as_deref(), Some(r#"["BTCUSD"]"#));
}

#[tokio::test]
async fn toggle_outside_catalog_is_ignored() {
    let mut h = harness().await;
    assert_eq!(
        h.manager.toggle_selection(&pair("XRPUSD")),
        SelectionChange::Ignored
    );
    assert!(h.manager.selection().is_empty());
    assert_eq!(h.store.raw("selectedPairs"), None);
    assert_eq!(h.probe.created_count(), 0);
}

#[tokio::test]
async fn initialize_drops_unknown_persisted_pairs() {
    let store = MemoryStore::with_entry("selectedPairs", r#"["ETH/USD","DOGEUSD","BTCUSD"]"#);
    let mut h = harness_with(store, RefreshPolicy::Incremental, &[BTC, ETH]).await;
    assert_eq!(
        h.manager.selection().pairs(),
        pairs(&[ETH, "DOGEUSD", BTC]).as_slice()
    );
    assert_eq!(h.probe.created_count(), 0);

    h.manager.initialize(pairs(&[BTC, ETH, SOL]));

    assert!(h.manager.is_catalog_loaded());
    assert_eq!(h.manager.selection().pairs(), pairs(&[ETH, BTC]).as_slice());
    assert_eq!(h.store.raw("selectedPairs").as_deref(), Some(r#"["ETHUSD","BTCUSD"]"#));
    assert_eq!(h.probe.container_order(), pairs(&[BTC, ETH]));
}

#[tokio::test]
async fn corrupt_persisted_selection_starts_empty() {
    let store = MemoryStore::with_entry("selectedPairs", "not json");
    let h = harness_with(store, RefreshPolicy::Incremental, &[]).await;
    assert!(h.manager.selection().is_empty());
}

#[tokio::test]
async fn incremental_refresh_keeps_surviving_charts() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(ETH));
    h.manager.settle().await;
    let fetched = crate::helpers::bar_requests(&h.controller).await;

    h.manager.refresh_catalog(pairs(&[BTC, SOL]));
    h.manager.settle().await;

    assert_eq!(h.manager.selection().pairs(), pairs(&[BTC]).as_slice());
    assert_eq!(h.probe.created_count(), 2);
    assert_eq!(h.probe.live_widgets().len(), 1);
    assert_eq!(crate::helpers::bar_requests(&h.controller).await, fetched);
    assert_eq!(
        h.manager.session(&pair(BTC)).map(|s| s.lifecycle()),
        Some(Lifecycle::Populated)
    );
}

#[tokio::test]
async fn rebuild_refresh_recreates_surviving_charts() {
    let mut h = harness_with(MemoryStore::new(), RefreshPolicy::Rebuild, &[BTC, ETH, SOL]).await;
    h.manager.initialize(pairs(&[BTC, ETH, SOL]));
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(ETH));
    h.manager.settle().await;
    let fetched = crate::helpers::bar_requests(&h.controller).await;

    h.manager.refresh_catalog(pairs(&[BTC, SOL]));
    h.manager.settle().await;

    assert_eq!(h.probe.created_count(), 3);
    let live = h.probe.live_widgets();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].pair, pair(BTC));
    assert_eq!(crate::helpers::bar_requests(&h.controller).await, fetched + 1);
}

#[tokio::test]
async fn detached_host_skips_chart_creation() {
    let mut h = harness().await;
    h.probe.set_attached(false);
    assert_eq!(h.manager.toggle_selection(&pair(BTC)), SelectionChange::Selected);
    assert_eq!(h.manager.session_count(), 0);
    assert!(h.manager.selection().contains(&pair(BTC)));

    // Attaching later and refreshing creates the missing chart.
    h.probe.set_attached(true);
    h.manager.refresh_catalog(pairs(&[BTC, ETH, SOL]));
    assert_eq!(h.manager.session_count(), 1);
}

#[tokio::test]
async fn teardown_disposes_everything_but_keeps_selection() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(SOL));
    h.manager.teardown();

    assert_eq!(h.manager.session_count(), 0);
    assert!(h.probe.live_widgets().is_empty());
    assert!(h.probe.container_order().is_empty());
    assert_eq!(h.manager.selection().len(), 2);
}

#[tokio::test]
async fn load_catalog_failure_changes_nothing() {
    let store = MemoryStore::with_entry("selectedPairs", r#"["BTCUSD"]"#);
    let mut h = harness_with(store, RefreshPolicy::Incremental, &[BTC]).await;
    h.controller
        .set_catalog_behavior(MockBehavior::Fail(DashError::Other("offline".into())))
        .await;

    assert!(h.manager.load_catalog().await.is_err());
    assert!(!h.manager.is_catalog_loaded());
    assert!(h.manager.catalog().is_empty());
    assert_eq!(h.manager.session_count(), 0);
    assert_eq!(h.manager.selection().pairs(), pairs(&[BTC]).as_slice());
}

#[tokio::test]
async fn load_catalog_initializes_then_refreshes() {
    let store = MemoryStore::with_entry("selectedPairs", r#"["SOLUSD","BTCUSD"]"#);
    let mut h = harness_with(store, RefreshPolicy::Incremental, &[BTC, SOL]).await;
    h.controller
        .set_catalog_behavior(MockBehavior::Return(vec![
            Some("BTC/USD".into()),
            Some("BTCUSD".into()),
            Some("ETH/USD".into()),
            Some("SOL/USD".into()),
        ]))
        .await;

    h.manager.load_catalog().await.expect("catalog");
    assert_eq!(h.manager.catalog(), pairs(&[BTC, ETH, SOL]).as_slice());
    assert_eq!(h.probe.container_order(), pairs(&[BTC, SOL]));

    h.controller
        .set_catalog_behavior(MockBehavior::Return(vec![Some("SOLUSD".into())]))
        .await;
    h.manager.load_catalog().await.expect("catalog");
    assert_eq!(h.manager.display_order(), pairs(&[SOL]));
    assert_eq!(h.store.raw("selectedPairs").as_deref(), Some(r#"["SOLUSD"]"#));
    assert_eq!(h.probe.created_count(), 2);
}

#[tokio::test]
async fn incremental_refresh_reorders_containers_without_recreating_charts() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(ETH));
    h.manager.settle().await;

    h.manager.refresh_catalog(pairs(&[ETH, BTC, SOL]));

    assert_eq!(h.manager.display_order(), pairs(&[ETH, BTC]));
    assert_eq!(h.probe.container_order(), pairs(&[ETH, BTC]));
    assert_eq!(h.probe.created_count(), 2);
    assert_eq!(h.probe.move_count(), 1);

    // Later insertions land relative to the new order.
    h.manager.toggle_selection(&pair(SOL));
    assert_eq!(h.probe.container_order(), pairs(&[ETH, BTC, SOL]));

    // An unchanged catalog moves nothing.
    h.manager.refresh_catalog(pairs(&[ETH, BTC, SOL]));
    assert_eq!(h.probe.move_count(), 1);
}

#[tokio::test]
async fn reversed_catalog_reverses_containers() {
    let mut h = harness().await;
    for p in [BTC, ETH, SOL] {
        h.manager.toggle_selection(&pair(p));
    }

    h.manager.refresh_catalog(pairs(&[SOL, ETH, BTC]));

    assert_eq!(h.probe.container_order(), pairs(&[SOL, ETH, BTC]));
    assert_eq!(h.probe.container_order(), h.manager.display_order());
    assert_eq!(h.probe.live_widgets().len(), 3);
}
