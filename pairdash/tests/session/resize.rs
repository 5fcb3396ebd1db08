use std::time::Duration;

use pairdash::{Dimensions, ResizeCoordinator};

use crate::helpers::{BTC, ETH, harness, pair};

#[tokio::test(start_paused = true)]
async fn burst_fires_once_after_quiet_window() {
    let mut rc = ResizeCoordinator::spawn(Duration::from_millis(100));
    for _ in 0..5 {
        rc.signal();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    assert!(!rc.try_fired());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rc.try_fired());
    assert!(!rc.try_fired());
}

#[tokio::test(start_paused = true)]
async fn fired_waits_for_the_window() {
    let mut rc = ResizeCoordinator::spawn(Duration::from_millis(250));
    let start = tokio::time::Instant::now();
    rc.signal();
    assert!(rc.fired().await);
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn fan_out_reads_each_container_at_fire_time() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(ETH));
    h.manager.settle().await;

    h.manager.on_viewport_resized();
    h.probe.set_container_size(&pair(BTC), Dimensions::new(500, 300));
    h.manager.on_viewport_resized();
    h.probe.set_container_size(&pair(BTC), Dimensions::new(640, 320));
    h.probe.set_container_size(&pair(ETH), Dimensions::new(900, 450));

    assert!(!h.manager.poll_resize());
    assert!(h.manager.next_resize().await);
    assert_eq!(h.manager.fan_out_resize(), 2);

    let btc = h.probe.widget(&pair(BTC)).expect("widget");
    let eth = h.probe.widget(&pair(ETH)).expect("widget");
    assert_eq!(btc.resizes, vec![Dimensions::new(640, 320)]);
    assert_eq!(eth.resizes, vec![Dimensions::new(900, 450)]);
}

#[tokio::test(start_paused = true)]
async fn poll_resize_skips_disposed_charts() {
    let mut h = harness().await;
    h.manager.toggle_selection(&pair(BTC));
    h.manager.toggle_selection(&pair(ETH));
    h.manager.toggle_selection(&pair(ETH));

    h.manager.on_viewport_resized();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(h.manager.poll_resize());

    assert_eq!(h.probe.widget(&pair(BTC)).expect("widget").resizes.len(), 1);
    assert!(h.probe.widget(&pair(ETH)).expect("widget").resizes.is_empty());
}
