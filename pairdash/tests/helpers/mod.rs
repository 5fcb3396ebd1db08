// Shared fixtures for the pairdash integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use pairdash::{
    Bar, ConfidenceValue, DashboardBuilder, FixedOffset, Pair, RefreshPolicy, SessionManager,
};
use pairdash_core::{Envelope, RawConfidence, RawPrediction};
use pairdash_mock::{
    DynamicMockController, DynamicMockTransport, MemoryStore, MockBehavior, MockWidgetHost,
    WidgetProbe,
};

pub const BTC: &str = "BTCUSD";
pub const ETH: &str = "ETHUSD";
pub const SOL: &str = "SOLUSD";

/// Parse a pair that is known to be valid.
pub fn pair(s: &str) -> Pair {
    Pair::parse(s).expect("valid pair")
}

pub fn pairs(list: &[&str]) -> Vec<Pair> {
    list.iter().map(|s| pair(s)).collect()
}

pub fn bar(time: i64) -> Bar {
    Bar {
        time,
        open: 1.0,
        high: 2.0,
        low: 0.5,
        close: 1.5,
    }
}

pub fn bars(times: &[i64]) -> Envelope<Bar> {
    Envelope::Bare(times.iter().copied().map(bar).collect())
}

pub fn prediction(times: &[i64]) -> Envelope<RawPrediction> {
    Envelope::Bare(
        times
            .iter()
            .map(|&t| RawPrediction {
                time: t,
                close: 100.0,
            })
            .collect(),
    )
}

pub fn confidences(times: &[f64]) -> Vec<RawConfidence> {
    times
        .iter()
        .map(|&t| RawConfidence {
            t,
            value: ConfidenceValue::Number(0.5),
        })
        .collect()
}

/// A manager wired to scripted collaborators, plus the handles to inspect them.
pub struct Harness {
    pub manager: SessionManager,
    pub probe: WidgetProbe,
    pub store: MemoryStore,
    pub controller: DynamicMockController,
}

/// Script every feed of `pair` to succeed immediately.
pub async fn serve_pair(controller: &DynamicMockController, p: &str) {
    let p = pair(p);
    controller
        .set_bars_behavior(p.clone(), MockBehavior::Return(bars(&[100, 200, 300])))
        .await;
    controller
        .set_prediction_behavior(p.clone(), MockBehavior::Return(prediction(&[400, 500])))
        .await;
    controller
        .set_confidences_behavior(p, MockBehavior::Return(confidences(&[100.0, 200.0])))
        .await;
}

pub async fn harness_with(
    store: MemoryStore,
    policy: RefreshPolicy,
    served: &[&str],
) -> Harness {
    let (transport, controller) = DynamicMockTransport::new_with_controller("dyn");
    for p in served {
        serve_pair(&controller, p).await;
    }
    let (host, probe) = MockWidgetHost::new();
    let manager = DashboardBuilder::new()
        .with_transport(transport)
        .with_widget_host(Box::new(host))
        .with_store(Arc::new(store.clone()))
        .with_clock(Arc::new(FixedOffset(0)))
        .refresh_policy(policy)
        .build()
        .expect("valid builder");
    Harness {
        manager,
        probe,
        store,
        controller,
    }
}

/// Manager with an initialized catalog of BTC, ETH and SOL, all served.
pub async fn harness() -> Harness {
    let mut h = harness_with(MemoryStore::new(), RefreshPolicy::Incremental, &[BTC, ETH, SOL]).await;
    h.manager.initialize(pairs(&[BTC, ETH, SOL]));
    h
}

/// Number of `bars/...` requests issued so far.
pub async fn bar_requests(controller: &DynamicMockController) -> usize {
    controller
        .requests()
        .await
        .iter()
        .filter(|r| r.starts_with("bars/"))
        .count()
}
