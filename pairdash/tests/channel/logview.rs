use std::time::Duration;

use pairdash::{ChannelState, LogView, ReconnectConfig, StreamChannel};
use pairdash_mock::{DynamicLogConnector, StreamBehavior};

use crate::helpers::{SOL, pair};

#[tokio::test]
async fn buffers_lines_in_order_and_clears() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller.set_behavior(StreamBehavior::Manual).await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut state = channel.watch_state();

    let mut view = LogView::open(channel, pair(SOL));
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.state == ChannelState::Open),
    )
    .await
    .expect("open in time")
    .expect("channel alive");

    assert!(controller.push_line("first").await);
    assert!(controller.push_line("second").await);
    assert_eq!(view.next_line().await, Some("first"));
    assert_eq!(view.next_line().await, Some("second"));
    assert_eq!(view.lines(), ["first".to_string(), "second".to_string()]);

    view.clear();
    assert!(view.lines().is_empty());
    assert_eq!(view.state(), ChannelState::Open);

    assert!(controller.push_line("third").await);
    assert_eq!(view.next_line().await, Some("third"));
    assert_eq!(view.close(), vec!["third".to_string()]);
}

#[tokio::test]
async fn closing_the_view_closes_the_socket() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller.set_behavior(StreamBehavior::Manual).await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut state = channel.watch_state();

    let view = LogView::open(channel, pair(SOL));
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.state == ChannelState::Open),
    )
    .await
    .expect("open in time")
    .expect("channel alive");
    drop(view);

    // The socket task exits once the view is gone; pushes then fail.
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while controller.push_line("late").await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(closed.is_ok());
    assert_eq!(controller.graceful_closes().await, 1);
}

#[tokio::test]
async fn dropping_the_channel_stops_the_socket_gracefully() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller.set_behavior(StreamBehavior::Manual).await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut state = channel.watch_state();
    channel.connect(pair(SOL));
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.state == ChannelState::Open),
    )
    .await
    .expect("open in time")
    .expect("channel alive");
    drop(channel);

    let stopped = tokio::time::timeout(Duration::from_secs(5), async {
        while controller.graceful_closes().await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(stopped.is_ok());
    assert!(!controller.push_line("late").await);
    assert_eq!(controller.open_requests().await, vec![pair(SOL)]);
}
