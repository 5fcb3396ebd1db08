use std::time::Duration;

use pairdash::{ChannelState, DashError, ReconnectConfig, StreamChannel};
use pairdash_mock::{DynamicLogConnector, LogStreamController, StreamBehavior};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::helpers::{BTC, ETH, pair};

async fn wait_for_state(rx: &mut watch::Receiver<pairdash::ChannelSnapshot>, state: ChannelState) {
    tokio::time::timeout(Duration::from_secs(120), rx.wait_for(|s| s.state == state))
        .await
        .expect("state reached in time")
        .expect("channel alive");
}

async fn refusing() -> (StreamChannel, LogStreamController) {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller
        .set_behavior(StreamBehavior::Fail(DashError::Socket("refused".into())))
        .await;
    (StreamChannel::spawn(connector, ReconnectConfig::default()), controller)
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_five_fixed_delay_reconnects() {
    let (channel, controller) = refusing().await;
    let mut state = channel.watch_state();
    let started = Instant::now();

    channel.connect(pair(BTC));
    wait_for_state(&mut state, ChannelState::Failed).await;

    // One initial open plus five reconnects, 5 s apart.
    assert_eq!(controller.open_requests().await.len(), 6);
    assert_eq!(channel.snapshot().attempt, 5);
    assert!(started.elapsed() >= Duration::from_secs(25));

    // No further automatic attempts.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(controller.open_requests().await.len(), 6);
    assert_eq!(channel.state(), ChannelState::Failed);
}

#[tokio::test(start_paused = true)]
async fn explicit_connect_after_failure_resets_counter() {
    let (channel, controller) = refusing().await;
    let mut state = channel.watch_state();
    channel.connect(pair(BTC));
    wait_for_state(&mut state, ChannelState::Failed).await;

    controller.set_behavior(StreamBehavior::Manual).await;
    channel.connect(pair(BTC));
    wait_for_state(&mut state, ChannelState::Open).await;
    assert_eq!(channel.snapshot().attempt, 0);
    assert_eq!(controller.open_requests().await.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn server_close_reconnects_and_reopens() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller.set_behavior(StreamBehavior::Manual).await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut state = channel.watch_state();

    channel.connect(pair(ETH));
    wait_for_state(&mut state, ChannelState::Open).await;

    controller.fail_stream().await;
    wait_for_state(&mut state, ChannelState::Reconnecting).await;
    assert_eq!(channel.snapshot().attempt, 1);

    wait_for_state(&mut state, ChannelState::Open).await;
    assert_eq!(channel.snapshot().attempt, 0);
    assert_eq!(controller.open_requests().await, vec![pair(ETH), pair(ETH)]);
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_pending_reconnect() {
    let (channel, controller) = refusing().await;
    let mut state = channel.watch_state();

    channel.connect(pair(BTC));
    wait_for_state(&mut state, ChannelState::Reconnecting).await;
    channel.disconnect();
    wait_for_state(&mut state, ChannelState::Closed).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(controller.open_requests().await.len(), 1);
    assert_eq!(channel.state(), ChannelState::Closed);
}

#[tokio::test(start_paused = true)]
async fn connect_switches_pair_with_a_single_connection() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller.set_behavior(StreamBehavior::Manual).await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut state = channel.watch_state();
    let mut logs = channel.subscribe_logs();

    channel.connect(pair(BTC));
    wait_for_state(&mut state, ChannelState::Open).await;
    channel.connect(pair(ETH));
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.state == ChannelState::Open && s.pair == Some(pair(ETH))),
    )
    .await
    .expect("reconnected in time")
    .expect("channel alive");

    // Only the newest socket is wired to the controller, and only it reaches subscribers.
    assert!(controller.push_line("from eth").await);
    let line = tokio::time::timeout(Duration::from_secs(5), logs.recv())
        .await
        .expect("line in time")
        .expect("line");
    assert_eq!(line, "from eth");
    assert_eq!(controller.open_requests().await, vec![pair(BTC), pair(ETH)]);
}
