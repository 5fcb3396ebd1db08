use std::time::Duration;

use pairdash::{ReconnectConfig, StreamChannel};
use pairdash_mock::{DynamicLogConnector, StreamBehavior};

use crate::helpers::{BTC, pair};

#[tokio::test]
async fn completion_lines_are_logged_and_announced() {
    let (connector, controller) = DynamicLogConnector::new_with_controller("logs");
    controller
        .set_behavior(StreamBehavior::Success(vec![
            "Loading model".into(),
            "Inference completed for pair `BTC/USD`".into(),
            "Inference completed for pair".into(),
        ]))
        .await;
    let channel = StreamChannel::spawn(connector, ReconnectConfig::default());
    let mut logs = channel.subscribe_logs();
    let mut completions = channel.completions();

    channel.connect(pair(BTC));

    let mut got = Vec::new();
    for _ in 0..3 {
        let line = tokio::time::timeout(Duration::from_secs(5), logs.recv())
            .await
            .expect("line in time")
            .expect("line");
        got.push(line);
    }
    assert_eq!(
        got,
        vec![
            "Loading model".to_string(),
            "Inference completed for pair `BTC/USD`".to_string(),
            "Inference completed for pair".to_string(),
        ]
    );

    let done = completions.try_recv().expect("one completion");
    assert_eq!(done, pair(BTC));
    assert!(completions.try_recv().is_err());
}
