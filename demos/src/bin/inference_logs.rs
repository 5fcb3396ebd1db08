use std::sync::Arc;
use std::time::Duration;

use pairdash::{
    DataSyncClient, InferenceLauncher, LaunchOutcome, LocalOffset, LogView, Pair, StreamChannel,
};
use pairdash_demos::common::{config, get_log_connector, get_transport, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cfg = config();
    let client = DataSyncClient::new(get_transport(&cfg), Arc::new(LocalOffset));
    let mut launcher = InferenceLauncher::new(client);
    let pair = Pair::parse("BTCUSD").ok_or("invalid pair")?;

    let channel = StreamChannel::spawn(get_log_connector(&cfg), cfg.reconnect);
    let mut completions = channel.completions();

    match launcher.launch(&pair).await? {
        LaunchOutcome::Started => println!("inference started for {pair}"),
        LaunchOutcome::AlreadyRunning => println!("inference already running for {pair}"),
    }
    // A second launch only re-opens the view.
    println!("second launch: {:?}", launcher.launch(&pair).await?);

    let mut view = LogView::open(channel, pair.clone());
    let done = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            tokio::select! {
                line = view.next_line() => match line {
                    Some(line) => println!("log: {line}"),
                    None => return None,
                },
                finished = completions.recv() => {
                    if let Ok(p) = finished {
                        return Some(p);
                    }
                }
            }
        }
    })
    .await;

    match done {
        Ok(Some(p)) => {
            launcher.complete(&p);
            println!("completed: {p}, still running: {}", launcher.is_running(&p));
        }
        Ok(None) => println!("log stream closed"),
        Err(_) => println!("timed out in state {:?}", view.state()),
    }

    view.drain();
    let lines = view.close();
    println!("{} lines buffered", lines.len());
    Ok(())
}
