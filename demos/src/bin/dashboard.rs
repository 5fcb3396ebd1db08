use pairdash::{DashboardBuilder, Pair, spawn_dashboard};
use pairdash_demos::common::{config, get_store, get_transport, init_tracing};
use pairdash_mock::MockWidgetHost;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cfg = config();
    // Headless host: records what a chart library would have drawn.
    let (host, probe) = MockWidgetHost::new();
    let manager = DashboardBuilder::new()
        .config(cfg.clone())
        .with_transport(get_transport(&cfg))
        .with_widget_host(Box::new(host))
        .with_store(get_store())
        .build()?;
    let dash = spawn_dashboard(manager);

    dash.refresh_catalog().await?;

    // Toggle in reverse catalog order; charts still come out in catalog order.
    for raw in ["ETH/USD", "BTC/USD"] {
        let pair = Pair::parse(raw).ok_or("invalid pair")?;
        let change = dash.toggle(pair.clone()).await?;
        println!("{pair}: {change:?}");
    }

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let snap = dash.snapshot().await?;
    println!("display order: {:?}", snap.display_order);
    for (pair, state) in &snap.sessions {
        let drawn = probe.widget(pair);
        println!(
            "{pair}: {state:?}, {} candles, {} prediction points, {} markers",
            drawn.as_ref().map_or(0, |w| w.bars.len()),
            drawn.as_ref().map_or(0, |w| w.line.len()),
            drawn.as_ref().map_or(0, |w| w.markers.len()),
        );
    }

    dash.shutdown().await;
    println!("live widgets after shutdown: {}", probe.live_widgets().len());
    Ok(())
}
