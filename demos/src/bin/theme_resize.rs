use std::time::Duration;

use pairdash::{DashboardBuilder, Dimensions, Pair, Theme};
use pairdash_demos::common::{config, get_store, get_transport, init_tracing};
use pairdash_mock::MockWidgetHost;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cfg = config();
    let (host, probe) = MockWidgetHost::new();
    let mut manager = DashboardBuilder::new()
        .config(cfg.clone())
        .with_transport(get_transport(&cfg))
        .with_widget_host(Box::new(host))
        .with_store(get_store())
        .resize_debounce(Duration::from_millis(50))
        .build()?;

    manager.load_catalog().await?;
    let sol = Pair::parse("SOLUSD").ok_or("invalid pair")?;
    manager.toggle_selection(&sol);
    manager.settle().await;

    manager.set_theme(Theme::Dark);
    if let Some(w) = probe.widget(&sol) {
        println!(
            "background {}, marker colours {:?}",
            w.options.background,
            w.markers.iter().map(|m| m.color.as_str()).collect::<Vec<_>>()
        );
    }

    // A burst of notifications produces a single resize per chart.
    probe.set_container_size(&sol, Dimensions::new(1024, 480));
    for _ in 0..10 {
        manager.on_viewport_resized();
    }
    if manager.next_resize().await {
        manager.fan_out_resize();
    }
    if let Some(w) = probe.widget(&sol) {
        println!("resizes applied: {:?}", w.resizes);
    }
    Ok(())
}
