//! Print inventory analytics for a JSON snapshot file.
//!
//! Usage: `snapshot-report <snapshot.json> [window_days] [tenant_id]`

use anyhow::Context;

use stocklens_analytics::{AnalyticsConfig, AnalyticsEngine, Window};
use stocklens_core::{TenantId, TenantScope};
use stocklens_infra::JsonSnapshotSource;

fn main() -> anyhow::Result<()> {
    stocklens_observability::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: snapshot-report <snapshot.json> [window_days] [tenant_id]")?;
    let window_days: u32 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid window_days: {s}"))?,
        None => 30,
    };
    let tenant_id: TenantId = match args.next() {
        Some(s) => s.parse()?,
        None => TenantId::new(),
    };

    let window = Window::new(window_days)?;
    let config = AnalyticsConfig::load().context("failed to load analytics config")?;
    let source = JsonSnapshotSource::new(&path);
    let engine = AnalyticsEngine::new(source.clone(), source).with_config(config);

    let scope = TenantScope::tenant(tenant_id);
    let now = chrono::Local::now().into();
    let result = engine
        .try_compute_at(&scope, window, now)
        .with_context(|| format!("failed to analyze {path}"))?;

    tracing::info!(
        items = result.summary.total_items,
        predictions = result.stock_predictions.len(),
        "analytics computed"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
