use anyhow::{Context, Result};
use tracing::info;

use project_morey::config::{self, DashboardConfig};
use project_morey::dashboard::{self, DashboardData};
use project_morey::dataset::load_player_table;
use project_morey::metrics::MetricRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let config = DashboardConfig::from_env();
    let table = load_player_table(&config.data_path)
        .with_context(|| format!("unable to load {}", config.data_path.display()))?;

    let registry = MetricRegistry::with_defaults();
    let derived = registry.names();
    let table = registry.apply(table).context("derive metrics")?;
    info!(metrics = ?derived, "derived metrics appended");

    let data = DashboardData::new(table, &derived);
    dashboard::serve(config.addr(), data).await
}
