//! Web dashboard over the assembled player table.

pub mod figures;
pub mod handlers;
pub mod layout;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::dataset::{Cell, Table};

/// Numeric columns offered in the metric pickers before derived metrics.
pub const BASE_METRICS: &[&str] = &[
    "z_score",
    "total_points",
    "average_points",
    "salary",
    "height_inches",
    "weight_lbs",
    "age",
    "experience_years",
];

pub const DEFAULT_SCATTER_DIMENSIONS: &[&str] = &["total_points", "salary", "age", "experience_years"];

pub struct DashboardData {
    pub table: Table,
    pub positions: Vec<String>,
    pub years: Vec<i64>,
    pub metrics: Vec<String>,
}

impl DashboardData {
    /// Takes ownership of the table; `derived` names the metric columns
    /// already appended to it.
    pub fn new(table: Table, derived: &[&str]) -> Self {
        let positions = table
            .distinct("position")
            .iter()
            .map(Cell::render)
            .collect();
        let mut years: Vec<i64> = table
            .distinct("year")
            .iter()
            .filter_map(Cell::as_f64)
            .map(|y| y as i64)
            .collect();
        years.sort_unstable();
        years.dedup();
        let metrics = BASE_METRICS
            .iter()
            .chain(derived.iter())
            .filter(|m| table.has_column(m))
            .map(|m| m.to_string())
            .collect();
        Self {
            table,
            positions,
            years,
            metrics,
        }
    }

    /// Latest year present, the initial year selection.
    pub fn default_year(&self) -> Option<i64> {
        self.years.iter().copied().max()
    }

    pub fn is_metric(&self, name: &str) -> bool {
        self.metrics.iter().any(|m| m == name)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<DashboardData>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/options", get(handlers::options))
        .route("/api/box", get(handlers::box_plot))
        .route("/api/scatter", get(handlers::scatter_matrix))
        .route("/api/rows", get(handlers::rows))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, data: DashboardData) -> Result<()> {
    info!(
        rows = data.table.len(),
        positions = data.positions.len(),
        years = data.years.len(),
        "dashboard data loaded"
    );
    let app = create_router(AppState {
        data: Arc::new(data),
    });

    info!("dashboard listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
