//! Print a dashboard with a text panel as JSON, then send it to Grafana.
//!
//! Either `GRAFANA_API_KEY` or both `GRAFANA_USER` and `GRAFANA_PASSWORD` must be set.
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use grafanarama::{
    models::{DashboardObject, GridPos, Panel, Spec},
    serializer, Auth, ClientBuilder,
};

const CONTENT: &str = "\
# Welcome to Grafana!

This dashboard was created using **grafanarama**.

## Features:
- Programmatic dashboard creation
- Type-checked panel configuration
- Easy integration with Grafana";

#[tokio::main]
async fn main() -> grafanarama::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let panel = Panel::builder()
        .panel_type("text")
        .id(1)
        .title("Welcome Panel")
        .grid_pos(GridPos::new(0, 0, 24, 8)?)
        .options(json!({"mode": "markdown", "content": CONTENT}))
        .build()?;
    let dashboard = DashboardObject::new(
        Spec::builder()
            .title("My First Dashboard with Text Panel")
            .schema_version(39)
            .panel(panel)
            .build()?,
    );

    println!("Dashboard JSON:");
    println!("{}", serializer::to_pretty_json(&dashboard)?);
    println!();

    let client = ClientBuilder::from_env()?.build()?;
    if client.auth() == &Auth::None {
        eprintln!("Error: either GRAFANA_API_KEY or GRAFANA_USER/GRAFANA_PASSWORD must be set");
        std::process::exit(1);
    }

    match client.send_dashboard(&dashboard, false).await {
        Ok(saved) => {
            tracing::info!(url = ?saved.url, version = ?saved.version, "dashboard sent");
            Ok(())
        }
        Err(e) => {
            tracing::error!(status = ?e.status(), "failed to send dashboard: {e}");
            Err(e)
        }
    }
}
