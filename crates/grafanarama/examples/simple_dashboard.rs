//! Create a dashboard with a single markdown text panel.
//!
//! Reads the `GRAFANA_*` environment variables, falling back to `admin`/`admin` when no
//! credentials are set.
use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use grafanarama::{
    models::{GridPos, Panel, Spec},
    ClientBuilder,
};

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
        .title("Hello from Rust!")
        .grid_pos(GridPos::new(0, 0, 24, 8)?)
        .options(json!({
            "mode": "markdown",
            "content": "# Hello World!\n\nThis dashboard was created programmatically.",
        }))
        .build()?;
    let dashboard = Spec::builder()
        .title("Simple Dashboard")
        .uid(format!("simple-{}", Utc::now().timestamp()))
        .schema_version(39)
        .panel(panel)
        .build()?;

    let mut builder = ClientBuilder::from_env()?;
    if std::env::var_os("GRAFANA_API_KEY").is_none() && std::env::var_os("GRAFANA_USER").is_none() {
        builder = builder.basic_auth("admin", "admin");
    }
    let client = builder.build()?;

    tracing::info!(url = %client.base_url(), "sending dashboard to Grafana");
    let saved = client.send_dashboard(&dashboard.into(), true).await?;
    tracing::info!(
        uid = saved.uid.as_deref().unwrap_or_default(),
        "dashboard created, view it at {}{}",
        client.base_url().as_str().trim_end_matches('/'),
        saved.url.as_deref().unwrap_or_default(),
    );
    Ok(())
}
