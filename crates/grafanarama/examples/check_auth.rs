//! Check that Grafana is reachable and that the configured credentials are accepted.
use tracing_subscriber::{prelude::*, EnvFilter};

use grafanarama::{ClientBuilder, Error};

fn main() -> grafanarama::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = ClientBuilder::from_env()?.build_blocking()?;
    tracing::info!(
        url = %client.inner().base_url(),
        auth = client.auth().scheme(),
        "checking connection"
    );

    let health = client.health()?;
    tracing::info!(
        version = health.version.as_deref().unwrap_or("unknown"),
        database = health.database.as_deref().unwrap_or("unknown"),
        "Grafana is up"
    );

    // Any lookup needs valid credentials; a missing datasource is still a success.
    match client.get_datasource_by_name("grafanarama-auth-check") {
        Ok(_) => {
            tracing::info!("authentication succeeded");
            Ok(())
        }
        Err(e @ Error::Http { .. }) => {
            tracing::error!(status = ?e.status(), message = ?e.message(), "authentication failed");
            Err(e)
        }
        Err(e) => Err(e),
    }
}
