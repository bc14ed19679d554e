/*! Typed Grafana dashboards, panels and datasources, and a client for pushing them to Grafana.

This crate is divided into four main modules:

- [`models`] contains the resource models, such as [`Spec`][models::Spec],
  [`Panel`][models::Panel] and [`Datasource`][models::Datasource], along with builders which
  check required fields and value ranges.
- [`schema`] contains the per-type schema descriptors generated by `#[derive(Schema)]`, and the
  normalization pass which makes sure array fields are sent as `[]` rather than `null`.
- [`serializer`] turns models into the JSON bodies expected by Grafana's HTTP API.
- [`client`] contains the asynchronous [`Client`]; [`blocking`] contains a synchronous wrapper.

```no_run
use grafanarama::{
    models::{GridPos, Panel, Spec},
    ClientBuilder,
};
use serde_json::json;

# fn main() -> grafanarama::Result<()> {
let panel = Panel::builder()
    .panel_type("text")
    .id(1)
    .title("Hello")
    .grid_pos(GridPos::new(0, 0, 24, 8)?)
    .options(json!({"mode": "markdown", "content": "# Hello"}))
    .build()?;
let dashboard = Spec::builder().title("D").panel(panel).build()?;

let client = ClientBuilder::from_env()?.build_blocking()?;
let saved = client.send_dashboard(&dashboard.into(), true)?;
println!("saved dashboard at {:?}", saved.url);
# Ok(())
# }
```

# Feature flags

- `blocking` (enabled by default) - adds the [`blocking`] module.

# Configuration

[`ClientBuilder::from_env`] reads the following environment variables:

| Variable            | Default     |
|---------------------|-------------|
| `GRAFANA_HOST`      | `localhost` |
| `GRAFANA_PORT`      | `3000`      |
| `GRAFANA_USE_HTTPS` | `false`     |
| `GRAFANA_API_KEY`   |             |
| `GRAFANA_USER`      |             |
| `GRAFANA_PASSWORD`  |             |

If both an API key and basic auth credentials are set, the API key is used.
*/
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets `#[derive(Schema)]` refer to `::grafanarama` from inside this crate.
extern crate self as grafanarama;

#[doc(hidden)]
pub use serde_json;

#[cfg(feature = "blocking")]
#[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
pub mod blocking;
pub mod client;
mod error;
pub mod models;
pub mod schema;
pub mod serializer;

pub use client::{Auth, Client, ClientBuilder, ConfigError, DashboardIdentifier};
pub use error::{Error, Result, ValidationError};
pub use serializer::{Resource, ResourceKind, SaveOptions};

/// Commonly used traits and types.
pub mod prelude {
    pub use crate::{
        models::{DashboardObject, Datasource, GridPos, Panel, Spec},
        schema::Schema,
        serializer::Resource,
        Client, ClientBuilder,
    };
}
