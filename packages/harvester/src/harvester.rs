//! Main harvester service that ties all components together.

use reqwest::blocking::Client;

use crate::catalog::download_catalog;
use crate::config::validate_location;
use crate::error::Result;
use crate::http::create_client;
use crate::mirror::resolve_mirror;
use crate::types::Filmliste;

/// Outcome of one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// Catalog location that was parsed.
    pub catalog_url: String,
    /// Retained broadcasts.
    pub liste: Filmliste,
}

/// Current time in epoch seconds, the reference for the retention window.
#[must_use]
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Resolve the current catalog mirror and harvest it.
///
/// # Arguments
/// * `control_url` - Location of the control document
///
/// # Returns
/// The catalog location and its retained broadcasts
pub fn harvest(control_url: &str) -> Result<Harvest> {
    let client = create_client()?;
    harvest_with(&client, control_url, None, now_epoch())
}

/// Harvest with an explicit client, catalog override and reference time.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `control_url` - Location of the control document
/// * `catalog` - Catalog location; skips mirror resolution when given
/// * `now` - Reference time in epoch seconds
pub fn harvest_with(
    client: &Client,
    control_url: &str,
    catalog: Option<&str>,
    now: i64,
) -> Result<Harvest> {
    let catalog_url = catalog_location(client, control_url, catalog)?;
    let liste = download_catalog(client, &catalog_url, now)?;

    tracing::info!(
        catalog = %catalog_url,
        seen = liste.seen(),
        retained = liste.len(),
        "Harvest complete"
    );

    Ok(Harvest { catalog_url, liste })
}

/// The catalog to parse: the explicit one, or the best mirror.
pub fn catalog_location(client: &Client, control_url: &str, catalog: Option<&str>) -> Result<String> {
    match catalog {
        Some(location) => {
            validate_location(location)?;
            tracing::info!(catalog = %location, "Using explicit catalog, skipping mirror resolution");
            Ok(location.to_string())
        }
        None => {
            validate_location(control_url)?;
            resolve_mirror(client, control_url)
        }
    }
}
