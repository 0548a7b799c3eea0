//! `localmart nearby`: one mount of the map surface, printed to stdout.

use std::sync::Arc;

use localmart_backend::{PositionSource, RetryPolicy, SupabaseClient, SupabaseGateway};
use localmart_core::{AppConfig, Coordinate};
use localmart_map::{MapSurface, SurfaceSettings};

use crate::render::ViewReport;

/// Picks the position source: explicit coordinates win, then the configured
/// IP lookup, otherwise none (the map falls back to the default position).
pub(crate) fn position_source(config: &AppConfig, position: Option<Coordinate>) -> PositionSource {
    match (position, config.geoip_url.as_ref()) {
        (Some(coordinate), _) => PositionSource::Fixed(coordinate),
        (None, Some(url)) => PositionSource::IpLookup(url.clone()),
        (None, None) => PositionSource::Unavailable,
    }
}

/// Mounts a map surface, waits for the first fetch cycle, and prints it.
///
/// A failed fetch is reported in the output, not as an error: the view is
/// still printed with its banner.
///
/// # Errors
///
/// Returns an error if the backend client cannot be constructed or the view
/// cannot be serialized.
pub(crate) async fn run_nearby(
    config: &AppConfig,
    position: Option<Coordinate>,
    json: bool,
) -> anyhow::Result<()> {
    let client = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        config.request_timeout_secs,
    )?
    .with_retry_policy(RetryPolicy {
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    });

    let source = position_source(config, position);
    tracing::debug!(?source, "position source selected");
    let gateway = Arc::new(SupabaseGateway::new(
        client,
        source,
        config.request_timeout_secs,
    )?);

    let mut surface = MapSurface::new(gateway, SurfaceSettings::from_config(config));
    surface.mount();
    let view = surface.settled().await;
    surface.unmount().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", ViewReport(&view));
    }
    Ok(())
}
