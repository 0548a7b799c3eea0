//! [`BackendGateway`] backed by Supabase RPC plus a configurable position
//! source.

use std::time::Duration;

use async_trait::async_trait;
use localmart_core::{
    BackendGateway, Coordinate, GatewayError, LocationError, LocationEvent, NearbyQuery,
    RawNearbyRecord,
};
use tokio::sync::broadcast;

use crate::client::SupabaseClient;
use crate::error::BackendError;
use crate::types::IpLocationResponse;

pub const NEARBY_PRODUCTS_RPC: &str = "get_nearby_products";
pub const NEARBY_WORKSHOPS_RPC: &str = "get_nearby_workshops";

const LOCATION_EVENT_CAPACITY: usize = 16;

/// Where the gateway gets the user's position from.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionSource {
    /// A position supplied up front, e.g. from command-line flags.
    Fixed(Coordinate),
    /// An IP geolocation endpoint answering with `lat`/`lon` JSON.
    IpLookup(String),
    /// No position service; every request fails and callers fall back.
    Unavailable,
}

pub struct SupabaseGateway {
    client: SupabaseClient,
    http: reqwest::Client,
    position: PositionSource,
    events: broadcast::Sender<LocationEvent>,
}

impl SupabaseGateway {
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the lookup HTTP client cannot be built.
    pub fn new(
        client: SupabaseClient,
        position: PositionSource,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("localmart/0.1 (nearby-discovery)")
            .build()?;
        let (events, _) = broadcast::channel(LOCATION_EVENT_CAPACITY);
        Ok(Self {
            client,
            http,
            position,
            events,
        })
    }

    /// Broadcasts a new position to every live location listener.
    ///
    /// Returns the number of listeners notified.
    pub fn report_position(&self, coordinate: Coordinate) -> usize {
        self.events
            .send(LocationEvent::Found(coordinate))
            .unwrap_or(0)
    }

    /// Broadcasts a location failure to every live location listener.
    pub fn report_error(&self, error: LocationError) -> usize {
        self.events.send(LocationEvent::Error(error)).unwrap_or(0)
    }

    async fn lookup_ip_position(&self, url: &str) -> Result<Coordinate, LocationError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::Unavailable(e.to_string())
                }
            })?;

        let body: IpLocationResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(format!("unreadable lookup response: {e}")))?;

        if body.status.as_deref() == Some("fail") {
            return Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                Coordinate::new(lat, lon).map_err(|e| LocationError::Unavailable(e.to_string()))
            }
            _ => Err(LocationError::Unavailable(
                "lookup response has no coordinates".to_string(),
            )),
        }
    }
}

#[async_trait]
impl BackendGateway for SupabaseGateway {
    async fn nearby_products(
        &self,
        query: NearbyQuery,
    ) -> Result<Vec<RawNearbyRecord>, GatewayError> {
        self.client
            .rpc_records(NEARBY_PRODUCTS_RPC, &query)
            .await
            .map_err(|e| to_gateway_error(NEARBY_PRODUCTS_RPC, e))
    }

    async fn nearby_workshops(
        &self,
        query: NearbyQuery,
    ) -> Result<Vec<RawNearbyRecord>, GatewayError> {
        self.client
            .rpc_records(NEARBY_WORKSHOPS_RPC, &query)
            .await
            .map_err(|e| to_gateway_error(NEARBY_WORKSHOPS_RPC, e))
    }

    async fn current_position(&self, max_zoom: u8) -> Result<Coordinate, LocationError> {
        match &self.position {
            PositionSource::Fixed(coordinate) => Ok(*coordinate),
            PositionSource::IpLookup(url) => {
                tracing::debug!(url, max_zoom, "resolving position by IP lookup");
                self.lookup_ip_position(url).await
            }
            PositionSource::Unavailable => Err(LocationError::Unavailable(
                "no position source configured".to_string(),
            )),
        }
    }

    fn location_events(&self) -> Option<broadcast::Receiver<LocationEvent>> {
        Some(self.events.subscribe())
    }
}

fn to_gateway_error(procedure: &str, err: BackendError) -> GatewayError {
    let procedure = procedure.to_string();
    match err {
        BackendError::Api { status, message } => GatewayError::Remote {
            procedure,
            status,
            message,
        },
        BackendError::Deserialize { source, .. } => GatewayError::Malformed {
            procedure,
            message: source.to_string(),
        },
        BackendError::Http(e) => GatewayError::Transport {
            procedure,
            message: e.to_string(),
        },
        BackendError::InvalidBaseUrl { .. } => GatewayError::Transport {
            procedure,
            message: err.to_string(),
        },
    }
}
