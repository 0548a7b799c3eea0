//! The seam between the map feature and everything remote.
//!
//! A [`BackendGateway`] is injected into each map surface; production code
//! wires it to Supabase, tests to an in-memory fake.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::entities::RawNearbyRecord;
use crate::geo::{Coordinate, SearchRadius};

/// Parameters for both nearby remote procedures, serialized verbatim as the
/// RPC argument object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyQuery {
    pub user_lat: f64,
    pub user_lng: f64,
    pub radius_meters: f64,
}

impl NearbyQuery {
    #[must_use]
    pub fn new(center: Coordinate, radius: SearchRadius) -> Self {
        Self {
            user_lat: center.latitude(),
            user_lng: center.longitude(),
            radius_meters: radius.meters(),
        }
    }
}

/// Failure of a single remote read.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request never produced a usable HTTP response.
    #[error("transport failure calling {procedure}: {message}")]
    Transport { procedure: String, message: String },

    /// The backend answered with an error status or error body.
    #[error("{procedure} failed with status {status}: {message}")]
    Remote {
        procedure: String,
        status: u16,
        message: String,
    },

    /// The response body was not a list of records.
    #[error("malformed response from {procedure}: {message}")]
    Malformed { procedure: String, message: String },
}

/// Why the platform could not provide a position fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location service unavailable: {0}")]
    Unavailable(String),

    #[error("timed out waiting for a location fix")]
    Timeout,
}

/// Continuous notifications from the platform location service.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Found(Coordinate),
    Error(LocationError),
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Calls `get_nearby_products`.
    async fn nearby_products(
        &self,
        query: NearbyQuery,
    ) -> Result<Vec<RawNearbyRecord>, GatewayError>;

    /// Calls `get_nearby_workshops`.
    async fn nearby_workshops(
        &self,
        query: NearbyQuery,
    ) -> Result<Vec<RawNearbyRecord>, GatewayError>;

    /// One-shot position request. `max_zoom` is an accuracy hint for
    /// platforms that accept one.
    async fn current_position(&self, max_zoom: u8) -> Result<Coordinate, LocationError>;

    /// Registers a listener for found/error notifications. Platforms without
    /// continuous updates return `None`.
    fn location_events(&self) -> Option<broadcast::Receiver<LocationEvent>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_query_serializes_rpc_argument_names() {
        let center = Coordinate::new(40.0, -75.0).unwrap();
        let query = NearbyQuery::new(center, SearchRadius::FIFTY_MILES);
        let json = serde_json::to_value(query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_lat": 40.0,
                "user_lng": -75.0,
                "radius_meters": 80_467.2
            })
        );
    }
}
