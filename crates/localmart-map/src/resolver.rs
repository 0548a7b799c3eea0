//! Geolocation resolution with fallback to a fixed default position.

use std::sync::Arc;
use std::time::Duration;

use localmart_core::{BackendGateway, Coordinate, LocationError, LocationEvent};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Zoom hint passed to the platform and used to center on a live fix.
pub const LOCATED_MAX_ZOOM: u8 = 13;
/// Zoom used when showing the fallback position (whole continent visible).
pub const FALLBACK_ZOOM: u8 = 4;
/// Zoom of the viewport before any position is known.
pub const INITIAL_ZOOM: u8 = 11;

pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// The platform produced a fix.
    Resolved,
    /// The platform failed or timed out; the fallback position is in use.
    Defaulted,
}

/// Outcome of one resolution attempt. Always usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationResolution {
    pub coordinate: Coordinate,
    pub zoom: u8,
    pub source: LocationSource,
}

impl LocationResolution {
    #[must_use]
    pub fn resolved(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            zoom: LOCATED_MAX_ZOOM,
            source: LocationSource::Resolved,
        }
    }

    #[must_use]
    pub fn defaulted() -> Self {
        Self {
            coordinate: Coordinate::FALLBACK,
            zoom: FALLBACK_ZOOM,
            source: LocationSource::Defaulted,
        }
    }
}

/// Registered listener for platform location notifications.
///
/// Dropping it unregisters the listener.
struct LocationSubscription {
    receiver: broadcast::Receiver<LocationEvent>,
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        tracing::debug!("location listener released");
    }
}

/// Resolves the user's position through a [`BackendGateway`].
///
/// Resolution never fails: platform errors and timeouts degrade to
/// [`Coordinate::FALLBACK`].
pub struct GeolocationResolver<G: ?Sized> {
    gateway: Arc<G>,
    timeout: Duration,
    subscription: Option<LocationSubscription>,
}

impl<G> GeolocationResolver<G>
where
    G: BackendGateway + ?Sized,
{
    #[must_use]
    pub fn new(gateway: Arc<G>, timeout: Duration) -> Self {
        Self {
            gateway,
            timeout,
            subscription: None,
        }
    }

    /// Requests a one-shot position fix, bounded by the configured timeout.
    pub async fn resolve(&self) -> LocationResolution {
        let attempt =
            tokio::time::timeout(self.timeout, self.gateway.current_position(LOCATED_MAX_ZOOM))
                .await
                .unwrap_or(Err(LocationError::Timeout));

        match attempt {
            Ok(coordinate) => {
                tracing::info!(
                    lat = coordinate.latitude(),
                    lng = coordinate.longitude(),
                    "location resolved"
                );
                LocationResolution::resolved(coordinate)
            }
            Err(error) => {
                tracing::info!(%error, fallback = %Coordinate::FALLBACK, "using default location");
                LocationResolution::defaulted()
            }
        }
    }

    /// Registers for found/error notifications.
    ///
    /// Returns `true` if a listener was registered by this call. Calling it
    /// while already subscribed is a no-op, so repeated mounts never stack
    /// listeners.
    pub fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }
        match self.gateway.location_events() {
            Some(receiver) => {
                self.subscription = Some(LocationSubscription { receiver });
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Unregisters the location listener, if any.
    pub fn release(&mut self) {
        self.subscription = None;
    }

    /// Waits for the next reported position.
    ///
    /// Positions that queued up while the caller was busy are coalesced to
    /// the most recent one. Error notifications after the first resolution
    /// are logged and skipped. Returns `None` once there is no subscription
    /// or the platform closed the channel.
    pub async fn next_position(&mut self) -> Option<Coordinate> {
        let subscription = self.subscription.as_mut()?;
        loop {
            let event = match subscription.receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "location listener lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            };

            let mut latest = match event {
                LocationEvent::Found(coordinate) => Some(coordinate),
                LocationEvent::Error(error) => {
                    tracing::info!(%error, "location update failed, keeping current position");
                    None
                }
            };

            loop {
                match subscription.receiver.try_recv() {
                    Ok(LocationEvent::Found(coordinate)) => latest = Some(coordinate),
                    Ok(LocationEvent::Error(error)) => {
                        tracing::info!(%error, "location update failed, keeping current position");
                    }
                    Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }

            if latest.is_some() {
                return latest;
            }
        }
    }
}
