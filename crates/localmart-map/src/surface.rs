//! The map surface: lifecycle, orchestration, and the published view.
//!
//! Mounting spawns a task that walks `Mounted -> Locating -> (Resolved |
//! DefaultedLocation) -> Fetching -> (Ready | Errored)` and then keeps
//! listening for position updates, running one fetch cycle per update.
//! Every state change goes through a guard that drops updates from an
//! unmounted or superseded mount, so nothing observable changes after
//! [`MapSurface::unmount`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use localmart_core::{AppConfig, BackendGateway, Coordinate, SearchRadius};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::fetcher::fetch_nearby;
use crate::resolver::{
    GeolocationResolver, LocationResolution, LocationSource, DEFAULT_LOCATE_TIMEOUT, INITIAL_ZOOM,
};
use crate::view::{project, MarkerViewState, TileLayer, ViewStatus, Viewport};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load nearby locations. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfacePhase {
    Mounted,
    Locating,
    Resolved,
    DefaultedLocation,
    Fetching,
    Ready,
    Errored,
    /// Also the phase of a surface that has never been mounted.
    Unmounted,
}

impl SurfacePhase {
    /// `true` once a fetch cycle has finished or the surface is gone.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            SurfacePhase::Ready | SurfacePhase::Errored | SurfacePhase::Unmounted
        )
    }
}

/// Inline, dismissible error shown over a still-usable map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSettings {
    pub radius: SearchRadius,
    /// How long to wait for a position fix before using the fallback.
    pub locate_timeout: Duration,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            radius: SearchRadius::FIFTY_MILES,
            locate_timeout: DEFAULT_LOCATE_TIMEOUT,
        }
    }
}

impl SurfaceSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            radius: SearchRadius::FIFTY_MILES,
            locate_timeout: Duration::from_secs(config.locate_timeout_secs),
        }
    }
}

/// Snapshot of everything the map renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub phase: SurfacePhase,
    pub viewport: Viewport,
    pub tiles: TileLayer,
    pub markers: MarkerViewState,
    pub banner: Option<ErrorBanner>,
    pub location_source: Option<LocationSource>,
    /// When the last fetch cycle settled.
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    mount_id: u64,
}

impl MapView {
    fn fresh(mount_id: u64, phase: SurfacePhase, radius: SearchRadius) -> Self {
        Self {
            phase,
            viewport: Viewport {
                center: Coordinate::FALLBACK,
                zoom: INITIAL_ZOOM,
            },
            tiles: TileLayer::OPEN_STREET_MAP,
            markers: MarkerViewState::loading(Coordinate::FALLBACK, radius),
            banner: None,
            location_source: None,
            updated_at: None,
            mount_id,
        }
    }
}

struct Session {
    mount_id: u64,
    task: JoinHandle<()>,
}

/// A reactive map of nearby listings around the user.
///
/// Each surface owns its view exclusively; two surfaces over the same
/// gateway share nothing but the gateway.
pub struct MapSurface<G: BackendGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    settings: SurfaceSettings,
    view: Arc<watch::Sender<MapView>>,
    session: Option<Session>,
    mounts: u64,
}

impl<G: BackendGateway + ?Sized + 'static> MapSurface<G> {
    #[must_use]
    pub fn new(gateway: Arc<G>, settings: SurfaceSettings) -> Self {
        let (view, _) = watch::channel(MapView::fresh(0, SurfacePhase::Unmounted, settings.radius));
        Self {
            gateway,
            settings,
            view: Arc::new(view),
            session: None,
            mounts: 0,
        }
    }

    /// Mounts the surface and starts locating.
    ///
    /// Returns `false` without doing anything if already mounted, so a
    /// repeated mount never registers a second location listener. Must be
    /// called from within a Tokio runtime.
    pub fn mount(&mut self) -> bool {
        if self.session.is_some() {
            return false;
        }

        self.mounts += 1;
        let mount_id = self.mounts;
        let radius = self.settings.radius;
        self.view.send_modify(|view| {
            *view = MapView::fresh(mount_id, SurfacePhase::Mounted, radius);
        });

        let resolver =
            GeolocationResolver::new(Arc::clone(&self.gateway), self.settings.locate_timeout);
        let publisher = Publisher {
            view: Arc::clone(&self.view),
            mount_id,
        };
        let task = tokio::spawn(drive(
            Arc::clone(&self.gateway),
            resolver,
            publisher,
            radius,
        ));

        tracing::debug!(mount_id, "map surface mounted");
        self.session = Some(Session { mount_id, task });
        true
    }

    /// Unmounts the surface, releasing the location listener.
    ///
    /// In-flight location or fetch work is abandoned; its results are never
    /// applied. Returns once the background task is gone.
    pub async fn unmount(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        self.view.send_modify(|view| view.phase = SurfacePhase::Unmounted);
        session.task.abort();
        if let Err(err) = session.task.await {
            if !err.is_cancelled() {
                tracing::warn!(error = %err, "map surface task ended abnormally");
            }
        }
        tracing::debug!(mount_id = session.mount_id, "map surface unmounted");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Receiver that observes every published view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MapView> {
        self.view.subscribe()
    }

    /// Current view snapshot.
    #[must_use]
    pub fn view(&self) -> MapView {
        self.view.borrow().clone()
    }

    /// Waits until the current fetch cycle has settled and returns the view.
    pub async fn settled(&self) -> MapView {
        let mut receiver = self.view.subscribe();
        let view = match receiver.wait_for(|view| view.phase.is_settled()).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        };
        view
    }

    /// Hides the error banner. The status stays `Errored`.
    ///
    /// Returns `true` if a banner was showing.
    pub fn dismiss_error(&self) -> bool {
        self.view.send_if_modified(|view| {
            view.phase != SurfacePhase::Unmounted && view.banner.take().is_some()
        })
    }
}

impl<G: BackendGateway + ?Sized + 'static> Drop for MapSurface<G> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.view.send_modify(|view| view.phase = SurfacePhase::Unmounted);
            session.task.abort();
        }
    }
}

/// Applies view updates on behalf of one mount, and only while that mount
/// is current.
struct Publisher {
    view: Arc<watch::Sender<MapView>>,
    mount_id: u64,
}

impl Publisher {
    fn update(&self, apply: impl FnOnce(&mut MapView)) -> bool {
        let mount_id = self.mount_id;
        self.view.send_if_modified(|view| {
            if view.mount_id != mount_id || view.phase == SurfacePhase::Unmounted {
                tracing::trace!(mount_id, "discarding stale map update");
                return false;
            }
            apply(view);
            true
        })
    }
}

async fn drive<G>(
    gateway: Arc<G>,
    mut resolver: GeolocationResolver<G>,
    publisher: Publisher,
    radius: SearchRadius,
) where
    G: BackendGateway + ?Sized + 'static,
{
    if !publisher.update(|view| view.phase = SurfacePhase::Locating) {
        return;
    }
    resolver.subscribe();

    let resolution = resolver.resolve().await;
    run_cycle(gateway.as_ref(), &publisher, resolution, radius).await;

    while let Some(coordinate) = resolver.next_position().await {
        tracing::debug!(
            lat = coordinate.latitude(),
            lng = coordinate.longitude(),
            "location changed, refreshing nearby listings"
        );
        run_cycle(
            gateway.as_ref(),
            &publisher,
            LocationResolution::resolved(coordinate),
            radius,
        )
        .await;
    }
    resolver.release();
}

/// One locate-to-render pass for an already-resolved position.
async fn run_cycle<G>(
    gateway: &G,
    publisher: &Publisher,
    resolution: LocationResolution,
    radius: SearchRadius,
) where
    G: BackendGateway + ?Sized,
{
    let center = resolution.coordinate;
    let phase = match resolution.source {
        LocationSource::Resolved => SurfacePhase::Resolved,
        LocationSource::Defaulted => SurfacePhase::DefaultedLocation,
    };

    let applied = publisher.update(|view| {
        view.phase = phase;
        view.viewport = Viewport {
            center,
            zoom: resolution.zoom,
        };
        view.location_source = Some(resolution.source);
        view.markers.user_coordinate = center;
    });
    if !applied {
        return;
    }

    publisher.update(|view| {
        view.phase = SurfacePhase::Fetching;
        view.markers.status = ViewStatus::Loading;
    });

    let result = fetch_nearby(gateway, center, radius).await;
    let settled_at = Utc::now();

    match result {
        Ok(entities) => {
            publisher.update(|view| {
                view.phase = SurfacePhase::Ready;
                view.markers = project(center, radius, entities);
                view.banner = None;
                view.updated_at = Some(settled_at);
            });
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load nearby locations");
            publisher.update(|view| {
                view.phase = SurfacePhase::Errored;
                view.markers = MarkerViewState::errored(center, radius, FETCH_FAILED_MESSAGE);
                view.banner = Some(ErrorBanner {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                });
                view.updated_at = Some(settled_at);
            });
        }
    }
}
