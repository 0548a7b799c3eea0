//! Proximity discovery for the marketplace map.
//!
//! A [`MapSurface`] resolves the user's position ([`resolver`]), fetches
//! nearby products and workshops through the injected gateway
//! ([`fetcher`]), and projects them into renderable annotations ([`view`]).

pub mod fetcher;
pub mod normalize;
pub mod resolver;
pub mod surface;
pub mod view;

pub use fetcher::{fetch_nearby, FetchError};
pub use normalize::{normalize_record, RecordRejection};
pub use resolver::{GeolocationResolver, LocationResolution, LocationSource};
pub use surface::{ErrorBanner, MapSurface, MapView, SurfacePhase, SurfaceSettings};
pub use view::{
    project, MapAnnotation, MarkerStyle, MarkerViewState, OverlayStyle, Popup, TileLayer,
    ViewStatus, Viewport,
};
