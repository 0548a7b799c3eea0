//! Marker view model: what the map draws for one fetch cycle.

use localmart_core::{Coordinate, EntityKey, EntityKind, NearbyEntity, SearchRadius};
use serde::Serialize;

pub const USER_MARKER_LABEL: &str = "You are here";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Ready,
    Errored(String),
}

/// Everything needed to draw the user position, the search circle, and the
/// nearby listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerViewState {
    pub user_coordinate: Coordinate,
    pub radius: SearchRadius,
    pub entities: Vec<NearbyEntity>,
    pub status: ViewStatus,
}

impl MarkerViewState {
    #[must_use]
    pub fn loading(user_coordinate: Coordinate, radius: SearchRadius) -> Self {
        Self {
            user_coordinate,
            radius,
            entities: Vec::new(),
            status: ViewStatus::Loading,
        }
    }

    /// A failed cycle: overlays stay, entity markers are cleared.
    #[must_use]
    pub fn errored(
        user_coordinate: Coordinate,
        radius: SearchRadius,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_coordinate,
            radius,
            entities: Vec::new(),
            status: ViewStatus::Errored(message.into()),
        }
    }

    /// Flattens the state into draw-ready annotations: the user marker, the
    /// radius overlay, then one marker per entity.
    #[must_use]
    pub fn annotations(&self) -> Vec<MapAnnotation> {
        let mut annotations = Vec::with_capacity(self.entities.len() + 2);
        annotations.push(MapAnnotation::UserMarker {
            coordinate: self.user_coordinate,
            label: USER_MARKER_LABEL,
        });
        annotations.push(MapAnnotation::RadiusOverlay {
            center: self.user_coordinate,
            radius_meters: self.radius.meters(),
            style: OverlayStyle::SEARCH_AREA,
        });
        annotations.extend(self.entities.iter().map(MapAnnotation::for_entity));
        annotations
    }
}

/// Projects a fetch result into a ready view state.
#[must_use]
pub fn project(
    user: Coordinate,
    radius: SearchRadius,
    entities: Vec<NearbyEntity>,
) -> MarkerViewState {
    MarkerViewState {
        user_coordinate: user,
        radius,
        entities,
        status: ViewStatus::Ready,
    }
}

/// Per-kind marker appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    /// CSS color of the marker dot.
    pub color: &'static str,
    pub size_px: u16,
}

impl MarkerStyle {
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Product => Self {
                color: "#22c55e",
                size_px: 24,
            },
            EntityKind::Workshop => Self {
                color: "#3b82f6",
                size_px: 24,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub stroke: &'static str,
    pub fill: &'static str,
    pub fill_opacity: f32,
}

impl OverlayStyle {
    pub const SEARCH_AREA: OverlayStyle = OverlayStyle {
        stroke: "green",
        fill: "green",
        fill_opacity: 0.1,
    };
}

/// Popup body shown when an entity marker is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub kind_label: &'static str,
    /// Two decimal places with a dollar sign, e.g. `$12.50`.
    pub price_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapAnnotation {
    UserMarker {
        coordinate: Coordinate,
        label: &'static str,
    },
    RadiusOverlay {
        center: Coordinate,
        radius_meters: f64,
        style: OverlayStyle,
    },
    EntityMarker {
        key: EntityKey,
        coordinate: Coordinate,
        style: MarkerStyle,
        popup: Popup,
    },
}

impl MapAnnotation {
    fn for_entity(entity: &NearbyEntity) -> Self {
        let listing = entity.listing();
        MapAnnotation::EntityMarker {
            key: entity.key(),
            coordinate: listing.coordinate,
            style: MarkerStyle::for_kind(entity.kind()),
            popup: Popup {
                title: listing.title.clone(),
                kind_label: entity.kind().label(),
                price_label: format!("${:.2}", listing.price.round_dp(2)),
            },
        }
    }

    /// Stable render key: `user`, `radius`, or `<kind>:<id>`.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            MapAnnotation::UserMarker { .. } => "user".to_string(),
            MapAnnotation::RadiusOverlay { .. } => "radius".to_string(),
            MapAnnotation::EntityMarker { key, .. } => key.to_string(),
        }
    }
}

/// Where the map is centered and how far it is zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Raster tile source for the base map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    pub url_template: &'static str,
    pub attribution: &'static str,
}

impl TileLayer {
    pub const OPEN_STREET_MAP: TileLayer = TileLayer {
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
    };
}
