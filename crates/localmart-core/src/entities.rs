//! Nearby listings as they appear on the map, plus the loosely-typed wire
//! record the remote procedures return.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Discriminates a sellable product from a scheduled workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Workshop,
}

impl EntityKind {
    /// Human-facing label, e.g. in marker popups.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Product => "Product",
            EntityKind::Workshop => "Workshop",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Product => write!(f, "product"),
            EntityKind::Workshop => write!(f, "workshop"),
        }
    }
}

/// Stable identity of a listing on the map. Ids are only unique per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Fields common to both listing kinds, already validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    /// Never negative.
    pub price: Decimal,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NearbyEntity {
    Product(Listing),
    Workshop(Listing),
}

impl NearbyEntity {
    #[must_use]
    pub fn new(kind: EntityKind, listing: Listing) -> Self {
        match kind {
            EntityKind::Product => NearbyEntity::Product(listing),
            EntityKind::Workshop => NearbyEntity::Workshop(listing),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            NearbyEntity::Product(_) => EntityKind::Product,
            NearbyEntity::Workshop(_) => EntityKind::Workshop,
        }
    }

    #[must_use]
    pub fn listing(&self) -> &Listing {
        match self {
            NearbyEntity::Product(l) | NearbyEntity::Workshop(l) => l,
        }
    }

    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind(),
            id: self.listing().id.clone(),
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.listing().coordinate
    }
}

/// One row returned by `get_nearby_products` / `get_nearby_workshops`.
///
/// Fields are deliberately loose: ids arrive as strings or numbers, prices as
/// numbers or numeric strings, titles may be absent or mistyped, and
/// `location` is whatever the geography column serialized to. Validation happens when the record is normalized into a
/// [`NearbyEntity`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNearbyRecord {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: serde_json::Value,
    #[serde(default)]
    pub price: serde_json::Value,
    /// Expected GeoJSON-ish `{ "coordinates": [lng, lat] }`.
    #[serde(default)]
    pub location: Option<serde_json::Value>,
}
