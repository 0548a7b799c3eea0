//! Normalization from raw RPC rows to [`NearbyEntity`].
//!
//! Rows with unusable identity or price are rejected. Rows with missing or
//! unusable geodata are kept and placed at the query center.

use std::str::FromStr;

use localmart_core::{Coordinate, EntityKind, Listing, NearbyEntity, RawNearbyRecord};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

const UNTITLED: &str = "Untitled";

/// Why a raw row could not become a [`NearbyEntity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejection {
    #[error("record has no usable id")]
    MissingId,

    #[error("record {id} has no price")]
    MissingPrice { id: String },

    #[error("record {id} has invalid price {raw}")]
    InvalidPrice { id: String, raw: String },
}

/// Normalizes one raw row returned for `kind`.
///
/// # Errors
///
/// Returns a [`RecordRejection`] when the id is missing or the price is
/// missing, unparseable, or negative.
pub fn normalize_record(
    kind: EntityKind,
    raw: RawNearbyRecord,
    center: Coordinate,
) -> Result<NearbyEntity, RecordRejection> {
    let id = parse_id(&raw.id).ok_or(RecordRejection::MissingId)?;
    let price = parse_price(&raw.price, &id)?;

    let title = match raw.title.as_str().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            if !(raw.title.is_null() || raw.title.is_string()) {
                tracing::debug!(%kind, id = %id, title = %raw.title, "non-text title");
            }
            UNTITLED.to_string()
        }
    };

    let coordinate = match raw.location.as_ref().map(parse_location) {
        Some(Some(coordinate)) => coordinate,
        Some(None) => {
            tracing::debug!(%kind, id = %id, "unusable location, placing at query center");
            center
        }
        None => center,
    };

    Ok(NearbyEntity::new(
        kind,
        Listing {
            id,
            title,
            price,
            coordinate,
        },
    ))
}

/// Ids arrive as strings (uuid) or integers depending on the table.
fn parse_id(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_price(raw: &Value, id: &str) -> Result<Decimal, RecordRejection> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Null => {
            return Err(RecordRejection::MissingPrice { id: id.to_string() });
        }
        other => {
            return Err(RecordRejection::InvalidPrice {
                id: id.to_string(),
                raw: other.to_string(),
            });
        }
    };

    let invalid = || RecordRejection::InvalidPrice {
        id: id.to_string(),
        raw: text.clone(),
    };

    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid())?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid());
    }
    Ok(price)
}

/// Reads a geography value.
///
/// Accepts GeoJSON (`{"coordinates": [lng, lat]}`) and the plain
/// `{"latitude": .., "longitude": ..}` object used by the listing tables.
fn parse_location(raw: &Value) -> Option<Coordinate> {
    if let Some(coordinates) = raw.get("coordinates").and_then(Value::as_array) {
        return match coordinates.as_slice() {
            [lng, lat, ..] => Coordinate::from_geojson([lng.as_f64()?, lat.as_f64()?]).ok(),
            _ => None,
        };
    }

    let lat = raw.get("latitude").and_then(Value::as_f64)?;
    let lng = raw.get("longitude").and_then(Value::as_f64)?;
    Coordinate::new(lat, lng).ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
