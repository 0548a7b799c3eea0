//! Concurrent, all-or-nothing fetch of nearby products and workshops.

use std::collections::HashSet;

use futures::future::join;
use localmart_core::{
    BackendGateway, Coordinate, EntityKey, EntityKind, GatewayError, NearbyEntity, NearbyQuery,
    RawNearbyRecord, SearchRadius,
};
use thiserror::Error;

use crate::normalize::normalize_record;

/// Either remote read failed; no entities are returned.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("nearby products query failed: {0}")]
    Products(#[source] GatewayError),

    #[error("nearby workshops query failed: {0}")]
    Workshops(#[source] GatewayError),
}

/// Fetches every product and workshop within `radius` of `center`.
///
/// Both remote reads run concurrently and are both awaited. If either fails
/// the whole fetch fails. Rows are normalized at this boundary; rows that
/// cannot be normalized are skipped and logged, and the result holds at most
/// one entity per `(kind, id)`.
///
/// # Errors
///
/// Returns [`FetchError::Products`] if the products read failed (even if the
/// workshops read also failed), otherwise [`FetchError::Workshops`].
pub async fn fetch_nearby<G>(
    gateway: &G,
    center: Coordinate,
    radius: SearchRadius,
) -> Result<Vec<NearbyEntity>, FetchError>
where
    G: BackendGateway + ?Sized,
{
    let query = NearbyQuery::new(center, radius);
    tracing::debug!(
        lat = query.user_lat,
        lng = query.user_lng,
        radius_meters = query.radius_meters,
        "fetching nearby listings"
    );

    let (products, workshops) =
        join(gateway.nearby_products(query), gateway.nearby_workshops(query)).await;

    let (products, workshops) = match (products, workshops) {
        (Ok(products), Ok(workshops)) => (products, workshops),
        (Err(products_err), workshops) => {
            if let Err(workshops_err) = workshops {
                tracing::warn!(error = %workshops_err, "nearby workshops query also failed");
            }
            return Err(FetchError::Products(products_err));
        }
        (Ok(_), Err(workshops_err)) => return Err(FetchError::Workshops(workshops_err)),
    };

    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(products.len() + workshops.len());
    collect_kind(EntityKind::Product, products, center, &mut seen, &mut entities);
    collect_kind(EntityKind::Workshop, workshops, center, &mut seen, &mut entities);

    tracing::info!(count = entities.len(), "nearby listings fetched");
    Ok(entities)
}

fn collect_kind(
    kind: EntityKind,
    rows: Vec<RawNearbyRecord>,
    center: Coordinate,
    seen: &mut HashSet<EntityKey>,
    out: &mut Vec<NearbyEntity>,
) {
    for row in rows {
        match normalize_record(kind, row, center) {
            Ok(entity) => {
                let key = entity.key();
                if seen.insert(key.clone()) {
                    out.push(entity);
                } else {
                    tracing::warn!(%key, "duplicate listing id, keeping first");
                }
            }
            Err(rejection) => {
                tracing::warn!(%kind, %rejection, "skipping malformed listing");
            }
        }
    }
}
