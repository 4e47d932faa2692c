//! Radius search over the full address table
//!
//! There is no spatial index: every call loads all rows and filters them by
//! haversine distance, which is O(n) per query.

use std::cmp::Ordering;

use crate::error::Result;
use crate::geo::haversine_km;
use crate::store::AddressStore;
use crate::types::{Address, NearbyQuery};

/// Addresses within `query.distance_km` of the query point, nearest first.
pub async fn find_nearby(store: &AddressStore, query: &NearbyQuery) -> Result<Vec<Address>> {
    query.validate()?;
    let addresses = store.all().await?;
    Ok(within_radius(addresses, query))
}

/// Keep addresses whose distance from the center is `<= distance_km`.
///
/// Sorted by ascending distance, ties broken by ascending id.
pub fn within_radius(addresses: Vec<Address>, query: &NearbyQuery) -> Vec<Address> {
    let mut matches: Vec<(f64, Address)> = addresses
        .into_iter()
        .filter_map(|address| {
            let distance = haversine_km(
                query.latitude,
                query.longitude,
                address.latitude,
                address.longitude,
            );
            (distance <= query.distance_km).then_some((distance, address))
        })
        .collect();

    matches.sort_by(|(da, a), (db, b)| {
        da.partial_cmp(db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    matches.into_iter().map(|(_, address)| address).collect()
}
