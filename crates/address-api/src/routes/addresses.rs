use address_db::validation::{DEFAULT_LIMIT, DEFAULT_SKIP};
use address_db::{Address, AddressPatch, NearbyQuery, NewAddress};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    skip: Option<i64>,
    limit: Option<i64>,
}

pub async fn list_addresses(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Address>>, AppError> {
    let Query(params) = query?;
    let skip = params.skip.unwrap_or(DEFAULT_SKIP);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let addresses = state.store.list(skip, limit).await?;
    Ok(Json(addresses))
}

#[derive(Deserialize)]
pub struct NearbyParams {
    latitude: Option<f64>,
    longitude: Option<f64>,
    distance_km: Option<f64>,
}

pub async fn get_nearby(
    State(state): State<AppState>,
    query: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<Vec<Address>>, AppError> {
    let Query(params) = query?;
    let latitude = params
        .latitude
        .ok_or_else(|| AppError::Unprocessable("latitude is required".into()))?;
    let longitude = params
        .longitude
        .ok_or_else(|| AppError::Unprocessable("longitude is required".into()))?;
    let distance_km = params
        .distance_km
        .ok_or_else(|| AppError::Unprocessable("distance_km is required".into()))?;

    let query = NearbyQuery {
        latitude,
        longitude,
        distance_km,
    };
    let addresses = address_db::find_nearby(&state.store, &query).await?;

    tracing::debug!(
        latitude,
        longitude,
        distance_km,
        count = addresses.len(),
        "Nearby search"
    );
    Ok(Json(addresses))
}

pub async fn get_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Address>, AppError> {
    let Path(id) = id?;
    let address = state.store.get(id).await?;
    Ok(Json(address))
}

pub async fn create_address(
    State(state): State<AppState>,
    body: Result<Json<NewAddress>, JsonRejection>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let Json(new) = body?;
    let address = state.store.create(&new).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AddressPatch>, JsonRejection>,
) -> Result<Json<Address>, AppError> {
    let Path(id) = id?;
    let Json(patch) = body?;
    let address = state.store.update(id, &patch).await?;
    Ok(Json(address))
}

pub async fn delete_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
