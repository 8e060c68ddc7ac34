//! JSON endpoints under `/api`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::ProfileFilter;
use crate::domain::{Coordinate, Profile, ProfileDraft, ProfileUpdate};
use crate::error::{AppError, Result};
use crate::maps::{MapSession, MapStatusReport};
use crate::server::state::AppState;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct GeocodeAnswer {
    pub address: String,
    pub coordinate: Option<Coordinate>,
}

#[derive(Deserialize)]
pub struct MarkersBody {
    pub markers: Vec<Coordinate>,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(filter): Query<ProfileFilter>,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(state.directory.list(&filter).await?))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(draft): Json<ProfileDraft>,
) -> Result<(StatusCode, Json<Profile>)> {
    let saved = state.directory.create(draft).await?;
    Ok((StatusCode::CREATED, Json(saved.profile)))
}

pub async fn get_profile(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Profile>> {
    Ok(Json(state.directory.get(&id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let saved = state.directory.update(&id, update).await?;
    Ok(Json(saved.profile))
}

pub async fn delete_profile(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Profile>> {
    Ok(Json(state.directory.delete(&id).await?))
}

pub async fn interests(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.directory.interests().await?))
}

pub async fn geocode(State(state): State<AppState>, Query(query): Query<GeocodeQuery>) -> Json<GeocodeAnswer> {
    let coordinate = state.directory.geocode(&query.address).await;
    Json(GeocodeAnswer { address: query.address, coordinate })
}

/// Opens and mounts a map for the profile; 404 when it has no location.
pub async fn open_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MapStatusReport>> {
    state
        .open_map(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} has no location", id)))
}

async fn session(state: &AppState, id: Uuid) -> Result<Arc<MapSession>> {
    state
        .maps
        .get(id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

pub async fn map_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<MapStatusReport>> {
    Ok(Json(session(&state, id).await?.report().await))
}

pub async fn set_map_center(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(center): Json<Coordinate>,
) -> Result<Json<MapStatusReport>> {
    Ok(Json(session(&state, id).await?.set_center(center).await))
}

/// Replaces every marker. A failed rebuild leaves the map in its error
/// state and closes the session.
pub async fn set_map_markers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MarkersBody>,
) -> Result<Json<MapStatusReport>> {
    match session(&state, id).await?.set_markers(body.markers).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            state.maps.close(id).await;
            Err(e.into())
        }
    }
}

pub async fn close_map(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if state.maps.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id.to_string()))
    }
}
