use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{AdminUser, AuthUser};
use super::error::ApiError;
use super::server::AppState;
use crate::core::houses::House;
use crate::core::services::registration::{
    NewRegistrant, Registrant, Sex, UpdateRegistrant,
};
use crate::toolkit::analytics::{HouseStats, OverviewStats};
use crate::utils::short_uid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub age: u32,
    pub sex: Sex,
    pub religion: String,
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub house: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /register` - submit a registration for the calling account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Registrant>, ApiError> {
    let new = NewRegistrant {
        full_name: request.full_name,
        age: request.age,
        sex: request.sex,
        religion: request.religion,
        contact: request.contact,
        owner: principal.uid,
    };

    let created = state.registrations.register(new).await?;
    state.analytics.invalidate();
    Ok(Json(created))
}

/// `GET /registrants[?house=KEY]` - admin listing.
pub async fn list_registrants(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Registrant>>, ApiError> {
    let house = query
        .house
        .map(|key| {
            House::from_key(&key)
                .ok_or_else(|| ApiError::InvalidArgument(format!("unknown house key {:?}", key)))
        })
        .transpose()?;

    let registrants = state.registrations.list(house).await?;
    Ok(Json(registrants))
}

/// `PATCH /registrants/{id}` - admin edit of identity fields.
pub async fn update_registrant(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(update): Json<UpdateRegistrant>,
) -> Result<Json<Registrant>, ApiError> {
    let updated = state.registrations.update_details(&id, update).await?;
    state.analytics.invalidate();
    Ok(Json(updated))
}

/// `GET /stats/houses` - admin dashboard.
pub async fn house_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<HouseStats>, ApiError> {
    Ok(Json(state.analytics.house_stats().await?))
}

/// `GET /stats/overview` - admin dashboard.
pub async fn overview_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<OverviewStats>, ApiError> {
    Ok(Json(state.analytics.overview_stats().await?))
}

/// `POST /account/delete` - delete the calling account everywhere.
///
/// The cascade always targets the caller's own uid, so the orchestrator's
/// self-service guard can never trip from this route.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
    let uid = principal.uid.clone();
    info!("Account deletion requested via API by {}", short_uid(&uid));

    state.deletion.delete_account(Some(&principal), &uid).await?;
    state.analytics.invalidate();

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "account deleted".to_string(),
    }))
}
