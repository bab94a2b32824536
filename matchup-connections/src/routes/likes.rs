use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use matchup_shared::errors::AppResult;
use matchup_shared::types::auth::AuthUser;
use matchup_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::Profile;
use crate::routes::blocking;
use crate::AppState;

/// GET /likes - profiles the current user has liked, newest profile first
pub async fn liked_profiles(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let user_id = user.id;
    let profiles = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.liked_profiles(user_id)
    })
    .await?;

    Ok(Json(ApiResponse::ok(Paginated::from_all(
        profiles,
        &pagination,
        state.config.page_size,
    ))))
}
