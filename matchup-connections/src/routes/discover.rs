use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use matchup_shared::errors::{AppError, AppResult, ErrorCode};
use matchup_shared::types::auth::AuthUser;
use matchup_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::Profile;
use crate::routes::blocking;
use crate::services::discovery::FeedOrder;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    pub order: Option<String>,
}

/// GET /discover?order=newest|random&page=1&per_page=3
pub async fn discover_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let order = params
        .order
        .as_deref()
        .map(str::parse::<FeedOrder>)
        .transpose()
        .map_err(|e| AppError::new(ErrorCode::InvalidFeedOrder, e.to_string()))?
        .unwrap_or_default();

    let user_id = user.id;
    let profiles = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.discover_feed(user_id, order)
    })
    .await?;

    Ok(Json(ApiResponse::ok(Paginated::from_all(
        profiles,
        &pagination,
        state.config.page_size,
    ))))
}
