use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use matchup_shared::errors::AppResult;
use matchup_shared::types::auth::AuthUser;
use matchup_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::Match;
use crate::routes::blocking;
use crate::services::MatchSummary;
use crate::AppState;

/// GET /matches - active matches with the partner's profile
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchSummary>>>> {
    let user_id = user.id;
    let summaries = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.list_matches(user_id)
    })
    .await?;

    Ok(Json(ApiResponse::ok(Paginated::from_all(
        summaries,
        &pagination,
        state.config.page_size,
    ))))
}

/// DELETE /matches/:match_id - unmatch; repeating it is a no-op
pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let user_id = user.id;
    let (deactivated, changed) = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.deactivate_match(user_id, match_id)
    })
    .await?;

    if changed {
        publisher::publish_match_deactivated(state.rabbitmq.as_ref(), match_id, user_id).await;
    }

    Ok(Json(ApiResponse::ok_with_message(deactivated, "match deactivated")))
}
