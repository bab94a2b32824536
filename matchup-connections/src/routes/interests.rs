use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use matchup_shared::errors::AppResult;
use matchup_shared::types::auth::AuthUser;
use matchup_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Disposition;
use crate::routes::blocking;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InterestResponse {
    pub disposition: Disposition,
    pub is_match: bool,
    pub match_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
}

/// POST /profiles/:profile_id/like
pub async fn like_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InterestResponse>>> {
    record(state, user.id, profile_id, Disposition::Like).await
}

/// POST /profiles/:profile_id/pass (also mounted as /dislike)
pub async fn pass_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InterestResponse>>> {
    record(state, user.id, profile_id, Disposition::Dislike).await
}

async fn record(
    state: Arc<AppState>,
    user_id: Uuid,
    profile_id: Uuid,
    disposition: Disposition,
) -> AppResult<Json<ApiResponse<InterestResponse>>> {
    let outcome = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.record_interest(user_id, profile_id, disposition)
    })
    .await?;

    if outcome.changed {
        publisher::publish_interest_recorded(state.rabbitmq.as_ref(), &outcome.interest).await;
    }
    if let Some(created) = &outcome.created_match {
        publisher::publish_match_created(state.rabbitmq.as_ref(), created, user_id).await;
    }

    let body = InterestResponse {
        disposition: outcome.interest.disposition,
        is_match: outcome.is_match,
        match_created: outcome.match_created(),
        match_id: outcome.created_match.as_ref().map(|m| m.id),
    };

    if body.match_created {
        Ok(Json(ApiResponse::ok_with_message(body, "It's a match!")))
    } else {
        Ok(Json(ApiResponse::ok(body)))
    }
}
