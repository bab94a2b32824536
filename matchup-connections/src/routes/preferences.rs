use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use matchup_shared::errors::AppResult;
use matchup_shared::types::auth::AuthUser;
use matchup_shared::types::ApiResponse;

use crate::routes::blocking;
use crate::services::preferences::{PreferenceDraft, PreferenceFilter};
use crate::AppState;

/// GET /preferences - `null` data when the user never saved any
pub async fn get_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Option<PreferenceFilter>>>> {
    let user_id = user.id;
    let preferences = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        service.preferences(user_id)
    })
    .await?;

    Ok(Json(ApiResponse::ok(preferences)))
}

/// PUT /preferences - replaces the stored preferences
pub async fn put_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<PreferenceDraft>,
) -> AppResult<Json<ApiResponse<PreferenceFilter>>> {
    let user_id = user.id;
    let saved = blocking(&state, move |service| {
        service.profile_for_user(user_id)?;
        let filter = PreferenceFilter::try_from(draft)?;
        service.save_preferences(user_id, filter)
    })
    .await?;

    Ok(Json(ApiResponse::ok_with_message(saved, "preferences saved")))
}
