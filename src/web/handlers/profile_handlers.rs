// src/web/handlers/profile_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::profiles::{Profile, ProfileRepository, ProfileUpdate};
use crate::recommendations::RecommendationCache;
use crate::web::types::*;

pub async fn get_profile_handler(auth: AuthenticatedUser) -> Json<DataResponse<Profile>> {
    Json(DataResponse::success(
        "Profile loaded".to_string(),
        auth.profile,
        None,
    ))
}

pub async fn update_profile_handler(
    request: Json<StandardRequest<ProfileUpdate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Profile>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let update = request.into_inner().data;
    let search_changed =
        update.desired_roles.is_some() || update.location.is_some() || update.country.is_some();

    let profile = match ProfileRepository::new(db.pool())
        .update(auth.user_id(), update)
        .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Err(Json(StandardErrorResponse::new(
                "Profile not found".to_string(),
                "PROFILE_NOT_FOUND".to_string(),
                vec!["Sign in again to recreate your profile".to_string()],
                conversation_id,
            )))
        }
        Err(e) => {
            app_log!(error, "Failed to update profile of {}: {}", auth.email(), e);
            return Err(Json(StandardErrorResponse::new(
                "Failed to update profile".to_string(),
                "PROFILE_UPDATE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                conversation_id,
            )));
        }
    };

    // cached recommendations were computed for the old preferences
    if search_changed {
        if let Err(e) = RecommendationCache::new(db.pool())
            .invalidate(auth.user_id())
            .await
        {
            app_log!(warn, "Failed to invalidate recommendations: {}", e);
        }
    }

    Ok(Json(DataResponse::success(
        "Profile updated".to_string(),
        profile,
        conversation_id,
    )))
}
