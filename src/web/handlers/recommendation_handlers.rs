// src/web/handlers/recommendation_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::recommendations::{RecommendationEngine, RecommendationQuery};
use crate::types::JobListing;
use crate::web::types::*;

pub async fn recommendations_handler(
    refresh: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    listings: &State<ListingsBackend>,
    config: &State<ServerConfig>,
) -> Json<DataResponse<Vec<JobListing>>> {
    let query = RecommendationQuery::from_profile(auth.profile());
    let engine = RecommendationEngine::new(db.pool(), listings.0.as_ref(), &config.recommendations);

    let results = if refresh.unwrap_or(false) {
        app_log!(info, "Refreshing recommendations for {}", auth.email());
        engine.refresh(auth.session(), &query).await
    } else {
        engine.get_recommendations(auth.session(), &query).await
    };

    Json(DataResponse::success(
        format!("{} recommendations", results.len()),
        results,
        None,
    ))
}
