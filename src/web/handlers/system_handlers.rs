// src/web/handlers/system_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::applications::{ApplicationDataClient, NotificationBuffer};
use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::core::Database;
use crate::stats::{compute_stats, ApplicationStats};
use crate::web::types::*;

pub async fn get_current_user_handler(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    let session = auth.session();
    Json(DataResponse::success(
        format!("Signed in as {}", session.email),
        UserInfo {
            uid: session.user_id.clone(),
            email: session.email.clone(),
            name: auth.profile().full_name.clone(),
            session_expires_at: session.expires_at,
        },
        None,
    ))
}

pub async fn stats_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Json<DataResponse<ApplicationStats>> {
    let buffer = NotificationBuffer::new();
    let applications = ApplicationDataClient::new(db.pool(), &buffer)
        .fetch(auth.session())
        .await;
    let stats = compute_stats(&applications, Utc::now());

    Json(
        DataResponse::success(format!("{} applications", stats.total), stats, None)
            .with_notifications(buffer.take()),
    )
}

pub async fn health_handler(
    auth: OptionalAuth,
    db: &State<Database>,
) -> Result<Json<TextResponse>, Json<StandardErrorResponse>> {
    match &auth.user {
        Some(user) => app_log!(info, "Health check by authenticated user: {}", user.email()),
        None => app_log!(info, "Health check by anonymous user"),
    }

    if let Err(e) = db.health_check().await {
        app_log!(error, "Health check failed: {:#}", e);
        return Err(Json(StandardErrorResponse::new(
            "Database unavailable".to_string(),
            "UNHEALTHY".to_string(),
            vec!["Check the database path and permissions".to_string()],
            None,
        )));
    }

    Ok(Json(TextResponse::success("OK".to_string(), None)))
}
