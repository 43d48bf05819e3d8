// src/web/handlers/emotion_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::emotions::{EmotionEntry, EmotionRepository, EmotionSubmission, Question, QUESTIONS};
use crate::web::types::*;

pub async fn questions_handler() -> Json<DataResponse<Vec<Question>>> {
    Json(DataResponse::success(
        "Answer each question from 1 to 5".to_string(),
        QUESTIONS.to_vec(),
        None,
    ))
}

pub async fn record_emotion_handler(
    request: Json<StandardRequest<EmotionSubmission>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<EmotionEntry>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();

    match EmotionRepository::new(db.pool())
        .record(auth.user_id(), request.into_inner().data)
        .await
    {
        Ok(entry) => Ok(Json(DataResponse::success(
            format!("Check-in saved, mood {:.1}", entry.mood_score),
            entry,
            conversation_id,
        ))),
        Err(e) => {
            app_log!(warn, "Rejected emotion check-in from {}: {:#}", auth.email(), e);
            Err(Json(StandardErrorResponse::new(
                e.to_string(),
                "INVALID_ANSWERS".to_string(),
                vec![
                    "Answer every question".to_string(),
                    "Use whole numbers from 1 to 5".to_string(),
                ],
                conversation_id,
            )))
        }
    }
}

pub async fn list_emotions_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<EmotionEntry>>>, Json<StandardErrorResponse>> {
    match EmotionRepository::new(db.pool())
        .list_for_user(auth.user_id())
        .await
    {
        Ok(entries) => Ok(Json(DataResponse::success(
            format!("{} check-ins", entries.len()),
            entries,
            None,
        ))),
        Err(e) => {
            app_log!(error, "Failed to load check-ins for {}: {}", auth.email(), e);
            Err(Json(StandardErrorResponse::new(
                "Failed to load check-ins".to_string(),
                "DATABASE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                None,
            )))
        }
    }
}
