// src/web/handlers/application_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::applications::{ApplicationDataClient, ApplicationUpdate, Notification, NotificationBuffer};
use crate::auth::AuthenticatedUser;
use crate::board::{BoardController, Column, DeleteOutcome, DeleteResult, DeletionGate, PendingDeletion};
use crate::core::Database;
use crate::types::{ApplicationStatus, JobApplication};
use crate::web::types::*;

fn first_error(notifications: &[Notification]) -> Option<String> {
    notifications
        .iter()
        .find(|n| n.is_error())
        .map(|n| n.message.clone())
}

fn invalid_status(raw: &str, conversation_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("Unknown status '{}'", raw),
        "INVALID_STATUS".to_string(),
        vec![format!(
            "Use one of: {}",
            ApplicationStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )],
        conversation_id,
    ))
}

pub async fn list_applications_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Json<DataResponse<Vec<JobApplication>>> {
    let buffer = NotificationBuffer::new();
    let client = ApplicationDataClient::new(db.pool(), &buffer);
    let applications = client.fetch(auth.session()).await;

    Json(
        DataResponse::success(
            format!("{} applications", applications.len()),
            applications,
            None,
        )
        .with_notifications(buffer.take()),
    )
}

pub async fn create_application_handler(
    request: Json<StandardRequest<CreateApplicationRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<JobApplication>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let new = request
        .into_inner()
        .data
        .into_new_application()
        .map_err(|raw| invalid_status(&raw, conversation_id.clone()))?;

    let buffer = NotificationBuffer::new();
    let client = ApplicationDataClient::new(db.pool(), &buffer);

    match client.create(auth.session(), new).await {
        Some(application) => Ok(Json(
            DataResponse::success(
                "Application created".to_string(),
                application,
                conversation_id,
            )
            .with_notifications(buffer.take()),
        )),
        None => {
            let notifications = buffer.take();
            Err(Json(StandardErrorResponse::new(
                first_error(&notifications)
                    .unwrap_or_else(|| "Failed to add application".to_string()),
                "CREATION_ERROR".to_string(),
                vec![
                    "Company and position are required".to_string(),
                    "Try again in a few moments".to_string(),
                ],
                conversation_id,
            )))
        }
    }
}

pub async fn update_details_handler(
    id: &str,
    request: Json<StandardRequest<ApplicationUpdate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<JobApplication>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let buffer = NotificationBuffer::new();
    let client = ApplicationDataClient::new(db.pool(), &buffer);

    match client
        .update_details(auth.session(), id, request.into_inner().data)
        .await
    {
        Some(application) => Ok(Json(
            DataResponse::success(
                "Application updated".to_string(),
                application,
                conversation_id,
            )
            .with_notifications(buffer.take()),
        )),
        None => Err(Json(StandardErrorResponse::new(
            first_error(&buffer.take()).unwrap_or_else(|| "Application not found".to_string()),
            "UPDATE_ERROR".to_string(),
            vec!["Refresh the board and try again".to_string()],
            conversation_id,
        ))),
    }
}

/// Moves a card and returns the rebuilt board.
pub async fn update_status_handler(
    id: &str,
    request: Json<StandardRequest<UpdateStatusRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<Vec<Column>>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let Some(status) = ApplicationStatus::parse(&request.data.status) else {
        return Err(invalid_status(&request.data.status, conversation_id));
    };

    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());
    let columns = controller.move_card(id, status).await;

    let notifications = buffer.take();
    if let Some(error) = first_error(&notifications) {
        return Err(Json(StandardErrorResponse::new(
            error,
            "STATUS_UPDATE_ERROR".to_string(),
            vec!["Refresh the board and try again".to_string()],
            conversation_id,
        )));
    }

    Ok(Json(
        DataResponse::success(
            format!("Application moved to {}", status.title()),
            columns,
            conversation_id,
        )
        .with_notifications(notifications),
    ))
}

pub async fn delete_request_handler(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<PendingDeletion>>, Json<StandardErrorResponse>> {
    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());

    match controller.request_delete(id).await {
        Some(pending) => Ok(Json(DataResponse::success(
            format!(
                "Delete {} at {}? Confirm or cancel before {}",
                pending.position,
                pending.company,
                pending.expires_at.format("%H:%M:%S UTC")
            ),
            pending,
            None,
        ))),
        None => Err(Json(StandardErrorResponse::new(
            first_error(&buffer.take()).unwrap_or_else(|| "Application not found".to_string()),
            "NOT_FOUND".to_string(),
            vec!["Refresh the board and try again".to_string()],
            None,
        ))),
    }
}

pub async fn confirm_delete_handler(
    request: Json<StandardRequest<DeleteTokenRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<DeleteResult>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());

    let result = controller.confirm_delete(request.data.token).await;
    let notifications = buffer.take();

    match result.outcome {
        DeleteOutcome::Deleted => Ok(Json(
            DataResponse::success("Application deleted".to_string(), result, conversation_id)
                .with_notifications(notifications),
        )),
        DeleteOutcome::NoPendingRequest => Err(Json(StandardErrorResponse::new(
            "Delete confirmation expired or unknown".to_string(),
            "NO_PENDING_DELETE".to_string(),
            vec!["Request the delete again".to_string()],
            conversation_id,
        ))),
        DeleteOutcome::Failed => Err(Json(StandardErrorResponse::new(
            first_error(&notifications)
                .unwrap_or_else(|| "Failed to delete application".to_string()),
            "DELETE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            conversation_id,
        ))),
    }
}

pub async fn cancel_delete_handler(
    request: Json<StandardRequest<DeleteTokenRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());

    if controller.cancel_delete(request.data.token) {
        Ok(Json(ActionResponse::success(
            "Delete cancelled".to_string(),
            "cancelled".to_string(),
            conversation_id,
        )))
    } else {
        app_log!(debug, "Cancel for unknown delete token by {}", auth.email());
        Err(Json(StandardErrorResponse::new(
            "Delete confirmation expired or unknown".to_string(),
            "NO_PENDING_DELETE".to_string(),
            vec!["Nothing to cancel".to_string()],
            conversation_id,
        )))
    }
}
