// src/web/handlers/board_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::applications::NotificationBuffer;
use crate::auth::AuthenticatedUser;
use crate::board::{move_options, BoardController, Column, DeletionGate, MoveOption};
use crate::core::Database;
use crate::types::ApplicationStatus;
use crate::web::types::*;

fn unknown_column(raw: &str) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("Unknown column '{}'", raw),
        "INVALID_STATUS".to_string(),
        vec!["Columns are applied, interview, offer and rejected".to_string()],
        None,
    ))
}

pub async fn get_board_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Json<DataResponse<Vec<Column>>> {
    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());
    let columns = controller.refresh().await;

    Json(
        DataResponse::success("Board loaded".to_string(), columns, None)
            .with_notifications(buffer.take()),
    )
}

/// Adds a card to the column the user clicked and returns the new board.
pub async fn add_card_handler(
    status: &str,
    request: Json<StandardRequest<CreateApplicationRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    gate: &State<DeletionGate>,
) -> Result<Json<DataResponse<Vec<Column>>>, Json<StandardErrorResponse>> {
    let Some(column) = ApplicationStatus::parse(status) else {
        return Err(unknown_column(status));
    };
    let conversation_id = request.conversation_id();
    let new = request
        .into_inner()
        .data
        .into_new_application()
        .map_err(|raw| unknown_column(&raw))?;

    let buffer = NotificationBuffer::new();
    let controller = BoardController::new(db.pool(), &buffer, auth.session(), gate.inner());
    let columns = controller.add_card(column, new).await;

    Ok(Json(
        DataResponse::success(
            format!("Card added to {}", column.title()),
            columns,
            conversation_id,
        )
        .with_notifications(buffer.take()),
    ))
}

pub async fn move_options_handler(
    status: &str,
) -> Result<Json<DataResponse<Vec<MoveOption>>>, Json<StandardErrorResponse>> {
    let from = ApplicationStatus::parse(status).ok_or_else(|| unknown_column(status))?;
    Ok(Json(DataResponse::success(
        format!("Moves from {}", from.title()),
        move_options(from),
        None,
    )))
}
