use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::position::PositionStatus;
use crate::positions::editor::{EditorSession, EditorView, PositionEdits, TrainAiChoice};
use crate::positions::image::check_size;
use crate::session::guard::{company_editor_chain, Access, GuardContext, LoginRoute};
use crate::session::Session;
use crate::state::AppState;

const IMAGE_FIELD: &str = "imgfile";

#[derive(Deserialize)]
pub struct TrainAiRequest {
    pub choice: TrainAiChoice,
}

/// Where the client navigates next. The editor instance is gone by then.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect: String,
}

fn act(
    state: &AppState,
    session: &Session,
    id: Uuid,
    f: impl FnOnce(&mut EditorSession) -> Result<(), AppError>,
) -> Result<Json<EditorView>, AppError> {
    state.editors.with(id, &session.user_id, |editor| {
        f(editor)?;
        Ok(Json(editor.view(id)))
    })
}

async fn save(
    state: &AppState,
    session: &Session,
    id: Uuid,
    status: PositionStatus,
) -> Result<Json<EditorView>, AppError> {
    let mut ctx = state
        .editors
        .with(id, &session.user_id, |editor| {
            editor.begin_save(status, &session.token)
        })?;

    let outcome = state.save_pipeline.run(&mut ctx).await;
    let saved_status = ctx
        .saved
        .as_ref()
        .and_then(|saved| saved.update_position.status);

    let (result, view) = state.editors.with(id, &session.user_id, |editor| {
        let result = editor.finish_save(outcome.map(|_| saved_status));
        Ok((result, editor.view(id)))
    })?;

    if let Some(path) = result?.revalidate {
        state.revalidator.revalidate(path);
    }
    Ok(Json(view))
}

/// POST /api/v1/positions/:position_id/editor
pub async fn handle_open_editor(
    State(state): State<AppState>,
    session: Session,
    Path(position_id): Path<String>,
) -> Result<(StatusCode, Json<EditorView>), AppError> {
    let position = state
        .graphql
        .as_user(&session.token)
        .find_position(&position_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Position {position_id} not found")))?;

    let ctx = GuardContext {
        session: Some(session.clone()),
        requested_path: format!("/jobs/{position_id}?edit=true"),
        company_slug: position.company_slug().map(str::to_string),
    };
    let chain = company_editor_chain(state.company_auth.clone(), LoginRoute::Landing);
    if let Access::Denied(denial) = chain.evaluate(&ctx).await? {
        return Err(denial.into_error());
    }

    let id = state
        .editors
        .insert(&session.user_id, EditorSession::new(position))?;
    info!("editor {id} opened by {} for {position_id}", session.user_id);

    let view = state
        .editors
        .with(id, &session.user_id, |editor| Ok(editor.view(id)))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/editors/:id
pub async fn handle_get(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, |_| Ok(()))
}

/// PUT /api/v1/editors/:id/edits
pub async fn handle_update_edits(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(edits): Json<PositionEdits>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, |editor| editor.update_edits(edits))
}

/// POST /api/v1/editors/:id/publish
pub async fn handle_open_publish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, EditorSession::open_publish)
}

/// POST /api/v1/editors/:id/publish/cancel
pub async fn handle_cancel_publish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, EditorSession::cancel_publish)
}

/// POST /api/v1/editors/:id/publish/confirm
pub async fn handle_confirm_publish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    save(&state, &session, id, PositionStatus::Active).await
}

/// POST /api/v1/editors/:id/draft
pub async fn handle_save_draft(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    save(&state, &session, id, PositionStatus::Unpublished).await
}

/// POST /api/v1/editors/:id/escape
pub async fn handle_escape(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, EditorSession::escape)
}

/// POST /api/v1/editors/:id/leave
pub async fn handle_open_leave(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, EditorSession::open_leave)
}

/// POST /api/v1/editors/:id/leave/cancel
pub async fn handle_cancel_leave(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    act(&state, &session, id, EditorSession::cancel_leave)
}

/// POST /api/v1/editors/:id/leave/confirm
pub async fn handle_confirm_leave(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<RedirectResponse>, AppError> {
    let redirect = state
        .editors
        .with(id, &session.user_id, |editor| editor.confirm_leave())?;
    state.editors.remove(id, &session.user_id)?;
    Ok(Json(RedirectResponse { redirect }))
}

/// POST /api/v1/editors/:id/train-ai
pub async fn handle_train_ai(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<TrainAiRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    let redirect = state
        .editors
        .with(id, &session.user_id, |editor| editor.choose_train_ai(req.choice))?;
    state.editors.remove(id, &session.user_id)?;
    Ok(Json(RedirectResponse { redirect }))
}

/// POST /api/v1/editors/:id/image
pub async fn handle_upload_image(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<EditorView>, AppError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Unreadable image: {e}")))?;
            image = Some(bytes);
            break;
        }
    }
    let bytes =
        image.ok_or_else(|| AppError::Validation(format!("Missing '{IMAGE_FIELD}' field")))?;
    check_size(bytes.len())?;

    let image_id = state
        .editors
        .with(id, &session.user_id, EditorSession::begin_upload)?;
    let outcome = state.images.store(&image_id, bytes).await;

    act(&state, &session, id, |editor| editor.finish_upload(outcome))
}
