use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::draft::{CvSummary, GeneralDetails};
use crate::interview::schedule::interview_link;
use crate::interview::session::{InterviewSession, InterviewView, NextOutcome};
use crate::session::Session;
use crate::state::AppState;
use crate::wizard::modal::CloseReason;

#[derive(Deserialize)]
pub struct StartInterviewRequest {
    pub position_id: String,
    #[serde(default)]
    pub preview: bool,
}

#[derive(Deserialize)]
pub struct ConsentRequest {
    pub checked: bool,
}

#[derive(Deserialize)]
pub struct GoToRequest {
    pub step: usize,
}

#[derive(Deserialize)]
pub struct DateRequest {
    pub date: DateTime<Utc>,
}

#[derive(Deserialize, Default)]
pub struct CloseRequest {
    #[serde(default)]
    pub reason: CloseReason,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub link: String,
    pub interview: InterviewView,
}

fn act(
    state: &AppState,
    session: &Session,
    id: Uuid,
    f: impl FnOnce(&mut InterviewSession) -> Result<(), AppError>,
) -> Result<Json<InterviewView>, AppError> {
    state.interviews.with(id, &session.user_id, |page| {
        f(page)?;
        Ok(Json(page.view(id)))
    })
}

/// Runs the application pipeline without holding the store lock across awaits.
async fn run_submission(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<Json<InterviewView>, AppError> {
    let mut ctx = state
        .interviews
        .with(id, &session.user_id, |page| page.begin_submit(&session.token))?;

    let outcome = state.application_pipeline.run(&mut ctx).await;

    let view = state.interviews.with(id, &session.user_id, |page| {
        page.finish_submit(outcome)?;
        Ok(page.view(id))
    })?;
    // The application is stored upstream; the draft has nothing left to do.
    state.interviews.remove(id, &session.user_id)?;
    Ok(Json(view))
}

/// POST /api/v1/interviews
pub async fn handle_start(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewView>), AppError> {
    let position = state
        .graphql
        .as_user(&session.token)
        .find_position(&req.position_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Position {} not found", req.position_id)))?;

    let page = InterviewSession::new(
        position,
        session.user_id.clone(),
        req.preview,
        state.analytics.clone(),
    );

    let id = state.interviews.insert(&session.user_id, page)?;
    info!(
        "interview {id} started by {} for position {}",
        session.user_id, req.position_id
    );

    let view = state
        .interviews
        .with(id, &session.user_id, |page| Ok(page.view(id)))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |_| Ok(()))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_discard(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.interviews.remove(id, &session.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/interviews/:id/cv
pub async fn handle_cv(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(summary): Json<CvSummary>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| page.record_cv(summary))
}

/// POST /api/v1/interviews/:id/consent
pub async fn handle_consent(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<ConsentRequest>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| page.set_consent(req.checked))
}

/// POST /api/v1/interviews/:id/chat-ended
pub async fn handle_chat_ended(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, InterviewSession::mark_chat_ended)
}

/// PUT /api/v1/interviews/:id/details
pub async fn handle_details(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(details): Json<GeneralDetails>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| page.update_details(details))
}

/// POST /api/v1/interviews/:id/next
pub async fn handle_next(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let outcome = state
        .interviews
        .with(id, &session.user_id, InterviewSession::next)?;

    if outcome == NextOutcome::SubmitRequired {
        return run_submission(&state, &session, id).await;
    }
    act(&state, &session, id, |_| Ok(()))
}

/// POST /api/v1/interviews/:id/prev
pub async fn handle_prev(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, InterviewSession::prev)
}

/// POST /api/v1/interviews/:id/goto
pub async fn handle_go_to(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<GoToRequest>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| page.go_to(req.step))
}

/// POST /api/v1/interviews/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    run_submission(&state, &session, id).await
}

// ── Start modal ──────────────────────────────────────────────────────────

/// POST /api/v1/interviews/:id/modal/start/begin
pub async fn handle_begin_interview(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, InterviewSession::begin_interview)
}

/// POST /api/v1/interviews/:id/modal/start/schedule-later
pub async fn handle_schedule_later(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, InterviewSession::schedule_later)
}

/// POST /api/v1/interviews/:id/modal/start/date
pub async fn handle_pick_date(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<DateRequest>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| page.pick_date(req.date))
}

/// POST /api/v1/interviews/:id/modal/start/calendar
pub async fn handle_add_to_calendar(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<CalendarResponse>, AppError> {
    let link_base = state.config.interview_link_base.clone();
    state.interviews.with(id, &session.user_id, |page| {
        let target = interview_link(&link_base, page.position_id());
        let link = page.add_to_calendar(&target)?;
        Ok(Json(CalendarResponse {
            link,
            interview: page.view(id),
        }))
    })
}

/// POST /api/v1/interviews/:id/modal/start/close
pub async fn handle_close_start(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    req: Option<Json<CloseRequest>>,
) -> Result<Json<InterviewView>, AppError> {
    let reason = req.map(|Json(r)| r.reason).unwrap_or_default();
    act(&state, &session, id, |page| page.close_start_modal(reason))
}

// ── Finish modal ─────────────────────────────────────────────────────────

/// POST /api/v1/interviews/:id/modal/finish/confirm
pub async fn handle_confirm_finish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, InterviewSession::confirm_finish)
}

/// POST /api/v1/interviews/:id/modal/finish/cancel
pub async fn handle_cancel_finish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| {
        page.close_finish_modal(CloseReason::Control)
    })
}

/// POST /api/v1/interviews/:id/modal/finish/escape
pub async fn handle_escape_finish(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    act(&state, &session, id, |page| {
        page.close_finish_modal(CloseReason::Escape)
    })
}
