pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers as interview;
use crate::pages::handlers as pages;
use crate::positions::handlers as positions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page props
        .route("/pages/interview/:position_id", get(pages::interview_page))
        .route("/pages/jobs/:position_id", get(pages::jobs_page))
        .route("/pages/projects/:id", get(pages::project_page))
        .route("/pages/applications", get(pages::applications_page))
        // Interview flow
        .route("/api/v1/interviews", post(interview::handle_start))
        .route(
            "/api/v1/interviews/:id",
            get(interview::handle_get).delete(interview::handle_discard),
        )
        .route("/api/v1/interviews/:id/cv", post(interview::handle_cv))
        .route(
            "/api/v1/interviews/:id/consent",
            post(interview::handle_consent),
        )
        .route(
            "/api/v1/interviews/:id/chat-ended",
            post(interview::handle_chat_ended),
        )
        .route(
            "/api/v1/interviews/:id/details",
            put(interview::handle_details),
        )
        .route("/api/v1/interviews/:id/next", post(interview::handle_next))
        .route("/api/v1/interviews/:id/prev", post(interview::handle_prev))
        .route("/api/v1/interviews/:id/goto", post(interview::handle_go_to))
        .route(
            "/api/v1/interviews/:id/submit",
            post(interview::handle_submit),
        )
        .route(
            "/api/v1/interviews/:id/modal/start/begin",
            post(interview::handle_begin_interview),
        )
        .route(
            "/api/v1/interviews/:id/modal/start/schedule-later",
            post(interview::handle_schedule_later),
        )
        .route(
            "/api/v1/interviews/:id/modal/start/date",
            post(interview::handle_pick_date),
        )
        .route(
            "/api/v1/interviews/:id/modal/start/calendar",
            post(interview::handle_add_to_calendar),
        )
        .route(
            "/api/v1/interviews/:id/modal/start/close",
            post(interview::handle_close_start),
        )
        .route(
            "/api/v1/interviews/:id/modal/finish/confirm",
            post(interview::handle_confirm_finish),
        )
        .route(
            "/api/v1/interviews/:id/modal/finish/cancel",
            post(interview::handle_cancel_finish),
        )
        .route(
            "/api/v1/interviews/:id/modal/finish/escape",
            post(interview::handle_escape_finish),
        )
        // Job post editor
        .route(
            "/api/v1/positions/:position_id/editor",
            post(positions::handle_open_editor),
        )
        .route("/api/v1/editors/:id", get(positions::handle_get))
        .route(
            "/api/v1/editors/:id/edits",
            put(positions::handle_update_edits),
        )
        .route(
            "/api/v1/editors/:id/publish",
            post(positions::handle_open_publish),
        )
        .route(
            "/api/v1/editors/:id/publish/cancel",
            post(positions::handle_cancel_publish),
        )
        .route(
            "/api/v1/editors/:id/publish/confirm",
            post(positions::handle_confirm_publish),
        )
        .route(
            "/api/v1/editors/:id/draft",
            post(positions::handle_save_draft),
        )
        .route(
            "/api/v1/editors/:id/escape",
            post(positions::handle_escape),
        )
        .route(
            "/api/v1/editors/:id/leave",
            post(positions::handle_open_leave),
        )
        .route(
            "/api/v1/editors/:id/leave/cancel",
            post(positions::handle_cancel_leave),
        )
        .route(
            "/api/v1/editors/:id/leave/confirm",
            post(positions::handle_confirm_leave),
        )
        .route(
            "/api/v1/editors/:id/train-ai",
            post(positions::handle_train_ai),
        )
        .route(
            "/api/v1/editors/:id/image",
            post(positions::handle_upload_image),
        )
        .with_state(state)
}
