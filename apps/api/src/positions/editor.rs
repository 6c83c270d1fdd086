//! Job-post editor page instance.
//!
//! Edits are buffered in `PositionEdits` and written in one bulk mutation.
//! The page is driven by a single phase machine:
//!
//! ```text
//! Editing --publish--> ConfirmingPublish --confirm--> Saving(ACTIVE)
//! Editing --draft--> Saving(UNPUBLISHED)
//! Saving --ok ACTIVE--> TrainAiPrompt
//! Saving --ok other / failed--> Editing
//! Editing --leave--> ConfirmingLeave --stay / escape--> Editing
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::graphql::{GraphqlClient, JobPostSaved};
use crate::models::position::{
    format_salary, office_policy_label, FundingRound, Position, PositionGeneralDetails,
    PositionStatus,
};
use crate::positions::image::{image_id, StorageError};
use crate::positions::revalidate::jobs_path;
use crate::wizard::modal::{ModalError, ModalKind, ModalView};
use crate::wizard::notice::Notice;
use crate::wizard::pipeline::{BusyFlag, MutationPipeline, PipelineFailure, Stage, StageError};

pub const DRAFT_SAVED_NOTICE: &str = "Saved as draft";
pub const SAVE_FAILED_NOTICE: &str = "An error occurred while submitting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "status")]
pub enum EditorPhase {
    Editing,
    ConfirmingPublish,
    Saving(PositionStatus),
    TrainAiPrompt,
    ConfirmingLeave,
}

impl EditorPhase {
    /// Modal shown in this phase.
    pub fn modal(self) -> Option<ModalKind> {
        match self {
            EditorPhase::Editing => None,
            EditorPhase::ConfirmingPublish => Some(ModalKind::Publish),
            EditorPhase::Saving(_) => Some(ModalKind::Saving),
            EditorPhase::TrainAiPrompt => Some(ModalKind::TrainAi),
            EditorPhase::ConfirmingLeave => Some(ModalKind::LeaveEditor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    OpenPublish,
    CancelPublish,
    ConfirmPublish,
    SaveDraft,
    SaveSucceeded(PositionStatus),
    SaveFailed,
    OpenLeave,
    CancelLeave,
    Escape,
}

/// The editor's transition table. `None` means the event is not accepted.
pub fn transition(phase: EditorPhase, event: EditorEvent) -> Option<EditorPhase> {
    use EditorEvent::*;
    use EditorPhase::*;

    match (phase, event) {
        (Editing, OpenPublish) => Some(ConfirmingPublish),
        (ConfirmingPublish, CancelPublish) => Some(Editing),
        (ConfirmingPublish, ConfirmPublish) => Some(Saving(PositionStatus::Active)),
        (Editing, SaveDraft) => Some(Saving(PositionStatus::Unpublished)),
        (Saving(_), SaveSucceeded(PositionStatus::Active)) => Some(TrainAiPrompt),
        (Saving(_), SaveSucceeded(_)) | (Saving(_), SaveFailed) => Some(Editing),
        (Editing, OpenLeave) => Some(ConfirmingLeave),
        // Only the leave dialog can be dismissed with escape.
        (ConfirmingLeave, CancelLeave) | (ConfirmingLeave, Escape) => Some(Editing),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainAiChoice {
    /// Let Eden configure the interview.
    Auto,
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyEdits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees_number: Option<f64>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    pub funding: Vec<FundingRound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founders: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glassdoor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whats_to_love: Option<String>,
}

/// Buffered job-post form. Nothing is written until a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionEdits {
    pub name: String,
    pub who_you_are: String,
    pub what_the_job_involves: String,
    pub general_details: PositionGeneralDetails,
    pub company: CompanyEdits,
}

fn strip_bullets(text: &str) -> String {
    text.replace("- ", "")
}

/// Drops a leading `-` marker from every line.
fn strip_line_bullets(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix('-') {
                Some(rest) => rest.trim_start(),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl PositionEdits {
    /// Seeds the form from the fetched position, with list markers removed
    /// from the free-text sections.
    pub fn from_position(position: &Position) -> Self {
        let company = position.company.clone().unwrap_or_default();
        Self {
            name: position.name.clone().unwrap_or_default(),
            who_you_are: position
                .who_you_are
                .as_deref()
                .map(strip_bullets)
                .unwrap_or_default(),
            what_the_job_involves: position
                .what_the_job_involves
                .as_deref()
                .map(strip_bullets)
                .unwrap_or_default(),
            general_details: position.general_details.clone().unwrap_or_default(),
            company: CompanyEdits {
                description: company.description,
                image_url: company.image_url,
                employees_number: company.employees_number,
                tags: company.tags,
                mission: company.mission,
                funding: company.funding,
                benefits: company.benefits.as_deref().map(strip_bullets),
                values: company.values.as_deref().map(strip_line_bullets),
                founders: company.founders,
                glassdoor: company.glassdoor,
                whats_to_love: company.whats_to_love,
            },
        }
    }

    /// Variables for the bulk save: company details, position copy and
    /// general details.
    pub fn save_variables(
        &self,
        position_id: &str,
        company_slug: &str,
        status: PositionStatus,
    ) -> Value {
        let mut company = json!(self.company);
        if let Some(fields) = company.as_object_mut() {
            fields.insert("slug".to_string(), json!(company_slug));
        }

        let mut details = json!(self.general_details);
        if let Some(fields) = details.as_object_mut() {
            fields.insert("_id".to_string(), json!(position_id));
        }

        json!({
            "fieldsCompany": company,
            "fieldsPosition": {
                "_id": position_id,
                "name": self.name,
                "status": status,
                "whoYouAre": self.who_you_are,
                "whatTheJobInvolves": self.what_the_job_involves,
            },
            "fieldsPositionDetails": details,
        })
    }
}

// ── Save pipeline ────────────────────────────────────────────────────────

pub struct SaveContext {
    pub variables: Value,
    pub auth_token: String,
    pub saved: Option<JobPostSaved>,
}

struct SaveJobPostStage {
    graphql: GraphqlClient,
}

#[async_trait]
impl Stage<SaveContext> for SaveJobPostStage {
    fn name(&self) -> &'static str {
        "saveJobPost"
    }

    async fn run(&self, ctx: &mut SaveContext) -> Result<(), StageError> {
        let saved = self
            .graphql
            .as_user(&ctx.auth_token)
            .save_job_post(ctx.variables.clone())
            .await?;
        ctx.saved = Some(saved);
        Ok(())
    }
}

pub fn save_pipeline(graphql: GraphqlClient) -> MutationPipeline<SaveContext> {
    MutationPipeline::new("job-post-save").then(SaveJobPostStage { graphql })
}

// ── Page instance ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub status: PositionStatus,
    /// Listing to revalidate after a publish.
    pub revalidate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorModals {
    pub publish: ModalView<()>,
    pub saving: ModalView<()>,
    pub train_ai: ModalView<()>,
    pub leave: ModalView<()>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorDisplay {
    pub office_policy: String,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub id: Uuid,
    pub position: Position,
    pub edits: PositionEdits,
    pub phase: EditorPhase,
    pub modals: EditorModals,
    pub display: EditorDisplay,
    pub uploading: bool,
    pub notice: Option<Notice>,
}

pub struct EditorSession {
    position_id: String,
    company_slug: String,
    position: Position,
    edits: PositionEdits,
    phase: EditorPhase,
    uploading: BusyFlag,
    notice: Option<Notice>,
}

impl EditorSession {
    pub fn new(position: Position) -> Self {
        Self {
            position_id: position.id.clone().unwrap_or_default(),
            company_slug: position.company_slug().unwrap_or_default().to_string(),
            edits: PositionEdits::from_position(&position),
            position,
            phase: EditorPhase::Editing,
            uploading: BusyFlag::default(),
            notice: None,
        }
    }

    fn apply(&mut self, event: EditorEvent) -> Result<EditorPhase, AppError> {
        match transition(self.phase, event) {
            Some(next) => {
                debug!("editor {:?} --{:?}--> {:?}", self.phase, event, next);
                self.phase = next;
                Ok(next)
            }
            None if event == EditorEvent::Escape => Err(match self.phase.modal() {
                Some(kind) => ModalError::EscapeDisabled(kind),
                None => ModalError::NotOpen(ModalKind::LeaveEditor),
            }
            .into()),
            None => Err(AppError::Conflict(format!(
                "{event:?} is not allowed while {:?}",
                self.phase
            ))),
        }
    }

    pub fn update_edits(&mut self, edits: PositionEdits) -> Result<(), AppError> {
        if self.phase != EditorPhase::Editing {
            return Err(AppError::Conflict(format!(
                "edits are locked while {:?}",
                self.phase
            )));
        }
        self.edits = edits;
        self.notice = None;
        Ok(())
    }

    pub fn open_publish(&mut self) -> Result<(), AppError> {
        self.apply(EditorEvent::OpenPublish).map(drop)
    }

    pub fn cancel_publish(&mut self) -> Result<(), AppError> {
        self.apply(EditorEvent::CancelPublish).map(drop)
    }

    pub fn open_leave(&mut self) -> Result<(), AppError> {
        self.apply(EditorEvent::OpenLeave).map(drop)
    }

    pub fn cancel_leave(&mut self) -> Result<(), AppError> {
        self.apply(EditorEvent::CancelLeave).map(drop)
    }

    pub fn escape(&mut self) -> Result<(), AppError> {
        self.apply(EditorEvent::Escape).map(drop)
    }

    /// Publishing goes through the confirmation modal; drafts save directly.
    /// Refused while a logo upload is still running.
    pub fn begin_save(
        &mut self,
        status: PositionStatus,
        auth_token: &str,
    ) -> Result<SaveContext, AppError> {
        if self.uploading.is_busy() {
            return Err(AppError::Conflict(
                "wait for the logo upload to finish before saving".to_string(),
            ));
        }
        let event = match status {
            PositionStatus::Active => EditorEvent::ConfirmPublish,
            PositionStatus::Unpublished => EditorEvent::SaveDraft,
            other => {
                return Err(AppError::Validation(format!(
                    "a job post cannot be saved as {other:?}"
                )))
            }
        };
        self.apply(event)?;
        self.notice = None;

        Ok(SaveContext {
            variables: self
                .edits
                .save_variables(&self.position_id, &self.company_slug, status),
            auth_token: auth_token.to_string(),
            saved: None,
        })
    }

    /// `saved_status` is the status echoed by the server, if any.
    pub fn finish_save(
        &mut self,
        outcome: Result<Option<PositionStatus>, PipelineFailure>,
    ) -> Result<SaveOutcome, AppError> {
        let EditorPhase::Saving(requested) = self.phase else {
            return Err(AppError::Conflict("no save in progress".to_string()));
        };

        match outcome {
            Ok(saved_status) => {
                let status = saved_status.unwrap_or(requested);
                self.apply(EditorEvent::SaveSucceeded(status))?;
                info!("job post {} saved as {:?}", self.position_id, status);

                let revalidate = match status {
                    PositionStatus::Active => Some(jobs_path(&self.company_slug)),
                    PositionStatus::Unpublished => {
                        self.notice = Some(Notice::success(DRAFT_SAVED_NOTICE));
                        None
                    }
                    _ => None,
                };
                Ok(SaveOutcome { status, revalidate })
            }
            Err(failure) => {
                self.apply(EditorEvent::SaveFailed)?;
                self.notice = Some(Notice::error(SAVE_FAILED_NOTICE));
                Err(AppError::Submission {
                    notice: SAVE_FAILED_NOTICE,
                    source: failure,
                })
            }
        }
    }

    pub fn dashboard_route(&self) -> String {
        format!("/dashboard/{}/{}", self.company_slug, self.position_id)
    }

    pub fn choose_train_ai(&self, choice: TrainAiChoice) -> Result<String, AppError> {
        if self.phase != EditorPhase::TrainAiPrompt {
            return Err(ModalError::NotOpen(ModalKind::TrainAi).into());
        }
        Ok(match choice {
            TrainAiChoice::Auto => self.dashboard_route(),
            TrainAiChoice::Manual => format!("{}/train-eden-ai", self.dashboard_route()),
        })
    }

    /// Confirms leaving; unsaved edits are dropped by the caller.
    pub fn confirm_leave(&self) -> Result<String, AppError> {
        if self.phase != EditorPhase::ConfirmingLeave {
            return Err(ModalError::NotOpen(ModalKind::LeaveEditor).into());
        }
        Ok(self.dashboard_route())
    }

    // ── Logo upload ──────────────────────────────────────────────────────

    /// Returns the id to store the image under.
    pub fn begin_upload(&mut self) -> Result<String, AppError> {
        if self.phase != EditorPhase::Editing {
            return Err(AppError::Conflict(format!(
                "uploads are locked while {:?}",
                self.phase
            )));
        }
        let company_id = self
            .position
            .company
            .as_ref()
            .and_then(|c| c.id.clone())
            .ok_or_else(|| AppError::Validation("position has no company".to_string()))?;
        if !self.uploading.begin() {
            return Err(AppError::Conflict("an upload is already running".to_string()));
        }
        Ok(image_id(&company_id))
    }

    pub fn finish_upload(&mut self, outcome: Result<String, StorageError>) -> Result<(), AppError> {
        self.uploading.clear();
        let url = outcome?;
        self.edits.company.image_url = Some(url);
        Ok(())
    }

    pub fn view(&self, id: Uuid) -> EditorView {
        let modal = |kind: ModalKind, close_on_esc: bool| ModalView {
            open: self.phase.modal() == Some(kind),
            close_on_esc,
            flow: None,
        };
        let salary = self.edits.general_details.yearly_salary.as_ref();

        EditorView {
            id,
            position: self.position.clone(),
            edits: self.edits.clone(),
            phase: self.phase,
            modals: EditorModals {
                publish: modal(ModalKind::Publish, false),
                saving: modal(ModalKind::Saving, false),
                train_ai: modal(ModalKind::TrainAi, false),
                leave: modal(ModalKind::LeaveEditor, true),
            },
            display: EditorDisplay {
                office_policy: office_policy_label(
                    self.edits
                        .general_details
                        .office_policy
                        .as_deref()
                        .unwrap_or_default(),
                )
                .to_string(),
                salary_min: salary.and_then(|s| s.min).map(format_salary),
                salary_max: salary.and_then(|s| s.max).map(format_salary),
            },
            uploading: self.uploading.is_busy(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graphql::testing::ScriptedTransport;

    pub(crate) fn position() -> Position {
        serde_json::from_value(json!({
            "_id": "p1",
            "name": "Rust Engineer",
            "status": "UNPUBLISHED",
            "whoYouAre": "- curious\n- kind",
            "whatTheJobInvolves": "- ship code",
            "generalDetails": {
                "yearlySalary": { "min": 85000, "max": 120000 },
                "officePolicy": "remote"
            },
            "company": {
                "_id": "c1",
                "slug": "eden",
                "benefits": "- equity",
                "values": "  - trust\n- speed\nplain"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_edits_are_seeded_without_list_markers() {
        let edits = PositionEdits::from_position(&position());
        assert_eq!(edits.who_you_are, "curious\nkind");
        assert_eq!(edits.what_the_job_involves, "ship code");
        assert_eq!(edits.company.benefits.as_deref(), Some("equity"));
        assert_eq!(edits.company.values.as_deref(), Some("trust\nspeed\nplain"));
    }

    #[test]
    fn test_save_variables_carry_all_three_sections() {
        let edits = PositionEdits::from_position(&position());
        let vars = edits.save_variables("p1", "eden", PositionStatus::Active);

        assert_eq!(vars["fieldsCompany"]["slug"], "eden");
        assert_eq!(vars["fieldsCompany"]["benefits"], "equity");
        assert!(vars["fieldsCompany"].get("description").is_none());
        assert_eq!(vars["fieldsPosition"]["_id"], "p1");
        assert_eq!(vars["fieldsPosition"]["status"], "ACTIVE");
        assert_eq!(vars["fieldsPositionDetails"]["_id"], "p1");
        assert_eq!(vars["fieldsPositionDetails"]["officePolicy"], "remote");
    }

    #[test]
    fn test_transition_table() {
        use EditorEvent::*;
        use EditorPhase::*;

        assert_eq!(transition(Editing, OpenPublish), Some(ConfirmingPublish));
        assert_eq!(transition(Editing, ConfirmPublish), None);
        assert_eq!(transition(ConfirmingPublish, Escape), None);
        assert_eq!(transition(ConfirmingLeave, Escape), Some(Editing));
        assert_eq!(transition(TrainAiPrompt, Escape), None);
        assert_eq!(
            transition(Saving(PositionStatus::Active), SaveSucceeded(PositionStatus::Active)),
            Some(TrainAiPrompt)
        );
        assert_eq!(
            transition(Saving(PositionStatus::Unpublished), SaveSucceeded(PositionStatus::Unpublished)),
            Some(Editing)
        );
        assert_eq!(transition(Saving(PositionStatus::Active), OpenLeave), None);
    }

    #[test]
    fn test_publish_requires_confirmation_modal() {
        let mut editor = EditorSession::new(position());
        assert!(matches!(
            editor.begin_save(PositionStatus::Active, "tok"),
            Err(AppError::Conflict(_))
        ));

        editor.open_publish().unwrap();
        assert!(matches!(editor.escape(), Err(AppError::Modal(_))));
        assert!(editor.view(Uuid::nil()).modals.publish.open);

        editor.cancel_publish().unwrap();
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::Editing);
    }

    #[test]
    fn test_publish_success_prompts_train_ai_and_revalidates() {
        let mut editor = EditorSession::new(position());
        editor.open_publish().unwrap();
        let ctx = editor.begin_save(PositionStatus::Active, "tok").unwrap();
        assert_eq!(ctx.variables["fieldsPosition"]["status"], "ACTIVE");
        assert!(matches!(editor.update_edits(PositionEdits::default()), Err(AppError::Conflict(_))));

        let outcome = editor.finish_save(Ok(Some(PositionStatus::Active))).unwrap();

        assert_eq!(outcome.revalidate.as_deref(), Some("/eden/jobs"));
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::TrainAiPrompt);
        assert_eq!(
            editor.choose_train_ai(TrainAiChoice::Manual).unwrap(),
            "/dashboard/eden/p1/train-eden-ai"
        );
        assert_eq!(editor.choose_train_ai(TrainAiChoice::Auto).unwrap(), "/dashboard/eden/p1");
    }

    #[test]
    fn test_draft_save_shows_notice() {
        let mut editor = EditorSession::new(position());
        editor.begin_save(PositionStatus::Unpublished, "tok").unwrap();
        let outcome = editor.finish_save(Ok(None)).unwrap();

        assert_eq!(outcome.status, PositionStatus::Unpublished);
        assert!(outcome.revalidate.is_none());
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::Editing);
        assert_eq!(
            editor.view(Uuid::nil()).notice,
            Some(Notice::success(DRAFT_SAVED_NOTICE))
        );
    }

    #[tokio::test]
    async fn test_failed_save_returns_to_editing_with_error() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.fail("updatePosition", "boom");
        let pipeline = save_pipeline(GraphqlClient::new(transport.clone()));

        let mut editor = EditorSession::new(position());
        let mut ctx = editor.begin_save(PositionStatus::Unpublished, "tok").unwrap();
        let outcome = pipeline.run(&mut ctx).await.map(|_| None);
        let err = editor.finish_save(outcome).unwrap_err();

        assert!(matches!(err, AppError::Submission { notice: SAVE_FAILED_NOTICE, .. }));
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::Editing);
        assert_eq!(transport.operations(), vec!["updatePosition"]);
    }

    #[test]
    fn test_leave_flow() {
        let mut editor = EditorSession::new(position());
        assert!(editor.confirm_leave().is_err());
        editor.open_leave().unwrap();
        editor.escape().unwrap();
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::Editing);

        editor.open_leave().unwrap();
        assert_eq!(editor.confirm_leave().unwrap(), "/dashboard/eden/p1");
    }

    #[test]
    fn test_upload_sets_image_url_once_finished() {
        let mut editor = EditorSession::new(position());
        let id = editor.begin_upload().unwrap();
        assert!(id.starts_with("c1_"));
        assert!(matches!(editor.begin_upload(), Err(AppError::Conflict(_))));

        editor
            .finish_upload(Ok(format!("https://bucket.test/{id}.png")))
            .unwrap();
        assert_eq!(
            editor.view(Uuid::nil()).edits.company.image_url,
            Some(format!("https://bucket.test/{id}.png"))
        );
        assert!(!editor.view(Uuid::nil()).uploading);
    }

    #[test]
    fn test_save_waits_for_running_upload() {
        let mut editor = EditorSession::new(position());
        editor.begin_upload().unwrap();

        assert!(matches!(
            editor.begin_save(PositionStatus::Unpublished, "tok"),
            Err(AppError::Conflict(_))
        ));
        editor.open_publish().unwrap();
        assert!(matches!(
            editor.begin_save(PositionStatus::Active, "tok"),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(editor.view(Uuid::nil()).phase, EditorPhase::ConfirmingPublish);

        editor.finish_upload(Ok("https://bucket.test/c1.png".to_string())).unwrap();
        let ctx = editor.begin_save(PositionStatus::Active, "tok").unwrap();
        assert_eq!(
            ctx.variables["fieldsCompany"]["imageUrl"],
            "https://bucket.test/c1.png"
        );
    }

    #[tokio::test]
    async fn test_save_runs_as_session_user() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.respond(
            "updatePosition",
            json!({ "updatePosition": { "_id": "p1", "status": "UNPUBLISHED" } }),
        );
        let pipeline = save_pipeline(GraphqlClient::new(transport.clone()));

        let mut editor = EditorSession::new(position());
        let mut ctx = editor.begin_save(PositionStatus::Unpublished, "tok-u1").unwrap();
        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(transport.calls()[0].auth.as_deref(), Some("tok-u1"));
    }

    #[test]
    fn test_view_formats_display_fields() {
        let view = EditorSession::new(position()).view(Uuid::nil());
        assert_eq!(view.display.office_policy, "Remote");
        assert_eq!(view.display.salary_min.as_deref(), Some("85k"));
        assert_eq!(view.display.salary_max.as_deref(), Some("120k"));
    }
}
