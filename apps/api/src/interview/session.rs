//! Interview page instance.
//!
//! Steps: CV, Insights, Interview, Details, All done. Backward navigation is
//! disabled; header jumps are only enabled in preview mode. Leaving Insights
//! goes through the start modal, leaving Interview through the finish modal,
//! and leaving Details submits the application.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::errors::{AppError, SERVER_ERROR_NOTICE};
use crate::interview::draft::{CvSummary, FormDraft, GeneralDetails};
use crate::interview::schedule::{ScheduleFlow, SchedulePhase, ScheduleView};
use crate::interview::submit::SubmissionContext;
use crate::models::position::Position;
use crate::wizard::controller::{StepTracker, StepWizard, TransitionError, WizardConfig, WizardView};
use crate::wizard::modal::{CloseReason, ModalGate, ModalKind, ModalView};
use crate::wizard::notice::Notice;
use crate::wizard::pipeline::{BusyFlag, PipelineFailure, PipelineReport};

pub const STEP_LABELS: [&str; 5] = ["CV", "Insights", "Interview", "Details", "All done"];

pub const EVENT_START: &str = "Interview > Start";
pub const EVENT_STEP: &str = "Interview > Step";
pub const EVENT_CV_UPLOADED: &str = "Interview > CV Uploaded";
pub const EVENT_START_AI_INTERVIEW: &str = "Interview > Start AI Interview";
pub const EVENT_END_AI_INTERVIEW: &str = "Interview > End AI Interview";
pub const EVENT_SUBMITTED: &str = "Interview > Application submitted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStep {
    Cv = 0,
    Insights = 1,
    Interview = 2,
    Details = 3,
    AllDone = 4,
}

impl InterviewStep {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Cv),
            1 => Some(Self::Insights),
            2 => Some(Self::Interview),
            3 => Some(Self::Details),
            4 => Some(Self::AllDone),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// What a forward request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "modal")]
pub enum NextOutcome {
    Advanced,
    ModalOpened(ModalKind),
    /// The Details step advances only through a successful submission.
    SubmitRequired,
}

pub struct InterviewSession {
    position_id: String,
    position: Position,
    candidate_id: String,
    preview: bool,
    wizard: StepWizard,
    draft: FormDraft,
    start_modal: ModalGate<ScheduleFlow>,
    finish_modal: ModalGate,
    submitting: BusyFlag,
    notice: Option<Notice>,
    analytics: Arc<dyn Analytics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewModals {
    pub start: ModalView<ScheduleView>,
    pub finish: ModalView<()>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewView {
    pub id: Uuid,
    pub position: Position,
    pub preview: bool,
    pub wizard: WizardView,
    pub draft: FormDraft,
    pub missing_details: Vec<&'static str>,
    pub modals: InterviewModals,
    pub submitting: bool,
    pub notice: Option<Notice>,
}

impl InterviewSession {
    pub fn new(
        position: Position,
        candidate_id: String,
        preview: bool,
        analytics: Arc<dyn Analytics>,
    ) -> Self {
        let wizard = StepWizard::new(WizardConfig {
            labels: STEP_LABELS.to_vec(),
            can_prev: false,
            navigation_enabled: preview,
        })
        .with_tracker(StepTracker {
            analytics: analytics.clone(),
            event: EVENT_STEP,
            user_id: candidate_id.clone(),
        });

        let session = Self {
            position_id: position.id.clone().unwrap_or_default(),
            position,
            candidate_id,
            preview,
            wizard,
            draft: FormDraft::default(),
            start_modal: ModalGate::new(ModalKind::StartInterview, true),
            finish_modal: ModalGate::new(ModalKind::FinishInterview, false),
            submitting: BusyFlag::default(),
            notice: None,
            analytics,
        };
        session.track(EVENT_START);
        session
    }

    pub fn position_id(&self) -> &str {
        &self.position_id
    }

    pub fn current_step(&self) -> InterviewStep {
        InterviewStep::from_index(self.wizard.current_step()).unwrap_or(InterviewStep::Cv)
    }

    fn track(&self, name: &str) {
        self.analytics.track(
            AnalyticsEvent::new(name)
                .for_user(&self.candidate_id)
                .with("positionId", self.position_id.as_str()),
        );
    }

    fn refresh_flags(&mut self) {
        let draft = &self.draft;
        let flags = [
            (InterviewStep::Cv, draft.cv_ended),
            (InterviewStep::Insights, draft.insights_checked),
            (InterviewStep::Interview, draft.cv_ended),
            (InterviewStep::Details, draft.general_details.is_complete()),
            (InterviewStep::AllDone, false),
        ];
        for (step, complete) in flags {
            self.wizard.set_complete(step.index(), complete);
        }
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.submitting.is_busy() {
            return Err(AppError::Conflict(
                "application submission in progress".to_string(),
            ));
        }
        Ok(())
    }

    // ── Step inputs ──────────────────────────────────────────────────────

    /// The CV analysis finished. Moves on to Insights when still on CV.
    pub fn record_cv(&mut self, summary: CvSummary) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.draft.cv = Some(summary);
        self.draft.cv_ended = true;
        self.refresh_flags();
        self.track(EVENT_CV_UPLOADED);

        if self.current_step() == InterviewStep::Cv {
            self.wizard.next()?;
        }
        Ok(())
    }

    pub fn set_consent(&mut self, checked: bool) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.draft.insights_checked = checked;
        self.refresh_flags();
        Ok(())
    }

    pub fn mark_chat_ended(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.draft.interview_ended = true;
        Ok(())
    }

    pub fn update_details(&mut self, details: GeneralDetails) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.draft.general_details = details;
        self.refresh_flags();
        Ok(())
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn next(&mut self) -> Result<NextOutcome, AppError> {
        self.ensure_idle()?;
        let step = self.current_step();
        if !self.wizard.can_advance(step.index()) {
            return Err(TransitionError::Incomplete(step.index()).into());
        }

        match step {
            InterviewStep::Insights => {
                self.start_modal.open();
                Ok(NextOutcome::ModalOpened(ModalKind::StartInterview))
            }
            InterviewStep::Interview => {
                self.finish_modal.open();
                Ok(NextOutcome::ModalOpened(ModalKind::FinishInterview))
            }
            InterviewStep::Details => Ok(NextOutcome::SubmitRequired),
            InterviewStep::Cv | InterviewStep::AllDone => {
                self.wizard.next()?;
                Ok(NextOutcome::Advanced)
            }
        }
    }

    pub fn prev(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.wizard.prev()?;
        Ok(())
    }

    /// Header navigation, preview mode only.
    pub fn go_to(&mut self, step: usize) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.wizard.go_to(step)?;
        Ok(())
    }

    // ── Start modal ──────────────────────────────────────────────────────

    pub fn begin_interview(&mut self) -> Result<(), AppError> {
        self.start_modal.require_open()?;
        self.start_modal
            .flow()
            .require_phase(SchedulePhase::First, "begin interview")?;
        self.start_modal.close(CloseReason::Control)?;
        self.track(EVENT_START_AI_INTERVIEW);
        self.wizard.next()?;
        Ok(())
    }

    pub fn schedule_later(&mut self) -> Result<(), AppError> {
        self.start_modal.flow_mut()?.schedule_later()?;
        Ok(())
    }

    pub fn pick_date(&mut self, date: DateTime<Utc>) -> Result<(), AppError> {
        self.start_modal.flow_mut()?.pick_date(date)?;
        Ok(())
    }

    pub fn add_to_calendar(&mut self, interview_link: &str) -> Result<String, AppError> {
        Ok(self.start_modal.flow_mut()?.add_to_calendar(interview_link)?)
    }

    pub fn close_start_modal(&mut self, reason: CloseReason) -> Result<(), AppError> {
        self.start_modal.close(reason)?;
        Ok(())
    }

    // ── Finish modal ─────────────────────────────────────────────────────

    pub fn confirm_finish(&mut self) -> Result<(), AppError> {
        self.finish_modal.close(CloseReason::Control)?;
        self.track(EVENT_END_AI_INTERVIEW);
        self.wizard.next()?;
        Ok(())
    }

    pub fn close_finish_modal(&mut self, reason: CloseReason) -> Result<(), AppError> {
        self.finish_modal.close(reason)?;
        Ok(())
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Marks the page busy and snapshots what the pipeline needs. The
    /// mutations run as the holder of `auth_token`.
    pub fn begin_submit(&mut self, auth_token: &str) -> Result<SubmissionContext, AppError> {
        let step = self.current_step();
        if step != InterviewStep::Details {
            return Err(AppError::Conflict(format!(
                "applications are submitted from the Details step, not {}",
                self.wizard.label(step.index())
            )));
        }
        if !self.draft.general_details.is_complete() {
            return Err(TransitionError::Incomplete(step.index()).into());
        }
        if !self.submitting.begin() {
            return Err(AppError::Conflict(
                "application submission in progress".to_string(),
            ));
        }
        self.notice = None;

        Ok(SubmissionContext::new(
            self.candidate_id.clone(),
            self.position_id.clone(),
            self.draft.general_details.member_update(&self.candidate_id),
            auth_token.to_string(),
        ))
    }

    /// Clears the busy state. Only a full success advances to All done.
    pub fn finish_submit(
        &mut self,
        outcome: Result<PipelineReport, PipelineFailure>,
    ) -> Result<(), AppError> {
        self.submitting.clear();
        match outcome {
            Ok(_) => {
                info!(
                    "candidate {} applied to position {}",
                    self.candidate_id, self.position_id
                );
                self.track(EVENT_SUBMITTED);
                self.wizard.next()?;
                Ok(())
            }
            Err(failure) => {
                self.notice = Some(Notice::error(SERVER_ERROR_NOTICE));
                Err(AppError::Submission {
                    notice: SERVER_ERROR_NOTICE,
                    source: failure,
                })
            }
        }
    }

    pub fn view(&self, id: Uuid) -> InterviewView {
        InterviewView {
            id,
            position: self.position.clone(),
            preview: self.preview,
            wizard: self.wizard.view(),
            draft: self.draft.clone(),
            missing_details: self.draft.general_details.missing_fields(),
            modals: InterviewModals {
                start: self.start_modal.view_with(ScheduleFlow::view),
                finish: self.finish_modal.view(),
            },
            submitting: self.submitting.is_busy(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::analytics::testing::RecordingAnalytics;
    use crate::graphql::testing::ScriptedTransport;
    use crate::graphql::GraphqlClient;
    use crate::interview::submit::application_pipeline;

    pub(crate) fn position() -> Position {
        serde_json::from_value(json!({ "_id": "p1", "name": "Engineer" })).unwrap()
    }

    pub(crate) fn complete_details() -> GeneralDetails {
        serde_json::from_value(json!({
            "budget": { "perHour": 50 },
            "hoursPerWeek": 20,
            "location": "NYC",
            "timeZone": "EST",
            "experienceLevel": { "years": 3, "total": 5 }
        }))
        .unwrap()
    }

    fn session(preview: bool) -> (InterviewSession, Arc<RecordingAnalytics>) {
        let analytics = Arc::new(RecordingAnalytics::default());
        let session = InterviewSession::new(position(), "u1".to_string(), preview, analytics.clone());
        (session, analytics)
    }

    /// Walks a fresh session up to the Details step.
    fn at_details(session: &mut InterviewSession) {
        session.record_cv(CvSummary::default()).unwrap();
        session.set_consent(true).unwrap();
        session.next().unwrap();
        session.begin_interview().unwrap();
        session.next().unwrap();
        session.confirm_finish().unwrap();
        assert_eq!(session.current_step(), InterviewStep::Details);
    }

    #[test]
    fn test_cv_upload_moves_to_insights() {
        let (mut s, analytics) = session(false);
        assert_eq!(s.current_step(), InterviewStep::Cv);
        assert!(s.next().is_err());

        s.record_cv(CvSummary::default()).unwrap();

        assert_eq!(s.current_step(), InterviewStep::Insights);
        assert_eq!(
            analytics.names(),
            vec![EVENT_START, EVENT_CV_UPLOADED, EVENT_STEP]
        );
    }

    #[test]
    fn test_insights_needs_consent_then_opens_start_modal() {
        let (mut s, _) = session(false);
        s.record_cv(CvSummary::default()).unwrap();

        assert!(matches!(s.next(), Err(AppError::Transition(_))));
        s.set_consent(true).unwrap();
        assert_eq!(
            s.next().unwrap(),
            NextOutcome::ModalOpened(ModalKind::StartInterview)
        );
        assert_eq!(s.current_step(), InterviewStep::Insights);

        s.begin_interview().unwrap();
        assert_eq!(s.current_step(), InterviewStep::Interview);
        assert!(!s.view(Uuid::nil()).modals.start.open);
    }

    #[test]
    fn test_schedule_later_walks_first_second_third() {
        let (mut s, _) = session(false);
        s.record_cv(CvSummary::default()).unwrap();
        s.set_consent(true).unwrap();
        s.next().unwrap();

        let phase = |s: &InterviewSession| s.view(Uuid::nil()).modals.start.flow.unwrap().phase;
        assert_eq!(phase(&s), SchedulePhase::First);

        s.schedule_later().unwrap();
        assert_eq!(phase(&s), SchedulePhase::Second);
        assert!(s.begin_interview().is_err());

        s.pick_date(Utc.with_ymd_and_hms(2023, 6, 1, 14, 30, 0).unwrap())
            .unwrap();
        let link = s.add_to_calendar("https://board.test/interview/p1").unwrap();
        assert!(link.contains("20230601T143000Z"));
        assert_eq!(phase(&s), SchedulePhase::Third);

        s.close_start_modal(CloseReason::Escape).unwrap();
        assert_eq!(s.current_step(), InterviewStep::Insights);

        s.next().unwrap();
        assert_eq!(phase(&s), SchedulePhase::First);
    }

    #[test]
    fn test_finish_modal_ignores_escape() {
        let (mut s, analytics) = session(false);
        s.record_cv(CvSummary::default()).unwrap();
        s.set_consent(true).unwrap();
        s.next().unwrap();
        s.begin_interview().unwrap();

        s.next().unwrap();
        assert!(matches!(
            s.close_finish_modal(CloseReason::Escape),
            Err(AppError::Modal(_))
        ));
        assert!(s.view(Uuid::nil()).modals.finish.open);

        s.close_finish_modal(CloseReason::Control).unwrap();
        assert_eq!(s.current_step(), InterviewStep::Interview);
        assert!(!analytics.names().contains(&EVENT_END_AI_INTERVIEW.to_string()));
    }

    #[test]
    fn test_backward_navigation_disabled() {
        let (mut s, _) = session(false);
        s.record_cv(CvSummary::default()).unwrap();
        assert!(matches!(
            s.prev(),
            Err(AppError::Transition(TransitionError::BackwardDisabled))
        ));
        assert!(matches!(
            s.go_to(0),
            Err(AppError::Transition(TransitionError::NavigationDisabled))
        ));
    }

    #[test]
    fn test_preview_enables_header_navigation() {
        let (mut s, _) = session(true);
        s.record_cv(CvSummary::default()).unwrap();
        s.go_to(0).unwrap();
        assert_eq!(s.current_step(), InterviewStep::Cv);
        assert!(s.go_to(2).is_err());
    }

    #[test]
    fn test_details_step_requires_complete_answers() {
        let (mut s, _) = session(false);
        at_details(&mut s);

        assert!(matches!(s.next(), Err(AppError::Transition(_))));
        assert!(s.begin_submit("tok").is_err());

        s.update_details(complete_details()).unwrap();
        assert_eq!(s.next().unwrap(), NextOutcome::SubmitRequired);
    }

    #[test]
    fn test_busy_state_blocks_second_submit_and_edits() {
        let (mut s, _) = session(false);
        at_details(&mut s);
        s.update_details(complete_details()).unwrap();

        s.begin_submit("tok").unwrap();
        assert!(s.view(Uuid::nil()).submitting);
        assert!(matches!(s.begin_submit("tok"), Err(AppError::Conflict(_))));
        assert!(matches!(
            s.update_details(GeneralDetails::default()),
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_step_and_retry_reissues_update() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.respond("updateMember", json!({ "updateMember": { "_id": "u1" } }));
        transport.fail("submitCandidatePosition", "boom");
        transport.respond("updateMember", json!({ "updateMember": { "_id": "u1" } }));
        transport.respond(
            "submitCandidatePosition",
            json!({ "submitCandidatePosition": { "_id": "p1" } }),
        );
        let pipeline = application_pipeline(GraphqlClient::new(transport.clone()));

        let (mut s, analytics) = session(false);
        at_details(&mut s);
        s.update_details(complete_details()).unwrap();

        let mut ctx = s.begin_submit("tok").unwrap();
        let outcome = pipeline.run(&mut ctx).await;
        let err = s.finish_submit(outcome).unwrap_err();

        assert!(matches!(err, AppError::Submission { notice, .. } if notice == "Server error"));
        assert_eq!(s.current_step(), InterviewStep::Details);
        assert!(!s.view(Uuid::nil()).submitting);
        assert_eq!(s.view(Uuid::nil()).notice, Some(Notice::error("Server error")));

        let mut ctx = s.begin_submit("tok").unwrap();
        let outcome = pipeline.run(&mut ctx).await;
        s.finish_submit(outcome).unwrap();

        assert_eq!(s.current_step(), InterviewStep::AllDone);
        assert_eq!(s.view(Uuid::nil()).notice, None);
        assert_eq!(
            transport.operations(),
            vec![
                "updateMember",
                "submitCandidatePosition",
                "updateMember",
                "submitCandidatePosition"
            ]
        );
        assert!(analytics.names().contains(&EVENT_SUBMITTED.to_string()));
    }
}
