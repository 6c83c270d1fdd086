//! Application submission: `updateMember` then `submitCandidatePosition`.

use async_trait::async_trait;

use crate::graphql::{GraphqlClient, MutationAck};
use crate::interview::draft::UpdateMemberInput;
use crate::wizard::pipeline::{MutationPipeline, Stage, StageError};

#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub candidate_id: String,
    pub position_id: String,
    pub member_fields: UpdateMemberInput,
    pub auth_token: String,
    pub member_ack: Option<MutationAck>,
    pub application_ack: Option<MutationAck>,
}

impl SubmissionContext {
    pub fn new(
        candidate_id: String,
        position_id: String,
        member_fields: UpdateMemberInput,
        auth_token: String,
    ) -> Self {
        Self {
            candidate_id,
            position_id,
            member_fields,
            auth_token,
            member_ack: None,
            application_ack: None,
        }
    }
}

struct UpdateMemberStage {
    graphql: GraphqlClient,
}

#[async_trait]
impl Stage<SubmissionContext> for UpdateMemberStage {
    fn name(&self) -> &'static str {
        "updateMember"
    }

    async fn run(&self, ctx: &mut SubmissionContext) -> Result<(), StageError> {
        let ack = self
            .graphql
            .as_user(&ctx.auth_token)
            .update_member(&ctx.member_fields)
            .await?;
        ctx.member_ack = Some(ack);
        Ok(())
    }
}

struct SubmitApplicationStage {
    graphql: GraphqlClient,
}

#[async_trait]
impl Stage<SubmissionContext> for SubmitApplicationStage {
    fn name(&self) -> &'static str {
        "submitCandidatePosition"
    }

    async fn run(&self, ctx: &mut SubmissionContext) -> Result<(), StageError> {
        if ctx.member_ack.is_none() {
            return Err(StageError("member profile was not updated".to_string()));
        }
        let ack = self
            .graphql
            .as_user(&ctx.auth_token)
            .submit_candidate_position(&ctx.candidate_id, &ctx.position_id)
            .await?;
        ctx.application_ack = Some(ack);
        Ok(())
    }
}

pub fn application_pipeline(graphql: GraphqlClient) -> MutationPipeline<SubmissionContext> {
    MutationPipeline::new("interview-application")
        .then(UpdateMemberStage {
            graphql: graphql.clone(),
        })
        .then(SubmitApplicationStage { graphql })
}
