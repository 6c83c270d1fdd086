use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Uri},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::models::member::{ApplicationPhase, MemberProject};
use crate::models::position::Position;
use crate::pages::{app_path, not_found, props, run_guards};
use crate::session::guard::{
    CompanyMembership, GuardChain, GuardContext, LoginRoute, OperatorBypass, RequireSession,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub edit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsQuery {
    #[serde(default)]
    pub phase: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JobProps {
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchstimate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PhaseTab {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
}

impl From<(usize, ApplicationPhase)> for PhaseTab {
    fn from((index, phase): (usize, ApplicationPhase)) -> Self {
        Self {
            index,
            kind: phase.as_str(),
            title: phase.title(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationsProps {
    pub phase: PhaseTab,
    pub phases: Vec<PhaseTab>,
    pub projects: Vec<MemberProject>,
}

/// Applied flag and match estimate of the viewer for a position.
/// The estimate is only shown for a non-negative score.
pub fn viewer_match(position: &Position, user_id: Option<&str>) -> (bool, Option<f64>) {
    let Some(entry) = user_id.and_then(|id| position.application_of(id)) else {
        return (false, None);
    };
    let matchstimate = entry
        .score_card_total
        .as_ref()
        .and_then(|total| total.score)
        .filter(|score| *score >= 0.0)
        .map(|score| score * 100.0);
    (true, matchstimate)
}

/// GET /pages/interview/:position_id
pub async fn interview_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Path(position_id): Path<String>,
) -> Result<Response, AppError> {
    let ctx = GuardContext {
        session: state.sessions.resolve(&headers),
        requested_path: app_path(&uri),
        company_slug: None,
    };
    let chain = GuardChain::new().then(RequireSession {
        login: LoginRoute::Landing,
    });
    if let Some(denied) = run_guards(&chain, &ctx).await? {
        return Ok(denied);
    }

    Ok(props(json!({ "positionId": position_id })))
}

/// GET /pages/jobs/:position_id
pub async fn jobs_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Path(position_id): Path<String>,
    Query(query): Query<JobsQuery>,
) -> Result<Response, AppError> {
    let session = state.sessions.resolve(&headers);
    let edit = query.edit.as_deref() == Some("true");

    if !edit {
        let Some(position) = state
            .graphql_for(session.as_ref())
            .find_position(&position_id)
            .await?
        else {
            return Ok(not_found());
        };
        let (submitted, matchstimate) =
            viewer_match(&position, session.as_ref().map(|s| s.user_id.as_str()));
        return Ok(props(JobProps {
            position,
            submitted: Some(submitted),
            matchstimate,
        }));
    }

    let mut ctx = GuardContext {
        session,
        requested_path: app_path(&uri),
        company_slug: None,
    };

    // No fetch happens for anonymous editors.
    let login = GuardChain::new().then(RequireSession {
        login: LoginRoute::Landing,
    });
    if let Some(denied) = run_guards(&login, &ctx).await? {
        return Ok(denied);
    }

    let Some(position) = state
        .graphql_for(ctx.session.as_ref())
        .find_position(&position_id)
        .await?
    else {
        return Ok(not_found());
    };
    ctx.company_slug = position.company_slug().map(str::to_string);

    let company = GuardChain::new().then(OperatorBypass).then(CompanyMembership {
        api: state.company_auth.clone(),
        login: LoginRoute::Landing,
    });
    if let Some(denied) = run_guards(&company, &ctx).await? {
        return Ok(denied);
    }

    Ok(props(JobProps {
        position,
        submitted: None,
        matchstimate: None,
    }))
}

/// GET /pages/projects/:id
pub async fn project_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Result<Response, AppError> {
    let session = state.sessions.resolve(&headers);
    let project = state
        .graphql_for(session.as_ref())
        .find_project(&project_id)
        .await?;
    Ok(props(json!({ "project": project })))
}

/// GET /pages/applications
pub async fn applications_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<ApplicationsQuery>,
) -> Result<Response, AppError> {
    let ctx = GuardContext {
        session: state.sessions.resolve(&headers),
        requested_path: app_path(&uri),
        company_slug: None,
    };
    let chain = GuardChain::new().then(RequireSession {
        login: LoginRoute::Login,
    });
    if let Some(denied) = run_guards(&chain, &ctx).await? {
        return Ok(denied);
    }
    let Some(session) = ctx.session else {
        return Err(AppError::Unauthenticated);
    };

    let index = query.phase.unwrap_or(0);
    let phase = ApplicationPhase::from_index(index)
        .ok_or_else(|| AppError::Validation(format!("Unknown application phase {index}")))?;

    let projects = state
        .graphql_for(Some(&session))
        .find_member(&session.user_id)
        .await?
        .map(|member| {
            member
                .projects_in_phase(phase)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Ok(props(ApplicationsProps {
        phase: (index, phase).into(),
        phases: ApplicationPhase::ALL
            .into_iter()
            .enumerate()
            .map(PhaseTab::from)
            .collect(),
        projects,
    }))
}
