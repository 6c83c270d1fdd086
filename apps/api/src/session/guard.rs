//! Server-side guard chain evaluated before any page props are computed.
//!
//! Guards run in order. The first guard that does not answer `Continue`
//! decides the request: `Grant` short-circuits to allow, `Deny` short-circuits
//! to a redirect or a 404.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use super::company_auth::{CompanyAuthApi, CompanyAuthDecision};
use super::Session;
use crate::errors::AppError;

/// Where unauthenticated visitors are sent, per app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRoute {
    /// Branded board: `/?redirect=<encoded path>`.
    Landing,
    /// Candidate board: `/login?redirect=<path without its leading slash>`.
    Login,
}

impl LoginRoute {
    pub fn destination(self, return_to: &str) -> String {
        match self {
            LoginRoute::Landing => format!("/?redirect={}", encode(return_to)),
            LoginRoute::Login => {
                let path = return_to.strip_prefix('/').unwrap_or(return_to);
                format!("/login?redirect={}", encode(path))
            }
        }
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated { login: LoginRoute, return_to: String },
    Unauthorized { company_slug: String },
    SubscriptionRequired { company_slug: String },
    NotFound,
}

impl Denial {
    /// Redirect target, or `None` for a 404.
    pub fn destination(&self) -> Option<String> {
        match self {
            Denial::Unauthenticated { login, return_to } => Some(login.destination(return_to)),
            Denial::Unauthorized { company_slug } => {
                Some(format!("/request-access?company={}", encode(company_slug)))
            }
            Denial::SubscriptionRequired { company_slug } => {
                Some(format!("/dashboard/{company_slug}/subscription"))
            }
            Denial::NotFound => None,
        }
    }

    /// The same denial for JSON endpoints, which answer with a status code.
    pub fn into_error(self) -> AppError {
        match self {
            Denial::Unauthenticated { .. } => AppError::Unauthenticated,
            Denial::Unauthorized { .. } => AppError::Unauthorized,
            Denial::SubscriptionRequired { company_slug } => {
                AppError::SubscriptionRequired(company_slug)
            }
            Denial::NotFound => AppError::NotFound("Company not found".to_string()),
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        match self.destination() {
            Some(destination) => Redirect::temporary(&destination).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({ "notFound": true }))).into_response(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Continue,
    Grant,
    Deny(Denial),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(Denial),
}

/// Facts a guard may look at.
#[derive(Debug, Clone, Default)]
pub struct GuardContext {
    pub session: Option<Session>,
    pub requested_path: String,
    pub company_slug: Option<String>,
}

#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;
    async fn check(&self, ctx: &GuardContext) -> Result<GuardOutcome, AppError>;
}

#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub async fn evaluate(&self, ctx: &GuardContext) -> Result<Access, AppError> {
        for guard in &self.guards {
            match guard.check(ctx).await? {
                GuardOutcome::Continue => continue,
                GuardOutcome::Grant => return Ok(Access::Allowed),
                GuardOutcome::Deny(denial) => {
                    info!(
                        "guard {} denied {}: {:?}",
                        guard.name(),
                        ctx.requested_path,
                        denial
                    );
                    return Ok(Access::Denied(denial));
                }
            }
        }
        Ok(Access::Allowed)
    }
}

pub struct RequireSession {
    pub login: LoginRoute,
}

#[async_trait]
impl Guard for RequireSession {
    fn name(&self) -> &'static str {
        "require_session"
    }

    async fn check(&self, ctx: &GuardContext) -> Result<GuardOutcome, AppError> {
        Ok(match ctx.session {
            Some(_) => GuardOutcome::Continue,
            None => GuardOutcome::Deny(Denial::Unauthenticated {
                login: self.login,
                return_to: ctx.requested_path.clone(),
            }),
        })
    }
}

pub struct OperatorBypass;

#[async_trait]
impl Guard for OperatorBypass {
    fn name(&self) -> &'static str {
        "operator_bypass"
    }

    async fn check(&self, ctx: &GuardContext) -> Result<GuardOutcome, AppError> {
        Ok(match &ctx.session {
            Some(session) if session.is_operator() => GuardOutcome::Grant,
            _ => GuardOutcome::Continue,
        })
    }
}

pub struct CompanyMembership {
    pub api: Arc<dyn CompanyAuthApi>,
    pub login: LoginRoute,
}

#[async_trait]
impl Guard for CompanyMembership {
    fn name(&self) -> &'static str {
        "company_membership"
    }

    async fn check(&self, ctx: &GuardContext) -> Result<GuardOutcome, AppError> {
        let Some(session) = &ctx.session else {
            return Ok(GuardOutcome::Deny(Denial::Unauthenticated {
                login: self.login,
                return_to: ctx.requested_path.clone(),
            }));
        };
        let Some(slug) = ctx.company_slug.as_deref() else {
            return Ok(GuardOutcome::Deny(Denial::NotFound));
        };

        let decision = self.api.check(&session.user_id, slug).await?;
        Ok(match decision {
            CompanyAuthDecision::Allowed => GuardOutcome::Continue,
            CompanyAuthDecision::Unauthorized => GuardOutcome::Deny(Denial::Unauthorized {
                company_slug: slug.to_string(),
            }),
            CompanyAuthDecision::NotFound => GuardOutcome::Deny(Denial::NotFound),
            CompanyAuthDecision::SubscriptionRequired { company_slug } => {
                GuardOutcome::Deny(Denial::SubscriptionRequired { company_slug })
            }
        })
    }
}

/// Session, then operator bypass, then company membership.
pub fn company_editor_chain(api: Arc<dyn CompanyAuthApi>, login: LoginRoute) -> GuardChain {
    GuardChain::new()
        .then(RequireSession { login })
        .then(OperatorBypass)
        .then(CompanyMembership { api, login })
}
