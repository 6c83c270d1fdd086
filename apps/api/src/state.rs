use std::sync::Arc;

use reqwest::Client;

use crate::analytics::{self, Analytics};
use crate::config::Config;
use crate::graphql::GraphqlClient;
use crate::interview::session::InterviewSession;
use crate::interview::submit::{application_pipeline, SubmissionContext};
use crate::positions::editor::{save_pipeline, EditorSession, SaveContext};
use crate::positions::image::{HttpImageStore, ImageStore};
use crate::positions::revalidate::{HttpRevalidator, Revalidator};
use crate::session::company_auth::{CompanyAuthApi, HttpCompanyAuth};
use crate::session::{Session, SessionResolver};
use crate::wizard::pipeline::MutationPipeline;
use crate::wizard::store::PageStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionResolver,
    pub graphql: GraphqlClient,
    /// Membership and subscription checks for company-side pages.
    pub company_auth: Arc<dyn CompanyAuthApi>,
    pub images: Arc<dyn ImageStore>,
    pub revalidator: Arc<dyn Revalidator>,
    pub analytics: Arc<dyn Analytics>,
    /// Live interview page instances, keyed by instance id.
    pub interviews: Arc<PageStore<InterviewSession>>,
    /// Live job-post editor instances, keyed by instance id.
    pub editors: Arc<PageStore<EditorSession>>,
    pub application_pipeline: Arc<MutationPipeline<SubmissionContext>>,
    pub save_pipeline: Arc<MutationPipeline<SaveContext>>,
}

/// Outbound collaborators; everything else in the state derives from these.
pub struct Collaborators {
    pub graphql: GraphqlClient,
    pub company_auth: Arc<dyn CompanyAuthApi>,
    pub images: Arc<dyn ImageStore>,
    pub revalidator: Arc<dyn Revalidator>,
    pub analytics: Arc<dyn Analytics>,
}

impl Collaborators {
    /// HTTP-backed clients sharing one connection pool.
    pub fn over_http(config: &Config, client: Client) -> Self {
        Self {
            graphql: GraphqlClient::over_http(client.clone(), config.graphql_url.clone()),
            company_auth: Arc::new(HttpCompanyAuth::new(client.clone(), config.auth_url.clone())),
            images: Arc::new(HttpImageStore::new(
                client.clone(),
                config.auth_url.clone(),
                config.image_bucket_url.clone(),
            )),
            revalidator: Arc::new(HttpRevalidator::new(client.clone(), config.site_url.clone())),
            analytics: analytics::from_token(client, config.mixpanel_token.clone()),
        }
    }
}

impl AppState {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let Collaborators {
            graphql,
            company_auth,
            images,
            revalidator,
            analytics,
        } = collaborators;

        Self {
            sessions: SessionResolver::new(config.session_cookie.clone()),
            application_pipeline: Arc::new(application_pipeline(graphql.clone())),
            save_pipeline: Arc::new(save_pipeline(graphql.clone())),
            interviews: Arc::new(PageStore::new("interview", config.page_idle_ttl)),
            editors: Arc::new(PageStore::new("editor", config.page_idle_ttl)),
            config,
            graphql,
            company_auth,
            images,
            revalidator,
            analytics,
        }
    }

    /// GraphQL client acting for `session`, or anonymously without one.
    pub fn graphql_for(&self, session: Option<&Session>) -> GraphqlClient {
        match session {
            Some(session) => self.graphql.as_user(&session.token),
            None => self.graphql.clone(),
        }
    }
}
