//! GraphQL data layer: the single point of entry for calls to the GraphQL API.
//!
//! Every page load and every mutation goes through `GraphqlClient`. The wire
//! transport is a trait so the pipelines can be exercised without a server.
//!
//! No timeout or retry policy is applied here: a failed call surfaces to the
//! caller, which clears its busy state and lets the user re-trigger.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::member::Member;
use crate::models::position::{Position, PositionStatus};
use crate::models::project::Project;

pub mod queries;

#[derive(Debug, Error)]
pub enum GraphqlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", .0.join("; "))]
    Errors(Vec<String>),

    #[error("GraphQL response carried no data")]
    MissingData,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One named operation sent to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    /// Logical name used for logs and by test transports; not sent on the wire.
    #[serde(skip)]
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Value,
    /// Session token of the user the call is made for; sent as a bearer
    /// credential, never in the body.
    #[serde(skip)]
    pub auth: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorBody>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorBody {
    message: String,
}

/// Sends a request and returns the `data` object of a successful response.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: GraphqlRequest) -> Result<Value, GraphqlError>;
}

/// reqwest-backed transport posting `{query, variables}` to a single endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<Value, GraphqlError> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &request.auth {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GraphQL {} returned {}: {}", request.operation, status, body);
            return Err(GraphqlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let data = parse_envelope(body)?;
        debug!("GraphQL {} succeeded", request.operation);
        Ok(data)
    }
}

/// Extracts `data`, treating any entry in `errors` as a failure of the whole call.
pub fn parse_envelope(body: Value) -> Result<Value, GraphqlError> {
    let envelope: GraphqlEnvelope = serde_json::from_value(body)?;

    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        return Err(GraphqlError::Errors(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    match envelope.data {
        Some(Value::Null) | None => Err(GraphqlError::MissingData),
        Some(data) => Ok(data),
    }
}

/// Typed facade over the transport. Cheap to clone.
#[derive(Clone)]
pub struct GraphqlClient {
    transport: Arc<dyn GraphqlTransport>,
    auth: Option<String>,
}

impl GraphqlClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self {
            transport,
            auth: None,
        }
    }

    /// A client whose calls carry `token`, so the API applies that user's
    /// permissions.
    pub fn as_user(&self, token: &str) -> Self {
        Self {
            transport: self.transport.clone(),
            auth: Some(token.to_string()),
        }
    }

    pub fn over_http(client: Client, endpoint: String) -> Self {
        Self::new(Arc::new(HttpTransport::new(client, endpoint)))
    }

    async fn field<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<T, GraphqlError> {
        let mut data = self
            .transport
            .execute(GraphqlRequest {
                operation,
                query,
                variables,
                auth: self.auth.clone(),
            })
            .await?;

        let value = data
            .get_mut(operation)
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    pub async fn find_position(&self, position_id: &str) -> Result<Option<Position>, GraphqlError> {
        self.field(
            "findPosition",
            queries::FIND_POSITION,
            json!({ "fields": { "_id": position_id } }),
        )
        .await
    }

    pub async fn find_project(&self, project_id: &str) -> Result<Option<Project>, GraphqlError> {
        self.field(
            "findProject",
            queries::FIND_PROJECT,
            json!({ "fields": { "_id": project_id } }),
        )
        .await
    }

    pub async fn find_member(&self, member_id: &str) -> Result<Option<Member>, GraphqlError> {
        self.field(
            "findMember",
            queries::FIND_MEMBER,
            json!({ "fields": { "_id": member_id } }),
        )
        .await
    }

    pub async fn update_member<F: Serialize + Sync>(
        &self,
        fields: &F,
    ) -> Result<MutationAck, GraphqlError> {
        self.field(
            "updateMember",
            queries::UPDATE_MEMBER,
            json!({ "fields": fields }),
        )
        .await
    }

    pub async fn submit_candidate_position(
        &self,
        candidate_id: &str,
        position_id: &str,
    ) -> Result<MutationAck, GraphqlError> {
        self.field(
            "submitCandidatePosition",
            queries::SUBMIT_CANDIDATE_POSITION,
            json!({ "fields": { "candidateID": candidate_id, "positionID": position_id } }),
        )
        .await
    }

    /// Company details, position copy and general details in one document.
    pub async fn save_job_post(&self, variables: Value) -> Result<JobPostSaved, GraphqlError> {
        let data = self
            .transport
            .execute(GraphqlRequest {
                operation: "updatePosition",
                query: queries::SAVE_JOB_POST,
                variables,
                auth: self.auth.clone(),
            })
            .await?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Minimal acknowledgement returned by the write operations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MutationAck {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostSaved {
    pub update_position: SavedPosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedPosition {
    pub status: Option<PositionStatus>,
}
