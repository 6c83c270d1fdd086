//! Product analytics: fire-and-forget event tracking.
//!
//! `track` never blocks and never fails the caller. Transport problems are
//! logged and dropped.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

const MIXPANEL_TRACK_URL: &str = "https://api.mixpanel.com/track";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub distinct_id: Option<String>,
    pub properties: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distinct_id: None,
            properties: Map::new(),
        }
    }

    pub fn for_user(mut self, user_id: &str) -> Self {
        self.distinct_id = Some(user_id.to_string());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

pub trait Analytics: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

/// Used when no analytics token is configured.
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        debug!(event = %event.name, properties = ?event.properties, "analytics event");
    }
}

pub struct MixpanelAnalytics {
    client: Client,
    token: String,
}

impl MixpanelAnalytics {
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }

    fn payload(&self, event: &AnalyticsEvent) -> Value {
        let mut properties = event.properties.clone();
        properties.insert("token".to_string(), json!(self.token));
        if let Some(id) = &event.distinct_id {
            properties.insert("distinct_id".to_string(), json!(id));
        }
        json!([{ "event": event.name, "properties": properties }])
    }
}

impl Analytics for MixpanelAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("analytics event {} dropped: no runtime", event.name);
            return;
        };

        let request = self
            .client
            .post(MIXPANEL_TRACK_URL)
            .header("accept", "text/plain")
            .json(&self.payload(&event));
        let name = event.name;

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("analytics event {name} delivered")
                }
                Ok(response) => warn!("analytics event {name} rejected: {}", response.status()),
                Err(e) => warn!("analytics event {name} failed: {e}"),
            }
        });
    }
}

pub fn from_token(client: Client, token: Option<String>) -> Arc<dyn Analytics> {
    match token {
        Some(token) => Arc::new(MixpanelAnalytics::new(client, token)),
        None => Arc::new(LogAnalytics),
    }
}
