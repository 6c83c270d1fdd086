//! Cache revalidation webhook on the public site.
//!
//! Fire-and-forget: the request runs on its own task and its outcome is only
//! logged. Publishing never waits for it and never fails because of it.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

pub trait Revalidator: Send + Sync {
    fn revalidate(&self, path: String);
}

/// Public jobs listing of a company.
pub fn jobs_path(company_slug: &str) -> String {
    format!("/{company_slug}/jobs")
}

/// `POST {SITE_URL}/api/revalidate/revalidate-path` with `{path}`.
pub struct HttpRevalidator {
    client: Client,
    site_url: String,
}

impl HttpRevalidator {
    pub fn new(client: Client, site_url: String) -> Self {
        Self { client, site_url }
    }
}

impl Revalidator for HttpRevalidator {
    fn revalidate(&self, path: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("revalidation of {path} skipped: no runtime");
            return;
        };

        let request = self
            .client
            .post(format!("{}/api/revalidate/revalidate-path", self.site_url))
            .json(&json!({ "path": path }));

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => debug!("revalidated {path}: {}", response.status()),
                Err(e) => warn!("revalidation of {path} failed: {e}"),
            }
        });
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_path() {
        assert_eq!(jobs_path("developer-dao"), "/developer-dao/jobs");
    }

    #[test]
    fn test_revalidate_without_runtime_does_not_panic() {
        HttpRevalidator::new(Client::new(), "http://site.test".to_string())
            .revalidate(jobs_path("eden"));
    }
}
