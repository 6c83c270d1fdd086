//! Company membership / subscription check against the auth service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::models::position::Company;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyAuthDecision {
    Allowed,
    Unauthorized,
    NotFound,
    SubscriptionRequired { company_slug: String },
}

#[derive(Debug, Error)]
pub enum CompanyAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("response did not describe a company")]
    MalformedBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompanyAuthBody {
    pub company: Option<Company>,
}

#[async_trait]
pub trait CompanyAuthApi: Send + Sync {
    async fn check(
        &self,
        user_id: &str,
        company_slug: &str,
    ) -> Result<CompanyAuthDecision, CompanyAuthError>;
}

/// `POST {AUTH_URL}/auth/company-auth`
pub struct HttpCompanyAuth {
    client: Client,
    auth_url: String,
}

impl HttpCompanyAuth {
    pub fn new(client: Client, auth_url: String) -> Self {
        Self { client, auth_url }
    }
}

#[async_trait]
impl CompanyAuthApi for HttpCompanyAuth {
    async fn check(
        &self,
        user_id: &str,
        company_slug: &str,
    ) -> Result<CompanyAuthDecision, CompanyAuthError> {
        let response = self
            .client
            .post(format!("{}/auth/company-auth", self.auth_url))
            .json(&json!({ "userID": user_id, "companySlug": company_slug }))
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!("company-auth for {user_id} on {company_slug} returned {status}");

        let body = if status == 200 {
            Some(response.json::<CompanyAuthBody>().await?)
        } else {
            None
        };
        classify(status, body)
    }
}

/// Maps the auth service answer onto a decision.
///
/// Communities never pay; every other company needs a stripe product.
pub fn classify(
    status: u16,
    body: Option<CompanyAuthBody>,
) -> Result<CompanyAuthDecision, CompanyAuthError> {
    match status {
        401 => Ok(CompanyAuthDecision::Unauthorized),
        404 => Ok(CompanyAuthDecision::NotFound),
        200 => {
            let company = body
                .and_then(|b| b.company)
                .ok_or(CompanyAuthError::MalformedBody)?;
            if company.is_community() || company.has_subscription() {
                Ok(CompanyAuthDecision::Allowed)
            } else {
                Ok(CompanyAuthDecision::SubscriptionRequired {
                    company_slug: company.slug.unwrap_or_default(),
                })
            }
        }
        other => Err(CompanyAuthError::UnexpectedStatus(other)),
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Returns a fixed decision and records who was checked.
    pub struct FixedCompanyAuth {
        decision: Result<CompanyAuthDecision, u16>,
        pub checked: Mutex<Vec<(String, String)>>,
    }

    impl FixedCompanyAuth {
        pub fn new(decision: CompanyAuthDecision) -> Self {
            Self {
                decision: Ok(decision),
                checked: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                decision: Err(status),
                checked: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.checked.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompanyAuthApi for FixedCompanyAuth {
        async fn check(
            &self,
            user_id: &str,
            company_slug: &str,
        ) -> Result<CompanyAuthDecision, CompanyAuthError> {
            self.checked
                .lock()
                .unwrap()
                .push((user_id.to_string(), company_slug.to_string()));
            self.decision
                .clone()
                .map_err(CompanyAuthError::UnexpectedStatus)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: serde_json::Value) -> Option<CompanyAuthBody> {
        Some(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_401_is_unauthorized() {
        assert_eq!(classify(401, None).unwrap(), CompanyAuthDecision::Unauthorized);
    }

    #[test]
    fn test_404_is_not_found() {
        assert_eq!(classify(404, None).unwrap(), CompanyAuthDecision::NotFound);
    }

    #[test]
    fn test_unsubscribed_company_requires_subscription() {
        let decision = classify(
            200,
            body(serde_json::json!({ "company": { "slug": "acme", "type": "COMPANY" } })),
        )
        .unwrap();
        assert_eq!(
            decision,
            CompanyAuthDecision::SubscriptionRequired {
                company_slug: "acme".to_string()
            }
        );
    }

    #[test]
    fn test_community_is_allowed_without_subscription() {
        let decision = classify(
            200,
            body(serde_json::json!({ "company": { "slug": "dao", "type": "COMMUNITY" } })),
        )
        .unwrap();
        assert_eq!(decision, CompanyAuthDecision::Allowed);
    }

    #[test]
    fn test_subscribed_company_is_allowed() {
        let decision = classify(
            200,
            body(serde_json::json!({
                "company": {
                    "slug": "acme",
                    "type": "COMPANY",
                    "stripe": { "product": { "ID": "prod_123" } }
                }
            })),
        )
        .unwrap();
        assert_eq!(decision, CompanyAuthDecision::Allowed);
    }

    #[test]
    fn test_200_without_company_is_malformed() {
        assert!(matches!(
            classify(200, body(serde_json::json!({}))),
            Err(CompanyAuthError::MalformedBody)
        ));
    }

    #[test]
    fn test_other_status_is_an_error() {
        assert!(matches!(
            classify(500, None),
            Err(CompanyAuthError::UnexpectedStatus(500))
        ));
    }
}
