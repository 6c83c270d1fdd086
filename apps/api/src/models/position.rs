use serde::{Deserialize, Serialize};

use super::null_as_empty;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Active,
    Unpublished,
    Archived,
    Deleted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    Community,
    Company,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<PositionStatus>,
    pub who_you_are: Option<String>,
    pub what_the_job_involves: Option<String>,
    pub company: Option<Company>,
    pub general_details: Option<PositionGeneralDetails>,
    #[serde(deserialize_with = "null_as_empty")]
    pub candidates: Vec<CandidateEntry>,
    #[serde(deserialize_with = "null_as_empty")]
    pub questions_to_ask: Vec<QuestionToAsk>,
    pub positions_requirements: Option<PositionRequirements>,
}

impl Position {
    pub fn company_slug(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.slug.as_deref())
    }

    /// The candidate entry for `user_id`, if that user has applied.
    pub fn application_of(&self, user_id: &str) -> Option<&CandidateEntry> {
        self.candidates
            .iter()
            .find(|c| c.user.as_ref().and_then(|u| u.id.as_deref()) == Some(user_id))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub company_type: Option<CompanyType>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub benefits: Option<String>,
    pub employees_number: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub whats_to_love: Option<String>,
    pub mission: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub funding: Vec<FundingRound>,
    pub values: Option<String>,
    pub founders: Option<String>,
    pub glassdoor: Option<String>,
    pub stripe: Option<StripeInfo>,
}

impl Company {
    pub fn is_community(&self) -> bool {
        self.company_type == Some(CompanyType::Community)
    }

    pub fn has_subscription(&self) -> bool {
        self.stripe
            .as_ref()
            .and_then(|s| s.product.as_ref())
            .and_then(|p| p.id.as_deref())
            .is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeInfo {
    pub product: Option<StripeProduct>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeProduct {
    #[serde(rename = "ID")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FundingRound {
    pub name: Option<String>,
    pub date: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionGeneralDetails {
    pub yearly_salary: Option<SalaryRange>,
    pub contract_type: Option<String>,
    pub office_policy: Option<String>,
    pub office_location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateEntry {
    pub submitted: Option<bool>,
    pub score_card_total: Option<ScoreCardTotal>,
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCardTotal {
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionToAsk {
    pub best_answer: Option<String>,
    pub question: Option<Question>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionRequirements {
    pub role_description: Option<String>,
    pub benefits: Option<String>,
}

/// Human label for the office policy codes used by the job board.
pub fn office_policy_label(policy: &str) -> &'static str {
    match policy {
        "on-site" => "On site",
        "remote" => "Remote",
        "hybrid-1-day-office" => "Hybrid - 1 day office",
        "hybrid-2-day-office" => "Hybrid - 2 day office",
        "hybrid-3-day-office" => "Hybrid - 3 day office",
        "hybrid-4-day-office" => "Hybrid - 4 day office",
        _ => "",
    }
}

/// `85000` -> `85k`; amounts below a thousand are printed as-is.
pub fn format_salary(amount: f64) -> String {
    if amount >= 1000.0 {
        format!("{}k", amount / 1000.0)
    } else {
        format!("{amount}")
    }
}
