//! FormDraft for the interview flow.
//!
//! Accumulates what the candidate enters across steps. Lives only as long as
//! the page instance and is submitted as one payload from the Details step.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// CV analysis results produced when the resume upload finishes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvSummary {
    pub title_role: String,
    pub top_skills: Vec<Value>,
    pub content: MatchContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchContent {
    pub match_percentage: Option<f64>,
    pub improvement_points: Option<String>,
    pub strong_fit: Option<String>,
    pub growth_areas: Option<String>,
    pub experience_areas: Option<String>,
}

/// Profile questions answered on the Details step. Form inputs arrive either
/// as numbers or as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralDetails {
    pub budget: Option<Budget>,
    #[serde(deserialize_with = "loose_number")]
    pub hours_per_week: Option<f64>,
    pub location: Option<String>,
    pub time_zone: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Budget {
    #[serde(deserialize_with = "loose_number")]
    pub per_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceLevel {
    #[serde(deserialize_with = "loose_number")]
    pub years: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub total: Option<f64>,
}

fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Zero and blank count as missing, like an empty form input.
fn filled(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

fn filled_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl GeneralDetails {
    pub fn per_hour(&self) -> Option<f64> {
        filled(self.budget.as_ref().and_then(|b| b.per_hour))
    }

    pub fn years(&self) -> Option<f64> {
        self.experience_level
            .as_ref()
            .and_then(|e| e.years)
            .filter(|v| v.is_finite())
    }

    pub fn total(&self) -> Option<f64> {
        filled(self.experience_level.as_ref().and_then(|e| e.total))
    }

    /// Details-step predicate. `years == 0` is an answer, not a blank.
    pub fn is_complete(&self) -> bool {
        self.per_hour().is_some()
            && filled(self.hours_per_week).is_some()
            && filled_text(&self.location).is_some()
            && filled_text(&self.time_zone).is_some()
            && self.years().is_some()
            && self.total().is_some()
    }

    /// Names of the fields still blocking the Details step.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("budget.perHour", self.per_hour().is_some()),
            ("hoursPerWeek", filled(self.hours_per_week).is_some()),
            ("location", filled_text(&self.location).is_some()),
            ("timeZone", filled_text(&self.time_zone).is_some()),
            ("experienceLevel.years", self.years().is_some()),
            ("experienceLevel.total", self.total().is_some()),
        ];
        checks
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }

    /// `updateMember` input carrying only the answered fields. The target
    /// member is always `member_id`, never anything from the form.
    pub fn member_update(&self, member_id: &str) -> UpdateMemberInput {
        let experience_level = match (self.total(), self.years()) {
            (None, None) => None,
            (total, years) => Some(ExperienceUpdate { total, years }),
        };

        UpdateMemberInput {
            id: member_id.to_string(),
            budget: self.per_hour().map(|per_hour| BudgetUpdate { per_hour }),
            hours_per_week: filled(self.hours_per_week),
            location: filled_text(&self.location).map(str::to_string),
            time_zone: filled_text(&self.time_zone).map(str::to_string),
            experience_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberInput {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_per_week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormDraft {
    pub cv: Option<CvSummary>,
    pub cv_ended: bool,
    pub insights_checked: bool,
    pub interview_ended: bool,
    pub general_details: GeneralDetails,
}
