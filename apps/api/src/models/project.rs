use serde::{Deserialize, Serialize};

use super::null_as_empty;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub role: Vec<ProjectRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRole {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub hours_per_week: Option<f64>,
    pub open_positions: Option<u32>,
    pub budget: Option<RoleBudget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleBudget {
    pub per_hour: Option<String>,
    pub token: Option<String>,
    pub total_budget: Option<String>,
}
