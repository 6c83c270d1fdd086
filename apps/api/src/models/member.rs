use serde::{Deserialize, Serialize};

use super::null_as_empty;
use super::project::Project;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub discord_name: Option<String>,
    pub conduct: Option<Conduct>,
    #[serde(deserialize_with = "null_as_empty")]
    pub projects: Vec<MemberProject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conduct {
    pub email: Option<String>,
    #[serde(rename = "telegramChatID")]
    pub telegram_chat_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberProject {
    pub phase: Option<String>,
    pub info: Option<Project>,
}

/// Tabs of the candidate "applications" page, keyed by their submenu index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationPhase {
    Committed,
    Engaged,
    Invited,
    Rejected,
}

impl ApplicationPhase {
    pub const ALL: [ApplicationPhase; 4] = [
        ApplicationPhase::Committed,
        ApplicationPhase::Engaged,
        ApplicationPhase::Invited,
        ApplicationPhase::Rejected,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationPhase::Committed => "committed",
            ApplicationPhase::Engaged => "engaged",
            ApplicationPhase::Invited => "invited",
            ApplicationPhase::Rejected => "rejected",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ApplicationPhase::Committed => "Active Projects",
            ApplicationPhase::Engaged => "Active Applications",
            ApplicationPhase::Invited => "Invited",
            ApplicationPhase::Rejected => "Rejected",
        }
    }
}

impl Member {
    pub fn projects_in_phase(&self, phase: ApplicationPhase) -> Vec<&MemberProject> {
        self.projects
            .iter()
            .filter(|p| p.phase.as_deref() == Some(phase.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_from_index() {
        assert_eq!(ApplicationPhase::from_index(0), Some(ApplicationPhase::Committed));
        assert_eq!(ApplicationPhase::from_index(3), Some(ApplicationPhase::Rejected));
        assert_eq!(ApplicationPhase::from_index(4), None);
        assert_eq!(ApplicationPhase::Engaged.title(), "Active Applications");
    }

    #[test]
    fn test_projects_in_phase_filters_by_phase_string() {
        let member: Member = serde_json::from_value(json!({
            "_id": "u1",
            "projects": [
                { "phase": "engaged", "info": { "_id": "p1", "title": "Eden" } },
                { "phase": "invited", "info": { "_id": "p2" } },
                { "phase": "engaged", "info": null }
            ]
        }))
        .unwrap();

        assert_eq!(member.projects_in_phase(ApplicationPhase::Engaged).len(), 2);
        assert_eq!(member.projects_in_phase(ApplicationPhase::Invited).len(), 1);
        assert!(member.projects_in_phase(ApplicationPhase::Rejected).is_empty());
    }
}
