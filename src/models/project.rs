use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::Resource;
use crate::models::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Planned,
    Ongoing,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planned,
        ProjectStatus::Ongoing,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Unknown or missing statuses read as the default.
fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProjectStatus, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ProjectStatus::parse).unwrap_or_default())
}

/// A project as listed by `GET /api/project`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    #[serde(alias = "id")]
    pub project_id: i64,
    #[serde(rename = "projectname", alias = "projectName")]
    pub name: String,
    #[serde(rename = "clientname", alias = "clientName", default)]
    pub client_name: String,
    #[serde(rename = "startdate", alias = "startDate", default, deserialize_with = "wire::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "enddate", alias = "endDate", default, deserialize_with = "wire::optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ProjectStatus,
    #[serde(rename = "assignedteam", alias = "assignedTeam", default)]
    pub assigned_team: Option<String>,
    #[serde(default, deserialize_with = "wire::number")]
    pub budget: f64,
}

/// Body of the create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub project_name: String,
    pub client_name: String,
    #[serde(serialize_with = "wire::optional_date_string")]
    pub start_date: Option<NaiveDate>,
    #[serde(serialize_with = "wire::optional_date_string")]
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub assigned_team: String,
    pub budget: f64,
}

impl Resource for Project {
    type Id = i64;
    type Draft = ProjectDraft;
    const NAME: &'static str = "project";

    fn id(&self) -> i64 {
        self.project_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_row() {
        let project: Project = serde_json::from_value(json!({
            "project_id": 3,
            "projectname": "Website",
            "clientname": "Acme",
            "startdate": "2024-05-01T00:00:00.000Z",
            "enddate": null,
            "status": "On Hold",
            "assignedteam": "Design",
            "budget": "1500.00"
        }))
        .unwrap();

        assert_eq!(project.project_id, 3);
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(project.end_date, None);
        assert_eq!(project.budget, 1500.0);
    }

    #[test]
    fn draft_uses_camel_case_fields() {
        let draft = ProjectDraft {
            project_name: "Website".into(),
            client_name: "Acme".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: None,
            status: ProjectStatus::Ongoing,
            assigned_team: String::new(),
            budget: 10.5,
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["projectName"], "Website");
        assert_eq!(body["startDate"], "2024-05-01");
        assert_eq!(body["endDate"], "");
        assert_eq!(body["status"], "Ongoing");
        assert_eq!(body["budget"], 10.5);
    }

    #[test]
    fn status_cycles_through_every_value() {
        let mut status = ProjectStatus::Planned;
        for _ in 0..ProjectStatus::ALL.len() {
            status = status.next();
        }
        assert_eq!(status, ProjectStatus::Planned);
        assert_eq!(ProjectStatus::Planned.previous(), ProjectStatus::OnHold);
    }

    #[test]
    fn unknown_status_reads_as_planned() {
        let project: Project = serde_json::from_value(json!({
            "id": 4,
            "projectname": "Audit",
            "status": "archived"
        }))
        .unwrap();
        assert_eq!(project.project_id, 4);
        assert_eq!(project.status, ProjectStatus::Planned);
        assert_eq!(ProjectStatus::parse("on hold"), Some(ProjectStatus::OnHold));
    }
}
