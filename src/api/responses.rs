//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{Project, ProjectId, TimerMode, TimerSnapshot},
    utils::{format_clock, format_hms},
};

/// Timer face as shown to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub mode: TimerMode,
    pub time_value: u64,
    pub display: String,
    pub is_running: bool,
    pub completed_sessions: u64,
}

impl From<TimerSnapshot> for TimerView {
    fn from(timer: TimerSnapshot) -> Self {
        Self {
            display: format_clock(timer.mode, timer.time_value),
            mode: timer.mode,
            time_value: timer.time_value,
            is_running: timer.is_running,
            completed_sessions: timer.completed_sessions,
        }
    }
}

/// One row of the project list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: ProjectId,
    pub name: String,
    pub time_spent: u64,
    pub display: String,
    pub is_active: bool,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            display: format_hms(project.time_spent),
            id: project.id,
            name: project.name,
            time_spent: project.time_spent,
            is_active: project.is_active,
        }
    }
}

pub fn project_views(projects: Vec<Project>) -> Vec<ProjectView> {
    projects.into_iter().map(ProjectView::from).collect()
}

/// Response body for timer commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl TimerResponse {
    pub fn new(message: impl Into<String>, timer: TimerSnapshot) -> Self {
        let status = if timer.is_running { "running" } else { "paused" };
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }
}

/// Response body for project commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: Option<ProjectId>,
    pub projects: Vec<ProjectView>,
    pub timer: TimerView,
}

impl ProjectResponse {
    fn new(
        status: &str,
        message: String,
        project_id: Option<ProjectId>,
        projects: Vec<Project>,
        timer: TimerSnapshot,
    ) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            project_id,
            projects: project_views(projects),
            timer: timer.into(),
        }
    }

    /// The command changed the project list
    pub fn changed(
        message: String,
        project_id: ProjectId,
        projects: Vec<Project>,
        timer: TimerSnapshot,
    ) -> Self {
        Self::new("changed", message, Some(project_id), projects, timer)
    }

    /// The command was declined and nothing changed
    pub fn unchanged(message: String, projects: Vec<Project>, timer: TimerSnapshot) -> Self {
        Self::new("unchanged", message, None, projects, timer)
    }
}

/// Request body for `POST /projects`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Full status response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timer: TimerView,
    pub projects: Vec<ProjectView>,
    pub active_project: Option<ProjectId>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_view_formats_by_mode() {
        let view = TimerView::from(TimerSnapshot {
            mode: TimerMode::Pomodoro,
            time_value: 1_499,
            is_running: true,
            completed_sessions: 2,
        });
        assert_eq!(view.display, "24:59");

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["mode"], "pomodoro");
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["completedSessions"], 2);
    }

    #[test]
    fn project_view_shows_accumulated_time() {
        let view = ProjectView::from(Project {
            id: 1,
            name: "Writing".to_string(),
            time_spent: 3_661,
            is_active: true,
        });
        assert_eq!(view.display, "01:01:01");
        assert!(view.is_active);
    }
}
