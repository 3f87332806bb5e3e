//! Named projects and the single project accruing tracked time

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::timer_state::{TimerEngine, TimerMode};
use crate::services::SnapshotStore;

/// Storage slot used for the project snapshot unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "pomodoro-projects";

pub type ProjectId = u64;

/// One entry of the project snapshot.
///
/// The wire names match the stored snapshot format, `isActive` is
/// accepted on read for the same flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default, rename = "isRunning", alias = "isActive")]
    pub is_active: bool,
}

impl Project {
    fn new(id: ProjectId, name: String) -> Self {
        Self {
            id,
            name,
            time_spent: 0,
            is_active: false,
        }
    }
}

/// Decode a stored snapshot.
///
/// Anything unreadable becomes an empty collection. Entries without a
/// name are dropped and every entry comes back inactive, since the
/// engine always starts paused.
pub fn decode_snapshot(raw: &str) -> Vec<Project> {
    let projects: Vec<Project> = match serde_json::from_str(raw) {
        Ok(projects) => projects,
        Err(e) => {
            warn!("Discarding malformed project snapshot: {}", e);
            return Vec::new();
        }
    };

    let total = projects.len();
    let mut seen = Vec::with_capacity(total);
    let projects: Vec<Project> = projects
        .into_iter()
        .filter(|p| !p.name.trim().is_empty())
        .filter(|p| {
            if seen.contains(&p.id) {
                return false;
            }
            seen.push(p.id);
            true
        })
        .map(|p| Project {
            is_active: false,
            ..p
        })
        .collect();

    if projects.len() != total {
        warn!("Dropped {} invalid project entries from snapshot", total - projects.len());
    }
    projects
}

pub fn encode_snapshot(projects: &[Project]) -> serde_json::Result<String> {
    serde_json::to_string(projects)
}

/// Ordered project collection that owns the single-active-project invariant
pub struct ProjectTracker {
    projects: Vec<Project>,
    active: Option<ProjectId>,
    last_id: ProjectId,
    store: Arc<dyn SnapshotStore>,
    storage_key: String,
}

impl std::fmt::Debug for ProjectTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectTracker")
            .field("projects", &self.projects)
            .field("active", &self.active)
            .field("storage_key", &self.storage_key)
            .finish()
    }
}

impl ProjectTracker {
    /// Empty tracker writing to `storage_key`; nothing is read from the store
    pub fn new(store: Arc<dyn SnapshotStore>, storage_key: impl Into<String>) -> Self {
        Self {
            projects: Vec::new(),
            active: None,
            last_id: 0,
            store,
            storage_key: storage_key.into(),
        }
    }

    /// Tracker restored from the snapshot stored under `storage_key`
    pub fn load(store: Arc<dyn SnapshotStore>, storage_key: impl Into<String>) -> Self {
        let mut tracker = Self::new(store, storage_key);
        let raw = match tracker.store.load(&tracker.storage_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read project snapshot, starting empty: {}", e);
                None
            }
        };

        if let Some(raw) = raw {
            tracker.projects = decode_snapshot(&raw);
            tracker.last_id = tracker.projects.iter().map(|p| p.id).max().unwrap_or(0);
        }
        info!(
            "Loaded {} projects from slot {:?}",
            tracker.projects.len(),
            tracker.storage_key
        );
        tracker
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn active_id(&self) -> Option<ProjectId> {
        self.active
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Append a project. Declined (returns `None`) when the name is missing or blank.
    pub fn add_project(&mut self, name: Option<&str>) -> Option<ProjectId> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;

        let id = self.next_id();
        self.projects.push(Project::new(id, name.to_string()));
        info!("Added project {:?} with id {}", name, id);
        self.persist();
        Some(id)
    }

    /// Flip a project's active flag and drive the engine to match.
    ///
    /// Returns the project's new state, or `None` for an unknown id.
    pub fn toggle_active(&mut self, id: ProjectId, engine: &mut TimerEngine) -> Option<bool> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        let activating = !self.projects[index].is_active;

        if activating {
            for other in self.projects.iter_mut().filter(|p| p.id != id) {
                other.is_active = false;
            }
        }

        let project = &mut self.projects[index];
        project.is_active = activating;
        self.active = if activating { Some(id) } else { None };

        if activating {
            engine.start();
            info!("Project {:?} is now active", project.name);
        } else {
            info!("Project {:?} is no longer active", project.name);
            if !self.projects.iter().any(|p| p.is_active) {
                engine.pause();
            }
        }

        self.persist();
        Some(activating)
    }

    /// Credit one period to the active project.
    ///
    /// Time only accrues in Tracker mode. Returns the credited project.
    pub fn on_tick(&mut self, engine: &TimerEngine) -> Option<&Project> {
        if engine.mode() != TimerMode::Tracker {
            return None;
        }
        let id = self.active?;
        let index = self.projects.iter().position(|p| p.id == id)?;
        self.projects[index].time_spent += 1;
        self.persist();
        self.projects.get(index)
    }

    fn next_id(&mut self) -> ProjectId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let candidate = self.last_id.checked_add(1).map(|next| now.max(next));
        let id = match candidate {
            Some(id) if self.get(id).is_none() => id,
            // A stored id sits at the top of the range; take the lowest free one
            _ => (1..=ProjectId::MAX)
                .find(|id| self.get(*id).is_none())
                .unwrap_or(0),
        };
        self.last_id = id;
        id
    }

    /// Write the whole collection. Storage failures are logged, never raised.
    fn persist(&self) {
        let snapshot = match encode_snapshot(&self.projects) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to encode project snapshot: {}", e);
                return;
            }
        };
        match self.store.save(&self.storage_key, &snapshot) {
            Ok(()) => debug!("Persisted {} projects", self.projects.len()),
            Err(e) => warn!("Failed to persist project snapshot: {}", e),
        }
    }
}
