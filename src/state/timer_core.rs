//! Engine and tracker combined into one unit of mutation

use serde::{Deserialize, Serialize};

use super::project_state::{Project, ProjectId, ProjectTracker};
use super::timer_state::{TimerEngine, TimerMode, TimerSnapshot};

/// Change notifications emitted by the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    /// The clock advanced; `project` is set when time was credited to one
    #[serde(rename_all = "camelCase")]
    Tick {
        mode: TimerMode,
        time_value: u64,
        project: Option<ProjectId>,
    },
    /// A Pomodoro countdown reached zero
    #[serde(rename_all = "camelCase")]
    SessionCompleted { completed_sessions: u64 },
    /// Run state, mode or value changed through a command
    TimerChanged { timer: TimerSnapshot },
    /// The project list changed through a command
    ProjectsChanged { projects: Vec<Project> },
}

impl AppEvent {
    /// Event name as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::Tick { .. } => "tick",
            AppEvent::SessionCompleted { .. } => "sessionCompleted",
            AppEvent::TimerChanged { .. } => "timerChanged",
            AppEvent::ProjectsChanged { .. } => "projectsChanged",
        }
    }
}

/// Owns the engine and the tracker so a clock period always updates both
#[derive(Debug)]
pub struct TimerCore {
    engine: TimerEngine,
    tracker: ProjectTracker,
}

impl TimerCore {
    pub fn new(engine: TimerEngine, tracker: ProjectTracker) -> Self {
        Self { engine, tracker }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn tracker(&self) -> &ProjectTracker {
        &self.tracker
    }

    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// One clock period: engine first, then the tracker.
    ///
    /// Returns no events when the engine is paused.
    pub fn tick(&mut self) -> Vec<AppEvent> {
        let Some(outcome) = self.engine.tick() else {
            return Vec::new();
        };

        let project = self.tracker.on_tick(&self.engine).map(|p| p.id);
        let mut events = vec![AppEvent::Tick {
            mode: outcome.mode,
            time_value: outcome.time_value,
            project,
        }];
        if outcome.session_completed {
            events.push(AppEvent::SessionCompleted {
                completed_sessions: self.engine.completed_sessions(),
            });
        }
        events
    }

    pub fn start(&mut self) -> AppEvent {
        self.engine.start();
        self.timer_changed()
    }

    pub fn pause(&mut self) -> AppEvent {
        self.engine.pause();
        self.timer_changed()
    }

    /// Start/pause button: pause when running, start otherwise
    pub fn toggle_running(&mut self) -> AppEvent {
        if self.engine.is_running() {
            self.engine.pause();
        } else {
            self.engine.start();
        }
        self.timer_changed()
    }

    pub fn reset(&mut self) -> AppEvent {
        self.engine.reset();
        self.timer_changed()
    }

    pub fn toggle_mode(&mut self) -> AppEvent {
        self.engine.toggle_mode();
        self.timer_changed()
    }

    /// Returns the new id, or `None` if the name was declined
    pub fn add_project(&mut self, name: Option<&str>) -> Option<(ProjectId, AppEvent)> {
        let id = self.tracker.add_project(name)?;
        Some((id, self.projects_changed()))
    }

    /// Returns the project's new active flag plus the resulting events,
    /// or `None` for an unknown id
    pub fn toggle_project(&mut self, id: ProjectId) -> Option<(bool, Vec<AppEvent>)> {
        let active = self.tracker.toggle_active(id, &mut self.engine)?;
        Some((active, vec![self.projects_changed(), self.timer_changed()]))
    }

    fn timer_changed(&self) -> AppEvent {
        AppEvent::TimerChanged {
            timer: self.engine.snapshot(),
        }
    }

    fn projects_changed(&self) -> AppEvent {
        AppEvent::ProjectsChanged {
            projects: self.tracker.projects().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemorySnapshotStore;
    use crate::state::project_state::DEFAULT_STORAGE_KEY;
    use std::sync::Arc;

    fn core_with_pomodoro(seconds: u64) -> TimerCore {
        let store = Arc::new(MemorySnapshotStore::new());
        TimerCore::new(
            TimerEngine::with_pomodoro_seconds(seconds),
            ProjectTracker::new(store, DEFAULT_STORAGE_KEY),
        )
    }

    #[test]
    fn paused_core_emits_nothing() {
        let mut core = core_with_pomodoro(3);
        assert!(core.tick().is_empty());
    }

    #[test]
    fn tick_credits_active_project_after_engine() {
        let mut core = core_with_pomodoro(3);
        let (id, _) = core.add_project(Some("Deep work")).expect("created");
        core.toggle_project(id).expect("known id");

        let events = core.tick();
        assert_eq!(
            events,
            vec![AppEvent::Tick {
                mode: TimerMode::Tracker,
                time_value: 1,
                project: Some(id),
            }]
        );
        assert_eq!(core.tracker().get(id).expect("p").time_spent, 1);
    }

    #[test]
    fn completing_session_does_not_credit_projects() {
        let mut core = core_with_pomodoro(2);
        let (id, _) = core.add_project(Some("A")).expect("created");
        core.toggle_project(id).expect("known id");
        core.toggle_mode();
        core.start();

        core.tick();
        let events = core.tick();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            AppEvent::SessionCompleted {
                completed_sessions: 1
            }
        );
        assert!(!core.is_running());
        assert_eq!(core.tracker().get(id).expect("p").time_spent, 0);
    }

    #[test]
    fn toggle_running_flips_run_state() {
        let mut core = core_with_pomodoro(3);
        core.toggle_running();
        assert!(core.is_running());
        core.toggle_running();
        assert!(!core.is_running());
    }

    #[test]
    fn manual_pause_keeps_project_active() {
        let mut core = core_with_pomodoro(3);
        let (id, _) = core.add_project(Some("A")).expect("created");
        core.toggle_project(id).expect("known id");
        core.tick();
        core.pause();
        assert!(core.tick().is_empty());

        core.start();
        core.tick();
        assert_eq!(core.tracker().active_id(), Some(id));
        assert_eq!(core.tracker().get(id).expect("p").time_spent, 2);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(AppEvent::SessionCompleted {
            completed_sessions: 4,
        })
        .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "type": "sessionCompleted", "completedSessions": 4 })
        );
        assert_eq!(json["type"], AppEvent::SessionCompleted { completed_sessions: 4 }.kind());
    }
}
