//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::state::{AppState, Project, ProjectId, StateError, TimerSnapshot};
use super::responses::{
    project_views, HealthResponse, NewProjectRequest, ProjectResponse, ProjectView,
    StatusResponse, TimerResponse,
};

fn internal_error(context: &str, e: StateError) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn timer_reply(
    result: Result<TimerSnapshot, StateError>,
    message: &str,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = result.map_err(|e| internal_error("Timer command failed", e))?;
    Ok(Json(TimerResponse::new(message, timer)))
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_reply(state.start(), "Timer started")
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_reply(state.pause(), "Timer paused")
}

/// Handle POST /timer/toggle - the start/pause button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_reply(state.toggle_running(), "Timer toggled")
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_reply(state.reset(), "Timer reset")
}

/// Handle POST /timer/mode - switch between tracker and pomodoro
pub async fn mode_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let result = state.toggle_mode();
    let message = match &result {
        Ok(timer) => format!("Switched to {} mode", timer.mode.as_str()),
        Err(_) => String::new(),
    };
    timer_reply(result, &message)
}

/// Handle GET /projects
pub async fn list_projects_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectView>>, StatusCode> {
    let projects = state
        .get_projects()
        .map_err(|e| internal_error("Failed to get projects", e))?;
    Ok(Json(project_views(projects)))
}

/// Handle POST /projects - add a named project
///
/// A missing or blank name is declined without error.
pub async fn add_project_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NewProjectRequest>>,
) -> Result<Json<ProjectResponse>, StatusCode> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let created = state
        .add_project(request.name.as_deref())
        .map_err(|e| internal_error("Failed to add project", e))?;

    let (projects, timer) = current_view(&state)?;
    let response = match created {
        Some(id) => {
            info!("Project {} created", id);
            ProjectResponse::changed("Project added".to_string(), id, projects, timer)
        }
        None => ProjectResponse::unchanged(
            "Project name is required".to_string(),
            projects,
            timer,
        ),
    };
    Ok(Json(response))
}

/// Handle POST /projects/:id/toggle - activate or deactivate a project
pub async fn toggle_project_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>, StatusCode> {
    let toggled = state
        .toggle_project(id)
        .map_err(|e| internal_error("Failed to toggle project", e))?;

    let (projects, timer) = current_view(&state)?;
    let response = match toggled {
        Some(true) => ProjectResponse::changed("Project started".to_string(), id, projects, timer),
        Some(false) => ProjectResponse::changed("Project stopped".to_string(), id, projects, timer),
        None => ProjectResponse::unchanged(format!("No project with id {}", id), projects, timer),
    };
    Ok(Json(response))
}

fn current_view(state: &AppState) -> Result<(Vec<Project>, TimerSnapshot), StatusCode> {
    let projects = state
        .get_projects()
        .map_err(|e| internal_error("Failed to get projects", e))?;
    let timer = state
        .get_timer_state()
        .map_err(|e| internal_error("Failed to get timer state", e))?;
    Ok((projects, timer))
}

/// Handle GET /status - Return current timer and project status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    // Last published timer view
    let timer = state.latest_timer();
    let projects = state
        .get_projects()
        .map_err(|e| internal_error("Failed to get projects", e))?;
    let active_project = state
        .get_active_project()
        .map_err(|e| internal_error("Failed to get active project", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: timer.into(),
        projects: project_views(projects),
        active_project,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - server-sent stream of state changes
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Event stream subscriber connected");
    let events = state.subscribe_events();

    let stream = stream::unfold(events, |mut events| async move {
        loop {
            match events.recv().await {
                Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), events)),
                    Err(e) => warn!("Failed to encode event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
