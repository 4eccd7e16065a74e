// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP client for the remote fitness web API
//!
//! # Endpoints
//!
//! - `GET  /api/goals` returns `{ "goals": [...] }`
//! - `POST /api/goals` creates a goal and returns `{ "goal": {...} }`
//! - `PUT  /api/goals` replaces the goal named by `id` and returns `{ "goal": {...} }`
//! - `POST /api/workouts` stores one workout; `409` means it already exists
//! - `GET  /api/workouts` returns `{ "workouts": [...] }`
//!
//! Failures are reported with an `{ "error": "..." }` body where the server can.

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

use crate::constants::endpoints::{GOALS_PATH, WORKOUTS_PATH};
use crate::logging::AppLogger;
use crate::models::{ApiWorkout, Goal, GoalInput, WorkoutRecord};

#[derive(Debug, Deserialize)]
struct GoalsResponse {
    goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
struct GoalResponse {
    goal: Goal,
}

#[derive(Debug, Deserialize)]
struct WorkoutsResponse {
    workouts: Vec<ApiWorkout>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Body of a goal replacement
#[derive(Debug, Serialize)]
struct GoalUpdatePayload<'a> {
    id: &'a str,
    #[serde(flatten)]
    input: &'a GoalInput,
}

/// Result of pushing one workout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    /// The server already had this workout
    AlreadyExists,
}

pub struct RemoteClient {
    client: Client,
    base_url: Url,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        // Url::join drops the last path segment unless it ends with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path)
            .map_err(|e| SyncError::InvalidUrl(e.to_string()))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, SyncError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await?;
        AppLogger::log_api_request(
            method.as_str(),
            path,
            response.status().as_u16(),
            started.elapsed().as_millis() as u64,
        );

        Ok(response)
    }

    /// All goals stored remotely
    pub async fn fetch_goals(&self) -> Result<Vec<Goal>, SyncError> {
        let response = self.send::<()>(Method::GET, GOALS_PATH, None).await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;
        let body: GoalsResponse = decode(response).await?;
        Ok(body.goals)
    }

    /// Create a goal; the server assigns its id and timestamps
    pub async fn create_goal(&self, input: &GoalInput) -> Result<Goal, SyncError> {
        let response = self.send(Method::POST, GOALS_PATH, Some(input)).await?;
        let response = expect_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        let body: GoalResponse = decode(response).await?;

        info!(goal.id = %body.goal.id(), goal.year = body.goal.year(), "Created remote goal");
        Ok(body.goal)
    }

    /// Replace the inputs of goal `goal_id`
    pub async fn update_goal(&self, goal_id: &str, input: &GoalInput) -> Result<Goal, SyncError> {
        let payload = GoalUpdatePayload { id: goal_id, input };
        let response = self.send(Method::PUT, GOALS_PATH, Some(&payload)).await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;
        let body: GoalResponse = decode(response).await?;

        info!(goal.id = %goal_id, "Updated remote goal");
        Ok(body.goal)
    }

    /// Push one workout
    pub async fn sync_workout(&self, workout: &WorkoutRecord) -> Result<SyncOutcome, SyncError> {
        let payload = ApiWorkout::from(workout);
        let response = self.send(Method::POST, WORKOUTS_PATH, Some(&payload)).await?;

        match response.status() {
            StatusCode::CREATED => Ok(SyncOutcome::Created),
            StatusCode::CONFLICT => Ok(SyncOutcome::AlreadyExists),
            _ => Err(error_from_response(response).await),
        }
    }

    /// All workouts stored remotely, each with a freshly assigned id
    ///
    /// Entries that fail validation are skipped.
    pub async fn fetch_workouts(&self) -> Result<Vec<WorkoutRecord>, SyncError> {
        let response = self.send::<()>(Method::GET, WORKOUTS_PATH, None).await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;
        let body: WorkoutsResponse = decode(response).await?;

        let total = body.workouts.len();
        let records: Vec<WorkoutRecord> = body
            .workouts
            .into_iter()
            .filter_map(|workout| match workout.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping remote workout: {}", e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!(total, accepted = records.len(), "Some remote workouts were rejected");
        }
        Ok(records)
    }
}

async fn expect_status(response: Response, accepted: &[StatusCode]) -> Result<Response, SyncError> {
    if accepted.contains(&response.status()) {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> SyncError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return SyncError::Network(e),
    };

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => SyncError::Api(error.error),
        Err(_) => SyncError::Http(status, body),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SyncError::InvalidResponse(e.to_string()))
}

/// Remote sync errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Server error ({0}): {1}")]
    Http(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
