// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tasks and the task monitor
//!
//! A `202 Accepted` answer to a POST, PATCH or DELETE starts a
//! server-side task. [`TaskMonitorInfo::from_accepted`] captures where to
//! poll (the `Location` header, else the body `@odata.id`) and
//! [`TaskMonitor`] polls it until one of:
//!
//! - a [`Task`] body in a terminal [`TaskState`],
//! - a 2xx body that is not a task (the operation's own response),
//! - the configured deadline ([`Error::Timeout`]),
//! - cancellation of the abort token ([`Error::Cancelled`]).
//!
//! A poll answered with `202 Accepted` means "still running". Polls are
//! spaced by `Retry-After` when the service sends it, else by the
//! configured interval with random jitter. `PercentComplete` is reported
//! as received; decreases are recorded in [`TaskReport::regressions`].
//!
//! Timeouts and cancellations leave the service-side task running unless
//! [`TaskMonitorConfig::delete_on_cancel`] is set, in which case a
//! cancellation also sends DELETE to the monitor URI.

use crate::entity::decode;
use crate::odata::ODATA_ID;
use crate::Bmc;
use crate::Client;
use crate::EdmDateTimeOffset;
use crate::EntityType;
use crate::Error;
use crate::ExtendedInfo;
use crate::ODataId;
use crate::ODataType;
use crate::ResourceBase;
use crate::Response;
use http::HeaderMap;
use http::StatusCode;
use rand::Rng as _;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::pending;
use std::time::Duration;
use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

/// `TaskState` of a Redfish task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Created, not started.
    New,
    /// Starting.
    Starting,
    /// Running.
    Running,
    /// Suspended.
    Suspended,
    /// Interrupted.
    Interrupted,
    /// Pending.
    Pending,
    /// Stopping.
    Stopping,
    /// Completed.
    Completed,
    /// Killed.
    Killed,
    /// Completed with an exception.
    Exception,
    /// Running as a service.
    Service,
    /// Being cancelled.
    Cancelling,
    /// Cancelled.
    Cancelled,
}

impl TaskState {
    /// True for states that never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Killed | Self::Exception | Self::Cancelled
        )
    }
}

/// `TaskStatus` of a Redfish task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Normal.
    #[serde(rename = "OK")]
    Ok,
    /// Warning.
    Warning,
    /// Critical.
    Critical,
}

/// Request the task was created for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Request headers.
    #[serde(rename = "HttpHeaders", default, skip_serializing_if = "Vec::is_empty")]
    pub http_headers: Vec<String>,
    /// HTTP method.
    #[serde(rename = "HttpOperation", default, skip_serializing_if = "Option::is_none")]
    pub http_operation: Option<String>,
    /// Request body.
    #[serde(rename = "JsonBody", default, skip_serializing_if = "Option::is_none")]
    pub json_body: Option<String>,
    /// Request URI.
    #[serde(rename = "TargetUri", default, skip_serializing_if = "Option::is_none")]
    pub target_uri: Option<String>,
}

/// Redfish `Task` resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// State.
    #[serde(rename = "TaskState", default, skip_serializing_if = "Option::is_none")]
    pub task_state: Option<TaskState>,
    /// Health.
    #[serde(rename = "TaskStatus", default, skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
    /// Progress, 0 to 100.
    #[serde(rename = "PercentComplete", default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<i64>,
    /// Start time.
    #[serde(rename = "StartTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<EdmDateTimeOffset>,
    /// End time.
    #[serde(rename = "EndTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<EdmDateTimeOffset>,
    /// Messages produced by the task.
    #[serde(rename = "Messages", default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ExtendedInfo>,
    /// Dedicated monitor URI.
    #[serde(rename = "TaskMonitor", default, skip_serializing_if = "Option::is_none")]
    pub task_monitor: Option<ODataId>,
    /// True if the service hides [`Task::payload`].
    #[serde(rename = "HidePayload", default, skip_serializing_if = "Option::is_none")]
    pub hide_payload: Option<bool>,
    /// Originating request.
    #[serde(rename = "Payload", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TaskPayload>,
    /// ISO 8601 duration estimate.
    #[serde(rename = "EstimatedDuration", default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl Task {
    /// True once the task is in a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.task_state.map_or(false, TaskState::is_terminal)
    }
}

impl EntityType for Task {
    const WRITABLE: &'static [&'static str] = &[];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

fn looks_like_task(v: &JsonValue) -> bool {
    ODataType::parse_from(v).map_or(false, |t| t.type_name == "Task") || v.get("TaskState").is_some()
}

/// Parse a body as a task if it looks like one.
fn task_from_body(body: &[u8]) -> Result<Option<Task>, Error> {
    let Ok(value) = serde_json::from_slice::<JsonValue>(body) else {
        return Ok(None);
    };
    if looks_like_task(&value) {
        decode(body).map(Some)
    } else {
        Ok(None)
    }
}

/// Where and how to follow an accepted request.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMonitorInfo {
    /// `Location` header of the `202 Accepted` response (or the body
    /// `@odata.id`).
    pub location: ODataId,
    /// `Retry-After` of the `202 Accepted` response.
    pub retry_after: Option<Duration>,
    /// Task returned in the `202 Accepted` body, if any.
    pub task: Option<Task>,
}

impl TaskMonitorInfo {
    /// Extract monitor information from a `202 Accepted` response.
    ///
    /// # Errors
    ///
    /// [`Error::MissingTaskMonitor`] if neither a `Location` header nor
    /// a body `@odata.id` is present.
    pub fn from_accepted(response: &Response) -> Result<Self, Error> {
        let task = task_from_body(&response.body).ok().flatten();
        let location = response
            .location()
            .or_else(|| {
                serde_json::from_slice::<JsonValue>(&response.body)
                    .ok()
                    .and_then(|v| v.get(ODATA_ID).and_then(JsonValue::as_str).map(ODataId::from))
            })
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingTaskMonitor)?;
        Ok(Self {
            location,
            retry_after: response.retry_after(),
            task,
        })
    }

    /// URI to poll: the task's `TaskMonitor` when known, else
    /// [`TaskMonitorInfo::location`].
    #[must_use]
    pub fn monitor_uri(&self) -> &ODataId {
        self.task
            .as_ref()
            .and_then(|task| task.task_monitor.as_ref())
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.location)
    }
}

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskMonitorConfig {
    /// Interval between polls when the service sends no `Retry-After`.
    pub poll_interval: Duration,
    /// Random spread applied to `poll_interval`, as a fraction.
    pub jitter: f64,
    /// Lower bound of any wait between polls.
    pub min_interval: Duration,
    /// Overall polling deadline.
    pub deadline: Option<Duration>,
    /// Send DELETE to the monitor URI when aborted.
    pub delete_on_cancel: bool,
    /// Use `Retry-After` instead of `poll_interval` when present.
    pub honor_retry_after: bool,
}

impl Default for TaskMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            jitter: 0.1,
            min_interval: Duration::from_millis(100),
            deadline: None,
            delete_on_cancel: false,
            honor_retry_after: true,
        }
    }
}

impl TaskMonitorConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set jitter fraction (clamped to `0.0..=1.0` when used).
    #[must_use]
    pub const fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set minimum wait between polls.
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set overall deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Send DELETE to the monitor when aborted.
    #[must_use]
    pub const fn delete_on_cancel(mut self, delete: bool) -> Self {
        self.delete_on_cancel = delete;
        self
    }

    /// Honor `Retry-After` of poll responses.
    #[must_use]
    pub const fn honor_retry_after(mut self, honor: bool) -> Self {
        self.honor_retry_after = honor;
        self
    }

    fn next_delay(&self, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(delay) if self.honor_retry_after => delay,
            _ => jittered(self.poll_interval, self.jitter),
        };
        delay.max(self.min_interval)
    }
}

fn jittered(interval: Duration, fraction: f64) -> Duration {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction <= 0.0 {
        return interval;
    }
    let factor = rand::thread_rng().gen_range((1.0 - fraction)..=(1.0 + fraction));
    interval.mul_f64(factor)
}

/// Decrease of `PercentComplete` between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentRegression {
    /// Previous value.
    pub from: i64,
    /// New, lower value.
    pub to: i64,
    /// State reported with the new value.
    pub state: Option<TaskState>,
}

/// Outcome of a completed wait.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Last observed task.
    pub task: Option<Task>,
    /// Final non-task response of the operation, if the monitor ended
    /// with one.
    pub final_response: Option<Response>,
    /// Observed `PercentComplete` decreases.
    pub regressions: Vec<PercentRegression>,
    /// Number of polls issued.
    pub polls: u32,
}

impl TaskReport {
    /// State of the last observed task.
    #[must_use]
    pub fn state(&self) -> Option<TaskState> {
        self.task.as_ref().and_then(|task| task.task_state)
    }

    /// Status of the last observed task.
    #[must_use]
    pub fn status(&self) -> Option<TaskStatus> {
        self.task.as_ref().and_then(|task| task.task_status)
    }
}

enum Observation {
    Running(Option<Task>, Option<Duration>),
    Task(Task, Option<Duration>),
    Final(Response),
}

fn observe(response: Response) -> Result<Observation, Error> {
    let retry_after = response.retry_after();
    if response.status == StatusCode::ACCEPTED {
        let task = task_from_body(&response.body).ok().flatten();
        return Ok(Observation::Running(task, retry_after));
    }
    match task_from_body(&response.body)? {
        Some(task) => Ok(Observation::Task(task, retry_after)),
        None => Ok(Observation::Final(response)),
    }
}

enum Step {
    Aborted,
    Expired,
    Polled(Result<Response, Error>),
}

async fn aborted(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => pending().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

/// Polls a task monitor URI to completion.
#[derive(Debug)]
pub struct TaskMonitor<B> {
    client: Client<B>,
    info: TaskMonitorInfo,
    config: TaskMonitorConfig,
    abort: Option<CancellationToken>,
}

impl<B: Bmc> TaskMonitor<B> {
    /// Monitor for an accepted request.
    #[must_use]
    pub fn new(client: Client<B>, info: TaskMonitorInfo) -> Self {
        Self {
            client,
            info,
            config: TaskMonitorConfig::default(),
            abort: None,
        }
    }

    /// Replace polling parameters.
    #[must_use]
    pub const fn with_config(mut self, config: TaskMonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop when `token` is cancelled.
    #[must_use]
    pub fn with_abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }

    /// Poll until the task ends.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] or [`Error::Cancelled`] carrying the last
    /// observed task, errors of the transport, decode errors.
    pub async fn wait(self) -> Result<TaskReport, Error> {
        self.wait_with_progress(|_| {}).await
    }

    /// Poll until the task ends, reporting every observed task.
    ///
    /// # Errors
    ///
    /// See [`TaskMonitor::wait`].
    #[instrument(skip_all, fields(monitor = %self.info.monitor_uri()))]
    pub async fn wait_with_progress<F>(self, mut progress: F) -> Result<TaskReport, Error>
    where
        F: FnMut(&Task) + Send,
    {
        let Self {
            client,
            info,
            config,
            abort,
        } = self;
        let uri = info.monitor_uri().clone();
        let deadline = config.deadline.map(|d| Instant::now() + d);
        let mut report = TaskReport {
            task: None,
            final_response: None,
            regressions: Vec::new(),
            polls: 0,
        };
        if let Some(task) = info.task {
            record(&mut report, task, &mut progress);
            if report.task.as_ref().map_or(false, Task::is_terminal) {
                return Ok(report);
            }
        }
        let mut delay = config.next_delay(info.retry_after);
        loop {
            let poll = async {
                sleep(delay).await;
                client.bmc().get(uri.as_str(), &HeaderMap::new()).await
            };
            let step = tokio::select! {
                biased;
                () = aborted(abort.as_ref()) => Step::Aborted,
                () = expired(deadline) => Step::Expired,
                response = poll => Step::Polled(response),
            };
            let response = match step {
                Step::Aborted => {
                    debug!("task monitor aborted");
                    if config.delete_on_cancel {
                        if let Err(err) = client.bmc().delete(uri.as_str(), &HeaderMap::new()).await {
                            warn!(error = %err, "task cancel request failed");
                        }
                    }
                    return Err(Error::Cancelled(report.task.map(Box::new)));
                }
                Step::Expired => {
                    debug!(polls = report.polls, "task monitor deadline exceeded");
                    return Err(Error::Timeout(report.task.map(Box::new)));
                }
                Step::Polled(response) => response?,
            };
            report.polls += 1;
            match observe(response)? {
                Observation::Running(task, retry_after) => {
                    if let Some(task) = task {
                        record(&mut report, task, &mut progress);
                    }
                    delay = config.next_delay(retry_after);
                }
                Observation::Task(task, retry_after) => {
                    record(&mut report, task, &mut progress);
                    if report.task.as_ref().map_or(false, Task::is_terminal) {
                        debug!(state = ?report.state(), polls = report.polls, "task finished");
                        return Ok(report);
                    }
                    delay = config.next_delay(retry_after);
                }
                Observation::Final(response) => {
                    debug!(status = %response.status, polls = report.polls, "operation finished");
                    report.final_response = Some(response);
                    return Ok(report);
                }
            }
        }
    }
}

fn record<F: FnMut(&Task)>(report: &mut TaskReport, task: Task, progress: &mut F) {
    let previous = report.task.as_ref().and_then(|t| t.percent_complete);
    if let (Some(from), Some(to)) = (previous, task.percent_complete) {
        if to < from {
            warn!(from, to, state = ?task.task_state, "task PercentComplete decreased");
            report.regressions.push(PercentRegression {
                from,
                to,
                state: task.task_state,
            });
        }
    }
    progress(&task);
    report.task = Some(task);
}
