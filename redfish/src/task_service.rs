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

//! Task service.

use crate::resource::ResourceProvidesStatus;
use crate::resource::Status;
use fishbind_core::Bmc;
use fishbind_core::EdmDateTimeOffset;
use fishbind_core::Entity;
use fishbind_core::EntityType;
use fishbind_core::Error;
use fishbind_core::Link;
use fishbind_core::ResourceBase;
use fishbind_core::Task;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

/// What happens when the task list is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverWritePolicy {
    /// Completed tasks are not overwritten; new tasks are refused.
    Manual,
    /// Oldest completed tasks are overwritten.
    Oldest,
}

/// Redfish `TaskService`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskService {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Service is enabled.
    #[serde(rename = "ServiceEnabled", default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    /// Minutes after completion before a task is deleted.
    #[serde(rename = "TaskAutoDeleteTimeoutMinutes", default, skip_serializing_if = "Option::is_none")]
    pub task_auto_delete_timeout_minutes: Option<i64>,
    /// Seconds after completion before a task monitor expires.
    #[serde(rename = "TaskMonitorAutoExpirySeconds", default, skip_serializing_if = "Option::is_none")]
    pub task_monitor_auto_expiry_seconds: Option<i64>,
    /// Overwrite policy for completed tasks.
    #[serde(rename = "CompletedTaskOverWritePolicy", default, skip_serializing_if = "Option::is_none")]
    pub completed_task_over_write_policy: Option<OverWritePolicy>,
    /// Events are sent on task state changes.
    #[serde(rename = "LifeCycleEventOnTaskStateChange", default, skip_serializing_if = "Option::is_none")]
    pub life_cycle_event_on_task_state_change: Option<bool>,
    /// Current service time.
    #[serde(rename = "DateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<EdmDateTimeOffset>,
    /// Tasks collection.
    #[serde(rename = "Tasks", default, skip_serializing_if = "Link::is_empty")]
    pub tasks: Link,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for TaskService {
    const WRITABLE: &'static [&'static str] = &[
        "ServiceEnabled",
        "TaskAutoDeleteTimeoutMinutes",
        "TaskMonitorAutoExpirySeconds",
    ];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for TaskService {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`TaskService`].
pub trait TaskServiceExt<B: Bmc> {
    /// All tasks known to the service.
    ///
    /// # Errors
    ///
    /// Returns error if the collection or one of its members cannot be
    /// retrieved.
    fn tasks(&self) -> impl Future<Output = Result<Vec<Entity<Task, B>>, Error>> + Send;
}

impl<B: Bmc> TaskServiceExt<B> for Entity<TaskService, B> {
    async fn tasks(&self) -> Result<Vec<Entity<Task, B>>, Error> {
        match self.tasks.id() {
            Some(id) => self.client().get_collection(id).await,
            None => Ok(Vec::new()),
        }
    }
}
