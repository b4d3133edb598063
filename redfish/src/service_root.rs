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

//! Service root (`/redfish/v1`).

use fishbind_core::Bmc;
use fishbind_core::Client;
use fishbind_core::Entity;
use fishbind_core::EntityType;
use fishbind_core::Error;
use fishbind_core::Link;
use fishbind_core::ODataId;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

#[cfg(feature = "composition-service")]
use crate::composition_service::CompositionService;
#[cfg(feature = "computer-systems")]
use crate::computer_system::ComputerSystem;
#[cfg(feature = "task-service")]
use crate::task_service::TaskService;

/// Entry point of a Redfish service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRoot {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Redfish protocol version.
    #[serde(rename = "RedfishVersion", default, skip_serializing_if = "Option::is_none")]
    pub redfish_version: Option<String>,
    /// Service UUID.
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Vendor.
    #[serde(rename = "Vendor", default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Computer systems collection.
    #[serde(rename = "Systems", default, skip_serializing_if = "Link::is_empty")]
    pub systems: Link,
    /// Chassis collection.
    #[serde(rename = "Chassis", default, skip_serializing_if = "Link::is_empty")]
    pub chassis: Link,
    /// Managers collection.
    #[serde(rename = "Managers", default, skip_serializing_if = "Link::is_empty")]
    pub managers: Link,
    /// Fabrics collection.
    #[serde(rename = "Fabrics", default, skip_serializing_if = "Link::is_empty")]
    pub fabrics: Link,
    /// Swordfish storage collection.
    #[serde(rename = "Storage", default, skip_serializing_if = "Link::is_empty")]
    pub storage: Link,
    /// Task service.
    #[serde(rename = "Tasks", default, skip_serializing_if = "Link::is_empty")]
    pub tasks: Link,
    /// Composition service.
    #[serde(rename = "CompositionService", default, skip_serializing_if = "Link::is_empty")]
    pub composition_service: Link,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for ServiceRoot {
    const WRITABLE: &'static [&'static str] = &[];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ServiceRoot {
    /// Fetch the service root.
    ///
    /// # Errors
    ///
    /// Returns error if retrieving the root path via Redfish fails.
    pub async fn get<B: Bmc>(client: &Client<B>) -> Result<Entity<Self, B>, Error> {
        client.get(&ODataId::service_root()).await
    }
}

/// Navigation from the service root.
pub trait ServiceRootExt<B: Bmc> {
    /// All computer systems. Empty if the service has none.
    #[cfg(feature = "computer-systems")]
    fn systems(&self) -> impl Future<Output = Result<Vec<Entity<ComputerSystem, B>>, Error>> + Send;

    /// Task service, if the service provides one.
    #[cfg(feature = "task-service")]
    fn task_service(&self) -> impl Future<Output = Result<Option<Entity<TaskService, B>>, Error>> + Send;

    /// Composition service, if the service provides one.
    #[cfg(feature = "composition-service")]
    fn composition_service(
        &self,
    ) -> impl Future<Output = Result<Option<Entity<CompositionService, B>>, Error>> + Send;
}

impl<B: Bmc> ServiceRootExt<B> for Entity<ServiceRoot, B> {
    #[cfg(feature = "computer-systems")]
    async fn systems(&self) -> Result<Vec<Entity<ComputerSystem, B>>, Error> {
        match self.systems.id() {
            Some(id) => self.client().get_collection(id).await,
            None => Ok(Vec::new()),
        }
    }

    #[cfg(feature = "task-service")]
    async fn task_service(&self) -> Result<Option<Entity<TaskService, B>>, Error> {
        self.follow(&self.tasks).await
    }

    #[cfg(feature = "composition-service")]
    async fn composition_service(&self) -> Result<Option<Entity<CompositionService, B>>, Error> {
        self.follow(&self.composition_service).await
    }
}
