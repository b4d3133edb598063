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

//! Fabric endpoint.

use crate::resource::ResourceProvidesStatus;
use crate::resource::Status;
use fishbind_core::EntityType;
use fishbind_core::Link;
use fishbind_core::Links;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Entity reachable through an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectedEntity {
    /// Kind of entity (`Drive`, `Processor`, `Volume`, ...).
    #[serde(rename = "EntityType", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// `Initiator`, `Target` or `Both`.
    #[serde(rename = "EntityRole", default, skip_serializing_if = "Option::is_none")]
    pub entity_role: Option<String>,
    /// The entity itself.
    #[serde(rename = "EntityLink", default, skip_serializing_if = "Link::is_empty")]
    pub entity_link: Link,
}

/// Endpoint links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointLinks {
    /// Endpoints that cannot be used together with this one.
    #[serde(rename = "MutuallyExclusiveEndpoints", default, skip_serializing_if = "Links::is_empty")]
    pub mutually_exclusive_endpoints: Links,
    /// Physical ports of the endpoint.
    #[serde(rename = "Ports", default, skip_serializing_if = "Links::is_empty")]
    pub ports: Links,
}

/// Redfish `Endpoint`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoint {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Protocol of the endpoint.
    #[serde(rename = "EndpointProtocol", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_protocol: Option<String>,
    /// Entities the endpoint gives access to.
    #[serde(rename = "ConnectedEntities", default, skip_serializing_if = "Vec::is_empty")]
    pub connected_entities: Vec<ConnectedEntity>,
    /// Memory reserved for the host.
    #[serde(
        rename = "HostReservationMemoryBytes",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub host_reservation_memory_bytes: Option<Option<i64>>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Links.
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<EndpointLinks>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for Endpoint {
    const WRITABLE: &'static [&'static str] = &[];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for Endpoint {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}
