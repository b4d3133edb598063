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

//! Fabric zone.
//!
//! Zones reference other zones (`ContainsZones`, `ContainedByZones`)
//! and endpoints that reference zones back. Links are followed one at
//! a time on request, so cycles are never walked implicitly.

use crate::endpoint::Endpoint;
use crate::resource::ResourceProvidesStatus;
use crate::resource::Status;
use fishbind_core::action::supported;
use fishbind_core::Action;
use fishbind_core::ActionOutcome;
use fishbind_core::Bmc;
use fishbind_core::Empty;
use fishbind_core::Entity;
use fishbind_core::EntityType;
use fishbind_core::Error;
use fishbind_core::Link;
use fishbind_core::Links;
use fishbind_core::Many;
use fishbind_core::ODataETag;
use fishbind_core::ODataId;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

/// Kind of zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ZoneType {
    Default,
    ZoneOfEndpoints,
    ZoneOfZones,
    ZoneOfResourceBlocks,
}

/// Who may access the zone's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ExternalAccessibility {
    GloballyAccessible,
    NonZonedAccessible,
    ZoneOnly,
    NoInternalRouting,
}

/// Parameters of `#Zone.AddEndpoint` and `#Zone.RemoveEndpoint`.
///
/// Both tags are optional. A service that checks them rejects a stale
/// tag with `412`, reported as [`fishbind_core::ErrorKind::Conflict`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRequest {
    /// Endpoint to add or remove.
    #[serde(rename = "Endpoint")]
    pub endpoint: Link,
    /// Current tag of the endpoint.
    #[serde(rename = "EndpointETag", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_etag: Option<ODataETag>,
    /// Current tag of the zone.
    #[serde(rename = "ZoneETag", default, skip_serializing_if = "Option::is_none")]
    pub zone_etag: Option<ODataETag>,
}

impl EndpointRequest {
    /// Request for `endpoint` without tags.
    #[must_use]
    pub fn new(endpoint: ODataId) -> Self {
        Self {
            endpoint: Link::new(endpoint),
            endpoint_etag: None,
            zone_etag: None,
        }
    }

    /// Set the endpoint tag.
    #[must_use]
    pub fn endpoint_etag(mut self, etag: ODataETag) -> Self {
        self.endpoint_etag = Some(etag);
        self
    }

    /// Set the zone tag.
    #[must_use]
    pub fn zone_etag(mut self, etag: ODataETag) -> Self {
        self.zone_etag = Some(etag);
        self
    }
}

/// Zone links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneLinks {
    /// Address pools of the zone.
    #[serde(rename = "AddressPools", default, skip_serializing_if = "Links::is_empty")]
    pub address_pools: Links,
    /// Zones containing this zone.
    #[serde(rename = "ContainedByZones", default, skip_serializing_if = "Links::is_empty")]
    pub contained_by_zones: Links,
    /// Zones this zone contains.
    #[serde(rename = "ContainsZones", default, skip_serializing_if = "Links::is_empty")]
    pub contains_zones: Links,
    /// Member endpoints.
    #[serde(rename = "Endpoints", default)]
    pub endpoints: Links,
    /// Advisory count of [`ZoneLinks::endpoints`].
    #[serde(rename = "Endpoints@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub endpoints_count: Option<i64>,
    /// Switches in the zone.
    #[serde(rename = "InvolvedSwitches", default, skip_serializing_if = "Links::is_empty")]
    pub involved_switches: Links,
    /// Resource blocks in the zone.
    #[serde(rename = "ResourceBlocks", default, skip_serializing_if = "Links::is_empty")]
    pub resource_blocks: Links,
}

/// Zone actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneActions {
    /// `#Zone.AddEndpoint`.
    #[serde(rename = "#Zone.AddEndpoint", default, skip_serializing_if = "Option::is_none")]
    pub add_endpoint: Option<Action<EndpointRequest, Empty>>,
    /// `#Zone.RemoveEndpoint`.
    #[serde(rename = "#Zone.RemoveEndpoint", default, skip_serializing_if = "Option::is_none")]
    pub remove_endpoint: Option<Action<EndpointRequest, Empty>>,
}

/// Redfish `Zone`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Zone {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Routing between endpoints of the zone is enabled by default.
    #[serde(rename = "DefaultRoutingEnabled", default, skip_serializing_if = "Option::is_none")]
    pub default_routing_enabled: Option<bool>,
    /// Accessibility of the zone's endpoints.
    #[serde(rename = "ExternalAccessibility", default, skip_serializing_if = "Option::is_none")]
    pub external_accessibility: Option<ExternalAccessibility>,
    /// Kind of zone.
    #[serde(rename = "ZoneType", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Links.
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ZoneLinks>,
    /// Actions.
    #[serde(rename = "Actions", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ZoneActions>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for Zone {
    const WRITABLE: &'static [&'static str] =
        &["DefaultRoutingEnabled", "ExternalAccessibility", "ZoneType"];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for Zone {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`Zone`].
pub trait ZoneExt<B: Bmc> {
    /// Member endpoints.
    fn endpoints(&self) -> impl Future<Output = Many<Endpoint, B>> + Send;

    /// Zones this zone contains.
    fn contains_zones(&self) -> impl Future<Output = Many<Zone, B>> + Send;

    /// Zones containing this zone.
    fn contained_by_zones(&self) -> impl Future<Output = Many<Zone, B>> + Send;

    /// Invoke `#Zone.AddEndpoint`.
    ///
    /// # Errors
    ///
    /// [`Error::ActionNotSupported`] if the zone does not advertise the
    /// action, [`Error::Conflict`] if a tag is stale, otherwise errors
    /// of the action request.
    fn add_endpoint(
        &self,
        request: &EndpointRequest,
    ) -> impl Future<Output = Result<ActionOutcome<Empty>, Error>> + Send;

    /// Invoke `#Zone.RemoveEndpoint`.
    ///
    /// # Errors
    ///
    /// See [`ZoneExt::add_endpoint`].
    fn remove_endpoint(
        &self,
        request: &EndpointRequest,
    ) -> impl Future<Output = Result<ActionOutcome<Empty>, Error>> + Send;

    /// Request for `endpoint` carrying the current tags of both the
    /// endpoint and this zone.
    fn endpoint_request(&self, endpoint: &Entity<Endpoint, B>) -> EndpointRequest;
}

impl<B: Bmc> ZoneExt<B> for Entity<Zone, B> {
    async fn endpoints(&self) -> Many<Endpoint, B> {
        let empty = Links::default();
        let links = self.links.as_ref().map_or(&empty, |l| &l.endpoints);
        self.follow_all(links).await
    }

    async fn contains_zones(&self) -> Many<Zone, B> {
        let empty = Links::default();
        let links = self.links.as_ref().map_or(&empty, |l| &l.contains_zones);
        self.follow_all(links).await
    }

    async fn contained_by_zones(&self) -> Many<Zone, B> {
        let empty = Links::default();
        let links = self.links.as_ref().map_or(&empty, |l| &l.contained_by_zones);
        self.follow_all(links).await
    }

    async fn add_endpoint(&self, request: &EndpointRequest) -> Result<ActionOutcome<Empty>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.add_endpoint.as_ref()),
            "#Zone.AddEndpoint",
        )?;
        action
            .run_with_headers(self.client(), request, &self.request_headers())
            .await
    }

    async fn remove_endpoint(
        &self,
        request: &EndpointRequest,
    ) -> Result<ActionOutcome<Empty>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.remove_endpoint.as_ref()),
            "#Zone.RemoveEndpoint",
        )?;
        action
            .run_with_headers(self.client(), request, &self.request_headers())
            .await
    }

    fn endpoint_request(&self, endpoint: &Entity<Endpoint, B>) -> EndpointRequest {
        EndpointRequest {
            endpoint: Link::new(endpoint.odata_id().clone()),
            endpoint_etag: endpoint.etag().cloned(),
            zone_etag: self.etag().cloned(),
        }
    }
}
