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

//! Composition service.
//!
//! `#CompositionService.Compose` takes a manifest describing the
//! systems to build out of resource blocks. A `Preview` request only
//! reports what would be composed, `PreviewReserve` additionally
//! reserves the blocks and returns a reservation that a later `Apply`
//! can refer to.

use crate::resource::ResourceProvidesStatus;
use crate::resource::Status;
use fishbind_core::action::supported;
use fishbind_core::Action;
use fishbind_core::ActionOutcome;
use fishbind_core::Bmc;
use fishbind_core::Entity;
use fishbind_core::EntityType;
use fishbind_core::Error;
use fishbind_core::Link;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

/// Kind of compose request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComposeRequestType {
    /// Report the result without composing.
    Preview,
    /// Report the result and reserve the resources.
    PreviewReserve,
    /// Compose.
    Apply,
}

/// Format of the compose request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComposeRequestFormat {
    /// Request carries a manifest.
    Manifest,
}

/// Parameters of `#CompositionService.Compose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeRequest {
    /// Kind of request.
    #[serde(rename = "RequestType")]
    pub request_type: ComposeRequestType,
    /// Format of the request.
    #[serde(rename = "RequestFormat")]
    pub request_format: ComposeRequestFormat,
    /// Manifest describing the composition.
    #[serde(rename = "Manifest", default, skip_serializing_if = "JsonValue::is_null")]
    pub manifest: JsonValue,
    /// Reservation obtained from a `PreviewReserve` request.
    #[serde(rename = "ReservationId", default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

impl ComposeRequest {
    /// Manifest request of the given type.
    #[must_use]
    pub fn manifest(request_type: ComposeRequestType, manifest: JsonValue) -> Self {
        Self {
            request_type,
            request_format: ComposeRequestFormat::Manifest,
            manifest,
            reservation_id: None,
        }
    }

    /// Apply a previously made reservation.
    #[must_use]
    pub fn reservation_id(mut self, id: impl Into<String>) -> Self {
        self.reservation_id = Some(id.into());
        self
    }
}

/// Response body of `#CompositionService.Compose`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeResponse {
    /// Manifest as processed by the service.
    #[serde(rename = "Manifest", default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<JsonValue>,
    /// Format of the request.
    #[serde(rename = "RequestFormat", default, skip_serializing_if = "Option::is_none")]
    pub request_format: Option<ComposeRequestFormat>,
    /// Kind of request.
    #[serde(rename = "RequestType", default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<ComposeRequestType>,
    /// Reservation made by a `PreviewReserve` request.
    #[serde(rename = "ReservationId", default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

/// Composition service actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositionServiceActions {
    /// `#CompositionService.Compose`.
    #[serde(rename = "#CompositionService.Compose", default, skip_serializing_if = "Option::is_none")]
    pub compose: Option<Action<ComposeRequest, ComposeResponse>>,
}

/// Redfish `CompositionService`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositionService {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Service is enabled.
    #[serde(rename = "ServiceEnabled", default, skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    /// Resource blocks may be shared between compositions.
    #[serde(rename = "AllowOverprovisioning", default, skip_serializing_if = "Option::is_none")]
    pub allow_overprovisioning: Option<bool>,
    /// How long a reservation is held (ISO 8601 duration).
    #[serde(rename = "ReservationDuration", default, skip_serializing_if = "Option::is_none")]
    pub reservation_duration: Option<String>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Resource blocks collection.
    #[serde(rename = "ResourceBlocks", default, skip_serializing_if = "Link::is_empty")]
    pub resource_blocks: Link,
    /// Resource zones collection.
    #[serde(rename = "ResourceZones", default, skip_serializing_if = "Link::is_empty")]
    pub resource_zones: Link,
    /// Blocks in use.
    #[serde(rename = "ActivePool", default, skip_serializing_if = "Link::is_empty")]
    pub active_pool: Link,
    /// Blocks available for composition.
    #[serde(rename = "FreePool", default, skip_serializing_if = "Link::is_empty")]
    pub free_pool: Link,
    /// Outstanding reservations.
    #[serde(rename = "CompositionReservations", default, skip_serializing_if = "Link::is_empty")]
    pub composition_reservations: Link,
    /// Actions.
    #[serde(rename = "Actions", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<CompositionServiceActions>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for CompositionService {
    const WRITABLE: &'static [&'static str] =
        &["AllowOverprovisioning", "ReservationDuration", "ServiceEnabled"];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for CompositionService {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`CompositionService`].
pub trait CompositionServiceExt {
    /// Invoke `#CompositionService.Compose`.
    ///
    /// A service that composes synchronously answers with the
    /// [`ComposeResponse`]; one that composes in the background answers
    /// with a task.
    ///
    /// # Errors
    ///
    /// [`Error::ActionNotSupported`] if the service does not advertise
    /// the action, otherwise errors of the action request.
    fn compose(
        &self,
        request: &ComposeRequest,
    ) -> impl Future<Output = Result<ActionOutcome<ComposeResponse>, Error>> + Send;
}

impl<B: Bmc> CompositionServiceExt for Entity<CompositionService, B> {
    async fn compose(&self, request: &ComposeRequest) -> Result<ActionOutcome<ComposeResponse>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.compose.as_ref()),
            "#CompositionService.Compose",
        )?;
        action
            .run_with_headers(self.client(), request, &self.request_headers())
            .await
    }
}
