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

//! Swordfish volume.

use crate::drive::Drive;
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
use fishbind_core::Links;
use fishbind_core::Many;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

/// How `#Volume.Initialize` writes the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitializeType {
    /// Complete once the volume is available, erase in background.
    Fast,
    /// Complete once every block is erased.
    Slow,
}

/// Parameters of `#Volume.Initialize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Initialization type; service default if absent.
    #[serde(rename = "InitializeType", default, skip_serializing_if = "Option::is_none")]
    pub initialize_type: Option<InitializeType>,
}

/// Volume links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeLinks {
    /// Drives backing the volume.
    #[serde(rename = "Drives", default)]
    pub drives: Links,
    /// Advisory count of [`VolumeLinks::drives`].
    #[serde(rename = "Drives@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub drives_count: Option<i64>,
}

/// Volume actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeActions {
    /// `#Volume.Initialize`.
    #[serde(rename = "#Volume.Initialize", default, skip_serializing_if = "Option::is_none")]
    pub initialize: Option<Action<InitializeRequest, Empty>>,
}

/// Swordfish `Volume`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Volume {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Size; `Some(None)` writes `null`.
    #[serde(
        rename = "CapacityBytes",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub capacity_bytes: Option<Option<i64>>,
    /// User-assigned name.
    #[serde(
        rename = "DisplayName",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<Option<String>>,
    /// Encryption enabled.
    #[serde(rename = "Encrypted", default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    /// Encryption types used.
    #[serde(rename = "EncryptionTypes", default, skip_serializing_if = "Option::is_none")]
    pub encryption_types: Option<Vec<String>>,
    /// IO performance mode.
    #[serde(rename = "IOPerfModeEnabled", default, skip_serializing_if = "Option::is_none")]
    pub io_perf_mode_enabled: Option<bool>,
    /// RAID type.
    #[serde(rename = "RAIDType", default, skip_serializing_if = "Option::is_none")]
    pub raid_type: Option<String>,
    /// Read cache policy.
    #[serde(rename = "ReadCachePolicy", default, skip_serializing_if = "Option::is_none")]
    pub read_cache_policy: Option<String>,
    /// Write cache policy.
    #[serde(rename = "WriteCachePolicy", default, skip_serializing_if = "Option::is_none")]
    pub write_cache_policy: Option<String>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Links.
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<VolumeLinks>,
    /// Actions.
    #[serde(rename = "Actions", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<VolumeActions>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for Volume {
    const WRITABLE: &'static [&'static str] = &[
        "CapacityBytes",
        "DisplayName",
        "Encrypted",
        "EncryptionTypes",
        "IOPerfModeEnabled",
        "ReadCachePolicy",
        "WriteCachePolicy",
    ];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for Volume {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`Volume`].
pub trait VolumeExt<B: Bmc> {
    /// Drives backing the volume.
    fn drives(&self) -> impl Future<Output = Many<Drive, B>> + Send;

    /// Invoke `#Volume.Initialize`.
    ///
    /// # Errors
    ///
    /// [`Error::ActionNotSupported`] if the volume does not advertise
    /// the action, otherwise errors of the action request.
    fn initialize(
        &self,
        initialize_type: Option<InitializeType>,
    ) -> impl Future<Output = Result<ActionOutcome<Empty>, Error>> + Send;
}

impl<B: Bmc> VolumeExt<B> for Entity<Volume, B> {
    async fn drives(&self) -> Many<Drive, B> {
        match &self.links {
            Some(links) => self.follow_all(&links.drives).await,
            None => self.follow_all(&Links::default()).await,
        }
    }

    async fn initialize(
        &self,
        initialize_type: Option<InitializeType>,
    ) -> Result<ActionOutcome<Empty>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.initialize.as_ref()),
            "#Volume.Initialize",
        )?;
        action
            .run_with_headers(
                self.client(),
                &InitializeRequest { initialize_type },
                &self.request_headers(),
            )
            .await
    }
}
