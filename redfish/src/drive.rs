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

//! Drive

use crate::resource::IndicatorLed;
use crate::resource::ResourceProvidesStatus;
use crate::resource::Status;
use crate::volume::Volume;
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
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;

#[cfg(feature = "assembly")]
use crate::assembly::Assembly;

/// Drive state as shown by its status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum StatusIndicator {
    #[serde(rename = "OK")]
    Ok,
    Fail,
    Rebuild,
    PredictiveFailureAnalysis,
    Hotspare,
    InACriticalArray,
    InAFailedArray,
}

/// Replacement mode of a hot spare drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HotspareReplacementMode {
    Revertible,
    NonRevertible,
}

/// Hot spare scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HotspareType {
    None,
    Global,
    Chassis,
    Dedicated,
}

/// Drive links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveLinks {
    /// Chassis containing the drive.
    #[serde(rename = "Chassis", default, skip_serializing_if = "Link::is_empty")]
    pub chassis: Link,
    /// Volumes using the drive.
    #[serde(rename = "Volumes", default)]
    pub volumes: Links,
    /// Advisory count of [`DriveLinks::volumes`].
    #[serde(rename = "Volumes@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub volumes_count: Option<i64>,
    /// Endpoints exposing the drive.
    #[serde(rename = "Endpoints", default)]
    pub endpoints: Links,
    /// Advisory count of [`DriveLinks::endpoints`].
    #[serde(rename = "Endpoints@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub endpoints_count: Option<i64>,
    /// PCIe functions of the drive.
    #[serde(rename = "PCIeFunctions", default, skip_serializing_if = "Links::is_empty")]
    pub pcie_functions: Links,
}

/// Drive actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveActions {
    /// `#Drive.SecureErase`.
    #[serde(rename = "#Drive.SecureErase", default, skip_serializing_if = "Option::is_none")]
    pub secure_erase: Option<Action<Empty, Empty>>,
}

/// Redfish `Drive`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Drive {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// User-assigned asset tag.
    #[serde(
        rename = "AssetTag",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_tag: Option<Option<String>>,
    /// Assembly of the drive.
    #[serde(rename = "Assembly", default, skip_serializing_if = "Link::is_empty")]
    pub assembly: Link,
    /// Block size.
    #[serde(rename = "BlockSizeBytes", default, skip_serializing_if = "Option::is_none")]
    pub block_size_bytes: Option<i64>,
    /// Maximum speed the drive can run at.
    #[serde(rename = "CapableSpeedGbs", default, skip_serializing_if = "Option::is_none")]
    pub capable_speed_gbs: Option<f64>,
    /// Raw capacity.
    #[serde(
        rename = "CapacityBytes",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub capacity_bytes: Option<Option<i64>>,
    /// Encryption capability.
    #[serde(rename = "EncryptionAbility", default, skip_serializing_if = "Option::is_none")]
    pub encryption_ability: Option<String>,
    /// Encryption status.
    #[serde(rename = "EncryptionStatus", default, skip_serializing_if = "Option::is_none")]
    pub encryption_status: Option<String>,
    /// True if a failure is predicted.
    #[serde(rename = "FailurePredicted", default, skip_serializing_if = "Option::is_none")]
    pub failure_predicted: Option<bool>,
    /// Hot spare replacement mode.
    #[serde(rename = "HotspareReplacementMode", default, skip_serializing_if = "Option::is_none")]
    pub hotspare_replacement_mode: Option<HotspareReplacementMode>,
    /// Hot spare scope.
    #[serde(rename = "HotspareType", default, skip_serializing_if = "Option::is_none")]
    pub hotspare_type: Option<HotspareType>,
    /// Indicator LED.
    #[serde(rename = "IndicatorLED", default, skip_serializing_if = "Option::is_none")]
    pub indicator_led: Option<IndicatorLed>,
    /// Location indicator.
    #[serde(rename = "LocationIndicatorActive", default, skip_serializing_if = "Option::is_none")]
    pub location_indicator_active: Option<bool>,
    /// Manufacturer.
    #[serde(rename = "Manufacturer", default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Media type (`HDD`, `SSD`, `SMR`).
    #[serde(rename = "MediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Model.
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Part number.
    #[serde(rename = "PartNumber", default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    /// Protocol the drive uses.
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Revision.
    #[serde(rename = "Revision", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Serial number.
    #[serde(rename = "SerialNumber", default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Status indicator. Read-only through this binding.
    #[serde(rename = "StatusIndicator", default, skip_serializing_if = "Option::is_none")]
    pub status_indicator: Option<StatusIndicator>,
    /// Write cache state.
    #[serde(rename = "WriteCacheEnabled", default, skip_serializing_if = "Option::is_none")]
    pub write_cache_enabled: Option<bool>,
    /// Links.
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<DriveLinks>,
    /// Actions.
    #[serde(rename = "Actions", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<DriveActions>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for Drive {
    const WRITABLE: &'static [&'static str] = &[
        "AssetTag",
        "HotspareReplacementMode",
        "HotspareType",
        "IndicatorLED",
        "LocationIndicatorActive",
        "WriteCacheEnabled",
    ];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for Drive {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`Drive`].
pub trait DriveExt<B: Bmc> {
    /// Volumes that use this drive.
    fn volumes(&self) -> impl Future<Output = Many<Volume, B>> + Send;

    /// Assembly of the drive, if linked.
    #[cfg(feature = "assembly")]
    fn assembly(&self) -> impl Future<Output = Result<Option<Entity<Assembly, B>>, Error>> + Send;

    /// Invoke `#Drive.SecureErase`.
    ///
    /// # Errors
    ///
    /// [`Error::ActionNotSupported`] if the drive does not advertise
    /// the action, otherwise errors of the action request.
    fn secure_erase(&self) -> impl Future<Output = Result<ActionOutcome<Empty>, Error>> + Send;
}

impl<B: Bmc> DriveExt<B> for Entity<Drive, B> {
    async fn volumes(&self) -> Many<Volume, B> {
        match &self.links {
            Some(links) => self.follow_all(&links.volumes).await,
            None => self.follow_all(&Links::default()).await,
        }
    }

    #[cfg(feature = "assembly")]
    async fn assembly(&self) -> Result<Option<Entity<Assembly, B>>, Error> {
        self.follow(&self.assembly).await
    }

    async fn secure_erase(&self) -> Result<ActionOutcome<Empty>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.secure_erase.as_ref()),
            "#Drive.SecureErase",
        )?;
        action
            .run_with_headers(self.client(), &Empty {}, &self.request_headers())
            .await
    }
}
