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

//! Computer system.

use crate::resource::IndicatorLed;
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
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use std::future::Future;

/// Power state of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
}

/// Reset type of `#ComputerSystem.Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
    PowerCycle,
    Suspend,
    Pause,
    Resume,
}

/// Parameters of `#ComputerSystem.Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Type of reset.
    #[serde(rename = "ResetType")]
    pub reset_type: ResetType,
}

/// Boot settings. Written as a whole; properties not modelled here
/// (allowable value annotations, newer schema additions) are kept in
/// [`Boot::other`] so an untouched object compares equal. Modelled
/// members keep service `null`s for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Boot {
    /// `Once`, `Continuous` or `Disabled`.
    #[serde(
        rename = "BootSourceOverrideEnabled",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub boot_source_override_enabled: Option<Option<String>>,
    /// Boot source override target (`Pxe`, `Hdd`, ...).
    #[serde(
        rename = "BootSourceOverrideTarget",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub boot_source_override_target: Option<Option<String>>,
    /// `Legacy` or `UEFI`.
    #[serde(
        rename = "BootSourceOverrideMode",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub boot_source_override_mode: Option<Option<String>>,
    /// Persistent boot order.
    #[serde(
        rename = "BootOrder",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub boot_order: Option<Option<Vec<String>>>,
    /// Everything else.
    #[serde(flatten)]
    pub other: JsonMap<String, JsonValue>,
}

/// Links of a computer system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputerSystemLinks {
    /// Chassis containing the system.
    #[serde(rename = "Chassis", default, skip_serializing_if = "Links::is_empty")]
    pub chassis: Links,
    /// Managers of the system.
    #[serde(rename = "ManagedBy", default, skip_serializing_if = "Links::is_empty")]
    pub managed_by: Links,
    /// Fabric endpoints of the system.
    #[serde(rename = "Endpoints", default, skip_serializing_if = "Links::is_empty")]
    pub endpoints: Links,
}

/// Actions of a computer system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputerSystemActions {
    /// `#ComputerSystem.Reset`.
    #[serde(rename = "#ComputerSystem.Reset", default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<Action<ResetRequest, Empty>>,
}

/// Redfish `ComputerSystem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputerSystem {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// User-assigned asset tag; `Some(None)` clears it.
    #[serde(
        rename = "AssetTag",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_tag: Option<Option<String>>,
    /// DNS host name.
    #[serde(
        rename = "HostName",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub host_name: Option<Option<String>>,
    /// Indicator LED (deprecated in favour of location indicator).
    #[serde(rename = "IndicatorLED", default, skip_serializing_if = "Option::is_none")]
    pub indicator_led: Option<IndicatorLed>,
    /// Location indicator.
    #[serde(rename = "LocationIndicatorActive", default, skip_serializing_if = "Option::is_none")]
    pub location_indicator_active: Option<bool>,
    /// Manufacturer.
    #[serde(rename = "Manufacturer", default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Model.
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Serial number.
    #[serde(rename = "SerialNumber", default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// System UUID.
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Power state.
    #[serde(rename = "PowerState", default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
    /// Delay in seconds before power restore actions.
    #[serde(
        rename = "PowerOnDelaySeconds",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub power_on_delay_seconds: Option<Option<f64>>,
    /// Boot settings.
    #[serde(rename = "Boot", default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<Boot>,
    /// Status.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Storage subsystems.
    #[serde(rename = "Storage", default, skip_serializing_if = "Link::is_empty")]
    pub storage: Link,
    /// Links.
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ComputerSystemLinks>,
    /// Actions.
    #[serde(rename = "Actions", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ComputerSystemActions>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for ComputerSystem {
    const WRITABLE: &'static [&'static str] = &[
        "AssetTag",
        "HostName",
        "IndicatorLED",
        "LocationIndicatorActive",
        "PowerOnDelaySeconds",
        "Boot",
        "Oem",
    ];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

impl ResourceProvidesStatus for ComputerSystem {
    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Operations on a fetched [`ComputerSystem`].
pub trait ComputerSystemExt {
    /// Invoke `#ComputerSystem.Reset`.
    ///
    /// # Errors
    ///
    /// [`Error::ActionNotSupported`] if the system does not advertise
    /// the action, otherwise errors of the action request.
    fn reset(
        &self,
        reset_type: ResetType,
    ) -> impl Future<Output = Result<ActionOutcome<Empty>, Error>> + Send;
}

impl<B: Bmc> ComputerSystemExt for Entity<ComputerSystem, B> {
    async fn reset(&self, reset_type: ResetType) -> Result<ActionOutcome<Empty>, Error> {
        let action = supported(
            self.actions.as_ref().and_then(|a| a.reset.as_ref()),
            "#ComputerSystem.Reset",
        )?;
        action
            .run_with_headers(
                self.client(),
                &ResetRequest { reset_type },
                &self.request_headers(),
            )
            .await
    }
}
