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

//! Assembly
//!
//! An assembly resource lists the field replaceable parts of its
//! parent. `Assemblies` is written as a whole, so every entry keeps the
//! properties it does not model and an untouched list compares equal
//! to what the service returned.

use fishbind_core::Bmc;
use fishbind_core::Entity;
use fishbind_core::EntityType;
use fishbind_core::Error;
use fishbind_core::ODataId;
use fishbind_core::ResourceBase;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use std::future::Future;
use tagged_types::TaggedType;

#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Copy, PartialEq, Eq)]
#[transparent(Debug, Display)]
#[capability(inner_access)]
pub enum ProducerTag {}

/// Assembly producer (AKA manufacturer).
pub type Producer<T> = TaggedType<T, ProducerTag>;

/// Hardware identity of an assembly entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareId<'a> {
    /// Producer.
    pub producer: Option<Producer<&'a str>>,
    /// Model.
    pub model: Option<&'a str>,
    /// Part number.
    pub part_number: Option<&'a str>,
    /// Serial number.
    pub serial_number: Option<&'a str>,
}

/// One field replaceable part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyData {
    /// Identifier of the entry.
    #[serde(
        rename = "@odata.id",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub odata_id: Option<Option<ODataId>>,
    /// Member identifier within the list.
    #[serde(
        rename = "MemberId",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub member_id: Option<Option<String>>,
    /// URI of the binary data (FRU image) of the part.
    #[serde(
        rename = "BinaryDataURI",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub binary_data_uri: Option<Option<ODataId>>,
    /// Model.
    #[serde(
        rename = "Model",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<Option<String>>,
    /// Part number.
    #[serde(
        rename = "PartNumber",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub part_number: Option<Option<String>>,
    /// Producer.
    #[serde(
        rename = "Producer",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub producer: Option<Option<String>>,
    /// Serial number.
    #[serde(
        rename = "SerialNumber",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub serial_number: Option<Option<String>>,
    /// Vendor.
    #[serde(
        rename = "Vendor",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub vendor: Option<Option<String>>,
    /// Hardware version.
    #[serde(
        rename = "Version",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<Option<String>>,
    /// Location indicator.
    #[serde(
        rename = "LocationIndicatorActive",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_indicator_active: Option<Option<bool>>,
    /// Prepared for removal.
    #[serde(
        rename = "ReadyToRemove",
        default,
        deserialize_with = "fishbind_core::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub ready_to_remove: Option<Option<bool>>,
    /// Properties not modelled above.
    #[serde(flatten)]
    pub other: JsonMap<String, JsonValue>,
}

impl AssemblyData {
    /// Hardware identity of the entry. Null and absent values are both
    /// reported as `None`.
    #[must_use]
    pub fn hardware_id(&self) -> HardwareId<'_> {
        HardwareId {
            producer: flat(&self.producer).map(Producer::new),
            model: flat(&self.model),
            part_number: flat(&self.part_number),
            serial_number: flat(&self.serial_number),
        }
    }
}

fn flat(v: &Option<Option<String>>) -> Option<&str> {
    v.as_ref().and_then(Option::as_deref)
}

/// Redfish `Assembly`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assembly {
    /// Identity.
    #[serde(flatten)]
    pub base: ResourceBase,
    /// Parts.
    #[serde(rename = "Assemblies", default, skip_serializing_if = "Option::is_none")]
    pub assemblies: Option<Vec<AssemblyData>>,
    /// OEM extension.
    #[serde(rename = "Oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<JsonValue>,
}

impl EntityType for Assembly {
    const WRITABLE: &'static [&'static str] = &["Assemblies"];

    fn base(&self) -> &ResourceBase {
        &self.base
    }
}

/// Operations on a fetched [`Assembly`].
pub trait AssemblyExt {
    /// Binary data of the entry at `index`.
    ///
    /// `Ok(None)` if there is no such entry or the entry has no binary
    /// data.
    ///
    /// # Errors
    ///
    /// Errors of the transport.
    fn binary_data(&self, index: usize) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send;
}

impl<B: Bmc> AssemblyExt for Entity<Assembly, B> {
    async fn binary_data(&self, index: usize) -> Result<Option<Vec<u8>>, Error> {
        let uri = self
            .assemblies
            .as_ref()
            .and_then(|all| all.get(index))
            .and_then(|entry| entry.binary_data_uri.clone())
            .flatten()
            .filter(|uri| !uri.is_empty());
        match uri {
            Some(uri) => self.client().get_binary(&uri).await.map(Some),
            None => Ok(None),
        }
    }
}
