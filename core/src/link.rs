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

//! OData links
//!
//! Schemas declare navigation properties as [`Link`] (single reference)
//! or [`Links`] (array of references). Both parse to URI strings only:
//!
//! - Single: `{ "@odata.id": "/redfish/v1/Chassis/1" }`
//! - Collection: `[ { "@odata.id": "/redfish/v1/Volumes/1" }, ... ]`
//!
//! Key points
//! - A missing property, `null` and `{}` all yield "no link", never an error.
//! - Expanded objects are accepted; only their `@odata.id` is kept.
//! - Collections keep document order and drop entries without `@odata.id`.
//! - Parsing never performs I/O. Resolution happens through
//!   [`crate::Entity::follow`] and [`crate::Entity::follow_all`].
//!
//! References:
//! - DMTF Redfish Specification DSP0266: `https://www.dmtf.org/standards/redfish`
//! - OASIS OData 4.01: navigation properties in JSON format

use crate::odata::ODATA_ID;
use crate::ODataId;
use serde::de;
use serde::de::Deserializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::convert::TryFrom;

/// Single navigation link. Empty if the property was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Link(Option<ODataId>);

impl Link {
    /// Link to `id`. A blank id produces an empty link.
    #[must_use]
    pub fn new(id: ODataId) -> Self {
        if id.is_empty() {
            Self(None)
        } else {
            Self(Some(id))
        }
    }

    /// Link that points nowhere.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Target identifier, if any.
    #[must_use]
    pub const fn id(&self) -> Option<&ODataId> {
        self.0.as_ref()
    }

    /// Target URI; empty string when the link is absent.
    #[must_use]
    pub fn uri(&self) -> &str {
        self.0.as_ref().map_or("", ODataId::as_str)
    }

    /// True when the link does not point anywhere.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl From<ODataId> for Link {
    fn from(id: ODataId) -> Self {
        Self::new(id)
    }
}

/// Extract `@odata.id` from a reference (or expanded) object.
fn reference_id<E: de::Error>(value: &JsonValue) -> Result<Option<ODataId>, E> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Object(obj) => match obj.get(ODATA_ID) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(ODataId::from(s.as_str())).filter(|v| !v.is_empty())),
            Some(other) => Err(E::custom(format!(
                "{ODATA_ID} must be a string, got {other}"
            ))),
        },
        other => Err(E::custom(format!(
            "expected link object, got {other}"
        ))),
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        reference_id(&value).map(Self)
    }
}

impl Serialize for Link {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(usize::from(self.0.is_some())))?;
        if let Some(id) = &self.0 {
            map.serialize_entry(ODATA_ID, id)?;
        }
        map.end()
    }
}

/// Array of navigation links in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Links(Vec<ODataId>);

impl Links {
    /// Links to the given identifiers, blank ones dropped.
    #[must_use]
    pub fn new(ids: Vec<ODataId>) -> Self {
        Self(ids.into_iter().filter(|id| !id.is_empty()).collect())
    }

    /// Target identifiers in document order.
    #[must_use]
    pub fn ids(&self) -> &[ODataId] {
        &self.0
    }

    /// Target URIs in document order.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(ODataId::as_str)
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the advisory `<Name>@odata.count` sibling against the
    /// parsed links. An absent count always matches.
    #[must_use]
    pub fn count_matches(&self, count: Option<i64>) -> bool {
        count.map_or(true, |count| {
            usize::try_from(count).map_or(false, |count| count == self.0.len())
        })
    }
}

impl From<Vec<ODataId>> for Links {
    fn from(ids: Vec<ODataId>) -> Self {
        Self::new(ids)
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Array(items) => items
                .iter()
                .filter_map(|item| reference_id::<D::Error>(item).transpose())
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
            other => Err(de::Error::custom(format!(
                "expected array of links, got {other}"
            ))),
        }
    }
}

impl Serialize for Links {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for id in &self.0 {
            seq.serialize_element(&Link(Some(id.clone())))?;
        }
        seq.end()
    }
}
