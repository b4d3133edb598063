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

//! Entity envelope
//!
//! An [`Entity`] binds a typed schema value to three things the engine
//! needs for a round trip:
//! - the response body exactly as received (`raw`),
//! - the concurrency token (`@odata.etag`, else the `ETag` header),
//! - the [`Client`] used for follow-up requests.
//!
//! The typed value is reachable through `Deref`/`DerefMut`, so callers
//! mutate fields directly and then call [`Entity::update`]. Only
//! properties listed in [`EntityType::WRITABLE`] whose value differs
//! from `raw` are sent.
//!
//! Raw bytes after an update: when the PATCH response carries the
//! resource representation (it has `@odata.id`), the entity adopts it
//! (bytes, typed value and tag). Otherwise the sent properties are merged
//! into the retained document so a repeated `update` is a no-op. The tag
//! is replaced only when the service sends a new one; call
//! [`Entity::refresh`] for a fresh representation.

use crate::client::Client;
use crate::client::Many;
use crate::odata::ODATA_ID;
use crate::payload;
use crate::task::TaskMonitorInfo;
use crate::Bmc;
use crate::Error;
use crate::ExtendedInfo;
use crate::Link;
use crate::Links;
use crate::ODataETag;
use crate::ODataId;
use crate::Response;
use http::header::IF_MATCH;
use http::HeaderMap;
use http::HeaderValue;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use tracing::debug;
use tracing::instrument;

/// Name of the top-level extended info annotation in success bodies.
const MESSAGE_EXTENDED_INFO: &str = "@Message.ExtendedInfo";

/// Capability every schema provides to the engine.
pub trait EntityType: Serialize + DeserializeOwned + Send + Sync {
    /// Client-writable (PATCHable) property names.
    const WRITABLE: &'static [&'static str];

    /// Common identity fields.
    fn base(&self) -> &ResourceBase;

    /// Extra headers for every request issued on behalf of this
    /// resource.
    fn request_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Identity properties shared by every resource. Schemas embed it with
/// `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBase {
    /// `@odata.id`.
    #[serde(rename = "@odata.id", default)]
    pub odata_id: ODataId,
    /// `@odata.type`.
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    /// `@odata.context`.
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub odata_context: Option<String>,
    /// `@odata.etag`.
    #[serde(rename = "@odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub odata_etag: Option<ODataETag>,
    /// `Id`.
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `Name`.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Description`; `Some(None)` when the service sent `null`.
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "crate::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

/// Options of [`Entity::update_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Do not send `If-Match` even if the entity carries a tag.
    pub force_write: bool,
}

impl UpdateOptions {
    /// Default options.
    #[must_use]
    pub const fn new() -> Self {
        Self { force_write: false }
    }

    /// Omit `If-Match` on this write.
    #[must_use]
    pub const fn force_write(mut self, force: bool) -> Self {
        self.force_write = force;
        self
    }
}

/// Result of [`Entity::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Nothing changed; no request was sent.
    Unchanged,
    /// PATCH accepted.
    Applied {
        /// Informational messages returned by the service.
        extended_info: Vec<ExtendedInfo>,
    },
    /// PATCH accepted with at least one warning or error message,
    /// i.e. some properties may not have been applied.
    PartiallyApplied {
        /// Messages returned by the service.
        extended_info: Vec<ExtendedInfo>,
    },
    /// PATCH answered `202 Accepted`: the change runs as a task. The
    /// retained representation is left as it was, so local edits stay
    /// pending until [`Entity::refresh`] after the task completes.
    Accepted(TaskMonitorInfo),
}

impl UpdateOutcome {
    /// True if no request was sent.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Task monitor of an asynchronous PATCH.
    #[must_use]
    pub const fn task_monitor(&self) -> Option<&TaskMonitorInfo> {
        match self {
            Self::Accepted(info) => Some(info),
            _ => None,
        }
    }

    /// Messages attached to the PATCH response.
    #[must_use]
    pub fn extended_info(&self) -> &[ExtendedInfo] {
        match self {
            Self::Unchanged | Self::Accepted(_) => &[],
            Self::Applied { extended_info } | Self::PartiallyApplied { extended_info } => {
                extended_info
            }
        }
    }
}

/// Typed resource together with its retained representation.
pub struct Entity<T, B> {
    data: T,
    raw: Vec<u8>,
    etag: Option<ODataETag>,
    etag_match: bool,
    client: Client<B>,
}

impl<T: EntityType, B: Bmc> Entity<T, B> {
    /// Bind a successful GET (or POST) response.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the body does not decode into `T`.
    pub fn from_response(client: Client<B>, response: Response) -> Result<Self, Error> {
        let data = decode::<T>(&response.body)?;
        let etag = data.base().odata_etag.clone().or_else(|| response.etag());
        Ok(Self {
            data,
            raw: response.body,
            etag: etag.filter(|tag| !tag.is_empty()),
            etag_match: true,
            client,
        })
    }

    /// Body bytes as last received from the service.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Concurrency token.
    #[must_use]
    pub const fn etag(&self) -> Option<&ODataETag> {
        self.etag.as_ref()
    }

    /// `@odata.id` of the resource.
    #[must_use]
    pub fn odata_id(&self) -> &ODataId {
        &self.data.base().odata_id
    }

    /// Client used for follow-up requests.
    #[must_use]
    pub const fn client(&self) -> &Client<B> {
        &self.client
    }

    /// Drop the envelope and return the typed value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Never send `If-Match` for this entity. Some services reject
    /// conditional writes.
    pub fn disable_etag_match(&mut self) {
        self.etag_match = false;
    }

    /// Compute the PATCH body without issuing any request.
    ///
    /// # Errors
    ///
    /// Encoding errors from [`payload::build`].
    pub fn patch_payload(&self) -> Result<Option<JsonMap<String, JsonValue>>, Error> {
        payload::build(&self.data, &self.raw, T::WRITABLE)
    }

    /// Headers for a write: resource headers plus `If-Match` when a tag
    /// is known, matching is enabled and `force_write` is off.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHeader`] if the tag cannot be sent as a header.
    pub fn write_headers(&self, force_write: bool) -> Result<HeaderMap, Error> {
        let mut headers = self.data.request_headers();
        if !force_write && self.etag_match {
            if let Some(etag) = &self.etag {
                headers.insert(IF_MATCH, HeaderValue::from_str(etag.as_str())?);
            }
        }
        Ok(headers)
    }

    /// PATCH changed writable properties.
    ///
    /// # Errors
    ///
    /// Encoding errors (no request sent) or errors of the transport.
    pub async fn update(&mut self) -> Result<UpdateOutcome, Error> {
        self.update_with(UpdateOptions::default()).await
    }

    /// PATCH changed writable properties with explicit options.
    ///
    /// # Errors
    ///
    /// Encoding errors (no request sent) or errors of the transport.
    #[instrument(skip(self), fields(odata_id = %self.odata_id()))]
    pub async fn update_with(&mut self, options: UpdateOptions) -> Result<UpdateOutcome, Error> {
        let Some(payload) = self.patch_payload()? else {
            debug!("no writable property changed");
            return Ok(UpdateOutcome::Unchanged);
        };
        let headers = self.write_headers(options.force_write)?;
        let body = serde_json::to_vec(&payload).map_err(Error::Encode)?;
        let uri = self.odata_id().to_string();
        let response = self.client.bmc().patch(&uri, body, &headers).await?;
        self.absorb_patch_response(payload, response)
    }

    fn absorb_patch_response(
        &mut self,
        sent: JsonMap<String, JsonValue>,
        response: Response,
    ) -> Result<UpdateOutcome, Error> {
        if response.status == StatusCode::ACCEPTED {
            let info = TaskMonitorInfo::from_accepted(&response)?;
            debug!(location = %info.location, "update continues as a task");
            return Ok(UpdateOutcome::Accepted(info));
        }
        let body = if response.is_body_empty() {
            None
        } else {
            serde_json::from_slice::<JsonValue>(&response.body).ok()
        };
        let extended_info = body
            .as_ref()
            .and_then(|v| v.get(MESSAGE_EXTENDED_INFO))
            .and_then(|v| serde_json::from_value::<Vec<ExtendedInfo>>(v.clone()).ok())
            .unwrap_or_default();
        let is_resource = body.as_ref().map_or(false, |v| v.get(ODATA_ID).is_some());
        let header_etag = response.etag();

        if is_resource {
            match decode::<T>(&response.body) {
                Ok(data) => {
                    let etag = data.base().odata_etag.clone().or(header_etag);
                    self.data = data;
                    self.raw = response.body;
                    if let Some(etag) = etag.filter(|tag| !tag.is_empty()) {
                        self.etag = Some(etag);
                    }
                }
                Err(err) => {
                    // The write went through; only the echoed resource is unusable.
                    self.merge_sent(sent, header_etag)?;
                    return Err(err);
                }
            }
        } else {
            self.merge_sent(sent, header_etag)?;
        }

        Ok(if extended_info.iter().any(ExtendedInfo::is_problem) {
            UpdateOutcome::PartiallyApplied { extended_info }
        } else {
            UpdateOutcome::Applied { extended_info }
        })
    }

    fn merge_sent(
        &mut self,
        sent: JsonMap<String, JsonValue>,
        etag: Option<ODataETag>,
    ) -> Result<(), Error> {
        let mut original =
            serde_json::from_slice::<JsonMap<String, JsonValue>>(&self.raw).map_err(Error::Encode)?;
        original.extend(sent);
        self.raw = serde_json::to_vec(&original).map_err(Error::Encode)?;
        if let Some(etag) = etag.filter(|tag| !tag.is_empty()) {
            self.etag = Some(etag);
        }
        Ok(())
    }

    /// Re-read the resource, replacing typed value, raw bytes and tag.
    ///
    /// # Errors
    ///
    /// Errors of the transport or decode errors.
    #[instrument(skip(self), fields(odata_id = %self.odata_id()))]
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let uri = self.odata_id().to_string();
        let headers = self.data.request_headers();
        let response = self.client.bmc().get(&uri, &headers).await?;
        let fresh = Self::from_response(self.client.clone(), response)?;
        self.data = fresh.data;
        self.raw = fresh.raw;
        self.etag = fresh.etag;
        Ok(())
    }

    /// DELETE the resource (with `If-Match` when a tag is known).
    ///
    /// Returns the task monitor when the service answers `202 Accepted`.
    ///
    /// # Errors
    ///
    /// Errors of the transport.
    #[instrument(skip(self), fields(odata_id = %self.odata_id()))]
    pub async fn delete(self) -> Result<Option<TaskMonitorInfo>, Error> {
        let headers = self.write_headers(false)?;
        let response = self
            .client
            .bmc()
            .delete(self.odata_id().as_str(), &headers)
            .await?;
        if response.status == StatusCode::ACCEPTED {
            TaskMonitorInfo::from_accepted(&response).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Resolve a single link. An empty link yields `Ok(None)` without
    /// any request.
    ///
    /// # Errors
    ///
    /// Errors of the transport or decode errors.
    pub async fn follow<L: EntityType>(&self, link: &Link) -> Result<Option<Entity<L, B>>, Error> {
        match link.id() {
            Some(id) => self.client.get::<L>(id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolve a link collection in tolerant mode.
    pub async fn follow_all<L: EntityType>(&self, links: &Links) -> Many<L, B> {
        self.client.get_many::<L>(links.ids()).await
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(de).map_err(Error::Decode)
}

impl<T, B> Deref for Entity<T, B> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T, B> DerefMut for Entity<T, B> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<T: Clone, B> Clone for Entity<T, B> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            raw: self.raw.clone(),
            etag: self.etag.clone(),
            etag_match: self.etag_match,
            client: self.client.clone(),
        }
    }
}

impl<T: fmt::Debug, B> fmt::Debug for Entity<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("data", &self.data)
            .field("raw_len", &self.raw.len())
            .field("etag", &self.etag)
            .field("etag_match", &self.etag_match)
            .finish_non_exhaustive()
    }
}
