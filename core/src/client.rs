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

//! Fetcher
//!
//! [`Client`] is the shared, cheaply clonable handle every [`Entity`]
//! keeps for follow-up requests. It turns transport responses into typed
//! entities:
//!
//! - [`Client::get`]: one resource.
//! - [`Client::get_collection`]: every member of an OData collection,
//!   following `Members@odata.nextLink` until absent.
//! - [`Client::get_many`]: an explicit list of URIs in tolerant mode;
//!   per-URI failures are reported next to the successes.
//! - [`Client::create`]: POST a new member to a collection.
//! - [`Client::get_binary`]: raw bytes (`application/octet-stream`).

use crate::entity::decode;
use crate::odata::ODATA_ID;
use crate::task::TaskMonitorInfo;
use crate::Bmc;
use crate::Entity;
use crate::EntityType;
use crate::Error;
use crate::Links;
use crate::ODataId;
use crate::Response;
use crate::ServiceError;
use futures_util::stream;
use futures_util::StreamExt as _;
use http::header::ACCEPT;
use http::HeaderMap;
use http::HeaderValue;
use http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

/// Requests in flight for [`Client::get_many`].
const GET_MANY_CONCURRENCY: usize = 3;

/// Shared handle over a [`Bmc`] transport.
pub struct Client<B> {
    bmc: Arc<B>,
}

impl<B> Clone for Client<B> {
    fn clone(&self) -> Self {
        Self {
            bmc: Arc::clone(&self.bmc),
        }
    }
}

impl<B> fmt::Debug for Client<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Page of an OData resource collection.
#[derive(Debug, Deserialize)]
struct CollectionPage {
    #[serde(rename = "Members", default)]
    members: Links,
    #[serde(rename = "Members@odata.count")]
    count: Option<i64>,
    #[serde(rename = "Members@odata.nextLink")]
    next_link: Option<ODataId>,
}

/// Result of a tolerant multi-fetch, in input order.
pub struct Many<T, B> {
    /// Resources that were fetched and decoded.
    pub successes: Vec<Entity<T, B>>,
    /// URIs that failed, with the reason.
    pub failures: Vec<(ODataId, Error)>,
}

impl<T, B> Many<T, B> {
    /// True if every URI was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T: fmt::Debug, B> fmt::Debug for Many<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Many")
            .field("successes", &self.successes)
            .field("failures", &self.failures)
            .finish()
    }
}

/// Result of [`Client::create`].
pub enum Created<T, B> {
    /// The service returned the new resource.
    Entity(Entity<T, B>),
    /// The service returned only the location of the new resource.
    Location(ODataId),
    /// Creation continues asynchronously.
    Accepted(TaskMonitorInfo),
}

impl<T: fmt::Debug, B> fmt::Debug for Created<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            Self::Location(id) => f.debug_tuple("Location").field(id).finish(),
            Self::Accepted(info) => f.debug_tuple("Accepted").field(info).finish(),
        }
    }
}

impl<B: Bmc> Client<B> {
    /// Client over a transport.
    pub fn new(bmc: B) -> Self {
        Self { bmc: Arc::new(bmc) }
    }

    /// Client over an already shared transport.
    pub const fn from_arc(bmc: Arc<B>) -> Self {
        Self { bmc }
    }

    /// Underlying transport.
    #[must_use]
    pub fn bmc(&self) -> &B {
        &self.bmc
    }

    /// Fetch one resource.
    ///
    /// # Errors
    ///
    /// Errors of the transport or decode errors.
    #[instrument(skip(self, id), fields(uri = %id))]
    pub async fn get<T: EntityType>(&self, id: &ODataId) -> Result<Entity<T, B>, Error> {
        let response = self.bmc.get(id.as_str(), &HeaderMap::new()).await?;
        Entity::from_response(self.clone(), response)
    }

    /// Member links of a collection across all pages, in source order.
    ///
    /// # Errors
    ///
    /// Errors of the transport, decode errors, or
    /// [`Error::PaginationLoop`] when a `nextLink` revisits a page.
    #[instrument(skip(self, id), fields(uri = %id))]
    pub async fn collection_members(&self, id: &ODataId) -> Result<Links, Error> {
        let mut members = Vec::new();
        let mut advertised = None;
        let mut visited = HashSet::new();
        let mut next = Some(id.clone());
        while let Some(page_id) = next.take() {
            if !visited.insert(page_id.clone()) {
                return Err(Error::PaginationLoop(page_id));
            }
            let response = self.bmc.get(page_id.as_str(), &HeaderMap::new()).await?;
            let page: CollectionPage = decode(&response.body)?;
            debug!(page = %page_id, members = page.members.len(), "collection page");
            advertised = advertised.or(page.count);
            members.extend(page.members.ids().iter().cloned());
            next = page.next_link.filter(|link| !link.is_empty());
        }
        let members = Links::new(members);
        if !members.count_matches(advertised) {
            warn!(
                advertised = advertised.unwrap_or_default(),
                actual = members.len(),
                "Members@odata.count does not match collection size"
            );
        }
        Ok(members)
    }

    /// Fetch every member of a collection. Fails on the first member
    /// that cannot be fetched; use [`Client::collection_members`] and
    /// [`Client::get_many`] for tolerant mode.
    ///
    /// # Errors
    ///
    /// Errors of [`Client::collection_members`] or of any member fetch.
    pub async fn get_collection<T: EntityType>(
        &self,
        id: &ODataId,
    ) -> Result<Vec<Entity<T, B>>, Error> {
        let members = self.collection_members(id).await?;
        let fetches: Vec<_> = members
            .ids()
            .iter()
            .map(|member| self.get::<T>(member))
            .collect();
        stream::iter(fetches)
            .buffered(GET_MANY_CONCURRENCY)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Fetch an explicit list of resources, tolerating per-URI
    /// failures. At most three requests are in flight; results keep
    /// input order.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_many<T: EntityType>(&self, ids: &[ODataId]) -> Many<T, B> {
        let fetches: Vec<_> = ids
            .iter()
            .map(|id| async move { (id, self.get::<T>(id).await) })
            .collect();
        let results = stream::iter(fetches)
            .buffered(GET_MANY_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;
        let mut many = Many {
            successes: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(entity) => many.successes.push(entity),
                Err(err) => {
                    debug!(uri = %id, error = %err, "member fetch failed");
                    many.failures.push((id.clone(), err));
                }
            }
        }
        many
    }

    /// POST a new member to a collection.
    ///
    /// # Errors
    ///
    /// Encoding errors (no request sent), errors of the transport,
    /// [`Error::Service`] for a success response that neither carries
    /// the resource nor its location.
    #[instrument(skip(self, collection, body), fields(uri = %collection))]
    pub async fn create<V, T>(&self, collection: &ODataId, body: &V) -> Result<Created<T, B>, Error>
    where
        V: Serialize + Sync,
        T: EntityType,
    {
        let body = serde_json::to_vec(body).map_err(Error::Encode)?;
        let response = self
            .bmc
            .post(collection.as_str(), body, &HeaderMap::new())
            .await?;
        if response.status == StatusCode::ACCEPTED {
            return TaskMonitorInfo::from_accepted(&response).map(Created::Accepted);
        }
        if is_resource_document(&response) {
            return Entity::from_response(self.clone(), response).map(Created::Entity);
        }
        match response.location() {
            Some(location) => Ok(Created::Location(location)),
            None => Err(unexpected(response)),
        }
    }

    /// Fetch a binary stream.
    ///
    /// # Errors
    ///
    /// Errors of the transport.
    #[instrument(skip(self, id), fields(uri = %id))]
    pub async fn get_binary(&self, id: &ODataId) -> Result<Vec<u8>, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));
        let response = self.bmc.get(id.as_str(), &headers).await?;
        Ok(response.body)
    }
}

/// True if the body is a JSON object with `@odata.id`.
pub(crate) fn is_resource_document(response: &Response) -> bool {
    !response.is_body_empty()
        && serde_json::from_slice::<JsonValue>(&response.body)
            .ok()
            .map_or(false, |v| v.get(ODATA_ID).is_some())
}

/// A 2xx response the operation cannot interpret.
pub(crate) fn unexpected(response: Response) -> Error {
    Error::Service(ServiceError::new(
        response.status,
        response.headers,
        response.body,
    ))
}
