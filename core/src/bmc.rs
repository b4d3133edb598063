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

//! Baseboard Management Controller (BMC) transport abstraction
//!
//! This module defines the transport-agnostic [`Bmc`] trait: four HTTP
//! primitives that move bytes to and from a Redfish service. Everything
//! typed (decode, diff, action dispatch) lives above it in
//! [`crate::Client`] and [`crate::Entity`].
//!
//! Contract for implementors:
//! - `uri` is either site-relative (`/redfish/v1/Systems/1`, possibly
//!   with a query string) or an absolute URL. Both must be accepted.
//! - Only 2xx responses are returned as `Ok`. Every other status is
//!   normalized with [`Error::from_response`], so callers see the same
//!   [`crate::ErrorKind`] regardless of transport.
//! - The returned [`Response`] owns the fully read body. No connection
//!   or stream outlives the call.
//! - Redirects, retries of idempotent requests and authentication are
//!   the transport's business and invisible to the engine.
//! - Futures are `Send`, and the trait is `Send + Sync` so one transport
//!   can be shared by many entities across threads.

use crate::Error;
use crate::ODataETag;
use crate::ODataId;
use http::header;
use http::HeaderMap;
use http::StatusCode;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

/// Fully read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body bytes exactly as received.
    pub body: Vec<u8>,
}

impl Response {
    /// Response with the given status, no headers and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// `ETag` response header.
    #[must_use]
    pub fn etag(&self) -> Option<ODataETag> {
        self.header_str(header::ETAG)
            .filter(|v| !v.trim().is_empty())
            .map(ODataETag::from)
    }

    /// `Location` response header.
    #[must_use]
    pub fn location(&self) -> Option<ODataId> {
        self.header_str(header::LOCATION)
            .filter(|v| !v.trim().is_empty())
            .map(|v| ODataId::from(v.trim()))
    }

    /// `Retry-After` response header as a delay from now.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.header_str(header::RETRY_AFTER)
            .and_then(parse_retry_after)
    }

    /// True if the body is empty or whitespace.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    fn header_str(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Parse a `Retry-After` value: either delta-seconds or an HTTP-date.
/// Dates in the past yield a zero delay.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = OffsetDateTime::parse(value, &Rfc2822).ok()?;
    let date = SystemTime::from(date);
    Some(
        date.duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

/// BMC trait defines access to a Baseboard Management Controller using
/// the Redfish protocol.
pub trait Bmc: Send + Sync {
    /// Issue a GET.
    fn get(
        &self,
        uri: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send;

    /// Issue a POST with a serialized body. `Content-Type` defaults to
    /// `application/json` unless present in `headers`.
    fn post(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send;

    /// Issue a PATCH with a serialized body.
    fn patch(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send;

    /// Issue a DELETE.
    fn delete(
        &self,
        uri: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send;
}

impl<B: Bmc> Bmc for Arc<B> {
    fn get(
        &self,
        uri: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send {
        self.as_ref().get(uri, headers)
    }

    fn post(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send {
        self.as_ref().post(uri, body, headers)
    }

    fn patch(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send {
        self.as_ref().patch(uri, body, headers)
    }

    fn delete(
        &self,
        uri: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Response, Error>> + Send {
        self.as_ref().delete(uri, headers)
    }
}

/// Credentials used to access the BMC.
///
/// `Debug`/`Display` never print the password.
#[derive(Clone)]
pub struct BmcCredentials {
    /// Username to access BMC.
    pub username: String,
    password: String,
}

impl BmcCredentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Get password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for BmcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BmcCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for BmcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BmcCredentials(username: {}, password: [REDACTED])",
            self.username
        )
    }
}
