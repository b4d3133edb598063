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

//! Error taxonomy
//!
//! Every failure surfaced by the engine is an [`Error`]. Callers should
//! branch on [`Error::kind`] rather than on message text. Transports
//! normalize HTTP status codes with [`Error::from_response`]:
//!
//! | Status            | Kind                          |
//! |-------------------|-------------------------------|
//! | 401               | [`ErrorKind::Authentication`] |
//! | 403               | [`ErrorKind::Authorization`]  |
//! | 404               | [`ErrorKind::NotFound`]       |
//! | 409, 412          | [`ErrorKind::Conflict`]       |
//! | 429               | [`ErrorKind::RateLimited`]    |
//! | anything else     | [`ErrorKind::ServiceError`]   |
//!
//! The Redfish error envelope
//! (`{"error": {"code", "message", "@Message.ExtendedInfo": [...]}}`)
//! is parsed into [`RedfishError`] when possible. Bodies that are not an
//! envelope (HTML pages, plain text, empty) are kept verbatim in
//! [`ServiceError::body`].

use crate::bmc::parse_retry_after;
use crate::odata::ODATA_ID;
use crate::task::Task;
use crate::ODataId;
use http::header::InvalidHeaderValue;
use http::HeaderMap;
use http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection, TLS, DNS or I/O failure.
    Transport,
    /// Request deadline or task deadline exceeded.
    Timeout,
    /// Caller's abort signal was raised.
    Cancelled,
    /// 404.
    NotFound,
    /// 409 or 412 (ETag mismatch).
    Conflict,
    /// 401.
    Authentication,
    /// 403.
    Authorization,
    /// 429 after retries were exhausted.
    RateLimited,
    /// Any other non-2xx, or a 2xx the operation cannot interpret.
    ServiceError,
    /// Local marshal, unmarshal or diff failure. No HTTP was issued for
    /// encode failures.
    Encoding,
    /// The resource does not advertise the requested action.
    NotSupported,
}

/// One `@Message.ExtendedInfo` record (Redfish `Message`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedInfo {
    /// `@odata.type` of the message object.
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    /// Registry-qualified message identifier, e.g. `Base.1.8.PropertyValueNotInList`.
    #[serde(rename = "MessageId", default)]
    pub message_id: String,
    /// Human readable message.
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Legacy severity string (`OK`, `Warning`, `Critical`).
    #[serde(rename = "Severity", default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Severity as a Redfish `Health` value.
    #[serde(rename = "MessageSeverity", default, skip_serializing_if = "Option::is_none")]
    pub message_severity: Option<String>,
    /// Suggested resolution.
    #[serde(rename = "Resolution", default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// JSON pointers of the properties the message refers to.
    #[serde(rename = "RelatedProperties", default, skip_serializing_if = "Vec::is_empty")]
    pub related_properties: Vec<String>,
    /// Message arguments.
    #[serde(rename = "MessageArgs", default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<JsonValue>,
}

impl ExtendedInfo {
    /// Effective severity: `MessageSeverity` if present, else `Severity`.
    #[must_use]
    pub fn effective_severity(&self) -> Option<&str> {
        self.message_severity
            .as_deref()
            .or_else(|| self.severity.as_deref())
    }

    /// True if the message reports something other than success.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        self.effective_severity()
            .map_or(false, |s| !s.eq_ignore_ascii_case("OK"))
    }
}

/// Parsed Redfish error envelope (`error` object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedfishError {
    /// Message identifier of the error, e.g. `Base.1.0.GeneralError`.
    #[serde(rename = "code", default)]
    pub code: String,
    /// Top level message.
    #[serde(rename = "message", default)]
    pub message: String,
    /// Extended information records.
    #[serde(rename = "@Message.ExtendedInfo", default)]
    pub extended_info: Vec<ExtendedInfo>,
}

#[derive(Deserialize)]
struct Envelope {
    error: RedfishError,
}

impl RedfishError {
    /// Parse an error body. Returns `None` for anything that is not a
    /// Redfish error envelope.
    #[must_use]
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Envelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

/// Non-2xx (or uninterpretable) response from the service.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed error envelope, when the body was one.
    pub envelope: Option<RedfishError>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ServiceError {
    /// Build from a response, parsing the error envelope if possible.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        let envelope = RedfishError::parse(&body);
        Self {
            status,
            headers,
            envelope,
            body,
        }
    }

    /// `Retry-After` hint of the response.
    #[must_use]
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        self.headers
            .get(http::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after)
    }

    /// Message identifiers of all extended info records.
    pub fn message_ids(&self) -> impl Iterator<Item = &str> {
        self.envelope
            .iter()
            .flat_map(|e| e.extended_info.iter())
            .map(|info| info.message_id.as_str())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.envelope {
            Some(envelope) => write!(
                f,
                "HTTP {}: {}: {}",
                self.status, envelope.code, envelope.message
            ),
            None if self.body.is_empty() => write!(f, "HTTP {}", self.status),
            None => {
                let body = String::from_utf8_lossy(&self.body);
                let body = body.chars().take(256).collect::<String>();
                write!(f, "HTTP {}: {body}", self.status)
            }
        }
    }
}

/// Error of the round-trip engine.
#[derive(Debug)]
pub enum Error {
    /// Transport failure (connection, TLS, DNS, I/O).
    Transport(Box<dyn StdError + Send + Sync>),
    /// Request or task deadline exceeded. Carries the last observed
    /// task when raised by the task monitor.
    Timeout(Option<Box<Task>>),
    /// Abort signal raised. Carries the last observed task when raised
    /// by the task monitor.
    Cancelled(Option<Box<Task>>),
    /// 404.
    NotFound(ServiceError),
    /// 409 or 412.
    Conflict(ServiceError),
    /// 401.
    Authentication(ServiceError),
    /// 403.
    Authorization(ServiceError),
    /// 429 after retries.
    RateLimited(ServiceError),
    /// Other non-2xx responses.
    Service(ServiceError),
    /// `202 Accepted` without `Location` header or `@odata.id` body.
    MissingTaskMonitor,
    /// Collection `nextLink` points to an already visited page.
    PaginationLoop(ODataId),
    /// Response body could not be decoded to the expected type.
    Decode(serde_path_to_error::Error<serde_json::Error>),
    /// Value could not be serialized.
    Encode(serde_json::Error),
    /// Payload is structurally unusable (e.g. not a JSON object).
    InvalidPayload(String),
    /// Header value cannot be sent (e.g. ETag with control characters).
    InvalidHeader(InvalidHeaderValue),
    /// URI cannot be resolved against the service endpoint.
    InvalidUri(String),
    /// Action is not advertised by the resource.
    ActionNotSupported(&'static str),
}

impl Error {
    /// Normalize a non-2xx response into the taxonomy.
    #[must_use]
    pub fn from_response(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        let err = ServiceError::new(status, headers, body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Authentication(err),
            StatusCode::FORBIDDEN => Self::Authorization(err),
            StatusCode::NOT_FOUND => Self::NotFound(err),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Self::Conflict(err),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(err),
            _ => Self::Service(err),
        }
    }

    /// Classification of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Service(_) | Self::MissingTaskMonitor | Self::PaginationLoop(_) => {
                ErrorKind::ServiceError
            }
            Self::Decode(_)
            | Self::Encode(_)
            | Self::InvalidPayload(_)
            | Self::InvalidHeader(_)
            | Self::InvalidUri(_) => ErrorKind::Encoding,
            Self::ActionNotSupported(_) => ErrorKind::NotSupported,
        }
    }

    /// Service response details for status-derived errors.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::NotFound(e)
            | Self::Conflict(e)
            | Self::Authentication(e)
            | Self::Authorization(e)
            | Self::RateLimited(e)
            | Self::Service(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status for status-derived errors.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.service_error().map(|e| e.status)
    }

    /// Parsed Redfish error envelope, if the service sent one.
    #[must_use]
    pub fn redfish_error(&self) -> Option<&RedfishError> {
        self.service_error().and_then(|e| e.envelope.as_ref())
    }

    /// Last task state observed before a task monitor timeout or
    /// cancellation.
    #[must_use]
    pub fn last_task(&self) -> Option<&Task> {
        match self {
            Self::Timeout(task) | Self::Cancelled(task) => task.as_deref(),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Timeout(_) => write!(f, "deadline exceeded"),
            Self::Cancelled(_) => write!(f, "cancelled"),
            Self::NotFound(e) => write!(f, "not found: {e}"),
            Self::Conflict(e) => write!(f, "conflict: {e}"),
            Self::Authentication(e) => write!(f, "authentication failed: {e}"),
            Self::Authorization(e) => write!(f, "not authorized: {e}"),
            Self::RateLimited(e) => write!(f, "rate limited: {e}"),
            Self::Service(e) => write!(f, "service error: {e}"),
            Self::MissingTaskMonitor => write!(
                f,
                "accepted response carries neither Location header nor task {ODATA_ID}"
            ),
            Self::PaginationLoop(id) => write!(f, "collection pagination loops back to {id}"),
            Self::Decode(e) => write!(
                f,
                "JSON deserialization error at line {} column {} path {}: {e}",
                e.inner().line(),
                e.inner().column(),
                e.path(),
            ),
            Self::Encode(e) => write!(f, "JSON serialization error: {e}"),
            Self::InvalidPayload(reason) => write!(f, "invalid payload: {reason}"),
            Self::InvalidHeader(e) => write!(f, "invalid header value: {e}"),
            Self::InvalidUri(uri) => write!(f, "invalid uri: {uri}"),
            Self::ActionNotSupported(name) => write!(f, "action {name} is not supported"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(e) => Some(e.as_ref()),
            Self::Decode(e) => Some(e.inner()),
            Self::Encode(e) => Some(e),
            Self::InvalidHeader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(e: InvalidHeaderValue) -> Self {
        Self::InvalidHeader(e)
    }
}
