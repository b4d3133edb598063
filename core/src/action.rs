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

//! Redfish actions
//!
//! Schemas declare each entry of the `Actions` object as
//! `Option<Action<Params, Response>>` renamed to `#<Resource>.<Action>`.
//! [`Action::run`] POSTs the parameter record to the target and
//! dispatches on the response status, see [`ActionOutcome`].

use crate::client::unexpected;
use crate::entity::decode;
use crate::task::TaskMonitorInfo;
use crate::Bmc;
use crate::Client;
use crate::Error;
use crate::ODataId;
use crate::Response;
use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use http::HeaderMap;
use http::StatusCode;
use serde::de;
use serde::de::DeserializeOwned;
use serde::de::Deserializer;
use serde::ser::SerializeMap;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;
use tracing::instrument;

const TARGET: &str = "target";
const TITLE: &str = "title";
const ACTION_INFO: &str = "@Redfish.ActionInfo";
const ALLOWABLE_VALUES: &str = "@Redfish.AllowableValues";

/// Type for `target` field of Action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ActionTarget(String);

impl ActionTarget {
    /// Wrap a target string.
    #[must_use]
    pub const fn new(v: String) -> Self {
        Self(v)
    }

    /// Target as sent by the service.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Target in a form every transport accepts: absolute URLs and
    /// site-relative paths are kept, bare relative paths get a leading
    /// `/`.
    #[must_use]
    pub fn normalized(&self) -> Cow<'_, str> {
        let target = self.0.trim();
        if target.starts_with('/') || target.contains("://") {
            Cow::Borrowed(target)
        } else {
            Cow::Owned(format!("/{target}"))
        }
    }
}

impl Display for ActionTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

/// Action descriptor from the `Actions` object of a resource.
///
/// `T` is the parameter record, `R` the response record of a `200 OK`.
pub struct Action<T, R> {
    /// Invocation target.
    pub target: ActionTarget,
    /// Optional display title.
    pub title: Option<String>,
    /// `@Redfish.ActionInfo` link.
    pub action_info: Option<ODataId>,
    allowable_values: BTreeMap<String, Vec<String>>,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T, R> Action<T, R> {
    /// Descriptor with only a target.
    #[must_use]
    pub fn new(target: ActionTarget) -> Self {
        Self {
            target,
            title: None,
            action_info: None,
            allowable_values: BTreeMap::new(),
            _marker: PhantomData,
        }
    }

    /// Values the service advertises for `param`
    /// (`<param>@Redfish.AllowableValues`).
    #[must_use]
    pub fn allowable_values(&self, param: &str) -> Option<&[String]> {
        self.allowable_values.get(param).map(Vec::as_slice)
    }

    /// Local check of a parameter value. Parameters without advertised
    /// values accept anything.
    #[must_use]
    pub fn is_allowed(&self, param: &str, value: &str) -> bool {
        self.allowable_values(param)
            .map_or(true, |values| values.iter().any(|v| v == value))
    }
}

impl<T, R> Clone for Action<T, R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            title: self.title.clone(),
            action_info: self.action_info.clone(),
            allowable_values: self.allowable_values.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for Action<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("target", &self.target)
            .field("title", &self.title)
            .field("action_info", &self.action_info)
            .field("allowable_values", &self.allowable_values)
            .finish()
    }
}

impl<'de, T, R> Deserialize<'de> for Action<T, R> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut obj = JsonMap::<String, JsonValue>::deserialize(deserializer)?;
        let target = match obj.remove(TARGET) {
            Some(JsonValue::String(target)) => ActionTarget::new(target),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "action {TARGET} must be a string, got {other}"
                )))
            }
            None => return Err(de::Error::missing_field(TARGET)),
        };
        let title = obj
            .remove(TITLE)
            .and_then(|v| v.as_str().map(ToOwned::to_owned));
        let action_info = obj
            .remove(ACTION_INFO)
            .and_then(|v| v.as_str().map(ODataId::from));
        let allowable_values = obj
            .into_iter()
            .filter_map(|(key, value)| {
                let param = key.strip_suffix(ALLOWABLE_VALUES)?.to_owned();
                let values = match value {
                    JsonValue::Array(values) => values
                        .into_iter()
                        .map(|v| match v {
                            JsonValue::String(s) => s,
                            other => other.to_string(),
                        })
                        .collect(),
                    _ => return None,
                };
                Some((param, values))
            })
            .collect();
        Ok(Self {
            target,
            title,
            action_info,
            allowable_values,
            _marker: PhantomData,
        })
    }
}

impl<T, R> Serialize for Action<T, R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TARGET, &self.target)?;
        if let Some(title) = &self.title {
            map.serialize_entry(TITLE, title)?;
        }
        if let Some(info) = &self.action_info {
            map.serialize_entry(ACTION_INFO, info)?;
        }
        for (param, values) in &self.allowable_values {
            map.serialize_entry(&format!("{param}{ALLOWABLE_VALUES}"), values)?;
        }
        map.end()
    }
}

/// Dispatched result of an action invocation.
#[derive(Debug)]
pub enum ActionOutcome<R> {
    /// `200 OK` with a body.
    Completed(R),
    /// `201 Created`, with the `Location` of the new resource if sent.
    Created(Option<ODataId>),
    /// `202 Accepted`; follow with [`crate::TaskMonitor`].
    Accepted(TaskMonitorInfo),
    /// `204 No Content`, or `200 OK` without a body.
    NoContent,
}

impl<R> ActionOutcome<R> {
    /// Task monitor information for an accepted action.
    #[must_use]
    pub const fn task(&self) -> Option<&TaskMonitorInfo> {
        match self {
            Self::Accepted(info) => Some(info),
            _ => None,
        }
    }

    /// Response record of a synchronously completed action.
    #[must_use]
    pub fn into_completed(self) -> Option<R> {
        match self {
            Self::Completed(r) => Some(r),
            _ => None,
        }
    }
}

impl<T, R> Action<T, R>
where
    T: Serialize + Sync,
    R: DeserializeOwned,
{
    /// Run the action with `params`.
    ///
    /// # Errors
    ///
    /// Encoding errors (no request sent), errors of the transport, or
    /// [`Error::Service`] for a success status the action cannot
    /// interpret.
    pub async fn run<B: Bmc>(&self, client: &Client<B>, params: &T) -> Result<ActionOutcome<R>, Error> {
        self.run_with_headers(client, params, &HeaderMap::new()).await
    }

    /// Run the action with extra request headers.
    ///
    /// # Errors
    ///
    /// See [`Action::run`].
    #[instrument(skip(self, client, params, headers), fields(target = %self.target))]
    pub async fn run_with_headers<B: Bmc>(
        &self,
        client: &Client<B>,
        params: &T,
        headers: &HeaderMap,
    ) -> Result<ActionOutcome<R>, Error> {
        let body = serde_json::to_vec(params).map_err(Error::Encode)?;
        let target = self.target.normalized();
        let response = client.bmc().post(&target, body, headers).await?;
        debug!(status = %response.status, "action response");
        dispatch(response)
    }
}

/// Map a successful POST response to an [`ActionOutcome`].
///
/// # Errors
///
/// Decode errors for a `200 OK` body, [`Error::MissingTaskMonitor`] for
/// an unusable `202 Accepted`, [`Error::Service`] for other statuses.
pub fn dispatch<R: DeserializeOwned>(response: Response) -> Result<ActionOutcome<R>, Error> {
    match response.status {
        StatusCode::OK if response.is_body_empty() => Ok(ActionOutcome::NoContent),
        StatusCode::OK => decode(&response.body).map(ActionOutcome::Completed),
        StatusCode::CREATED => Ok(ActionOutcome::Created(response.location())),
        StatusCode::ACCEPTED => TaskMonitorInfo::from_accepted(&response).map(ActionOutcome::Accepted),
        StatusCode::NO_CONTENT => Ok(ActionOutcome::NoContent),
        _ => Err(unexpected(response)),
    }
}

/// Resolve an optional action descriptor, failing with
/// [`Error::ActionNotSupported`] when the resource does not advertise it.
///
/// # Errors
///
/// [`Error::ActionNotSupported`] if `action` is `None`.
pub fn supported<'a, T, R>(
    action: Option<&'a Action<T, R>>,
    name: &'static str,
) -> Result<&'a Action<T, R>, Error> {
    action.ok_or(Error::ActionNotSupported(name))
}
