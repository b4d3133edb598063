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

//! Scripted [`fishbind_core::Bmc`] for tests.
//!
//! Expectations are matched by method and URI (first unused match
//! wins, so concurrent fetches may arrive in any order). Every request
//! is recorded and can be inspected afterwards.

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;
pub use expect::ExpectedResponse;

use fishbind_core::Bmc as FishbindBmc;
use fishbind_core::Error as FishbindError;
use fishbind_core::Response;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use http::Method;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

/// Mock protocol violation. Surfaces as a transport error.
#[derive(Debug)]
pub enum Error {
    /// A request arrived but nothing more is expected.
    NothingIsExpected(Method, String),
    /// No expectation matches method and URI.
    Unexpected(Method, String, Vec<ExpectedRequest>),
    /// Body differs from the expected one.
    UnexpectedBody {
        /// Method.
        method: Method,
        /// URI.
        uri: String,
        /// Body sent by the client.
        actual: String,
        /// Body the expectation asked for.
        expected: String,
    },
    /// Expected request body is not JSON.
    BadExpectationJson(serde_json::Error),
    /// Scripted header cannot be represented.
    BadHeader(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NothingIsExpected(method, uri) => {
                write!(f, "nothing is expected but got {method} {uri}")
            }
            Self::Unexpected(method, uri, expected) => {
                write!(f, "unexpected {method} {uri}; expected: {expected:?}")
            }
            Self::UnexpectedBody {
                method,
                uri,
                actual,
                expected,
            } => write!(
                f,
                "unexpected body for {method} {uri}: {actual}; expected: {expected}"
            ),
            Self::BadExpectationJson(err) => write!(f, "bad expected json: {err}"),
            Self::BadHeader(name) => write!(f, "bad scripted header: {name}"),
        }
    }
}

impl StdError for Error {}

impl From<Error> for FishbindError {
    fn from(err: Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Request as received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Method.
    pub method: Method,
    /// URI.
    pub uri: String,
    /// Headers passed by the engine.
    pub headers: HeaderMap,
    /// Parsed JSON body, if any.
    pub body: Option<JsonValue>,
}

/// Scripted BMC.
#[derive(Default)]
pub struct Bmc {
    expect: Mutex<VecDeque<Expect>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Bmc {
    /// Mock without expectations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock with the given expectations.
    #[must_use]
    pub fn with_expectations(expectations: impl IntoIterator<Item = Expect>) -> Self {
        let bmc = Self::new();
        lock(&bmc.expect).extend(expectations);
        bmc
    }

    /// Add an expectation.
    pub fn expect(&self, exp: Expect) {
        lock(&self.expect).push_back(exp);
    }

    /// All requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Requests with the given method.
    #[must_use]
    pub fn requests_with(&self, method: &Method) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == *method)
            .cloned()
            .collect()
    }

    /// Number of expectations not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.expect).len()
    }

    fn handle(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        headers: &HeaderMap,
    ) -> Result<Response, FishbindError> {
        let body = body.map(|body| {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&body).into_owned()))
        });
        lock(&self.requests).push(RecordedRequest {
            method: method.clone(),
            uri: uri.to_string(),
            headers: headers.clone(),
            body: body.clone(),
        });

        let expect = {
            let mut expectations = lock(&self.expect);
            if expectations.is_empty() {
                return Err(Error::NothingIsExpected(method, uri.to_string()).into());
            }
            let position = expectations
                .iter()
                .position(|e| e.request.method == method && e.request.uri == uri);
            match position.and_then(|position| expectations.remove(position)) {
                Some(expect) => expect,
                None => {
                    let pending = expectations.iter().map(|e| e.request.clone()).collect();
                    return Err(Error::Unexpected(method, uri.to_string(), pending).into());
                }
            }
        };

        if let Some(expected) = &expect.request.body {
            let expected_json: JsonValue =
                serde_json::from_str(expected).map_err(Error::BadExpectationJson)?;
            if body.as_ref() != Some(&expected_json) {
                return Err(Error::UnexpectedBody {
                    method,
                    uri: uri.to_string(),
                    actual: body.map(|b| b.to_string()).unwrap_or_default(),
                    expected: expected.clone(),
                }
                .into());
            }
        }

        let mut response_headers = HeaderMap::new();
        for (name, value) in expect.response.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::BadHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|_| Error::BadHeader(name.clone()))?;
            response_headers.append(header_name, header_value);
        }
        let status = expect.response.status;
        if status.is_success() {
            Ok(Response {
                status,
                headers: response_headers,
                body: expect.response.body,
            })
        } else {
            Err(FishbindError::from_response(
                status,
                response_headers,
                expect.response.body,
            ))
        }
    }
}

impl FishbindBmc for Bmc {
    async fn get(&self, uri: &str, headers: &HeaderMap) -> Result<Response, FishbindError> {
        self.handle(Method::GET, uri, None, headers)
    }

    async fn post(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> Result<Response, FishbindError> {
        self.handle(Method::POST, uri, Some(body), headers)
    }

    async fn patch(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &HeaderMap,
    ) -> Result<Response, FishbindError> {
        self.handle(Method::PATCH, uri, Some(body), headers)
    }

    async fn delete(&self, uri: &str, headers: &HeaderMap) -> Result<Response, FishbindError> {
        self.handle(Method::DELETE, uri, None, headers)
    }
}
