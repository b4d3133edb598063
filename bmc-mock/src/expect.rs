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

//! Expectations for Bmc Mock.

use http::Method;
use http::StatusCode;
use std::fmt::Display;

/// Request expected by BMC.
#[derive(Debug, Clone)]
pub struct ExpectedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URI exactly as the client sends it.
    pub uri: String,
    /// JSON body the request must carry (compared as JSON values).
    /// `None` accepts any body.
    pub body: Option<String>,
}

/// Scripted response.
#[derive(Debug, Clone)]
pub struct ExpectedResponse {
    /// Status code.
    pub status: StatusCode,
    /// Headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Body bytes, returned verbatim.
    pub body: Vec<u8>,
}

/// Expectation for the tests.
#[derive(Debug, Clone)]
pub struct Expect {
    /// Request to match.
    pub request: ExpectedRequest,
    /// Response to return once matched.
    pub response: ExpectedResponse,
}

impl Expect {
    fn new(method: Method, uri: impl Display, body: Option<String>, response: Vec<u8>) -> Self {
        Self {
            request: ExpectedRequest {
                method,
                uri: uri.to_string(),
                body,
            },
            response: ExpectedResponse {
                status: StatusCode::OK,
                headers: Vec::new(),
                body: response,
            },
        }
    }

    /// `GET uri` answered with `200` and `response` as body.
    pub fn get(uri: impl Display, response: impl Display) -> Self {
        Self::new(Method::GET, uri, None, response.to_string().into_bytes())
    }

    /// `GET uri` answered with `200` and arbitrary bytes.
    pub fn get_raw(uri: impl Display, response: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::GET, uri, None, response.into())
    }

    /// `PATCH uri` with `request` body. An empty `response` gives `204`.
    pub fn patch(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self::new(
            Method::PATCH,
            uri,
            Some(request.to_string()),
            response.to_string().into_bytes(),
        )
        .no_content_if_empty()
    }

    /// `POST uri` with `request` body. An empty `response` gives `204`.
    pub fn post(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self::new(
            Method::POST,
            uri,
            Some(request.to_string()),
            response.to_string().into_bytes(),
        )
        .no_content_if_empty()
    }

    /// `DELETE uri` answered with `204`.
    pub fn delete(uri: impl Display) -> Self {
        Self::new(Method::DELETE, uri, None, Vec::new()).with_status(StatusCode::NO_CONTENT)
    }

    /// Accept any request body.
    #[must_use]
    pub fn any_body(mut self) -> Self {
        self.request.body = None;
        self
    }

    /// Override the response status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.response.status = status;
        self
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Display, value: impl Display) -> Self {
        self.response
            .headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Replace the response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Display) -> Self {
        self.response.body = body.to_string().into_bytes();
        self
    }

    fn no_content_if_empty(self) -> Self {
        if self.response.body.is_empty() {
            self.with_status(StatusCode::NO_CONTENT)
        } else {
            self
        }
    }
}
