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

//! HTTP transport for the fishbind round-trip engine.
//!
//! [`HttpBmc`] implements [`fishbind_core::Bmc`] over any [`HttpClient`]
//! (a `reqwest` implementation ships behind the default `reqwest`
//! feature). It owns everything HTTP-specific the engine does not see:
//!
//! - resolution of site-relative URIs against the service endpoint,
//! - Basic credentials and per-client custom headers,
//! - `Accept`, `OData-Version` and `Content-Type` defaults,
//! - bounded retries of idempotent requests ([`RetryPolicy`]),
//! - normalization of non-2xx statuses into [`fishbind_core::Error`].

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf
)]
#![deny(
    clippy::todo,
    clippy::unimplemented,
    clippy::tests_outside_test_module,
    clippy::unwrap_in_result,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Retry policy for idempotent requests.
pub mod retry;

/// `reqwest` based [`HttpClient`].
#[cfg(feature = "reqwest")]
pub mod reqwest;

use fishbind_core::Bmc;
use fishbind_core::Error;
use fishbind_core::Response;
use http::header;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::StatusCode;
use std::error::Error as StdError;
use std::future::Future;
use tokio::time::sleep;
use tracing::debug;
use tracing::warn;
use url::Url;

#[doc(inline)]
pub use fishbind_core::BmcCredentials;
#[doc(inline)]
pub use retry::RetryPolicy;

/// Value of the `OData-Version` request header.
pub const ODATA_VERSION: &str = "4.0";

/// Classification an [`HttpClient`] error must provide.
pub trait TransportError: StdError + Send + Sync + 'static {
    /// True if the request deadline expired.
    fn is_timeout(&self) -> bool;

    /// True if the failure is worth retrying for an idempotent request
    /// (e.g. connection refused or reset).
    fn is_transient(&self) -> bool;
}

/// Minimal HTTP client used by [`HttpBmc`].
///
/// Implementations send the request as given and return the response
/// with its body fully read, whatever the status.
pub trait HttpClient: Send + Sync {
    /// Client error.
    type Error: TransportError;

    /// Perform an HTTP GET request.
    fn get(
        &self,
        url: Url,
        credentials: &BmcCredentials,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;

    /// Perform an HTTP POST request.
    fn post(
        &self,
        url: Url,
        body: Vec<u8>,
        credentials: &BmcCredentials,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;

    /// Perform an HTTP PATCH request.
    fn patch(
        &self,
        url: Url,
        body: Vec<u8>,
        credentials: &BmcCredentials,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;

    /// Perform an HTTP DELETE request.
    fn delete(
        &self,
        url: Url,
        credentials: &BmcCredentials,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

/// HTTP-based BMC implementation that wraps an [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use fishbind_bmc_http::BmcCredentials;
/// use fishbind_bmc_http::HttpBmc;
/// use fishbind_bmc_http::RetryPolicy;
/// use fishbind_bmc_http::reqwest::Client;
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = BmcCredentials::new("admin".to_string(), "password".to_string());
/// let http_client = Client::new()?;
/// let endpoint = Url::parse("https://192.168.1.100")?;
///
/// let bmc = HttpBmc::new(http_client, endpoint, credentials)
///     .with_retry_policy(RetryPolicy::default().max_attempts(5));
/// # Ok(())
/// # }
/// ```
pub struct HttpBmc<C: HttpClient> {
    client: C,
    redfish_endpoint: RedfishEndpoint,
    credentials: BmcCredentials,
    custom_headers: HeaderMap,
    retry: RetryPolicy,
}

impl<C: HttpClient> HttpBmc<C> {
    /// Create a new HTTP-based BMC.
    ///
    /// * `client` - The HTTP client implementation to use for requests
    /// * `redfish_endpoint` - The base URL of the Redfish service (e.g., `https://192.168.1.100`)
    /// * `credentials` - Authentication credentials for the BMC
    pub fn new(client: C, redfish_endpoint: Url, credentials: BmcCredentials) -> Self {
        Self::with_custom_headers(client, redfish_endpoint, credentials, HeaderMap::new())
    }

    /// Create a new HTTP-based BMC with headers added to every request
    /// (vendor headers, session tokens and the like).
    ///
    /// ```rust,no_run
    /// use fishbind_bmc_http::BmcCredentials;
    /// use fishbind_bmc_http::HttpBmc;
    /// use fishbind_bmc_http::reqwest::Client;
    /// use http::HeaderMap;
    /// use url::Url;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut headers = HeaderMap::new();
    /// headers.insert("X-Auth-Token", "custom-token-value".parse()?);
    ///
    /// let bmc = HttpBmc::with_custom_headers(
    ///     Client::new()?,
    ///     Url::parse("https://192.168.1.100")?,
    ///     BmcCredentials::new("admin".to_string(), "password".to_string()),
    ///     headers,
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_custom_headers(
        client: C,
        redfish_endpoint: Url,
        credentials: BmcCredentials,
        custom_headers: HeaderMap,
    ) -> Self {
        Self {
            client,
            redfish_endpoint: RedfishEndpoint::from(redfish_endpoint),
            credentials,
            custom_headers,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Service endpoint.
    pub const fn endpoint(&self) -> &RedfishEndpoint {
        &self.redfish_endpoint
    }

    fn request_headers(&self, headers: &HeaderMap, has_body: bool) -> HeaderMap {
        let mut all = HeaderMap::new();
        all.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        all.insert("OData-Version", HeaderValue::from_static(ODATA_VERSION));
        if has_body {
            all.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        for (name, value) in self.custom_headers.iter().chain(headers.iter()) {
            all.insert(name.clone(), value.clone());
        }
        all
    }

    async fn execute(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        headers: &HeaderMap,
    ) -> Result<Response, Error> {
        let url = self.redfish_endpoint.resolve(uri)?;
        let headers = self.request_headers(headers, body.is_some());
        // PATCH is idempotent only when it is conditional.
        let idempotent = match method {
            Method::POST => false,
            Method::PATCH => headers.contains_key(header::IF_MATCH),
            _ => true,
        };
        let mut attempt = 1;
        loop {
            debug!(%method, %url, attempt, "redfish request");
            let result = match (&method, body.clone()) {
                (&Method::GET, _) => {
                    self.client
                        .get(url.clone(), &self.credentials, headers.clone())
                        .await
                }
                (&Method::DELETE, _) => {
                    self.client
                        .delete(url.clone(), &self.credentials, headers.clone())
                        .await
                }
                (&Method::PATCH, body) => {
                    self.client
                        .patch(
                            url.clone(),
                            body.unwrap_or_default(),
                            &self.credentials,
                            headers.clone(),
                        )
                        .await
                }
                (_, body) => {
                    self.client
                        .post(
                            url.clone(),
                            body.unwrap_or_default(),
                            &self.credentials,
                            headers.clone(),
                        )
                        .await
                }
            };
            match result {
                Ok(response) if response.status.is_success() => {
                    debug!(%method, %url, status = %response.status, "redfish response");
                    return Ok(response);
                }
                Ok(response) => {
                    let throttled = matches!(
                        response.status,
                        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
                    );
                    // Throttling is retried only when the service says when.
                    let delay = match response.retry_after() {
                        Some(retry_after) if idempotent && throttled => {
                            self.retry.delay(attempt, Some(retry_after))
                        }
                        _ => None,
                    };
                    if let Some(delay) = delay {
                        warn!(%method, %url, status = %response.status, ?delay, attempt, "retrying throttled request");
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    debug!(%method, %url, status = %response.status, "redfish error response");
                    return Err(Error::from_response(
                        response.status,
                        response.headers,
                        response.body,
                    ));
                }
                Err(err) => {
                    let delay = if idempotent && err.is_transient() {
                        self.retry.delay(attempt, None)
                    } else {
                        None
                    };
                    if let Some(delay) = delay {
                        warn!(%method, %url, error = %err, ?delay, attempt, "retrying failed request");
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(if err.is_timeout() {
                        Error::Timeout(None)
                    } else {
                        Error::Transport(Box::new(err))
                    });
                }
            }
        }
    }
}

impl<C: HttpClient> Bmc for HttpBmc<C> {
    async fn get(&self, uri: &str, headers: &HeaderMap) -> Result<Response, Error> {
        self.execute(Method::GET, uri, None, headers).await
    }

    async fn post(&self, uri: &str, body: Vec<u8>, headers: &HeaderMap) -> Result<Response, Error> {
        self.execute(Method::POST, uri, Some(body), headers).await
    }

    async fn patch(&self, uri: &str, body: Vec<u8>, headers: &HeaderMap) -> Result<Response, Error> {
        self.execute(Method::PATCH, uri, Some(body), headers).await
    }

    async fn delete(&self, uri: &str, headers: &HeaderMap) -> Result<Response, Error> {
        self.execute(Method::DELETE, uri, None, headers).await
    }
}

/// Base URL of a Redfish service.
#[derive(Debug, Clone)]
pub struct RedfishEndpoint {
    base_url: Url,
}

impl RedfishEndpoint {
    /// Create a new `RedfishEndpoint` from a base URL
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Resolve a site-relative path (with optional query) or an
    /// absolute URL.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUri`] if `uri` cannot be turned into a URL.
    pub fn resolve(&self, uri: &str) -> Result<Url, Error> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(uri)
                .map_err(|e| Error::InvalidUri(format!("{uri}: {e}"))),
            Err(e) => Err(Error::InvalidUri(format!("{uri}: {e}"))),
        }
    }
}

impl From<Url> for RedfishEndpoint {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

impl From<&RedfishEndpoint> for Url {
    fn from(endpoint: &RedfishEndpoint) -> Self {
        endpoint.base_url.clone()
    }
}
