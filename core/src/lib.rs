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

//! Resource round-trip engine for Redfish and Swordfish clients.
//!
//! The crate is schema-agnostic. Schemas implement [`EntityType`]
//! (decode, writable property list, request headers) and the engine
//! provides the rest:
//!
//! - [`Client`] fetches documents ([`Client::get`],
//!   [`Client::get_collection`], [`Client::get_many`]) through any
//!   [`Bmc`] transport and binds them to [`Entity`] envelopes that keep
//!   the bytes exactly as received.
//! - [`Entity::update`] diffs the current typed value against those
//!   bytes ([`payload::build`]) and PATCHes only changed writable
//!   properties.
//! - [`Action::run`] posts action parameters and dispatches on the
//!   response status; `202 Accepted` hands over to [`TaskMonitor`].
//! - [`Error`] normalizes every failure into an [`ErrorKind`].

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

/// Action descriptors, invocation and response dispatch.
pub mod action;
/// Transport abstraction.
pub mod bmc;
/// Fetcher: typed get, collections and tolerant multi-get.
pub mod client;
/// `Edm.DateTimeOffset` primitive.
pub mod edm_date_time_offset;
/// Entity envelope with raw-bytes retention.
pub mod entity;
/// Error taxonomy and Redfish error envelope.
pub mod error;
/// OData link model.
pub mod link;
/// Serde helper for nullable optional properties.
pub mod nullable;
/// OData identifiers.
pub mod odata;
/// PATCH payload builder.
pub mod payload;
/// Task resource and task monitor.
pub mod task;

use serde::Deserialize;
use serde::Serialize;

#[doc(inline)]
pub use action::Action;
#[doc(inline)]
pub use action::ActionOutcome;
#[doc(inline)]
pub use action::ActionTarget;
#[doc(inline)]
pub use bmc::Bmc;
#[doc(inline)]
pub use bmc::BmcCredentials;
#[doc(inline)]
pub use bmc::Response;
#[doc(inline)]
pub use client::Client;
#[doc(inline)]
pub use client::Created;
#[doc(inline)]
pub use client::Many;
#[doc(inline)]
pub use edm_date_time_offset::EdmDateTimeOffset;
#[doc(inline)]
pub use entity::Entity;
#[doc(inline)]
pub use entity::EntityType;
#[doc(inline)]
pub use entity::ResourceBase;
#[doc(inline)]
pub use entity::UpdateOptions;
#[doc(inline)]
pub use entity::UpdateOutcome;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use error::ErrorKind;
#[doc(inline)]
pub use error::ExtendedInfo;
#[doc(inline)]
pub use error::RedfishError;
#[doc(inline)]
pub use error::ServiceError;
#[doc(inline)]
pub use link::Link;
#[doc(inline)]
pub use link::Links;
#[doc(inline)]
pub use odata::ODataETag;
#[doc(inline)]
pub use odata::ODataId;
#[doc(inline)]
pub use odata::ODataType;
#[doc(inline)]
pub use task::Task;
#[doc(inline)]
pub use task::TaskMonitor;
#[doc(inline)]
pub use task::TaskMonitorConfig;
#[doc(inline)]
pub use task::TaskMonitorInfo;
#[doc(inline)]
pub use task::TaskReport;
#[doc(inline)]
pub use task::TaskState;
#[doc(inline)]
pub use task::TaskStatus;

/// Cancellation token accepted by [`TaskMonitor::with_abort`].
pub use tokio_util::sync::CancellationToken;

/// Empty struct, denotes an action or request without a response
/// body (or without parameters).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}
