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

//! Typed Redfish and Swordfish resources on top of `fishbind-core`.
//!
//! Every resource is a plain serde type implementing
//! [`EntityType`]. Fetching one yields an [`Entity`] that can be
//! modified and written back with [`Entity::update`]; resource specific
//! navigation and actions live in `*Ext` traits implemented for the
//! entity (for example [`drive::DriveExt`]).
//!
//! Schemas are grouped by cargo features; `std-redfish` enables all of
//! them.
//!
//! ```no_run
//! # #[cfg(all(feature = "computer-systems", feature = "bmc-http"))]
//! # async fn example() -> Result<(), fishbind::Error> {
//! use fishbind::bmc_http::reqwest::Client as ReqwestClient;
//! use fishbind::bmc_http::HttpBmc;
//! use fishbind::computer_system::ComputerSystemExt;
//! use fishbind::computer_system::ResetType;
//! use fishbind::service_root::ServiceRoot;
//! use fishbind::service_root::ServiceRootExt;
//! use fishbind::BmcCredentials;
//! use fishbind::Client;
//!
//! let http = ReqwestClient::new().map_err(|e| fishbind::Error::Transport(Box::new(e)))?;
//! let endpoint = "https://bmc.example.com".parse().map_err(|_| fishbind::Error::InvalidUri("bmc".into()))?;
//! let bmc = HttpBmc::new(http, endpoint, BmcCredentials::new("root".into(), "secret".into()));
//! let client = Client::new(bmc);
//!
//! let root = ServiceRoot::get(&client).await?;
//! for mut system in root.systems().await? {
//!     system.asset_tag = Some(Some("rack-7".into()));
//!     system.update().await?;
//!     system.reset(ResetType::GracefulRestart).await?;
//! }
//! # Ok(())
//! # }
//! ```

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

/// Common resource accessors and status types.
pub mod resource;
/// Service root.
pub mod service_root;

/// Assembly (field replaceable parts).
#[cfg(feature = "assembly")]
pub mod assembly;
/// Composition service.
#[cfg(feature = "composition-service")]
pub mod composition_service;
/// Computer system.
#[cfg(feature = "computer-systems")]
pub mod computer_system;
/// Drive.
#[cfg(feature = "storage")]
pub mod drive;
/// Fabric endpoint.
#[cfg(feature = "fabrics")]
pub mod endpoint;
/// Task service.
#[cfg(feature = "task-service")]
pub mod task_service;
/// Swordfish volume.
#[cfg(feature = "storage")]
pub mod volume;
/// Fabric zone.
#[cfg(feature = "fabrics")]
pub mod zone;

#[doc(inline)]
pub use fishbind_core::Action;
#[doc(inline)]
pub use fishbind_core::ActionOutcome;
#[doc(inline)]
pub use fishbind_core::Bmc;
#[doc(inline)]
pub use fishbind_core::BmcCredentials;
#[doc(inline)]
pub use fishbind_core::Client;
#[doc(inline)]
pub use fishbind_core::Created;
#[doc(inline)]
pub use fishbind_core::Empty;
#[doc(inline)]
pub use fishbind_core::Entity;
#[doc(inline)]
pub use fishbind_core::EntityType;
#[doc(inline)]
pub use fishbind_core::Error;
#[doc(inline)]
pub use fishbind_core::ErrorKind;
#[doc(inline)]
pub use fishbind_core::Link;
#[doc(inline)]
pub use fishbind_core::Links;
#[doc(inline)]
pub use fishbind_core::Many;
#[doc(inline)]
pub use fishbind_core::ODataETag;
#[doc(inline)]
pub use fishbind_core::ODataId;
#[doc(inline)]
pub use fishbind_core::Task;
#[doc(inline)]
pub use fishbind_core::TaskMonitor;
#[doc(inline)]
pub use fishbind_core::TaskMonitorConfig;
#[doc(inline)]
pub use fishbind_core::TaskMonitorInfo;
#[doc(inline)]
pub use fishbind_core::TaskState;
#[doc(inline)]
pub use fishbind_core::UpdateOptions;
#[doc(inline)]
pub use fishbind_core::UpdateOutcome;
#[doc(inline)]
pub use resource::Resource;
#[doc(inline)]
pub use resource::ResourceProvidesStatus;

/// HTTP transport.
#[cfg(feature = "bmc-http")]
pub use fishbind_bmc_http as bmc_http;
