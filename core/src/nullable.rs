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

//! Nullable optional properties.
//!
//! Redfish clears a property by writing `null`, so a schema field must
//! distinguish three states. Declare it as `Option<Option<T>>`:
//!
//! | JSON              | Rust             |
//! |-------------------|------------------|
//! | property absent   | `None`           |
//! | `"Prop": null`    | `Some(None)`     |
//! | `"Prop": 5`       | `Some(Some(5))`  |
//!
//! ```rust
//! use serde::Deserialize;
//! use serde::Serialize;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Volume {
//!     #[serde(
//!         rename = "CapacityBytes",
//!         default,
//!         deserialize_with = "fishbind_core::nullable::deserialize",
//!         skip_serializing_if = "Option::is_none"
//!     )]
//!     capacity_bytes: Option<Option<i64>>,
//! }
//!
//! let v: Volume = serde_json::from_str(r#"{"CapacityBytes": null}"#).unwrap();
//! assert_eq!(v.capacity_bytes, Some(None));
//! assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"CapacityBytes":null}"#);
//!
//! let v: Volume = serde_json::from_str("{}").unwrap();
//! assert_eq!(v.capacity_bytes, None);
//! assert_eq!(serde_json::to_string(&v).unwrap(), "{}");
//! ```

use serde::Deserialize;
use serde::Deserializer;

/// Deserialize a present property into `Some(..)`, keeping `null` as
/// `Some(None)`. Use together with `#[serde(default)]`.
///
/// # Errors
///
/// Propagates the inner deserializer error.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
