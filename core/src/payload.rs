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

//! PATCH payload builder
//!
//! [`build`] compares the re-serialized current value of an entity with
//! the bytes the service last returned, restricted to the writable
//! property names of the schema, and produces the minimal PATCH body.
//!
//! For every writable name `n`:
//! - `n` absent from the current value: skipped.
//! - `n` absent from the original document: sent.
//! - otherwise sent only if the two values are not [`semantic_eq`].
//!
//! The comparison is per top-level property. A change anywhere inside a
//! writable object (including `Oem`) sends the whole object.

use crate::Error;
use serde::Serialize;
use serde_json::Map as JsonMap;
use serde_json::Number;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Build the PATCH body for `current` against the `original` document.
///
/// Returns `Ok(None)` when nothing changed, so no request must be sent.
///
/// # Errors
///
/// - [`Error::Encode`] if `current` cannot be serialized.
/// - [`Error::Decode`] if `original` is not valid JSON.
/// - [`Error::InvalidPayload`] if either side is not a JSON object.
pub fn build<T: Serialize>(
    current: &T,
    original: &[u8],
    writable: &[&str],
) -> Result<Option<JsonMap<String, JsonValue>>, Error> {
    let current = match serde_json::to_value(current).map_err(Error::Encode)? {
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::InvalidPayload(format!(
                "current value serialized to {} instead of an object",
                kind_name(&other)
            )))
        }
    };
    let de = &mut serde_json::Deserializer::from_slice(original);
    let original: JsonValue = serde_path_to_error::deserialize(de).map_err(Error::Decode)?;
    let original = original.as_object().ok_or_else(|| {
        Error::InvalidPayload(format!(
            "original document is {} instead of an object",
            kind_name(&original)
        ))
    })?;

    let mut payload = JsonMap::new();
    for name in writable {
        let Some(value) = current.get(*name) else {
            trace!(property = *name, "skipped: not set on current value");
            continue;
        };
        match original.get(*name) {
            Some(before) if semantic_eq(value, before) => {
                trace!(property = *name, "omitted: unchanged");
            }
            Some(_) => {
                trace!(property = *name, "included: changed");
                payload.insert((*name).to_string(), value.clone());
            }
            None => {
                trace!(property = *name, "included: absent from original");
                payload.insert((*name).to_string(), value.clone());
            }
        }
    }
    Ok(if payload.is_empty() {
        None
    } else {
        Some(payload)
    })
}

/// Semantic equality of two JSON values.
///
/// Numbers compare by value regardless of representation (`1`, `1.0`
/// and `1e0` are equal). Objects ignore key order. Arrays are position
/// sensitive.
#[must_use]
pub fn semantic_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => true,
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a == b,
        (JsonValue::String(a), JsonValue::String(b)) => a == b,
        (JsonValue::Number(a), JsonValue::Number(b)) => number_eq(a, b),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| semantic_eq(a, b))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).map_or(false, |other| semantic_eq(v, other)))
        }
        _ => false,
    }
}

#[allow(clippy::float_cmp)]
fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

const fn kind_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
