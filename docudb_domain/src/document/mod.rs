// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Value Semantics
//!
//! A document is a tree of JSON values with a mandatory `_id` string; keys
//! starting with `_` are reserved for the engine. This module defines the
//! value semantics every other component leans on:
//!
//! - **Deep equality** ([`deep_equal`]): structural recursion; numbers compare
//!   numerically across integer/float representations; date strings compare
//!   by epoch-millisecond instant; objects compare by key set regardless of
//!   insertion order.
//! - **Ordering** ([`compare_values`]): native ordering on numbers and dates;
//!   plain strings order lexicographically; everything else is unordered.
//! - **Date detection** ([`parse_datetime`]): a point-in-time is represented
//!   in a document as an RFC-3339 string with millisecond resolution. Storage
//!   persists raw JSON only; interpretation happens here and in the schema
//!   validator.
//! - **Index key normalization** ([`normalized_key`]): the deterministic
//!   string an equality index buckets a value under.
//!
//! `null` and absent are distinguished throughout: absent fields may receive
//! schema defaults, `null` is a value.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Interprets a JSON value as a point-in-time.
///
/// Only RFC-3339 date-time strings qualify; a bare date or an arbitrary
/// string does not. Resolution is clamped to milliseconds by all consumers.
pub fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Structural deep equality over document values.
///
/// - Numbers compare numerically (`1` equals `1.0`).
/// - Strings that both denote instants compare by epoch-milliseconds, so
///   `"2024-01-01T00:00:00Z"` equals `"2024-01-01T00:00:00+00:00"`.
/// - Objects compare by key set with recursive equality; insertion order is
///   irrelevant.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        (Value::String(x), Value::String(y)) => {
            if x == y {
                return true;
            }
            match (parse_datetime(a), parse_datetime(b)) {
                (Some(dx), Some(dy)) => dx.timestamp_millis() == dy.timestamp_millis(),
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => x.len() == y.len() && x.iter().zip(y).all(|(v, w)| deep_equal(v, w)),
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| match y.get(k) {
                    Some(w) => deep_equal(v, w),
                    None => false,
                })
        }
        _ => false,
    }
}

/// Native ordering over document values.
///
/// Defined for numbers (numeric), dates (instant), and plain strings
/// (lexicographic). Mixed or unordered types return `None`; range operators
/// treat that as "no match" and sorting treats it as equal.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_datetime(a), parse_datetime(b)) {
            (Some(dx), Some(dy)) => Some(dx.timestamp_millis().cmp(&dy.timestamp_millis())),
            _ => Some(x.cmp(y)),
        },
        _ => None,
    }
}

/// Serializes a value with recursively sorted object keys.
///
/// Used wherever a value must map to one canonical string regardless of how
/// its maps were built (index keys for object values).
pub fn canonical_json(value: &Value) -> String {
    fn write(value: &Value, out: &mut String) {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                out.push('{');
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&serde_json::to_string(key).expect("string serialization is infallible"));
                    out.push(':');
                    write(&map[key.as_str()], out);
                }
                out.push('}');
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write(item, out);
                }
                out.push(']');
            }
            other => {
                out.push_str(&other.to_string());
            }
        }
    }

    let mut out = String::new();
    write(value, &mut out);
    out
}

/// Derives the deterministic equality key a value is indexed under.
///
/// `None` stands for an absent field. Lookups use the same derivation, so a
/// stored key and a queried key agree for equal values:
///
/// - absent -> `undefined`
/// - `null` -> `null`
/// - date string -> `date:<epoch-ms>`
/// - boolean -> `boolean:<value>`
/// - number -> `number:<value>`
/// - plain string -> `string:<value>`
/// - object / array -> `obj:<canonical-json>`
pub fn normalized_key(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => format!("boolean:{}", b),
        Some(Value::Number(n)) => match n.as_f64() {
            // One numeric domain: 1 and 1.0 are deep-equal, so they must
            // share a bucket. Integral values inside the exact-f64 range
            // print without a fraction.
            Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                format!("number:{}", f as i64)
            }
            _ => format!("number:{}", n),
        },
        Some(v @ Value::String(s)) => match parse_datetime(v) {
            Some(dt) => format!("date:{}", dt.timestamp_millis()),
            None => format!("string:{}", s),
        },
        Some(v @ Value::Object(_)) | Some(v @ Value::Array(_)) => format!("obj:{}", canonical_json(v)),
    }
}

/// Requires a document to be a JSON map, returning its entries.
pub fn require_object(doc: &Value) -> Result<&Map<String, Value>, StoreError> {
    doc.as_object()
        .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".to_string()))
}
