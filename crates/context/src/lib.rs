// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! A context is a container for a set of key-value pairs, plus the
//! per-call metadata (`priority`, `timestamp`, cancellation) that a
//! [`RequestContext`] threads into a throttler's `acquire`/`release` pair.

use std::collections::HashMap;

pub mod request;

pub use request::RequestContext;

/// Values that can be used as the `value` field of a `Context`
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// A boolean value
    Bool(bool),
    /// A u64 value
    U64(u64),
    /// A i64 value
    I64(i64),
    /// A f64 value
    F64(f64),
    /// A string value
    String(String),
}

/// A context is a map of key-value pairs that can be used to pass data during
/// the initialization phase to the receivers, processors, and the exporters
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    /// Creates a new context
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a new value to the context
    pub fn set(&mut self, key: &str, value: Value) {
        let _ = self.values.insert(key.to_string(), value);
    }

    /// Gets a value from the context
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a value from the context or returns a default value if the key is
    /// not present
    pub fn get_value<V: TryFrom<Value>>(&self, key: &str, default: V) -> V {
        match self.get(key) {
            Some(v) => V::try_from(v.clone()).unwrap_or(default),
            None => default,
        }
    }
}

/// A generic error for all the following TryFrom implementations
pub struct TryFromError {}

impl TryFrom<Value> for u8 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as u8),
            Value::I64(v) => u8::try_from(v).map_err(|_| TryFromError {}),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for u16 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as u16),
            Value::I64(v) => u16::try_from(v).map_err(|_| TryFromError {}),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for u32 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as u32),
            Value::I64(v) => u32::try_from(v).map_err(|_| TryFromError {}),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for u64 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v),
            Value::I64(v) => u64::try_from(v).map_err(|_| TryFromError {}),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for i8 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as i8),
            Value::I64(v) => Ok(v as i8),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for i16 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as i16),
            Value::I64(v) => Ok(v as i16),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as i32),
            Value::I64(v) => Ok(v as i32),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => i64::try_from(v).map_err(|_| TryFromError {}),
            Value::I64(v) => Ok(v),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as f32),
            Value::I64(v) => Ok(v as f32),
            Value::F64(v) => Ok(v as f32),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v as f64),
            Value::I64(v) => Ok(v as f64),
            Value::F64(v) => Ok(v),
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::String(v) => {
                if v.to_lowercase() == "true" {
                    Ok(true)
                } else if v.to_lowercase() == "false" {
                    Ok(false)
                } else {
                    Err(TryFromError {})
                }
            }
            _ => Err(TryFromError {}),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = TryFromError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U64(v) => Ok(v.to_string()),
            Value::I64(v) => Ok(v.to_string()),
            Value::F64(v) => Ok(v.to_string()),
            Value::Bool(v) => Ok(v.to_string()),
            Value::String(v) => Ok(v),
        }
    }
}
