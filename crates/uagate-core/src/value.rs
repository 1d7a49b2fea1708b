// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wire-type codec.
//!
//! Node values cross the gateway boundary as canonical text: batches pushed
//! to the sink carry encoded strings, and control-plane writes arrive as
//! strings that must be decoded against the node's current type. This
//! module owns both directions.
//!
//! Encoding is total. Decoding trims the input once, then parses it in the
//! width of the target [`WireType`]; failures carry the offending text so
//! the caller can log or surface them verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

// =============================================================================
// WireType
// =============================================================================

/// The node value types the codec understands.
///
/// Anything a server reports outside this set is handled as the distinct
/// *unsupported* case by [`NodeValue`](crate::transport::NodeValue); it
/// never enters the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    /// Boolean.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// UTF-8 string.
    String,
}

impl WireType {
    /// Canonical short name, as reported by node queries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TypedValue
// =============================================================================

/// A node value tagged with its wire type.
///
/// Serializes as a tagged union, e.g. `{"type": "int32", "value": 7}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    String(String),
}

impl TypedValue {
    /// The wire type of this value.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Bool(_) => WireType::Bool,
            Self::Int8(_) => WireType::Int8,
            Self::UInt8(_) => WireType::UInt8,
            Self::Int16(_) => WireType::Int16,
            Self::UInt16(_) => WireType::UInt16,
            Self::Int32(_) => WireType::Int32,
            Self::UInt32(_) => WireType::UInt32,
            Self::Int64(_) => WireType::Int64,
            Self::UInt64(_) => WireType::UInt64,
            Self::Float32(_) => WireType::Float32,
            Self::Float64(_) => WireType::Float64,
            Self::String(_) => WireType::String,
        }
    }

    /// Encodes the value to its canonical text form.
    ///
    /// Booleans encode as `"1"` / `"0"`; numbers use their shortest
    /// round-trippable decimal form; strings pass through unchanged.
    pub fn encode(&self) -> String {
        match self {
            Self::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            Self::Int8(v) => v.to_string(),
            Self::UInt8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::UInt16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::UInt32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::UInt64(v) => v.to_string(),
            Self::Float32(v) => v.to_string(),
            Self::Float64(v) => v.to_string(),
            Self::String(v) => v.clone(),
        }
    }
}

macro_rules! impl_from_for_typed_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TypedValue {
                fn from(v: $ty) -> Self {
                    TypedValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_typed_value! {
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes canonical text into a value of the target wire type.
///
/// The input is trimmed before parsing. Booleans accept the
/// case-insensitive forms `true`/`1` and `false`/`0`.
///
/// # Example
///
/// ```
/// use uagate_core::value::{decode, TypedValue, WireType};
///
/// assert_eq!(decode(WireType::Int32, " 7 ").unwrap(), TypedValue::Int32(7));
/// assert_eq!(decode(WireType::Bool, "TRUE").unwrap(), TypedValue::Bool(true));
/// assert!(decode(WireType::Int32, "true").is_err());
/// ```
pub fn decode(wire_type: WireType, text: &str) -> Result<TypedValue, CodecError> {
    let text = text.trim();
    match wire_type {
        WireType::Bool => decode_bool(text).map(TypedValue::Bool),
        WireType::Int8 => decode_number::<i8>(text, wire_type).map(TypedValue::Int8),
        WireType::UInt8 => decode_number::<u8>(text, wire_type).map(TypedValue::UInt8),
        WireType::Int16 => decode_number::<i16>(text, wire_type).map(TypedValue::Int16),
        WireType::UInt16 => decode_number::<u16>(text, wire_type).map(TypedValue::UInt16),
        WireType::Int32 => decode_number::<i32>(text, wire_type).map(TypedValue::Int32),
        WireType::UInt32 => decode_number::<u32>(text, wire_type).map(TypedValue::UInt32),
        WireType::Int64 => decode_number::<i64>(text, wire_type).map(TypedValue::Int64),
        WireType::UInt64 => decode_number::<u64>(text, wire_type).map(TypedValue::UInt64),
        WireType::Float32 => decode_number::<f32>(text, wire_type).map(TypedValue::Float32),
        WireType::Float64 => decode_number::<f64>(text, wire_type).map(TypedValue::Float64),
        WireType::String => Ok(TypedValue::String(text.to_string())),
    }
}

fn decode_bool(text: &str) -> Result<bool, CodecError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(CodecError::invalid_boolean(text)),
    }
}

fn decode_number<T: std::str::FromStr>(text: &str, target: WireType) -> Result<T, CodecError> {
    text.parse::<T>()
        .map_err(|_| CodecError::invalid_number(text, target.name()))
}

// =============================================================================
// Tests
// =============================================================================
