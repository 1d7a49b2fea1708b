// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node address scheme.
//!
//! Every polled or written node is identified by a compound key of
//! namespace index and numeric identifier, written as `"ns:id"` in
//! configuration and on the control plane (for example `"1:2045"`).
//!
//! Parsing is strict: the `':'` separator must be present exactly once
//! and both halves must be numeric. Anything else is rejected with
//! [`ClientError::AddressFormat`] so that malformed entries are caught
//! at the call site instead of reaching the server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Separator between the namespace index and the identifier.
pub const ADDRESS_SEPARATOR: char = ':';

// =============================================================================
// NodeAddress
// =============================================================================

/// A parsed OPC UA node address.
///
/// # Example
///
/// ```
/// use uagate_core::address::NodeAddress;
///
/// let addr: NodeAddress = "1:2045".parse().unwrap();
/// assert_eq!(addr.namespace_index, 1);
/// assert_eq!(addr.identifier, 2045);
/// assert_eq!(addr.to_string(), "1:2045");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddress {
    /// Namespace index on the server.
    pub namespace_index: u16,
    /// Numeric node identifier within the namespace.
    pub identifier: u32,
}

impl NodeAddress {
    /// Creates an address from its two components.
    pub fn new(namespace_index: u16, identifier: u32) -> Self {
        Self {
            namespace_index,
            identifier,
        }
    }

    /// Parses the canonical `"ns:id"` text form.
    ///
    /// Surrounding whitespace is ignored. Returns
    /// [`ClientError::AddressFormat`] when the separator is absent or
    /// either half is not a number in range.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let trimmed = text.trim();
        let (ns, id) = trimmed
            .split_once(ADDRESS_SEPARATOR)
            .ok_or_else(|| ClientError::address_format(trimmed))?;

        let namespace_index: u16 = ns
            .trim()
            .parse()
            .map_err(|_| ClientError::address_format(trimmed))?;
        let identifier: u32 = id
            .trim()
            .parse()
            .map_err(|_| ClientError::address_format(trimmed))?;

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

impl FromStr for NodeAddress {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.namespace_index, ADDRESS_SEPARATOR, self.identifier
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_address() {
        let addr = NodeAddress::parse("1:2045").unwrap();
        assert_eq!(addr, NodeAddress::new(1, 2045));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = NodeAddress::parse("  2 : 17 ").unwrap();
        assert_eq!(addr, NodeAddress::new(2, 17));
    }

    #[test]
    fn test_parse_format_round_trip() {
        for text in ["0:0", "1:2045", "65535:4294967295"] {
            let addr = NodeAddress::parse(text).unwrap();
            assert_eq!(addr.to_string(), text);
            assert_eq!(NodeAddress::parse(&addr.to_string()).unwrap(), addr);
        }
    }

    #[test]
    fn test_parse_missing_separator() {
        let err = NodeAddress::parse("2045").unwrap_err();
        assert!(matches!(err, ClientError::AddressFormat { .. }));
    }

    #[test]
    fn test_parse_non_numeric_halves() {
        assert!(NodeAddress::parse("abc:1").is_err());
        assert!(NodeAddress::parse("1:abc").is_err());
        assert!(NodeAddress::parse("abc").is_err());
        assert!(NodeAddress::parse(":").is_err());
        assert!(NodeAddress::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_segments() {
        assert!(NodeAddress::parse("1:2:3").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(NodeAddress::parse("65536:1").is_err());
        assert!(NodeAddress::parse("1:4294967296").is_err());
        assert!(NodeAddress::parse("-1:1").is_err());
    }

    #[test]
    fn test_legacy_underscore_scheme_not_recognized() {
        assert!(NodeAddress::parse("1_2045").is_err());
    }
}
