//! [CAIP-2] chain identifiers (`namespace:reference`) and their hashes.
//!
//! The hash is a lookup key into registry storage. When an RPC connection is
//! available prefer the contract's own `computeCaip2Hash` (see
//! [`crate::ChainClient::caip2_hash_on_chain`]) so the key is computed exactly
//! as the contract computes it.
//!
//! [CAIP-2]: https://chainagnostic.org/CAIPs/caip-2

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{B256, keccak256};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Join a namespace and a reference with `:`. No escaping is applied.
///
/// # Errors
///
/// Returns [`Error::InvalidCaip2`] if either part is empty or contains `:`.
pub fn build_identifier(namespace: &str, reference: &str) -> Result<String> {
    Caip2::new(namespace, reference).map(|id| id.to_string())
}

/// `keccak256(utf8(identifier))`.
#[must_use]
pub fn hash(identifier: &str) -> B256 {
    keccak256(identifier.as_bytes())
}

/// A parsed CAIP-2 identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Caip2 {
    namespace: String,
    reference: String,
}

impl Caip2 {
    /// Build an identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCaip2`] if either part is empty or contains `:`.
    pub fn new(namespace: impl Into<String>, reference: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let reference = reference.into();
        let valid = |s: &str| !s.is_empty() && !s.contains(':');
        if !valid(&namespace) || !valid(&reference) {
            return Err(Error::InvalidCaip2(format!("{namespace}:{reference}")));
        }
        Ok(Self {
            namespace,
            reference,
        })
    }

    /// Shorthand for `eip155:<chain_id>`.
    #[must_use]
    pub fn eip155(chain_id: u64) -> Self {
        Self {
            namespace: "eip155".to_owned(),
            reference: chain_id.to_string(),
        }
    }

    /// The namespace part (e.g. `eip155`).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The reference part (e.g. `1`).
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Local keccak-256 hash of the textual identifier.
    #[must_use]
    pub fn hash(&self) -> B256 {
        hash(&self.to_string())
    }
}

impl fmt::Display for Caip2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for Caip2 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(reference), None) => {
                Self::new(ns, reference).map_err(|_| Error::InvalidCaip2(s.to_owned()))
            }
            _ => Err(Error::InvalidCaip2(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Caip2 {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Caip2> for String {
    fn from(value: Caip2) -> Self {
        value.to_string()
    }
}
