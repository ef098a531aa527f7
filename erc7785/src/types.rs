//! Core domain types for the ERC-7785 SDK.
//!
//! Inputs are validated once, when they are turned into these types, so
//! that malformed values are rejected before any network call.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, B256, Bytes, U256, hex};
use serde::{Deserialize, Serialize};

use crate::dns::MAX_LABEL_LEN;
use crate::error::{Error, Result};
use crate::namehash::{label_hash, namehash, normalize};

/// A normalized, single-level label such as `base`.
///
/// Normalization (trim, lower-case) happens here and nowhere else, so a
/// label hashes identically on the write path and on the read path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Normalize and validate a user-supplied label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyLabel`] for blank input, [`Error::InvalidLabel`]
    /// if it contains a `.` or whitespace, and [`Error::LabelTooLong`] past
    /// 63 bytes.
    pub fn parse(input: &str) -> Result<Self> {
        let label = normalize(input);
        if label.is_empty() {
            return Err(Error::EmptyLabel);
        }
        if label.contains('.') {
            return Err(Error::InvalidLabel {
                label,
                reason: "labels cannot contain '.'",
            });
        }
        if label.chars().any(char::is_whitespace) {
            return Err(Error::InvalidLabel {
                label,
                reason: "labels cannot contain whitespace",
            });
        }
        if label.len() > MAX_LABEL_LEN {
            let len = label.len();
            return Err(Error::LabelTooLong { label, len });
        }
        Ok(Self(label))
    }

    /// The normalized label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `keccak256(label)`, the registry's key for this label.
    #[must_use]
    pub fn hash(&self) -> B256 {
        label_hash(&self.0)
    }

    /// `label.suffix`, or just the label when the suffix is empty.
    ///
    /// The suffix is normalized like the label, so the namehash and the DNS
    /// encoding of the result see the same bytes.
    #[must_use]
    pub fn full_name(&self, suffix: &str) -> String {
        let suffix = normalize(suffix);
        let suffix = suffix.trim_matches('.');
        if suffix.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{suffix}", self.0)
        }
    }

    /// Namehash of [`Self::full_name`].
    #[must_use]
    pub fn node(&self, suffix: &str) -> B256 {
        namehash(&self.full_name(suffix))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.0
    }
}

/// An opaque ERC-7785 chain identifier.
///
/// Variable-length bytes, at most [`ChainIdentifier::MAX_LEN`]. It is not a
/// hash; the registry hands it out and accepts it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainIdentifier(Bytes);

impl ChainIdentifier {
    /// Longest identifier the registry accepts.
    pub const MAX_LEN: usize = 263;

    /// Wrap raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierLength`] for empty input or input
    /// longer than [`Self::MAX_LEN`].
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() > Self::MAX_LEN {
            return Err(Error::InvalidIdentifierLength {
                len: bytes.len(),
                expected: "1..=263",
            });
        }
        Ok(Self(bytes))
    }

    /// Parse hex bytes, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHex`] for non-hex or odd-length input, and
    /// the errors of [`Self::from_bytes`].
    pub fn from_hex(input: &str) -> Result<Self> {
        let input = input.trim();
        let bytes = hex::decode(input).map_err(|e| Error::InvalidHex {
            input: input.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// A 32-byte identifier, as stored by the resolver's node mapping.
    #[must_use]
    pub fn from_b256(value: B256) -> Self {
        Self(Bytes::copy_from_slice(value.as_slice()))
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    /// Lower-case hex without the `0x` prefix.
    #[must_use]
    pub fn to_hex_no_prefix(&self) -> String {
        hex::encode(&self.0)
    }

    /// The identifier as `bytes32`, for resolver entrypoints that take one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierLength`] unless exactly 32 bytes.
    pub fn to_b256(&self) -> Result<B256> {
        B256::try_from(self.0.as_ref()).map_err(|_| Error::InvalidIdentifierLength {
            len: self.0.len(),
            expected: "32",
        })
    }
}

impl fmt::Display for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex_no_prefix())
    }
}

impl FromStr for ChainIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for ChainIdentifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<ChainIdentifier> for String {
    fn from(value: ChainIdentifier) -> Self {
        value.to_string()
    }
}

/// Outcome of a lookup that reached the contract.
///
/// A negative answer is a normal result, distinct from a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// The contract returned a record.
    Found(T),
    /// The contract has no record for the key.
    NotFound,
}

impl<T> Lookup<T> {
    /// Convert into an [`Option`].
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }

    /// Whether a record was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Map the found value.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(v) => Lookup::Found(f(v)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Which decoder produced a reverse-resolution answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// The payload was a well-formed ABI `string`.
    Abi,
    /// ABI decoding failed and the bytes were read as UTF-8 text.
    RawUtf8,
}

/// A label recovered by reverse resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseName {
    /// The label text, exactly as stored.
    pub name: String,
    /// How the answer was decoded.
    pub decoded_via: DecodePath,
}

/// Result of a forward resolution (`label` → chain identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardResolution {
    /// The normalized label.
    pub label: Label,
    /// The full name the node was computed from.
    pub full_name: String,
    /// Namehash of `full_name`.
    pub node: B256,
    /// The identifier, if the label is registered.
    pub chain_id: Lookup<ChainIdentifier>,
}

/// Registry metadata for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainData {
    /// Human-readable chain name.
    pub chain_name: String,
    /// Chain id of the settlement layer.
    pub settlement_chain_id: U256,
    /// Free-form version string.
    pub version: String,
    /// Rollup contract on the settlement layer.
    pub rollup_contract: Address,
    /// CAIP-2 namespace (e.g. `eip155`).
    pub chain_namespace: String,
    /// CAIP-2 reference.
    pub chain_reference: String,
    /// SLIP-44 coin type.
    pub coin_type: U256,
}

impl ChainData {
    /// An unset storage slot: no name and a zero rollup contract.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain_name.is_empty() && self.rollup_contract.is_zero()
    }

    /// The CAIP-2 identifier described by this record, if well-formed.
    #[must_use]
    pub fn caip2(&self) -> Option<crate::Caip2> {
        crate::Caip2::new(self.chain_namespace.clone(), self.chain_reference.clone()).ok()
    }

    /// Check a record before it is submitted for registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChainData`] for a blank name or a namespace
    /// and reference that do not form a CAIP-2 identifier.
    pub fn validate(&self) -> Result<()> {
        if self.chain_name.trim().is_empty() {
            return Err(Error::InvalidChainData("chain name is empty"));
        }
        if self.caip2().is_none() {
            return Err(Error::InvalidChainData(
                "namespace and reference do not form a CAIP-2 identifier",
            ));
        }
        Ok(())
    }
}

/// A registry record reached through its CAIP-2 hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caip2Record {
    /// `keccak256` of the CAIP-2 identifier string.
    pub caip2_hash: B256,
    /// The chain identifier stored under that hash.
    pub chain_id: B256,
    /// The registry record of that chain.
    pub data: ChainData,
}

/// The resolver's own label-to-identifier mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// `computeNode(label)` as computed by the resolver.
    pub node: B256,
    /// `nodeToChainId(node)`; a zero word means unassigned.
    pub chain_id: Lookup<ChainIdentifier>,
}

/// A forward resolution, optionally followed by a reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChain {
    /// The forward answer.
    #[serde(flatten)]
    pub forward: ForwardResolution,
    /// Reverse lookup of the found identifier, when one was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<Lookup<ReverseName>>,
    /// Why the reverse lookup failed. The forward answer stands regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_error: Option<String>,
}

impl From<ForwardResolution> for ResolvedChain {
    fn from(forward: ForwardResolution) -> Self {
        Self {
            forward,
            reverse: None,
            reverse_error: None,
        }
    }
}

/// Progress of one on-chain write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "tx", rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started.
    Idle,
    /// Submitted, waiting for inclusion.
    Pending(B256),
    /// Included with a success status.
    Confirmed(B256),
}

/// Outcome of the two-write registration flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The registered label.
    pub label: Label,
    /// The identifier it maps to.
    pub chain_id: ChainIdentifier,
    /// `Registry.register` transaction.
    pub registry: StepStatus,
    /// `Resolver.register` transaction.
    pub resolver: StepStatus,
}
