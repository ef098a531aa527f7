//! Call-data construction and answer decoding for [ENSIP-10] reads.
//!
//! Every record read goes through the resolver's single entrypoint:
//!
//! ```text
//! resolve(dns_encode(name), text(node, key) | data(node, key)) -> bytes
//! ```
//!
//! The answer is therefore decoded twice: first the outer `bytes` envelope,
//! then the inner function's own return type.
//!
//! [ENSIP-10]: https://docs.ens.domains/ensip/10

use alloy::primitives::{B256, Bytes};
use alloy::sol_types::{SolCall, SolValue};

use crate::contracts::{IChainResolver, IRecordReader};
use crate::dns::{MAX_NAME_LEN, dns_encode};
use crate::error::{Error, Result};
use crate::namehash::namehash;
use crate::networks::{ReverseKeyEncoding, ReverseNode};
use crate::types::{ChainIdentifier, DecodePath, Label, Lookup, ReverseName};

/// Text record key holding a label's chain identifier.
pub const CHAIN_ID_KEY: &str = "chain-id";

/// Prefix of the reverse-lookup service key.
pub const REVERSE_KEY_PREFIX: &str = "chain-name:";

/// `text(bytes32,string)` call data.
#[must_use]
pub fn text_call(node: B256, key: &str) -> Bytes {
    IRecordReader::textCall {
        node,
        key: key.to_owned(),
    }
    .abi_encode()
    .into()
}

/// `data(bytes32,bytes)` call data.
#[must_use]
pub fn data_call(node: B256, key: Bytes) -> Bytes {
    IRecordReader::dataCall { node, key }.abi_encode().into()
}

/// `resolve(bytes,bytes)` call data wrapping an inner record read.
#[must_use]
pub fn resolve_call(name: Bytes, inner: Bytes) -> Bytes {
    IChainResolver::resolveCall { name, data: inner }
        .abi_encode()
        .into()
}

/// Arguments of one `resolve(name, data)` read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Node passed to the inner record read.
    pub node: B256,
    /// DNS wire-format name passed as `resolve`'s first argument.
    pub name: Bytes,
    /// Inner `text`/`data` call data.
    pub inner: Bytes,
    /// Which inner function `inner` calls.
    pub record: RecordKind,
}

impl ResolveRequest {
    /// Complete `resolve(bytes,bytes)` call data for a raw `eth_call`.
    #[must_use]
    pub fn calldata(&self) -> Bytes {
        resolve_call(self.name.clone(), self.inner.clone())
    }
}

/// The inner record function of a [`ResolveRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `text(bytes32,string) returns (string)`.
    Text,
    /// `data(bytes32,bytes) returns (bytes)`.
    Data,
}

/// Build the forward read `text(namehash(label.suffix), "chain-id")`.
///
/// # Errors
///
/// Fails if the full name cannot be DNS-encoded.
pub fn forward_request(label: &Label, suffix: &str) -> Result<ResolveRequest> {
    let full_name = label.full_name(suffix);
    let node = namehash(&full_name);
    Ok(ResolveRequest {
        node,
        name: dns_encode(&full_name, MAX_NAME_LEN)?,
        inner: text_call(node, CHAIN_ID_KEY),
        record: RecordKind::Text,
    })
}

/// Binary-safe reverse key: `abi.encode("chain-name:") || identifier`.
///
/// The identifier bytes are appended raw, not re-encoded.
#[must_use]
pub fn reverse_key_binary(id: &ChainIdentifier) -> Bytes {
    let mut key = REVERSE_KEY_PREFIX.to_owned().abi_encode();
    key.extend_from_slice(id.as_bytes());
    key.into()
}

/// Text reverse key: `"chain-name:" + hex(identifier)`, no `0x`.
#[must_use]
pub fn reverse_key_text(id: &ChainIdentifier) -> String {
    format!("{REVERSE_KEY_PREFIX}{}", id.to_hex_no_prefix())
}

/// The node a reverse lookup reads under.
#[must_use]
pub fn reverse_node(convention: &ReverseNode) -> B256 {
    match convention {
        ReverseNode::Zero => B256::ZERO,
        ReverseNode::Sentinel(name) => namehash(name),
    }
}

/// Build the reverse read for `id` under the given conventions.
///
/// The outer name is the DNS root (`0x00`); the resolver dispatches on the
/// key alone.
#[must_use]
pub fn reverse_request(
    id: &ChainIdentifier,
    node: &ReverseNode,
    encoding: ReverseKeyEncoding,
) -> ResolveRequest {
    let node = reverse_node(node);
    let (inner, record) = match encoding {
        ReverseKeyEncoding::Binary => (data_call(node, reverse_key_binary(id)), RecordKind::Data),
        ReverseKeyEncoding::Text => (text_call(node, &reverse_key_text(id)), RecordKind::Text),
    };
    ResolveRequest {
        node,
        name: Bytes::from_static(&[0]),
        inner,
        record,
    }
}

/// Decode the outer envelope of a raw `resolve` return value.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the data is not an ABI `bytes` value.
pub fn decode_resolve_answer(raw: &[u8]) -> Result<Bytes> {
    IChainResolver::resolveCall::abi_decode_returns(raw)
        .map_err(|e| Error::decode("resolve() answer", e))
}

/// Decode an inner `text()` return value.
///
/// An empty payload means the resolver had nothing to say and decodes to
/// the empty string.
///
/// # Errors
///
/// Returns [`Error::Decode`] for a non-empty payload that is not an ABI
/// `string`.
pub fn decode_text_answer(inner: &[u8]) -> Result<String> {
    if inner.is_empty() {
        return Ok(String::new());
    }
    IRecordReader::textCall::abi_decode_returns(inner)
        .map_err(|e| Error::decode("text() answer", e))
}

/// Decode an inner `data()` return value. Empty payload ⇒ empty bytes.
///
/// # Errors
///
/// Returns [`Error::Decode`] for a non-empty payload that is not an ABI
/// `bytes`.
pub fn decode_data_answer(inner: &[u8]) -> Result<Bytes> {
    if inner.is_empty() {
        return Ok(Bytes::new());
    }
    IRecordReader::dataCall::abi_decode_returns(inner)
        .map_err(|e| Error::decode("data() answer", e))
}

/// Interpret a `chain-id` text record.
///
/// The record holds hex digits, with or without `0x`. An empty record, or
/// one that is not whole bytes of hex, means the label is not registered.
#[must_use]
pub fn parse_chain_id_text(text: &str) -> Lookup<ChainIdentifier> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return Lookup::NotFound;
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) || digits.len() % 2 != 0 {
        tracing::debug!(record = text, "chain-id record is not hex bytes, treating as unset");
        return Lookup::NotFound;
    }
    ChainIdentifier::from_hex(digits).ok().into()
}

/// Decode the inner payload of a forward `text(node, "chain-id")` read.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the payload is not an ABI `string`.
pub fn decode_forward_answer(inner: &[u8]) -> Result<Lookup<ChainIdentifier>> {
    decode_text_answer(inner).map(|text| parse_chain_id_text(&text))
}

/// Decode the payload of a binary reverse read (`data()` return value).
///
/// The payload should be an ABI-encoded `string`. When it is not, the
/// bytes are read as UTF-8 text instead and the answer is marked
/// [`DecodePath::RawUtf8`]. An empty name means not registered.
#[must_use]
pub fn decode_reverse_payload(payload: &[u8]) -> Lookup<ReverseName> {
    if payload.is_empty() {
        return Lookup::NotFound;
    }
    let (name, decoded_via) = match String::abi_decode(payload) {
        Ok(name) => (name, DecodePath::Abi),
        Err(e) => {
            tracing::warn!(
                error = %e,
                len = payload.len(),
                "reverse answer is not an ABI string, reading raw UTF-8"
            );
            (
                String::from_utf8_lossy(payload).into_owned(),
                DecodePath::RawUtf8,
            )
        }
    };
    let name = name.trim_matches('\0').to_owned();
    if name.is_empty() {
        return Lookup::NotFound;
    }
    Lookup::Found(ReverseName { name, decoded_via })
}

/// Decode the inner answer of a reverse read built by [`reverse_request`].
///
/// # Errors
///
/// Returns [`Error::Decode`] if the inner envelope does not match `record`.
pub fn decode_reverse_answer(record: RecordKind, inner: &[u8]) -> Result<Lookup<ReverseName>> {
    match record {
        RecordKind::Data => decode_data_answer(inner).map(|payload| decode_reverse_payload(&payload)),
        RecordKind::Text => decode_text_answer(inner).map(|name| {
            if name.is_empty() {
                Lookup::NotFound
            } else {
                Lookup::Found(ReverseName {
                    name,
                    decoded_via: DecodePath::Abi,
                })
            }
        }),
    }
}
