//! Error types for the ERC-7785 SDK.
//!
//! Errors fall into four groups: malformed input (rejected before any
//! network call), transport failures (retryable on another endpoint),
//! on-chain reverts (surfaced with their decoded reason) and ABI decode
//! failures. A negative lookup is *not* an error; it is reported through
//! the `NotFound` variants of the resolution types instead.

use std::fmt;
use std::time::Duration;

use alloy::primitives::{B256, Bytes};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the SDK can report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The label was empty after trimming.
    #[error("label is empty")]
    EmptyLabel,

    /// The label contains a character the name format cannot carry.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel {
        /// The offending input.
        label: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A single DNS label exceeds 63 bytes.
    #[error("label {label:?} is {len} bytes, the wire format allows at most 63")]
    LabelTooLong {
        /// The offending label.
        label: String,
        /// Its UTF-8 length.
        len: usize,
    },

    /// The DNS-encoded name exceeds the requested ceiling.
    #[error("encoded name is {len} bytes, limit is {max}")]
    NameTooLong {
        /// Encoded length that would have been produced.
        len: usize,
        /// Effective ceiling.
        max: usize,
    },

    /// A DNS wire-format buffer could not be parsed.
    #[error("malformed DNS wire name: {0}")]
    MalformedDnsName(&'static str),

    /// A hex string could not be parsed.
    #[error("invalid hex {input:?}: {reason}")]
    InvalidHex {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A chain identifier has an unsupported length.
    #[error("chain identifier is {len} bytes, expected {expected}")]
    InvalidIdentifierLength {
        /// Actual byte length.
        len: usize,
        /// Human-readable expectation (e.g. `"1..=263"`).
        expected: &'static str,
    },

    /// A CAIP-2 identifier is not of the form `namespace:reference`.
    #[error("invalid CAIP-2 identifier {0:?}: expected `namespace:reference`")]
    InvalidCaip2(String),

    /// A chain metadata record is incomplete.
    #[error("invalid chain data: {0}")]
    InvalidChainData(&'static str),

    /// A contract address required by the operation is not configured.
    #[error("{0} address is not configured")]
    MissingAddress(&'static str),

    /// The label already maps to a chain identifier in the registry.
    #[error("label {0:?} is already registered")]
    LabelTaken(String),

    /// An ABI payload returned by a contract could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: &'static str,
        /// Underlying decoder error.
        #[source]
        source: alloy::sol_types::Error,
    },

    /// A contract call failed without revert data.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),

    /// A raw RPC call failed.
    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    /// Waiting for a transaction receipt failed.
    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    /// The contract rejected the call or the transaction reverted.
    #[error("execution reverted: {reason}")]
    Reverted {
        /// Decoded revert reason, or the raw revert data in hex.
        reason: String,
        /// Raw revert data, when the node returned any.
        data: Option<Bytes>,
    },

    /// A mined transaction did not emit the event carrying its result.
    #[error("transaction {tx} emitted no {event} event")]
    MissingEvent {
        /// The expected event name.
        event: &'static str,
        /// The transaction hash.
        tx: B256,
    },

    /// An endpoint did not answer within the per-endpoint timeout.
    #[error("{endpoint} timed out after {after:?}")]
    Timeout {
        /// The endpoint URL.
        endpoint: String,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// An RPC URL could not be parsed.
    #[error("invalid RPC URL {0:?}")]
    InvalidRpcUrl(String),

    /// No RPC endpoints were supplied.
    #[error("no RPC endpoints configured")]
    NoEndpoints,

    /// Every endpoint failed; each failure is listed.
    #[error("all {} RPC endpoints failed: {}", .0.len(), FailureList(.0))]
    AllEndpointsFailed(Vec<EndpointFailure>),
}

impl Error {
    /// Whether retrying the same request elsewhere could succeed.
    ///
    /// Malformed input and reverts are deterministic and never retryable.
    /// A response that fails to decode is treated as an endpoint fault.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Contract(_)
                | Self::Decode { .. }
                | Self::PendingTransaction(_)
                | Self::Timeout { .. }
                | Self::AllEndpointsFailed(_)
        )
    }

    /// Whether the input was rejected before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyLabel
                | Self::InvalidLabel { .. }
                | Self::LabelTooLong { .. }
                | Self::NameTooLong { .. }
                | Self::MalformedDnsName(_)
                | Self::InvalidHex { .. }
                | Self::InvalidIdentifierLength { .. }
                | Self::InvalidCaip2(_)
                | Self::InvalidChainData(_)
                | Self::MissingAddress(_)
                | Self::InvalidRpcUrl(_)
                | Self::NoEndpoints
        )
    }

    pub(crate) const fn decode(context: &'static str, source: alloy::sol_types::Error) -> Self {
        Self::Decode { context, source }
    }
}

/// One failed attempt inside an endpoint fallback sequence.
#[derive(Debug)]
pub struct EndpointFailure {
    /// The endpoint URL that was tried.
    pub endpoint: String,
    /// Why it failed.
    pub error: Error,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.error)
    }
}

struct FailureList<'a>(&'a [EndpointFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{failure}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_error_lists_every_endpoint() {
        let err = Error::AllEndpointsFailed(vec![
            EndpointFailure {
                endpoint: "https://a.example".to_owned(),
                error: Error::NoEndpoints,
            },
            EndpointFailure {
                endpoint: "https://b.example".to_owned(),
                error: Error::Timeout {
                    endpoint: "https://b.example".to_owned(),
                    after: Duration::from_secs(5),
                },
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("all 2 RPC endpoints failed"), "{msg}");
        assert!(msg.contains("https://a.example"), "{msg}");
        assert!(msg.contains("https://b.example timed out"), "{msg}");
        assert!(err.is_retryable(), "aggregate transport failure is retryable");
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = Error::EmptyLabel;
        assert!(err.is_validation(), "empty label is a validation error");
        assert!(!err.is_retryable(), "validation errors are final");
    }
}
