//! Rust SDK for the [ERC-7785] chain identifier registry and resolver.
//!
//! Human-readable chain labels (`base`, `optimism`) map to opaque chain
//! identifiers through an ENS-style resolver. This crate provides:
//!
//! - the offline codec: [`namehash`], [`dns_encode`], ENSIP-10 call data and
//!   answer decoding ([`codec`]), reverse-lookup keys and [CAIP-2] hashing;
//! - typed bindings and a [`ChainClient`] for the registry, resolver and
//!   CAIP-2 helper contracts, including the two-write registration flow;
//! - [`Endpoints`], an ordered RPC list with per-endpoint timeout and
//!   fallback;
//! - [`ResolveSession`], last-request-wins ordering for overlapping lookups.
//!
//! A label that is not registered resolves to [`Lookup::NotFound`]; only
//! malformed input, transport failures and reverts are [`Error`]s.
//!
//! ```no_run
//! use erc7785::{ChainClient, Deployment, Endpoints, Label, Network};
//!
//! # async fn run() -> erc7785::Result<()> {
//! let deployment = Deployment {
//!     resolver: "0x1111111111111111111111111111111111111111".parse().unwrap(),
//!     ..Deployment::default()
//! };
//! let label = Label::parse("base")?;
//!
//! let answer = Endpoints::for_network(Network::EthereumSepolia)?
//!     .run(|provider| {
//!         let client = ChainClient::new(provider, deployment.clone());
//!         let label = label.clone();
//!         async move { client.resolve(&label).await }
//!     })
//!     .await?;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```
//!
//! [ERC-7785]: https://eips.ethereum.org/EIPS/eip-7785
//! [CAIP-2]: https://chainagnostic.org/CAIPs/caip-2

pub mod caip2;
mod client;
pub mod codec;
pub mod contracts;
pub mod dns;
mod error;
pub mod namehash;
mod networks;
mod registry;
mod resolver;
mod rpc;
mod session;
mod types;

pub use caip2::Caip2;
pub use client::ChainClient;
pub use dns::{dns_decode, dns_encode};
pub use error::{EndpointFailure, Error, Result};
pub use namehash::{label_hash, namehash};
pub use networks::{DEFAULT_SUFFIX, Deployment, Network, ReverseKeyEncoding, ReverseNode};
pub use registry::Registry;
pub use resolver::Resolver;
pub use rpc::Endpoints;
pub use session::{ResolveSession, ResolveState, Ticket};
pub use types::{
    Caip2Record, ChainData, ChainIdentifier, DecodePath, ForwardResolution, Label, Lookup,
    Mapping, Registration, ResolvedChain, ReverseName, StepStatus,
};
