//! Known networks and per-deployment configuration.
//!
//! Contract addresses differ between deployments of the registry, so they
//! are not hard-coded here; they are carried by an explicit [`Deployment`]
//! value that callers build from their own configuration.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::caip2::Caip2;
use crate::error::{Error, Result};

/// Name suffix under which labels are resolved (`<label>.cid.eth`).
pub const DEFAULT_SUFFIX: &str = "cid.eth";

/// Networks the registry has been deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Network {
    /// Ethereum Mainnet (chain ID 1).
    EthereumMainnet,
    /// Ethereum Sepolia testnet (chain ID 11155111).
    EthereumSepolia,
}

impl Network {
    /// Returns the EIP-155 chain ID for this network.
    #[must_use]
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::EthereumMainnet => 1,
            Self::EthereumSepolia => 11_155_111,
        }
    }

    /// Short display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EthereumMainnet => "mainnet",
            Self::EthereumSepolia => "sepolia",
        }
    }

    /// Public RPC endpoints, best first.
    #[must_use]
    pub const fn default_rpcs(self) -> &'static [&'static str] {
        match self {
            Self::EthereumMainnet => &[
                "https://ethereum-rpc.publicnode.com",
                "https://eth.llamarpc.com",
            ],
            Self::EthereumSepolia => &[
                "https://ethereum-sepolia.publicnode.com",
                "https://rpc.sepolia.org",
                "https://endpoints.omniatech.io/v1/eth/sepolia/public",
            ],
        }
    }

    /// The CAIP-2 identifier of this network (`eip155:<id>`).
    #[must_use]
    pub fn caip2(self) -> Caip2 {
        Caip2::eip155(self.chain_id())
    }

    /// All known network variants.
    pub const ALL: &[Self] = &[Self::EthereumMainnet, Self::EthereumSepolia];

    /// Look up a [`Network`] by its EIP-155 chain ID.
    #[must_use]
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.iter().find(|n| n.chain_id() == chain_id).copied()
    }
}

/// Which `node` the reverse lookup passes to `data(node, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReverseNode {
    /// `0x00…00`.
    #[default]
    Zero,
    /// Namehash of a fixed sentinel name.
    Sentinel(String),
}

/// How the reverse-lookup service key is built.
///
/// A deployment understands exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReverseKeyEncoding {
    /// `abi.encode("chain-name:") || identifier`, read with `data(bytes32,bytes)`.
    #[default]
    Binary,
    /// `"chain-name:" + hex(identifier)`, read with `text(bytes32,string)`.
    Text,
}

/// Contract addresses and lookup conventions of one registry deployment.
///
/// Unset addresses are [`Address::ZERO`]; operations that need them fail
/// with [`Error::MissingAddress`] before touching the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    /// The network the contracts live on.
    pub network: Network,
    /// Chain registry contract.
    pub registry: Address,
    /// ENSIP-10 chain resolver contract.
    pub resolver: Address,
    /// Resolver answering reverse lookups; falls back to `resolver` when unset.
    pub reverse_resolver: Address,
    /// CAIP-2 hashing helper contract.
    pub caip2: Address,
    /// Suffix appended to labels before hashing.
    pub suffix: String,
    /// Node convention for reverse lookups.
    pub reverse_node: ReverseNode,
    /// Key convention for reverse lookups.
    pub reverse_key: ReverseKeyEncoding,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            network: Network::EthereumSepolia,
            registry: Address::ZERO,
            resolver: Address::ZERO,
            reverse_resolver: Address::ZERO,
            caip2: Address::ZERO,
            suffix: DEFAULT_SUFFIX.to_owned(),
            reverse_node: ReverseNode::Zero,
            reverse_key: ReverseKeyEncoding::Binary,
        }
    }
}

impl Deployment {
    /// The registry address, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] when unset.
    pub fn registry(&self) -> Result<Address> {
        require(self.registry, "chain registry")
    }

    /// The resolver address, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] when unset.
    pub fn resolver(&self) -> Result<Address> {
        require(self.resolver, "chain resolver")
    }

    /// The reverse resolver, defaulting to the forward resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] when neither is set.
    pub fn reverse_resolver(&self) -> Result<Address> {
        if self.reverse_resolver.is_zero() {
            return require(self.resolver, "reverse resolver");
        }
        Ok(self.reverse_resolver)
    }

    /// The CAIP-2 helper address, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] when unset.
    pub fn caip2(&self) -> Result<Address> {
        require(self.caip2, "CAIP-2 helper")
    }
}

fn require(address: Address, what: &'static str) -> Result<Address> {
    if address.is_zero() {
        Err(Error::MissingAddress(what))
    } else {
        Ok(address)
    }
}
