//! Runtime configuration loaded from `erc7785.toml`.
//!
//! Settings are layered: built-in defaults, then the TOML file, then
//! `ERC7785_*` environment variables, then command-line flags. When no
//! config file is present the defaults are used, so every contract address
//! must come from the environment.
//!
//! ```toml
//! rpcs = ["https://ethereum-sepolia.publicnode.com"]
//! timeout_secs = 10
//!
//! [deployment]
//! network = "ethereum-sepolia"
//! registry = "0x..."
//! resolver = "0x..."
//! reverse_key = "binary"
//! ```

use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use erc7785::{Deployment, Endpoints};
use serde::Deserialize;

/// Environment variable holding the registry address.
pub const ENV_REGISTRY: &str = "ERC7785_REGISTRY_ADDRESS";
/// Environment variable holding the resolver address.
pub const ENV_RESOLVER: &str = "ERC7785_RESOLVER_ADDRESS";
/// Environment variable holding the reverse resolver address.
pub const ENV_REVERSE_RESOLVER: &str = "ERC7785_REVERSE_RESOLVER_ADDRESS";
/// Environment variable holding the CAIP-2 helper address.
pub const ENV_CAIP2: &str = "ERC7785_CAIP2_ADDRESS";
/// Environment variable holding comma-separated RPC URLs.
pub const ENV_RPC_URLS: &str = "ERC7785_RPC_URLS";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Contract addresses and lookup conventions.
    #[serde(default)]
    pub deployment: Deployment,
    /// Ordered RPC URLs (best first). Empty means the network defaults.
    #[serde(default)]
    pub rpcs: Vec<String>,
    /// Per-endpoint timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns [`Config::default`] if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or unknown keys.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `ERC7785_*` overrides read through `var`.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when an address is malformed.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        for (name, slot) in [
            (ENV_REGISTRY, &mut self.deployment.registry),
            (ENV_RESOLVER, &mut self.deployment.resolver),
            (ENV_REVERSE_RESOLVER, &mut self.deployment.reverse_resolver),
            (ENV_CAIP2, &mut self.deployment.caip2),
        ] {
            if let Some(value) = get(name) {
                *slot = parse_address(name, &value)?;
            }
        }
        if let Some(urls) = get(ENV_RPC_URLS) {
            self.rpcs = split_urls(&urls);
        }
        Ok(())
    }

    /// Apply `--rpc` flags, which replace every other RPC source.
    pub fn apply_rpc_flags(&mut self, rpcs: Vec<String>) {
        if !rpcs.is_empty() {
            self.rpcs = rpcs;
        }
    }

    /// Return the RPC URL list, falling back to the network's built-in
    /// endpoints when none are configured.
    #[must_use]
    pub fn rpcs(&self) -> Vec<String> {
        if self.rpcs.is_empty() {
            self.deployment
                .network
                .default_rpcs()
                .iter()
                .map(|&u| u.to_owned())
                .collect()
        } else {
            self.rpcs.clone()
        }
    }

    /// The endpoint list with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if an RPC URL is malformed.
    pub fn endpoints(&self) -> Result<Endpoints> {
        let endpoints = Endpoints::new(self.rpcs())?;
        Ok(match self.timeout_secs {
            Some(secs) => endpoints.with_timeout(Duration::from_secs(secs)),
            None => endpoints,
        })
    }
}

fn parse_address(name: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} is not a valid address: {value:?}"))
}

fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alloy::primitives::address;
    use erc7785::{Network, ReverseKeyEncoding, ReverseNode};

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/erc7785.toml")).unwrap();
        assert!(config.rpcs.is_empty(), "no rpcs");
        assert_eq!(config.deployment, Deployment::default(), "default deployment");
        assert_eq!(
            config.rpcs().len(),
            Network::EthereumSepolia.default_rpcs().len(),
            "falls back to network defaults"
        );
    }

    #[test]
    fn parses_full_file() {
        let config = Config::parse(
            r#"
            rpcs = ["https://a.example", "https://b.example"]
            timeout_secs = 3

            [deployment]
            network = "ethereum-mainnet"
            resolver = "0x00000000000000000000000000000000000000aa"
            suffix = "chains.eth"
            reverse_key = "text"
            reverse_node = { sentinel = "reverse.chains.eth" }
            "#,
        )
        .unwrap();

        assert_eq!(config.rpcs(), ["https://a.example", "https://b.example"], "rpcs");
        assert_eq!(config.timeout_secs, Some(3), "timeout");
        let d = &config.deployment;
        assert_eq!(d.network, Network::EthereumMainnet, "network");
        assert_eq!(d.resolver, address!("00000000000000000000000000000000000000aa"), "resolver");
        assert_eq!(d.registry, Address::ZERO, "unset registry");
        assert_eq!(d.suffix, "chains.eth", "suffix");
        assert_eq!(d.reverse_key, ReverseKeyEncoding::Text, "key encoding");
        assert_eq!(
            d.reverse_node,
            ReverseNode::Sentinel("reverse.chains.eth".to_owned()),
            "reverse node"
        );
        assert_eq!(
            config.endpoints().unwrap().timeout(),
            Duration::from_secs(3),
            "timeout applied"
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("rpc = []").is_err(), "typo is reported");
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::parse(
            r#"
            rpcs = ["https://file.example"]
            [deployment]
            resolver = "0x00000000000000000000000000000000000000aa"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_RESOLVER, "0x00000000000000000000000000000000000000bb"),
            (ENV_REGISTRY, "  "),
            (ENV_RPC_URLS, "https://x.example, ,https://y.example"),
        ]
        .into();

        config
            .apply_env(|name| env.get(name).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(
            config.deployment.resolver,
            address!("00000000000000000000000000000000000000bb"),
            "env wins"
        );
        assert_eq!(config.deployment.registry, Address::ZERO, "blank ignored");
        assert_eq!(config.rpcs(), ["https://x.example", "https://y.example"], "split list");

        config.apply_rpc_flags(vec!["https://flag.example".to_owned()]);
        assert_eq!(config.rpcs(), ["https://flag.example"], "flag wins");
    }

    #[test]
    fn malformed_env_address_names_the_variable() {
        let mut config = Config::default();
        let err = config
            .apply_env(|name| (name == ENV_CAIP2).then(|| "0x1234".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CAIP2), "{err}");
    }
}
