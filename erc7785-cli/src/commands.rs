//! Subcommand implementations.
//!
//! Every command returns a serializable report; printing is left to the
//! binary. Reads go through [`erc7785::Endpoints`] fallback. Writes are
//! sent to the first endpoint only, so a transaction is never submitted
//! twice.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use erc7785::codec::{reverse_key_binary, reverse_key_text};
use erc7785::{
    Caip2, Caip2Record, ChainClient, ChainData, ChainIdentifier, Label, Lookup, Mapping,
    Registration, ResolvedChain, ReverseKeyEncoding, ReverseName, dns_encode, label_hash,
    namehash,
};
use serde::Serialize;

use crate::config::Config;

/// Environment variable holding the signing key for write commands.
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";

/// Output of `resolve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    /// Network queried.
    pub network: &'static str,
    /// Resolver queried.
    pub resolver: Address,
    /// The resolution itself.
    #[serde(flatten)]
    pub result: ResolvedChain,
}

/// Forward resolution of `label`, chained into a reverse lookup unless
/// `no_reverse` is set.
///
/// # Errors
///
/// Fails on invalid input, missing addresses or when every endpoint fails.
pub async fn resolve(config: &Config, label: &str, no_reverse: bool) -> Result<ResolveReport> {
    let label = Label::parse(label)?;
    let deployment = &config.deployment;
    let resolver = deployment.resolver()?;

    let result = config
        .endpoints()?
        .run(|provider| {
            let client = ChainClient::new(provider, deployment.clone());
            let label = label.clone();
            async move {
                if no_reverse {
                    client.resolve(&label).await.map(ResolvedChain::from)
                } else {
                    client.resolve_and_reverse(&label).await
                }
            }
        })
        .await
        .with_context(|| format!("resolving {label}"))?;

    Ok(ResolveReport {
        network: deployment.network.name(),
        resolver,
        result,
    })
}

/// Output of `reverse`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseReport {
    /// Network queried.
    pub network: &'static str,
    /// Resolver queried.
    pub resolver: Address,
    /// The identifier looked up.
    pub chain_id: ChainIdentifier,
    /// The service key sent to the resolver.
    pub key: String,
    /// The recovered label.
    pub name: Lookup<ReverseName>,
}

/// Reverse resolution of a hex identifier.
///
/// # Errors
///
/// Fails on invalid input, missing addresses or when every endpoint fails.
pub async fn reverse(config: &Config, chain_id: &str) -> Result<ReverseReport> {
    let id = ChainIdentifier::from_hex(chain_id)?;
    let deployment = &config.deployment;
    let resolver = deployment.reverse_resolver()?;

    let name = config
        .endpoints()?
        .run(|provider| {
            let client = ChainClient::new(provider, deployment.clone());
            let id = id.clone();
            async move { client.reverse(&id).await }
        })
        .await
        .with_context(|| format!("reverse resolving {id}"))?;

    let key = match deployment.reverse_key {
        ReverseKeyEncoding::Binary => reverse_key_binary(&id).to_string(),
        ReverseKeyEncoding::Text => reverse_key_text(&id),
    };
    Ok(ReverseReport {
        network: deployment.network.name(),
        resolver,
        chain_id: id,
        key,
        name,
    })
}

/// Output of `mapping`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReport {
    /// The label checked.
    pub label: Label,
    /// Resolver queried.
    pub resolver: Address,
    /// The resolver's node and assignment.
    #[serde(flatten)]
    pub mapping: Mapping,
}

/// The resolver's `computeNode` / `nodeToChainId` view of `label`.
///
/// # Errors
///
/// Fails on invalid input, missing addresses or when every endpoint fails.
pub async fn mapping(config: &Config, label: &str) -> Result<MappingReport> {
    let label = Label::parse(label)?;
    let deployment = &config.deployment;
    let resolver = deployment.resolver()?;

    let mapping = config
        .endpoints()?
        .run(|provider| {
            let client = ChainClient::new(provider, deployment.clone());
            let label = label.clone();
            async move { client.resolver()?.current_mapping(&label).await }
        })
        .await
        .with_context(|| format!("reading mapping of {label}"))?;

    Ok(MappingReport {
        label,
        resolver,
        mapping,
    })
}

/// Output of `namehash`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamehashReport {
    /// Input as given.
    pub name: String,
    /// `keccak256` of the leftmost label.
    pub label_hash: B256,
    /// ENS namehash of the name.
    pub namehash: B256,
    /// DNS wire-format encoding.
    pub dns_encoded: Bytes,
}

/// Offline namehash and DNS encoding of `name`.
///
/// # Errors
///
/// Fails if the name cannot be DNS-encoded.
pub fn namehash_of(name: &str) -> Result<NamehashReport> {
    let normalized = erc7785::namehash::normalize(name);
    let first = normalized.split('.').next().unwrap_or_default();
    Ok(NamehashReport {
        label_hash: label_hash(first),
        namehash: namehash(&normalized),
        dns_encoded: dns_encode(&normalized, erc7785::dns::MAX_NAME_LEN)?,
        name: name.to_owned(),
    })
}

/// Output of `caip2`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caip2Report {
    /// The identifier.
    pub identifier: Caip2,
    /// CAIP-2 namespace.
    pub namespace: String,
    /// CAIP-2 reference.
    pub reference: String,
    /// Locally computed hash.
    pub hash: B256,
    /// Hash computed by the helper contract, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_chain_hash: Option<B256>,
}

/// Build and hash a CAIP-2 identifier, optionally through the helper.
///
/// # Errors
///
/// Fails on a malformed identifier, or on the helper call.
pub async fn caip2(config: &Config, identifier: &str, on_chain: bool) -> Result<Caip2Report> {
    let caip2: Caip2 = identifier.parse()?;
    let on_chain_hash = if on_chain {
        let deployment = &config.deployment;
        deployment.caip2()?;
        let hash = config
            .endpoints()?
            .run(|provider| {
                let client = ChainClient::new(provider, deployment.clone());
                let caip2 = caip2.clone();
                async move { client.caip2_hash_on_chain(&caip2).await }
            })
            .await
            .context("computing CAIP-2 hash on chain")?;
        Some(hash)
    } else {
        None
    };

    Ok(Caip2Report {
        namespace: caip2.namespace().to_owned(),
        reference: caip2.reference().to_owned(),
        hash: caip2.hash(),
        identifier: caip2,
        on_chain_hash,
    })
}

/// Where `chain-data` starts its lookup.
#[derive(Debug, Clone)]
pub enum ChainDataQuery {
    /// A CAIP-2 identifier, hashed first.
    Caip2(Caip2),
    /// A precomputed CAIP-2 hash.
    Hash(B256),
}

/// Output of `chain-data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDataReport {
    /// Network queried.
    pub network: &'static str,
    /// Registry queried.
    pub registry: Address,
    /// The CAIP-2 identifier, when the query was by identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caip2: Option<Caip2>,
    /// The registry record.
    pub record: Lookup<Caip2Record>,
}

/// Registry record lookup by CAIP-2 identifier or hash.
///
/// # Errors
///
/// Fails on missing addresses or when every endpoint fails.
pub async fn chain_data(config: &Config, query: ChainDataQuery) -> Result<ChainDataReport> {
    let deployment = &config.deployment;
    let registry = deployment.registry()?;

    let record = config
        .endpoints()?
        .run(|provider| {
            let client = ChainClient::new(provider, deployment.clone());
            let query = query.clone();
            async move {
                match query {
                    ChainDataQuery::Caip2(caip2) => client.caip2_lookup(&caip2).await,
                    ChainDataQuery::Hash(hash) => {
                        client.registry()?.chain_data_by_caip2_hash(hash).await
                    }
                }
            }
        })
        .await
        .context("reading chain data")?;

    Ok(ChainDataReport {
        network: deployment.network.name(),
        registry,
        caip2: match query {
            ChainDataQuery::Caip2(caip2) => Some(caip2),
            ChainDataQuery::Hash(_) => None,
        },
        record,
    })
}

/// Chain metadata given on the command line.
#[derive(Debug, Clone, clap::Args)]
pub struct ChainRecordArgs {
    /// Human-readable chain name.
    #[arg(long)]
    pub name: String,

    /// Chain id of the settlement layer.
    #[arg(long)]
    pub settlement_chain_id: U256,

    /// Version string.
    #[arg(long = "chain-version")]
    pub version: String,

    /// Rollup contract on the settlement layer.
    #[arg(long)]
    pub rollup_contract: Address,

    /// CAIP-2 namespace, e.g. `eip155`.
    #[arg(long)]
    pub namespace: String,

    /// CAIP-2 reference, e.g. `8453`.
    #[arg(long)]
    pub reference: String,

    /// SLIP-44 coin type. Defaults to 0 for `eip155`.
    #[arg(long)]
    pub coin_type: Option<U256>,
}

impl ChainRecordArgs {
    /// Build the registry record.
    ///
    /// # Errors
    ///
    /// Fails when the coin type is missing outside `eip155`, or the record
    /// is incomplete.
    pub fn into_chain_data(self) -> Result<ChainData> {
        let namespace = self.namespace.trim().to_owned();
        let coin_type = match self.coin_type {
            Some(coin_type) => coin_type,
            None if namespace.eq_ignore_ascii_case("eip155") => U256::ZERO,
            None => anyhow::bail!("--coin-type is required for namespace {namespace:?}"),
        };
        let data = ChainData {
            chain_name: self.name,
            settlement_chain_id: self.settlement_chain_id,
            version: self.version,
            rollup_contract: self.rollup_contract,
            chain_namespace: namespace,
            chain_reference: self.reference.trim().to_owned(),
            coin_type,
        };
        data.validate()?;
        Ok(data)
    }
}

/// Output of `register-chain`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterChainReport {
    /// Network used.
    pub network: &'static str,
    /// Registry called.
    pub registry: Address,
    /// Whether the call was only simulated.
    pub simulated: bool,
    /// Identifier assigned (or that would be assigned) to the record.
    pub chain_id: B256,
    /// The submitted record.
    pub record: ChainData,
}

/// Register a chain metadata record, or only simulate it with `simulate`.
///
/// # Errors
///
/// Fails on an incomplete record, a missing key (unless simulating) or a
/// revert such as `ChainAlreadyRegistered`.
pub async fn register_chain(
    config: &Config,
    record: ChainRecordArgs,
    simulate: bool,
) -> Result<RegisterChainReport> {
    let record = record.into_chain_data()?;
    let deployment = &config.deployment;
    let registry = deployment.registry()?;

    let chain_id = if simulate {
        config
            .endpoints()?
            .run(|provider| {
                let client = ChainClient::new(provider, deployment.clone());
                let record = record.clone();
                async move { client.preview_chain_data(&record).await }
            })
            .await
            .with_context(|| format!("simulating registration of {}", record.chain_name))?
    } else {
        let (client, _) = writer(config)?;
        client
            .register_chain_data(&record)
            .await
            .with_context(|| format!("registering {}", record.chain_name))?
    };

    Ok(RegisterChainReport {
        network: deployment.network.name(),
        registry,
        simulated: simulate,
        chain_id,
        record,
    })
}

/// Output of `register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReport {
    /// Network written to.
    pub network: &'static str,
    /// Owner recorded for the label.
    pub owner: Address,
    /// Final state of both writes.
    #[serde(flatten)]
    pub registration: Registration,
}

/// Two-write registration of `label` for `chain_id`.
///
/// # Errors
///
/// Fails on invalid input, a missing key, a taken label or a revert.
pub async fn register(
    config: &Config,
    label: &str,
    chain_id: &str,
    owner: Option<Address>,
) -> Result<RegisterReport> {
    let label = Label::parse(label)?;
    let id = ChainIdentifier::from_hex(chain_id)?;
    let (client, signer) = writer(config)?;
    let owner = owner.unwrap_or(signer);

    let registration = client
        .register_with_progress(&label, &id, owner, |step| {
            tracing::info!(registry = ?step.registry, resolver = ?step.resolver, "registration progress");
        })
        .await
        .with_context(|| format!("registering {label}"))?;

    Ok(RegisterReport {
        network: config.deployment.network.name(),
        owner,
        registration,
    })
}

/// Output of `assign`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignReport {
    /// The label assigned.
    pub label: Label,
    /// The identifier assigned.
    pub chain_id: ChainIdentifier,
    /// Assignment transaction.
    pub tx: B256,
    /// The resolver's mapping read back after inclusion.
    pub mapping: Lookup<ChainIdentifier>,
}

/// Resolver assignment of `label` to a 32-byte `chain_id`.
///
/// # Errors
///
/// Fails on invalid input, a missing key or a revert.
pub async fn assign(config: &Config, label: &str, chain_id: &str) -> Result<AssignReport> {
    let label = Label::parse(label)?;
    let id = ChainIdentifier::from_hex(chain_id)?;
    id.to_b256()?;
    let (client, _) = writer(config)?;

    let (tx, mapping) = client
        .assign(&label, &id)
        .await
        .with_context(|| format!("assigning {label}"))?;

    Ok(AssignReport {
        label,
        chain_id: id,
        tx,
        mapping,
    })
}

/// A signing client on the first configured endpoint.
fn writer(config: &Config) -> Result<(ChainClient<impl alloy::providers::Provider>, Address)> {
    let key = std::env::var(ENV_PRIVATE_KEY)
        .with_context(|| format!("{ENV_PRIVATE_KEY} must be set for write commands"))?;
    let signer: PrivateKeySigner = key
        .trim()
        .parse()
        .with_context(|| format!("{ENV_PRIVATE_KEY} is not a valid private key"))?;
    let address = signer.address();

    let endpoints = config.endpoints()?;
    let url = endpoints
        .urls()
        .first()
        .context("no RPC endpoint configured")?
        .clone();
    tracing::info!(rpc = %url, from = %address, "sending from");

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url);
    Ok((ChainClient::new(provider, config.deployment.clone()), address))
}
