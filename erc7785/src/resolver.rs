//! ENSIP-10 chain resolver: forward and reverse resolution, label mapping.

use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::Provider;

use crate::codec::{self, ResolveRequest};
use crate::contracts::{IChainResolver, confirm, contract_error};
use crate::error::Result;
use crate::networks::Deployment;
use crate::types::{ChainIdentifier, ForwardResolution, Label, Lookup, Mapping, ReverseName};

/// Handle to a chain resolver contract.
#[derive(Debug)]
pub struct Resolver<'a, P> {
    contract: IChainResolver::IChainResolverInstance<&'a P>,
    deployment: &'a Deployment,
}

impl<'a, P: Provider> Resolver<'a, P> {
    pub(crate) fn new(address: Address, provider: &'a P, deployment: &'a Deployment) -> Self {
        Self {
            contract: IChainResolver::IChainResolverInstance::new(address, provider),
            deployment,
        }
    }

    /// The resolver contract address.
    #[must_use]
    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// Send one `resolve(name, data)` read and strip the outer envelope.
    async fn call_resolve(&self, request: &ResolveRequest) -> Result<Bytes> {
        self.contract
            .resolve(request.name.clone(), request.inner.clone())
            .call()
            .await
            .map_err(contract_error)
    }

    /// Resolve `label` to its chain identifier.
    ///
    /// Reads `text(namehash(label.suffix), "chain-id")` through `resolve`.
    /// An unregistered label is a [`Lookup::NotFound`] answer, not an error.
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be encoded, the call fails, or the answer
    /// is not ABI-encoded.
    pub async fn resolve(&self, label: &Label) -> Result<ForwardResolution> {
        let request = codec::forward_request(label, &self.deployment.suffix)?;
        let inner = self.call_resolve(&request).await?;
        let chain_id = codec::decode_forward_answer(&inner)?;
        tracing::debug!(%label, node = %request.node, found = chain_id.is_found(), "forward resolution");
        Ok(ForwardResolution {
            label: label.clone(),
            full_name: label.full_name(&self.deployment.suffix),
            node: request.node,
            chain_id,
        })
    }

    /// Resolve `id` back to the label it was registered under.
    ///
    /// The node and key follow the deployment's reverse conventions.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the answer envelope is malformed.
    pub async fn reverse(&self, id: &ChainIdentifier) -> Result<Lookup<ReverseName>> {
        let request = codec::reverse_request(
            id,
            &self.deployment.reverse_node,
            self.deployment.reverse_key,
        );
        let inner = self.call_resolve(&request).await?;
        let name = codec::decode_reverse_answer(request.record, &inner)?;
        tracing::debug!(chain_id = %id, found = name.is_found(), "reverse resolution");
        Ok(name)
    }

    /// The resolver's own node for `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn compute_node(&self, label: &Label) -> Result<B256> {
        self.contract
            .computeNode(label.as_str().to_owned())
            .call()
            .await
            .map_err(contract_error)
    }

    /// The identifier assigned to `node`. A zero word means unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn node_to_chain_id(&self, node: B256) -> Result<Lookup<ChainIdentifier>> {
        let chain_id = self
            .contract
            .nodeToChainId(node)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(if chain_id.is_zero() {
            Lookup::NotFound
        } else {
            Lookup::Found(ChainIdentifier::from_b256(chain_id))
        })
    }

    /// `computeNode(label)` followed by `nodeToChainId(node)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either call fails.
    pub async fn current_mapping(&self, label: &Label) -> Result<Mapping> {
        let node = self.compute_node(label).await?;
        let chain_id = self.node_to_chain_id(node).await?;
        Ok(Mapping { node, chain_id })
    }

    /// Assign `label` to a 32-byte identifier and wait for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidIdentifierLength`] unless `id` is 32
    /// bytes, [`crate::Error::Reverted`] if the resolver rejects it (for
    /// example `LabelAlreadyAssigned`), or the transport error.
    pub async fn assign(&self, label: &Label, id: &ChainIdentifier) -> Result<B256> {
        let chain_id = id.to_b256()?;
        let pending = self
            .contract
            .assign(label.as_str().to_owned(), chain_id)
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending, "resolver assignment", |_| {}).await
    }

    /// Record `owner` for `label` in the resolver and wait for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Reverted`] if the resolver rejects the call,
    /// or the transport error.
    pub async fn register(
        &self,
        label: &Label,
        owner: Address,
        on_submit: impl FnOnce(B256),
    ) -> Result<B256> {
        let pending = self
            .contract
            .register(label.hash(), owner)
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending, "resolver registration", on_submit).await
    }
}
