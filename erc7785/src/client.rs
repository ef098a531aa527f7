//! Entry point tying a provider to a [`Deployment`].

use alloy::primitives::{Address, B256};
use alloy::providers::Provider;

use crate::caip2::Caip2;
use crate::contracts::{ICaip2, contract_error};
use crate::error::{Error, Result};
use crate::networks::Deployment;
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::types::{
    Caip2Record, ChainData, ChainIdentifier, ForwardResolution, Label, Lookup, Registration,
    ResolvedChain, ReverseName, StepStatus,
};

/// Client for one ERC-7785 deployment.
///
/// # Example
///
/// ```no_run
/// use alloy::providers::ProviderBuilder;
/// use erc7785::{ChainClient, Deployment, Label};
///
/// # async fn run() -> erc7785::Result<()> {
/// let provider = ProviderBuilder::new()
///     .connect_http("https://ethereum-sepolia.publicnode.com".parse().unwrap());
/// let deployment = Deployment {
///     resolver: "0x1111111111111111111111111111111111111111".parse().unwrap(),
///     ..Deployment::default()
/// };
/// let client = ChainClient::new(provider, deployment);
///
/// let answer = client.resolve(&Label::parse("base")?).await?;
/// println!("{:?}", answer.chain_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChainClient<P> {
    provider: P,
    deployment: Deployment,
}

impl<P: Provider> ChainClient<P> {
    /// Bind `provider` to the contracts of `deployment`.
    #[must_use]
    pub const fn new(provider: P, deployment: Deployment) -> Self {
        Self {
            provider,
            deployment,
        }
    }

    /// The underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The deployment this client talks to.
    #[must_use]
    pub const fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// The chain registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if no registry is configured.
    pub fn registry(&self) -> Result<Registry<'_, P>> {
        Ok(Registry::new(self.deployment.registry()?, &self.provider))
    }

    /// The forward resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if no resolver is configured.
    pub fn resolver(&self) -> Result<Resolver<'_, P>> {
        Ok(Resolver::new(
            self.deployment.resolver()?,
            &self.provider,
            &self.deployment,
        ))
    }

    /// The resolver answering reverse lookups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if neither a reverse resolver nor
    /// a resolver is configured.
    pub fn reverse_resolver(&self) -> Result<Resolver<'_, P>> {
        Ok(Resolver::new(
            self.deployment.reverse_resolver()?,
            &self.provider,
            &self.deployment,
        ))
    }

    /// Forward resolution of `label`.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub async fn resolve(&self, label: &Label) -> Result<ForwardResolution> {
        self.resolver()?.resolve(label).await
    }

    /// Reverse resolution of `id`.
    ///
    /// # Errors
    ///
    /// See [`Resolver::reverse`].
    pub async fn reverse(&self, id: &ChainIdentifier) -> Result<Lookup<ReverseName>> {
        self.reverse_resolver()?.reverse(id).await
    }

    /// Forward resolution, chained into a reverse lookup when found.
    ///
    /// The reverse lookup is best effort: its failure is logged and kept in
    /// [`ResolvedChain::reverse_error`], never in place of the forward answer.
    ///
    /// # Errors
    ///
    /// Fails only if the forward lookup fails.
    pub async fn resolve_and_reverse(&self, label: &Label) -> Result<ResolvedChain> {
        let mut resolved = ResolvedChain::from(self.resolve(label).await?);
        if let Lookup::Found(id) = &resolved.forward.chain_id {
            match self.reverse(id).await {
                Ok(reverse) => resolved.reverse = Some(reverse),
                Err(e) => {
                    tracing::warn!(%label, %id, error = %e, "reverse lookup failed");
                    resolved.reverse_error = Some(e.to_string());
                }
            }
        }
        Ok(resolved)
    }

    /// `computeCaip2Hash(namespace, reference)` on the helper contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if no helper is configured, or the
    /// call error.
    pub async fn caip2_hash_on_chain(&self, caip2: &Caip2) -> Result<B256> {
        let helper = ICaip2::new(self.deployment.caip2()?, &self.provider);
        helper
            .computeCaip2Hash(caip2.namespace().to_owned(), caip2.reference().to_owned())
            .call()
            .await
            .map_err(contract_error)
    }

    /// The CAIP-2 hash, computed by the helper contract when one is
    /// configured and locally otherwise.
    ///
    /// # Errors
    ///
    /// Returns the helper call error.
    pub async fn caip2_hash(&self, caip2: &Caip2) -> Result<B256> {
        if self.deployment.caip2.is_zero() {
            tracing::debug!(%caip2, "no CAIP-2 helper configured, hashing locally");
            return Ok(caip2.hash());
        }
        let on_chain = self.caip2_hash_on_chain(caip2).await?;
        let local = caip2.hash();
        if on_chain != local {
            tracing::warn!(%caip2, %on_chain, %local, "CAIP-2 hash differs from local computation");
        }
        Ok(on_chain)
    }

    /// Look up a chain's registry record by its CAIP-2 identifier.
    ///
    /// # Errors
    ///
    /// Fails if the registry is not configured or a call fails.
    pub async fn caip2_lookup(&self, caip2: &Caip2) -> Result<Lookup<Caip2Record>> {
        let registry = self.registry()?;
        let hash = self.caip2_hash(caip2).await?;
        registry.chain_data_by_caip2_hash(hash).await
    }

    /// The identifier the registry would assign to `data`, via `eth_call`.
    ///
    /// # Errors
    ///
    /// See [`Registry::preview_chain_data`].
    pub async fn preview_chain_data(&self, data: &ChainData) -> Result<B256> {
        self.registry()?.preview_chain_data(data).await
    }

    /// Register a chain metadata record and return its identifier.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_chain_data`].
    pub async fn register_chain_data(&self, data: &ChainData) -> Result<B256> {
        self.registry()?.register_chain_data(data, |_| {}).await
    }

    /// Register `label` for `id` in the registry and then the resolver.
    ///
    /// See [`Self::register_with_progress`].
    ///
    /// # Errors
    ///
    /// See [`Self::register_with_progress`].
    pub async fn register(
        &self,
        label: &Label,
        id: &ChainIdentifier,
        owner: Address,
    ) -> Result<Registration> {
        self.register_with_progress(label, id, owner, |_| {}).await
    }

    /// Two-write registration flow.
    ///
    /// 1. Refuse if `chainId(labelHash)` already holds an identifier.
    /// 2. `Registry.register(label, owner, id)`, wait for the receipt.
    /// 3. `Resolver.register(labelHash, owner)`, wait for the receipt.
    ///
    /// `progress` sees the [`Registration`] after every step change.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelTaken`] from the preflight check,
    /// [`Error::Reverted`] when either write is rejected, or the transport
    /// error. A failure in step 3 leaves step 2 committed on-chain.
    pub async fn register_with_progress(
        &self,
        label: &Label,
        id: &ChainIdentifier,
        owner: Address,
        mut progress: impl FnMut(&Registration),
    ) -> Result<Registration> {
        let registry = self.registry()?;
        let resolver = self.resolver()?;

        if let Lookup::Found(existing) = registry.chain_identifier(label).await? {
            tracing::warn!(%label, %existing, "label already registered");
            return Err(Error::LabelTaken(label.to_string()));
        }

        let mut state = Registration {
            label: label.clone(),
            chain_id: id.clone(),
            registry: StepStatus::Idle,
            resolver: StepStatus::Idle,
        };

        let tx = registry
            .register(label, owner, id, |tx| {
                state.registry = StepStatus::Pending(tx);
                progress(&state);
            })
            .await?;
        state.registry = StepStatus::Confirmed(tx);
        progress(&state);

        let tx = resolver
            .register(label, owner, |tx| {
                state.resolver = StepStatus::Pending(tx);
                progress(&state);
            })
            .await?;
        state.resolver = StepStatus::Confirmed(tx);
        progress(&state);

        Ok(state)
    }

    /// Assign `label` to `id` in the resolver and read the mapping back.
    ///
    /// # Errors
    ///
    /// See [`Resolver::assign`].
    pub async fn assign(
        &self,
        label: &Label,
        id: &ChainIdentifier,
    ) -> Result<(B256, Lookup<ChainIdentifier>)> {
        let resolver = self.resolver()?;
        let tx = resolver.assign(label, id).await?;
        let mapping = resolver.current_mapping(label).await?;
        Ok((tx, mapping.chain_id))
    }
}
