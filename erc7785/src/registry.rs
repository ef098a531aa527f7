//! Chain registry reads and the registry half of registration.

use alloy::primitives::{Address, B256};
use alloy::providers::Provider;

use crate::contracts::{IChainRegistry, confirm, confirm_receipt, contract_error};
use crate::error::{Error, Result};
use crate::types::{Caip2Record, ChainData, ChainIdentifier, Label, Lookup};

/// Handle to the chain registry contract.
#[derive(Debug)]
pub struct Registry<'a, P> {
    contract: IChainRegistry::IChainRegistryInstance<&'a P>,
}

impl<'a, P: Provider> Registry<'a, P> {
    pub(crate) fn new(address: Address, provider: &'a P) -> Self {
        Self {
            contract: IChainRegistry::IChainRegistryInstance::new(address, provider),
        }
    }

    /// The registry contract address.
    #[must_use]
    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// The identifier stored for `label`, via `chainId(labelHash)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or returns a malformed identifier.
    pub async fn chain_identifier(&self, label: &Label) -> Result<Lookup<ChainIdentifier>> {
        let raw = self
            .contract
            .chainId(label.hash())
            .call()
            .await
            .map_err(contract_error)?;
        if raw.is_empty() {
            return Ok(Lookup::NotFound);
        }
        ChainIdentifier::from_bytes(raw).map(Lookup::Found)
    }

    /// The chain name stored for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn chain_name(&self, id: &ChainIdentifier) -> Result<Lookup<String>> {
        let name = self
            .contract
            .chainName(id.as_bytes().clone())
            .call()
            .await
            .map_err(contract_error)?;
        Ok(if name.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(name)
        })
    }

    /// The metadata record of a 32-byte identifier.
    ///
    /// A record with no name and no rollup contract is an unset slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn chain_data(&self, chain_id: B256) -> Result<Lookup<ChainData>> {
        let data: ChainData = self
            .contract
            .chainData(chain_id)
            .call()
            .await
            .map_err(contract_error)?
            .into();
        Ok(if data.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(data)
        })
    }

    /// The identifier registered under a CAIP-2 hash. Zero means none.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn caip2_hash_to_chain_id(&self, caip2_hash: B256) -> Result<Lookup<B256>> {
        let chain_id = self
            .contract
            .caip2HashToChainId(caip2_hash)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(if chain_id.is_zero() {
            Lookup::NotFound
        } else {
            Lookup::Found(chain_id)
        })
    }

    /// `caip2HashToChainId` followed by `chainData`.
    ///
    /// # Errors
    ///
    /// Returns an error if either call fails.
    pub async fn chain_data_by_caip2_hash(&self, caip2_hash: B256) -> Result<Lookup<Caip2Record>> {
        let Lookup::Found(chain_id) = self.caip2_hash_to_chain_id(caip2_hash).await? else {
            return Ok(Lookup::NotFound);
        };
        Ok(self.chain_data(chain_id).await?.map(|data| Caip2Record {
            caip2_hash,
            chain_id,
            data,
        }))
    }

    /// Whether `account` may manage `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn is_authorized(&self, label: &Label, account: Address) -> Result<bool> {
        self.contract
            .isAuthorized(label.hash(), account)
            .call()
            .await
            .map_err(contract_error)
    }

    /// Submit `register(label, owner, id)` and wait for the receipt.
    ///
    /// `on_submit` is called with the transaction hash once the node has
    /// accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Reverted`] if the contract rejects the call or the
    /// transaction reverts, or the transport error.
    pub async fn register(
        &self,
        label: &Label,
        owner: Address,
        id: &ChainIdentifier,
        on_submit: impl FnOnce(B256),
    ) -> Result<B256> {
        let pending = self
            .contract
            .register(label.as_str().to_owned(), owner, id.as_bytes().clone())
            .send()
            .await
            .map_err(contract_error)?;
        confirm(pending, "registry registration", on_submit).await
    }

    /// Simulate `demoRegister(data)` with `eth_call`.
    ///
    /// Returns the identifier the registry would assign, without sending a
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChainData`] for an incomplete record,
    /// [`Error::Reverted`] if the registry would reject it (for example
    /// `ChainAlreadyRegistered`), or the transport error.
    pub async fn preview_chain_data(&self, data: &ChainData) -> Result<B256> {
        data.validate()?;
        self.contract
            .demoRegister(data.into())
            .call()
            .await
            .map_err(contract_error)
    }

    /// Submit `demoRegister(data)`, wait for the receipt and read the
    /// assigned identifier from its `ChainRegistered` event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChainData`] for an incomplete record,
    /// [`Error::Reverted`] if the registry rejects it,
    /// [`Error::MissingEvent`] if the receipt carries no `ChainRegistered`
    /// log, or the transport error.
    pub async fn register_chain_data(
        &self,
        data: &ChainData,
        on_submit: impl FnOnce(B256),
    ) -> Result<B256> {
        data.validate()?;
        let pending = self
            .contract
            .demoRegister(data.into())
            .send()
            .await
            .map_err(contract_error)?;
        let receipt = confirm_receipt(pending, "chain data registration", on_submit).await?;

        let event = receipt
            .decoded_log::<IChainRegistry::ChainRegistered>()
            .ok_or(Error::MissingEvent {
                event: "ChainRegistered",
                tx: receipt.transaction_hash,
            })?;
        tracing::info!(
            chain = %event.data.chainName,
            chain_id = %event.data.chainId,
            "chain data registered"
        );
        Ok(event.data.chainId)
    }
}
