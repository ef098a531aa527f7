//! Solidity bindings for the registry, resolver and CAIP-2 helper contracts.
//!
//! Only the surface this crate calls is declared. The `text`/`data` record
//! readers are never called directly; their call data travels inside
//! `resolve(bytes,bytes)`.

#![allow(missing_docs, reason = "generated by the sol! macro")]

use alloy::network::{Ethereum, ReceiptResponse};
use alloy::primitives::{B256, hex};
use alloy::providers::PendingTransactionBuilder;
use alloy::rpc::types::TransactionReceipt;
use alloy::sol;
use alloy::sol_types::{SolInterface, decode_revert_reason};

use crate::error::{Error, Result};

sol! {
    /// ERC-7785 chain registry.
    #[sol(rpc)]
    interface IChainRegistry {
        struct ChainData {
            string chainName;
            uint256 settlementChainId;
            string version;
            address rollupContract;
            string chainNamespace;
            string chainReference;
            uint256 coinType;
        }

        error InvalidDataLength();
        error NotAuthorized(address _caller, bytes32 _labelHash);
        error ChainAlreadyRegistered();
        error ChainNameEmpty();
        error OwnableUnauthorizedAccount(address account);
        error OwnableInvalidOwner(address owner);

        event RecordSet(bytes32 indexed _labelHash, bytes _chainId, string _chainName);
        event LabelOwnerSet(bytes32 indexed _labelHash, address _owner);
        event ChainRegistered(bytes32 indexed chainId, string chainName);

        function register(string _chainName, address _owner, bytes _chainId) external;
        function demoRegister(ChainData data) external returns (bytes32 chainId);
        function chainId(bytes32 _labelHash) external view returns (bytes _chainId);
        function chainName(bytes _chainIdBytes) external view returns (string _chainName);
        function chainData(bytes32 _chainId) external view returns (ChainData memory);
        function caip2HashToChainId(bytes32 _caip2Hash) external view returns (bytes32);
        function isAuthorized(bytes32 _labelHash, address _address) external view returns (bool _authorized);
    }

    /// ENSIP-10 extended resolver mapping labels to chain identifiers.
    #[sol(rpc)]
    interface IChainResolver {
        error ChainNameEmpty();
        error LabelAlreadyAssigned();
        error UnsupportedFunction();
        error OwnableUnauthorizedAccount(address account);
        error OwnableInvalidOwner(address owner);
        error StringsInsufficientHexLength(uint256 value, uint256 length);

        event NodeAssigned(bytes32 indexed node, string indexed label, bytes32 indexed chainId);

        function resolve(bytes name, bytes data) external view returns (bytes);
        function computeNode(string chainName) external pure returns (bytes32);
        function nodeToChainId(bytes32 node) external view returns (bytes32);
        function assign(string label, bytes32 chainId) external;
        function register(bytes32 labelHash, address owner) external;
    }

    /// Record readers reached through `resolve`.
    #[derive(Debug, PartialEq, Eq)]
    interface IRecordReader {
        function text(bytes32 node, string key) external view returns (string);
        function data(bytes32 node, bytes key) external view returns (bytes);
    }

    /// CAIP-2 hashing helper.
    #[sol(rpc)]
    interface ICaip2 {
        function computeCaip2Hash(string chainNamespace, string chainReference) external pure returns (bytes32);
    }
}

impl From<IChainRegistry::ChainData> for crate::types::ChainData {
    fn from(data: IChainRegistry::ChainData) -> Self {
        Self {
            chain_name: data.chainName,
            settlement_chain_id: data.settlementChainId,
            version: data.version,
            rollup_contract: data.rollupContract,
            chain_namespace: data.chainNamespace,
            chain_reference: data.chainReference,
            coin_type: data.coinType,
        }
    }
}

impl From<&crate::types::ChainData> for IChainRegistry::ChainData {
    fn from(data: &crate::types::ChainData) -> Self {
        Self {
            chainName: data.chain_name.clone(),
            settlementChainId: data.settlement_chain_id,
            version: data.version.clone(),
            rollupContract: data.rollup_contract,
            chainNamespace: data.chain_namespace.clone(),
            chainReference: data.chain_reference.clone(),
            coinType: data.coin_type,
        }
    }
}

/// Render revert data as a readable reason.
///
/// Custom errors of both contracts are tried first, then `Error(string)` /
/// `Panic(uint256)`. Anything else is shown as hex.
#[must_use]
pub fn revert_reason(data: &[u8]) -> String {
    use IChainRegistry::IChainRegistryErrors as Reg;
    use IChainResolver::IChainResolverErrors as Res;

    if let Ok(err) = Res::abi_decode(data) {
        return match err {
            Res::LabelAlreadyAssigned(_) => "label is already assigned".to_owned(),
            Res::ChainNameEmpty(_) => "chain name cannot be empty".to_owned(),
            Res::UnsupportedFunction(_) => "resolver does not support this record type".to_owned(),
            Res::OwnableUnauthorizedAccount(e) => {
                format!("only the contract owner can do this (caller {})", e.account)
            }
            Res::OwnableInvalidOwner(e) => format!("invalid owner {}", e.owner),
            Res::StringsInsufficientHexLength(e) => {
                format!("hex length {} too short for value {}", e.length, e.value)
            }
        };
    }
    if let Ok(err) = Reg::abi_decode(data) {
        return match err {
            Reg::InvalidDataLength(_) => "invalid chain identifier length".to_owned(),
            Reg::NotAuthorized(e) => {
                format!("{} is not authorized for label {}", e._caller, e._labelHash)
            }
            Reg::ChainAlreadyRegistered(_) => "chain is already registered".to_owned(),
            Reg::ChainNameEmpty(_) => "chain name cannot be empty".to_owned(),
            Reg::OwnableUnauthorizedAccount(e) => {
                format!("only the contract owner can do this (caller {})", e.account)
            }
            Reg::OwnableInvalidOwner(e) => format!("invalid owner {}", e.owner),
        };
    }
    decode_revert_reason(data).unwrap_or_else(|| format!("0x{}", hex::encode(data)))
}

/// Turn a contract-call failure into [`Error::Reverted`] when the node
/// returned revert data, keeping transport failures as they are.
pub(crate) fn contract_error(err: alloy::contract::Error) -> Error {
    match err.as_revert_data() {
        Some(data) => Error::Reverted {
            reason: revert_reason(&data),
            data: Some(data),
        },
        None => Error::Contract(err),
    }
}

/// Report the submitted hash, wait for inclusion and check the status.
pub(crate) async fn confirm(
    pending: PendingTransactionBuilder<Ethereum>,
    action: &'static str,
    on_submit: impl FnOnce(B256),
) -> Result<B256> {
    confirm_receipt(pending, action, on_submit)
        .await
        .map(|receipt| receipt.transaction_hash)
}

/// [`confirm`], keeping the receipt for its logs.
pub(crate) async fn confirm_receipt(
    pending: PendingTransactionBuilder<Ethereum>,
    action: &'static str,
    on_submit: impl FnOnce(B256),
) -> Result<TransactionReceipt> {
    let tx = *pending.tx_hash();
    tracing::info!(action, %tx, "transaction submitted");
    on_submit(tx);

    let receipt = pending.get_receipt().await?;
    if !ReceiptResponse::status(&receipt) {
        return Err(Error::Reverted {
            reason: format!("{action} transaction {tx} reverted"),
            data: None,
        });
    }
    tracing::info!(action, %tx, block = ?ReceiptResponse::block_number(&receipt), "transaction confirmed");
    Ok(receipt)
}
