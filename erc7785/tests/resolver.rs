//! Client tests against alloy's mocked transport.
//!
//! Each `push_success` queues the raw answer of the next RPC request. A
//! write takes three: `eth_sendTransaction`, then `eth_getTransactionReceipt`
//! twice (once when the watch is registered, once when the receipt is read).

use alloy::primitives::{Address, B256, Bloom, Bytes, LogData, U256, address, b256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol_types::{SolEvent, SolValue};
use alloy::transports::mock::Asserter;
use erc7785::contracts::IChainRegistry;
use erc7785::{
    Caip2, ChainClient, ChainData, ChainIdentifier, DecodePath, Deployment, Error, Label, Lookup,
    ResolveSession, ResolveState, StepStatus, namehash,
};
use serde_json::json;

const RESOLVER: Address = address!("00000000000000000000000000000000000000aa");
const REGISTRY: Address = address!("00000000000000000000000000000000000000bb");

const CHAIN_ID: B256 = b256!("0000000000000000000000000000000000000000000000000000000000000001");

const BLOCK_HASH: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000b1");

fn client(deployment: Deployment) -> (ChainClient<impl Provider>, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone());
    (ChainClient::new(provider, deployment), asserter)
}

fn deployment() -> Deployment {
    Deployment {
        resolver: RESOLVER,
        registry: REGISTRY,
        ..Deployment::default()
    }
}

/// `resolve()` answer wrapping an inner `text()` return value.
fn text_answer(text: &str) -> Bytes {
    let inner = Bytes::from(text.to_owned().abi_encode());
    inner.abi_encode().into()
}

/// `resolve()` answer wrapping an inner `data()` return value.
fn data_answer(payload: Vec<u8>) -> Bytes {
    let inner = Bytes::from(Bytes::from(payload).abi_encode());
    inner.abi_encode().into()
}

/// A mined receipt for `tx` in block 1.
fn receipt(tx: B256, success: bool, logs: &[LogData]) -> serde_json::Value {
    let logs: Vec<_> = logs
        .iter()
        .enumerate()
        .map(|(i, log)| {
            json!({
                "address": REGISTRY,
                "topics": log.topics(),
                "data": log.data,
                "blockHash": BLOCK_HASH,
                "blockNumber": "0x1",
                "transactionHash": tx,
                "transactionIndex": "0x0",
                "logIndex": format!("{i:#x}"),
                "removed": false,
            })
        })
        .collect();
    json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": Bloom::ZERO,
        "transactionHash": tx,
        "transactionIndex": "0x0",
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x1",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": Address::repeat_byte(0x42),
        "to": REGISTRY,
        "contractAddress": null,
    })
}

/// Queue the answers of one transaction that is already mined.
fn push_write(asserter: &Asserter, tx: B256, success: bool, logs: &[LogData]) {
    let receipt = receipt(tx, success, logs);
    asserter.push_success(&tx);
    asserter.push_success(&receipt);
    asserter.push_success(&receipt);
}

fn chain_data(name: &str) -> IChainRegistry::ChainData {
    IChainRegistry::ChainData {
        chainName: name.to_owned(),
        settlementChainId: U256::from(1),
        version: "1".to_owned(),
        rollupContract: address!("00000000000000000000000000000000000000cc"),
        chainNamespace: "eip155".to_owned(),
        chainReference: "8453".to_owned(),
        coinType: U256::from(60),
    }
}

#[tokio::test]
async fn forward_resolution_finds_identifier() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(
        "0000000000000000000000000000000000000000000000000000000000000001",
    ));

    let label = Label::parse("Base").unwrap();
    let answer = client.resolve(&label).await.unwrap();

    assert_eq!(answer.label.as_str(), "base", "normalized label");
    assert_eq!(answer.full_name, "base.cid.eth", "full name");
    assert_eq!(answer.node, namehash("base.cid.eth"), "node");
    assert_eq!(
        answer.chain_id,
        Lookup::Found(ChainIdentifier::from_b256(CHAIN_ID)),
        "identifier"
    );
}

#[tokio::test]
async fn unregistered_label_is_not_found() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(""));

    let answer = client
        .resolve(&Label::parse("notregistered").unwrap())
        .await
        .unwrap();
    assert_eq!(answer.chain_id, Lookup::NotFound, "empty record is not an error");
}

#[tokio::test]
async fn non_hex_record_is_not_found() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer("hello"));

    let answer = client.resolve(&Label::parse("base").unwrap()).await.unwrap();
    assert_eq!(answer.chain_id, Lookup::NotFound, "garbage record");
}

#[tokio::test]
async fn reverse_resolution_decodes_abi_string() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&data_answer("base".to_owned().abi_encode()));

    let id = ChainIdentifier::from_b256(CHAIN_ID);
    let name = client.reverse(&id).await.unwrap().found().unwrap();
    assert_eq!(name.name, "base", "label");
    assert_eq!(name.decoded_via, DecodePath::Abi, "strict decode");
}

#[tokio::test]
async fn reverse_resolution_falls_back_to_raw_text() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&data_answer(b"optimism".to_vec()));

    let id = ChainIdentifier::from_b256(CHAIN_ID);
    let name = client.reverse(&id).await.unwrap().found().unwrap();
    assert_eq!(name.name, "optimism", "label");
    assert_eq!(name.decoded_via, DecodePath::RawUtf8, "degraded decode");
}

#[tokio::test]
async fn forward_then_reverse() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(
        "0x0000000000000000000000000000000000000000000000000000000000000001",
    ));
    asserter.push_success(&data_answer("base".to_owned().abi_encode()));

    let resolved = client
        .resolve_and_reverse(&Label::parse("base").unwrap())
        .await
        .unwrap();
    assert!(resolved.forward.chain_id.is_found(), "forward found");
    let reverse = resolved.reverse.unwrap().found().unwrap();
    assert_eq!(reverse.name, "base", "round trip");
}

#[tokio::test]
async fn reverse_is_skipped_when_forward_misses() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(""));

    let resolved = client
        .resolve_and_reverse(&Label::parse("nothing").unwrap())
        .await
        .unwrap();
    assert_eq!(resolved.reverse, None, "no reverse lookup");
}

#[tokio::test]
async fn failed_reverse_keeps_forward_answer() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(
        "0000000000000000000000000000000000000000000000000000000000000001",
    ));
    asserter.push_failure_msg("reverse resolver unavailable");

    let resolved = client
        .resolve_and_reverse(&Label::parse("base").unwrap())
        .await
        .unwrap();
    assert_eq!(
        resolved.forward.chain_id,
        Lookup::Found(ChainIdentifier::from_b256(CHAIN_ID)),
        "forward answer survives"
    );
    assert_eq!(resolved.reverse, None, "no reverse answer");
    let reason = resolved.reverse_error.as_ref().unwrap();
    assert!(reason.contains("reverse resolver unavailable"), "{reason}");

    let value = serde_json::to_value(&resolved).unwrap();
    assert_eq!(value["chainId"]["status"], "found", "reported as found");
    assert!(value["reverseError"].is_string(), "failure reported");
}

#[tokio::test]
async fn mapping_reads_node_then_identifier() {
    let (client, asserter) = client(deployment());
    let node = namehash("base.cid.eth");
    asserter.push_success(&Bytes::from(node.abi_encode()));
    asserter.push_success(&Bytes::from(CHAIN_ID.abi_encode()));

    let mapping = client
        .resolver()
        .unwrap()
        .current_mapping(&Label::parse("base").unwrap())
        .await
        .unwrap();
    assert_eq!(mapping.node, node, "node");
    assert_eq!(
        mapping.chain_id,
        Lookup::Found(ChainIdentifier::from_b256(CHAIN_ID)),
        "assigned"
    );
}

#[tokio::test]
async fn zero_mapping_is_unassigned() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&Bytes::from(B256::ZERO.abi_encode()));

    let chain_id = client
        .resolver()
        .unwrap()
        .node_to_chain_id(B256::repeat_byte(1))
        .await
        .unwrap();
    assert_eq!(chain_id, Lookup::NotFound, "zero word");
}

#[tokio::test]
async fn registry_identifier_lookup() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&Bytes::from(Bytes::from_static(&[0x0a, 0x0b]).abi_encode()));
    asserter.push_success(&Bytes::from(Bytes::new().abi_encode()));

    let registry = client.registry().unwrap();
    let found = registry
        .chain_identifier(&Label::parse("base").unwrap())
        .await
        .unwrap();
    assert_eq!(found.found().unwrap().to_string(), "0x0a0b", "stored bytes");

    let missing = registry
        .chain_identifier(&Label::parse("other").unwrap())
        .await
        .unwrap();
    assert_eq!(missing, Lookup::NotFound, "empty bytes");
}

#[tokio::test]
async fn chain_data_empty_slot_is_not_found() {
    let (client, asserter) = client(deployment());
    let mut empty = chain_data("");
    empty.rollupContract = Address::ZERO;
    asserter.push_success(&Bytes::from(empty.abi_encode()));
    asserter.push_success(&Bytes::from(chain_data("base").abi_encode()));

    let registry = client.registry().unwrap();
    assert_eq!(
        registry.chain_data(CHAIN_ID).await.unwrap(),
        Lookup::NotFound,
        "zeroed record"
    );
    let data = registry.chain_data(CHAIN_ID).await.unwrap().found().unwrap();
    assert_eq!(data.chain_name, "base", "name");
    assert_eq!(data.caip2().unwrap().to_string(), "eip155:8453", "caip2");
}

#[tokio::test]
async fn caip2_lookup_hashes_locally_without_helper() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&Bytes::from(CHAIN_ID.abi_encode()));
    asserter.push_success(&Bytes::from(chain_data("base").abi_encode()));

    let caip2: Caip2 = "eip155:8453".parse().unwrap();
    let record = client.caip2_lookup(&caip2).await.unwrap().found().unwrap();
    assert_eq!(record.caip2_hash, caip2.hash(), "local hash");
    assert_eq!(record.chain_id, CHAIN_ID, "identifier");
    assert_eq!(record.data.chain_name, "base", "record");
}

#[tokio::test]
async fn unknown_caip2_is_not_found() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&Bytes::from(B256::ZERO.abi_encode()));

    let record = client.caip2_lookup(&Caip2::eip155(999)).await.unwrap();
    assert_eq!(record, Lookup::NotFound, "no chain for hash");
}

#[tokio::test]
async fn registration_refuses_taken_label() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&Bytes::from(Bytes::from_static(&[0x01]).abi_encode()));

    let err = client
        .register(
            &Label::parse("base").unwrap(),
            &ChainIdentifier::from_b256(CHAIN_ID),
            Address::repeat_byte(0x42),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LabelTaken(ref l) if l == "base"), "{err}");
}

#[tokio::test]
async fn registration_confirms_both_writes_in_order() {
    let (client, asserter) = client(deployment());
    let registry_tx = B256::repeat_byte(0x01);
    let resolver_tx = B256::repeat_byte(0x02);
    asserter.push_success(&Bytes::from(Bytes::new().abi_encode()));
    push_write(&asserter, registry_tx, true, &[]);
    push_write(&asserter, resolver_tx, true, &[]);

    let mut steps = Vec::new();
    let registration = client
        .register_with_progress(
            &Label::parse("mychain").unwrap(),
            &ChainIdentifier::from_b256(CHAIN_ID),
            Address::repeat_byte(0x42),
            |r| steps.push((r.registry, r.resolver)),
        )
        .await
        .unwrap();

    assert_eq!(
        steps,
        [
            (StepStatus::Pending(registry_tx), StepStatus::Idle),
            (StepStatus::Confirmed(registry_tx), StepStatus::Idle),
            (StepStatus::Confirmed(registry_tx), StepStatus::Pending(resolver_tx)),
            (StepStatus::Confirmed(registry_tx), StepStatus::Confirmed(resolver_tx)),
        ],
        "registry first, then resolver"
    );
    assert_eq!(registration.label.as_str(), "mychain", "label");
    assert_eq!(registration.resolver, StepStatus::Confirmed(resolver_tx), "final state");
}

#[tokio::test]
async fn reverted_receipt_stops_registration() {
    let (client, asserter) = client(deployment());
    let registry_tx = B256::repeat_byte(0x01);
    asserter.push_success(&Bytes::from(Bytes::new().abi_encode()));
    push_write(&asserter, registry_tx, false, &[]);

    let mut steps = Vec::new();
    let err = client
        .register_with_progress(
            &Label::parse("mychain").unwrap(),
            &ChainIdentifier::from_b256(CHAIN_ID),
            Address::repeat_byte(0x42),
            |r| steps.push((r.registry, r.resolver)),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Reverted { data: None, ref reason } if reason.contains("reverted")),
        "{err}"
    );
    assert_eq!(
        steps,
        [(StepStatus::Pending(registry_tx), StepStatus::Idle)],
        "never confirmed, resolver never started"
    );
}

#[tokio::test]
async fn resolver_failure_leaves_registry_write_committed() {
    let (client, asserter) = client(deployment());
    let registry_tx = B256::repeat_byte(0x01);
    asserter.push_success(&Bytes::from(Bytes::new().abi_encode()));
    push_write(&asserter, registry_tx, true, &[]);
    asserter.push_failure_msg("nonce too low");

    let mut steps = Vec::new();
    let err = client
        .register_with_progress(
            &Label::parse("mychain").unwrap(),
            &ChainIdentifier::from_b256(CHAIN_ID),
            Address::repeat_byte(0x42),
            |r| steps.push((r.registry, r.resolver)),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("nonce too low"), "{err}");
    assert_eq!(
        steps.last(),
        Some(&(StepStatus::Confirmed(registry_tx), StepStatus::Idle)),
        "registry step stays confirmed"
    );
}

#[tokio::test]
async fn assignment_reads_mapping_back() {
    let (client, asserter) = client(deployment());
    let tx = B256::repeat_byte(0x03);
    push_write(&asserter, tx, true, &[]);
    asserter.push_success(&Bytes::from(namehash("base.cid.eth").abi_encode()));
    asserter.push_success(&Bytes::from(CHAIN_ID.abi_encode()));

    let (assigned_tx, mapping) = client
        .assign(
            &Label::parse("base").unwrap(),
            &ChainIdentifier::from_b256(CHAIN_ID),
        )
        .await
        .unwrap();
    assert_eq!(assigned_tx, tx, "transaction hash");
    assert_eq!(
        mapping,
        Lookup::Found(ChainIdentifier::from_b256(CHAIN_ID)),
        "mapping read back"
    );
}

#[tokio::test]
async fn assignment_needs_a_32_byte_identifier() {
    let (client, _asserter) = client(deployment());
    let err = client
        .assign(
            &Label::parse("base").unwrap(),
            &ChainIdentifier::from_hex("0x0a0b").unwrap(),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidIdentifierLength { len: 2, .. }),
        "{err}"
    );
}

#[tokio::test]
async fn chain_data_preview_returns_identifier() {
    let (client, asserter) = client(deployment());
    let chain_id = B256::repeat_byte(0x77);
    asserter.push_success(&Bytes::from(chain_id.abi_encode()));

    let data = ChainData::from(chain_data("base"));
    let preview = client.preview_chain_data(&data).await.unwrap();
    assert_eq!(preview, chain_id, "simulated identifier");
}

#[tokio::test]
async fn chain_data_registration_reads_event() {
    let (client, asserter) = client(deployment());
    let tx = B256::repeat_byte(0x04);
    let chain_id = B256::repeat_byte(0x77);
    let event = IChainRegistry::ChainRegistered {
        chainId: chain_id,
        chainName: "base".to_owned(),
    };
    push_write(&asserter, tx, true, &[event.encode_log_data()]);

    let data = ChainData::from(chain_data("base"));
    let registered = client.register_chain_data(&data).await.unwrap();
    assert_eq!(registered, chain_id, "identifier from ChainRegistered");
}

#[tokio::test]
async fn chain_data_registration_without_event_fails() {
    let (client, asserter) = client(deployment());
    let tx = B256::repeat_byte(0x05);
    push_write(&asserter, tx, true, &[]);

    let data = ChainData::from(chain_data("base"));
    let err = client.register_chain_data(&data).await.unwrap_err();
    assert!(
        matches!(err, Error::MissingEvent { event: "ChainRegistered", tx: t } if t == tx),
        "{err}"
    );
}

#[tokio::test]
async fn incomplete_chain_data_is_rejected_before_any_call() {
    let (client, _asserter) = client(deployment());
    let data = ChainData::from(chain_data(""));
    let err = client.register_chain_data(&data).await.unwrap_err();
    assert!(err.is_validation(), "{err}");
}

#[tokio::test]
async fn missing_address_fails_before_any_call() {
    let (client, _asserter) = client(Deployment::default());
    let err = client.resolve(&Label::parse("base").unwrap()).await.unwrap_err();
    assert!(matches!(err, Error::MissingAddress(_)), "{err}");
    assert!(err.is_validation(), "validation error");
}

#[tokio::test]
async fn session_tracks_client_outcome() {
    let (client, asserter) = client(deployment());
    asserter.push_success(&text_answer(""));

    let session = ResolveSession::new();
    let label = Label::parse("nothing").unwrap();
    let (outcome, applied) = session
        .run(async { client.resolve(&label).await.map(|r| r.chain_id) })
        .await;
    assert!(applied, "only request is current");
    assert_eq!(outcome.unwrap(), Lookup::NotFound, "outcome");
    assert_eq!(session.state(), ResolveState::NotFound, "state");
}
