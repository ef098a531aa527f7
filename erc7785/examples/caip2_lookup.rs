#![allow(clippy::print_stdout)]
//! Look up a chain's registry record by its CAIP-2 identifier.
//!
//! Usage:
//!   `ERC7785_REGISTRY_ADDRESS=0x.. cargo run --example caip2_lookup -- eip155:8453`
//!
//! Set `ERC7785_CAIP2_ADDRESS` to hash through the on-chain helper instead
//! of locally.

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use erc7785::{Caip2, ChainClient, Deployment, Network};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let caip2: Caip2 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "eip155:8453".to_owned())
        .parse()?;
    println!("{caip2} -> local hash {}", caip2.hash());

    let helper = match std::env::var("ERC7785_CAIP2_ADDRESS") {
        Ok(addr) => addr.parse()?,
        Err(_) => Address::ZERO,
    };
    let deployment = Deployment {
        registry: std::env::var("ERC7785_REGISTRY_ADDRESS")?.parse()?,
        caip2: helper,
        ..Deployment::default()
    };

    let rpc = Network::EthereumSepolia.default_rpcs()[0];
    let provider = ProviderBuilder::new().connect_http(rpc.parse()?);
    let client = ChainClient::new(provider, deployment);

    match client.caip2_lookup(&caip2).await?.found() {
        Some(record) => {
            println!("chain id:  {}", record.chain_id);
            println!("name:      {}", record.data.chain_name);
            println!("version:   {}", record.data.version);
            println!("coin type: {}", record.data.coin_type);
        }
        None => println!("no chain registered for {caip2}"),
    }

    Ok(())
}
