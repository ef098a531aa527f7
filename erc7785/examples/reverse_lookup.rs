#![allow(clippy::print_stdout)]
//! Resolve a chain identifier back to its label.
//!
//! Usage:
//!   `ERC7785_RESOLVER_ADDRESS=0x.. cargo run --example reverse_lookup -- 0x<identifier>`
//!
//! Prints the reverse keys for both key conventions before querying.

use alloy::providers::ProviderBuilder;
use erc7785::codec::{reverse_key_binary, reverse_key_text};
use erc7785::{ChainClient, ChainIdentifier, Deployment, Network};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let id: ChainIdentifier = std::env::args()
        .nth(1)
        .ok_or("usage: reverse_lookup <0x-identifier>")?
        .parse()?;

    println!("binary key: {}", reverse_key_binary(&id));
    println!("text key:   {}", reverse_key_text(&id));

    let rpc = Network::EthereumSepolia.default_rpcs()[0];
    let provider = ProviderBuilder::new().connect_http(rpc.parse()?);
    let deployment = Deployment {
        resolver: std::env::var("ERC7785_RESOLVER_ADDRESS")?.parse()?,
        ..Deployment::default()
    };
    let client = ChainClient::new(provider, deployment);

    match client.reverse(&id).await?.found() {
        Some(name) => println!("{id} -> {}", name.name),
        None => println!("{id} is not registered"),
    }

    Ok(())
}
