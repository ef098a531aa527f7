#![allow(clippy::print_stdout)]
//! Register a chain label in the registry and the resolver.
//!
//! Usage:
//!   cargo run --example `register_chain` -- <label> <0x-identifier>
//!
//! **Requirements:** A funded Sepolia wallet in `PRIVATE_KEY`, and
//! `ERC7785_REGISTRY_ADDRESS` / `ERC7785_RESOLVER_ADDRESS` set.

use alloy::{
    network::EthereumWallet, providers::ProviderBuilder, signers::local::PrivateKeySigner,
};
use erc7785::{ChainClient, ChainIdentifier, Deployment, Label, Network};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let label = Label::parse(&args.next().ok_or("missing <label>")?)?;
    let id: ChainIdentifier = args.next().ok_or("missing <identifier>")?.parse()?;

    let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
    let owner = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(Network::EthereumSepolia.default_rpcs()[0].parse()?);

    let deployment = Deployment {
        registry: std::env::var("ERC7785_REGISTRY_ADDRESS")?.parse()?,
        resolver: std::env::var("ERC7785_RESOLVER_ADDRESS")?.parse()?,
        ..Deployment::default()
    };
    let client = ChainClient::new(provider, deployment);

    let registration = client
        .register_with_progress(&label, &id, owner, |step| {
            println!("registry: {:?}, resolver: {:?}", step.registry, step.resolver);
        })
        .await?;
    println!("Registered {} -> {}", registration.label, registration.chain_id);

    Ok(())
}
