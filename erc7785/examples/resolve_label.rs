#![allow(clippy::print_stdout)]
//! Resolve a chain label to its ERC-7785 chain identifier.
//!
//! Usage:
//!   `ERC7785_RESOLVER_ADDRESS=0x.. cargo run --example resolve_label -- base`
//!
//! Tries each public Sepolia RPC in turn until one answers.

use erc7785::{ChainClient, Deployment, Endpoints, Label, Lookup, Network};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let label = Label::parse(&std::env::args().nth(1).unwrap_or_else(|| "base".to_owned()))?;
    let deployment = Deployment {
        resolver: std::env::var("ERC7785_RESOLVER_ADDRESS")?.parse()?,
        ..Deployment::default()
    };

    let endpoints = Endpoints::for_network(Network::EthereumSepolia)?;
    let answer = endpoints
        .run(|provider| {
            let client = ChainClient::new(provider, deployment.clone());
            let label = label.clone();
            async move { client.resolve_and_reverse(&label).await }
        })
        .await?;

    println!("{} (node {})", answer.forward.full_name, answer.forward.node);
    match &answer.forward.chain_id {
        Lookup::Found(id) => println!("  chain id: {id}"),
        Lookup::NotFound => println!("  not registered"),
    }
    if let Some(Lookup::Found(name)) = &answer.reverse {
        println!("  reverse:  {} ({:?})", name.name, name.decoded_via);
    }

    Ok(())
}
