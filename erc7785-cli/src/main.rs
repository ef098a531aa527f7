//! ERC-7785 chain identifier CLI.
//!
//! Resolves chain labels through an ENSIP-10 chain resolver and prints the
//! answer as JSON. A label that is not registered is a normal answer
//! (`"status": "not_found"`) and exits 0; invalid input, RPC failures and
//! reverts exit non-zero.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a label (and reverse-resolve the identifier found)
//! ERC7785_RESOLVER_ADDRESS=0x... erc7785 resolve base
//!
//! # Resolve through a specific RPC endpoint
//! erc7785 --rpc https://my-rpc.example.com resolve base --no-reverse
//!
//! # Identifier back to label
//! erc7785 reverse 0x0000000000000000000000000000000000000000000000000000000000000001
//!
//! # Registry record by CAIP-2 identifier
//! ERC7785_REGISTRY_ADDRESS=0x... erc7785 chain-data --caip2 eip155:8453
//!
//! # Register a label (needs PRIVATE_KEY)
//! erc7785 register mychain 0x...
//!
//! # Identifier a chain record would get, without sending a transaction
//! erc7785 register-chain --name mychain --settlement-chain-id 1 --chain-version 1 \
//!     --rollup-contract 0x... --namespace eip155 --reference 12345 --simulate
//! ```

use std::path::PathBuf;

use alloy::primitives::{Address, B256};
use anyhow::Result;
use clap::{Parser, Subcommand};
use erc7785::{Caip2, Network};
use erc7785_cli::commands::{self, ChainDataQuery, ChainRecordArgs};
use erc7785_cli::config::Config;
use serde::Serialize;

/// ERC-7785 chain identifier resolver.
#[derive(Debug, Parser)]
#[command(name = "erc7785", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "erc7785.toml")]
    config: PathBuf,

    /// RPC endpoint to use, in fallback order. Repeatable.
    /// Overrides the config file and `ERC7785_RPC_URLS`.
    #[arg(long, global = true)]
    rpc: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a label to its chain identifier.
    Resolve {
        /// Chain label, e.g. `base`.
        label: String,

        /// Skip the reverse lookup of a found identifier.
        #[arg(long)]
        no_reverse: bool,
    },

    /// Resolve a hex chain identifier back to its label.
    Reverse {
        /// Chain identifier as hex, with or without `0x`.
        chain_id: String,
    },

    /// Show the resolver's node and assignment for a label.
    Mapping {
        /// Chain label.
        label: String,
    },

    /// Compute the namehash and DNS encoding of a name offline.
    Namehash {
        /// Dotted name, e.g. `base.cid.eth`.
        name: String,
    },

    /// Build and hash a CAIP-2 identifier.
    Caip2 {
        /// Identifier of the form `namespace:reference`.
        identifier: String,

        /// Also compute the hash with the on-chain helper.
        #[arg(long)]
        on_chain: bool,
    },

    /// Look up a chain's registry record.
    #[command(group = clap::ArgGroup::new("query").required(true))]
    ChainData {
        /// CAIP-2 identifier, e.g. `eip155:8453`.
        #[arg(long, group = "query")]
        caip2: Option<Caip2>,

        /// Precomputed CAIP-2 hash.
        #[arg(long, group = "query")]
        hash: Option<B256>,
    },

    /// Register a label in the registry and the resolver.
    Register {
        /// Chain label.
        label: String,

        /// Chain identifier as hex.
        chain_id: String,

        /// Label owner; defaults to the signer.
        #[arg(long)]
        owner: Option<Address>,
    },

    /// Register chain metadata and print the identifier it is assigned.
    RegisterChain {
        #[command(flatten)]
        record: ChainRecordArgs,

        /// Only compute the identifier with `eth_call`; send nothing.
        #[arg(long)]
        simulate: bool,
    },

    /// Assign a label to a 32-byte chain identifier in the resolver.
    Assign {
        /// Chain label.
        label: String,

        /// 32-byte chain identifier as hex.
        chain_id: String,
    },

    /// List known networks.
    Networks,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs on stderr; stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    config.apply_env(|name| std::env::var(name).ok())?;
    config.apply_rpc_flags(cli.rpc);

    match cli.command {
        Command::Resolve { label, no_reverse } => {
            emit(&commands::resolve(&config, &label, no_reverse).await?)
        }
        Command::Reverse { chain_id } => emit(&commands::reverse(&config, &chain_id).await?),
        Command::Mapping { label } => emit(&commands::mapping(&config, &label).await?),
        Command::Namehash { name } => emit(&commands::namehash_of(&name)?),
        Command::Caip2 {
            identifier,
            on_chain,
        } => emit(&commands::caip2(&config, &identifier, on_chain).await?),
        Command::ChainData { caip2, hash } => {
            let query = match (caip2, hash) {
                (Some(caip2), _) => ChainDataQuery::Caip2(caip2),
                (None, Some(hash)) => ChainDataQuery::Hash(hash),
                (None, None) => anyhow::bail!("one of --caip2 or --hash is required"),
            };
            emit(&commands::chain_data(&config, query).await?)
        }
        Command::Register {
            label,
            chain_id,
            owner,
        } => emit(&commands::register(&config, &label, &chain_id, owner).await?),
        Command::RegisterChain { record, simulate } => {
            emit(&commands::register_chain(&config, record, simulate).await?)
        }
        Command::Assign { label, chain_id } => {
            emit(&commands::assign(&config, &label, &chain_id).await?)
        }
        Command::Networks => {
            cmd_networks();
            Ok(())
        }
    }
}

/// Print a report as pretty JSON on stdout.
#[allow(clippy::print_stdout, reason = "the report is the program's output")]
fn emit<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Execute the `networks` subcommand.
#[allow(clippy::print_stdout, reason = "table output")]
fn cmd_networks() {
    println!("{:<12} {:<10} {:<18} RPC", "Chain ID", "Name", "CAIP-2");
    println!("{}", "-".repeat(80));

    for network in Network::ALL {
        let rpcs = network.default_rpcs();
        for (i, rpc) in rpcs.iter().enumerate() {
            if i == 0 {
                println!(
                    "{:<12} {:<10} {:<18} {rpc}",
                    network.chain_id(),
                    network.name(),
                    network.caip2().to_string(),
                );
            } else {
                println!("{:<12} {:<10} {:<18} {rpc}", "", "", "");
            }
        }
    }
}
