use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mocha_deploy::{FACTORY_CONTRACT, ROUTER_CONTRACT, WETH_CONTRACT};
use tracing::level_filters::LevelFilter;

/// A contract of the Mocha suite, selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContractName {
    Weth,
    Factory,
    Router,
}

impl ContractName {
    /// The registry/artifact name of the selected contract.
    pub fn contract_name(self) -> &'static str {
        match self {
            ContractName::Weth => WETH_CONTRACT,
            ContractName::Factory => FACTORY_CONTRACT,
            ContractName::Router => ROUTER_CONTRACT,
        }
    }
}

#[derive(Parser)]
#[command(name = "mocha")]
#[command(author, version, about = "Deploy the Mocha exchange contract suite")]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "MOCHA_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The target network. If not provided, the configured default
    /// network is used.
    #[arg(short, long, env = "MOCHA_NETWORK")]
    pub network: Option<String>,

    /// The path to the configuration file.
    #[arg(short, long, env = "MOCHA_CONFIG", default_value = "Mocha.toml")]
    pub config: PathBuf,

    /// The path to the address registry file.
    #[arg(short, long, env = "MOCHA_DEPLOYMENTS", default_value = "deployments.toml")]
    pub deployments: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the contract suite in dependency order.
    Deploy {
        /// Deploy only the named contract. Its dependencies must already
        /// be recorded in the registry.
        #[arg(long)]
        contract: Option<ContractName>,

        /// Redeploy contracts that already have a recorded address,
        /// overwriting the registry entry.
        #[arg(long)]
        redeploy: bool,
    },
    /// Show the recorded addresses for the target network.
    Status,
}
