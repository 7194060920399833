//! mocha is a CLI tool that deploys the Mocha exchange contract suite
//! (WETH, MochaFactory, MochaRouter) in dependency order and records the
//! resulting addresses per network.

mod cli;

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;
use mocha_deploy::{
    AddressRegistry, ArtifactStore, MochaConfig, Pipeline, RpcChainClient, Secrets, mocha_suite,
};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = MochaConfig::load(&cli.config)?;
    let mut registry = AddressRegistry::load_from_file(&cli.deployments)?;

    match cli.command {
        Command::Status => {
            let network = cli.network.as_deref().unwrap_or(&config.default_network);

            let mut table = Table::new();
            table.set_header(["Contract", "Address"]);
            for (name, address) in registry.entries(network) {
                table.add_row([name.to_string(), address.to_string()]);
            }

            println!("Deployments on `{network}`:");
            println!("{table}");
        }

        Command::Deploy { contract, redeploy } => {
            // Secrets are required before any network call.
            let secrets = Secrets::from_env()?;
            let network = config.resolve(cli.network.as_deref(), &secrets)?;

            tracing::info!(
                network = %network.name,
                chain_id = ?network.chain_id,
                "Resolved target network"
            );

            let client = RpcChainClient::connect(&network).await?;
            let artifacts = ArtifactStore::new(&config.artifacts_dir);

            let mut specs = mocha_suite(config.fee_to);
            if let Some(contract) = contract {
                specs.retain(|spec| spec.contract_name == contract.contract_name());
            }

            let results = Pipeline::new(&client, &artifacts, &network.name, &cli.deployments)
                .redeploy(redeploy)
                .run(&specs, &mut registry)
                .await?;

            if results.is_empty() {
                tracing::info!("Nothing to deploy");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(["Contract", "Address", "Transaction", "Block"]);
            for result in &results {
                table.add_row([
                    result.contract_name.clone(),
                    result.address.to_string(),
                    result.transaction_hash.to_string(),
                    result.block_number.to_string(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
