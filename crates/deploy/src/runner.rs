//! The deployment step runner and the pipeline driver.
//!
//! One step: resolve constructor arguments (literals or registry lookups),
//! submit the creation transaction, wait for confirmation, record the
//! address. The pipeline runs an ordered list of steps strictly
//! sequentially and fails fast: no step is retried, and a failure leaves
//! every previously confirmed registry entry in place so the run can be
//! repeated and pick up where it stopped.

use std::path::Path;

use alloy::primitives::{Address, Bytes, TxHash};

use crate::{
    artifact::ArtifactStore,
    client::{ChainClient, encode_constructor_args},
    error::DeployError,
    plan::{ConstructorArg, DeploymentSpec, execution_order},
    registry::AddressRegistry,
};

/// Lifecycle of a single deployment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Spec selected, dependencies not yet resolved.
    Pending,
    /// Creation transaction accepted by the client.
    Submitted,
    /// Transaction included; registry updated.
    Confirmed,
    /// The step failed; the registry is unchanged for this entry.
    Failed,
}

/// The outcome of one confirmed deployment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// Executes a single [`DeploymentSpec`] against one network.
pub struct StepRunner<'a, C> {
    client: &'a C,
    artifacts: &'a ArtifactStore,
    network: &'a str,
}

impl<'a, C: ChainClient> StepRunner<'a, C> {
    pub fn new(client: &'a C, artifacts: &'a ArtifactStore, network: &'a str) -> Self {
        Self {
            client,
            artifacts,
            network,
        }
    }

    /// Deploy one contract.
    ///
    /// Dependencies must already be recorded in `registry` for the active
    /// network; a dependency-free spec never consults the registry. On
    /// success the registry holds the new address (overwriting any prior
    /// entry for the same name) and the caller is responsible for
    /// persisting it.
    pub async fn deploy(
        &self,
        spec: &DeploymentSpec,
        registry: &mut AddressRegistry,
    ) -> Result<DeploymentResult, DeployError> {
        let mut args = Vec::with_capacity(spec.constructor_args.len());
        for arg in &spec.constructor_args {
            match arg {
                ConstructorArg::Literal(address) => args.push(*address),
                ConstructorArg::Deployed(dependency) => {
                    let address = registry.get(self.network, dependency).ok_or_else(|| {
                        DeployError::DependencyUnresolved {
                            contract: spec.contract_name.clone(),
                            dependency: dependency.clone(),
                            network: self.network.to_string(),
                        }
                    })?;
                    args.push(address);
                }
            }
        }

        let artifact = self.artifacts.load(&spec.contract_name)?;
        let mut init_code = artifact.bytecode.to_vec();
        init_code.extend_from_slice(&encode_constructor_args(&args));

        let deployer = self.client.deployer_address();
        tracing::info!(
            contract = %spec.contract_name,
            state = ?StepState::Pending,
            "Deploying {} with the address: {}",
            spec.contract_name,
            deployer
        );

        let tx_hash = self
            .client
            .submit_deployment(&spec.contract_name, init_code.into())
            .await?;
        tracing::info!(
            contract = %spec.contract_name,
            state = ?StepState::Submitted,
            tx_hash = %tx_hash,
            "Creation transaction submitted, awaiting confirmation..."
        );

        let deployment = self
            .client
            .await_confirmation(&spec.contract_name, tx_hash)
            .await?;

        registry.set(self.network, &spec.contract_name, deployment.address);
        tracing::info!(
            contract = %spec.contract_name,
            state = ?StepState::Confirmed,
            block_number = deployment.block_number,
            "{} deployed at {}",
            spec.contract_name,
            deployment.address
        );

        if let Some(probe) = &spec.probe {
            let calldata = Bytes::from(probe.selector().to_vec());
            let output = self
                .client
                .view(&spec.contract_name, deployment.address, calldata)
                .await?;
            tracing::info!(contract = %spec.contract_name, "{}: {}", probe.label, output);
        }

        Ok(DeploymentResult {
            contract_name: spec.contract_name.clone(),
            address: deployment.address,
            transaction_hash: deployment.transaction_hash,
            block_number: deployment.block_number,
        })
    }
}

/// Drives a list of specs through the runner in dependency order.
///
/// Policy, made explicit rather than accidental: strictly sequential,
/// fail fast, no retries. The registry file is rewritten after every
/// confirmed step, so an interrupted pipeline keeps its completed entries.
pub struct Pipeline<'a, C> {
    runner: StepRunner<'a, C>,
    registry_path: &'a Path,
    redeploy: bool,
}

impl<'a, C: ChainClient> Pipeline<'a, C> {
    pub fn new(
        client: &'a C,
        artifacts: &'a ArtifactStore,
        network: &'a str,
        registry_path: &'a Path,
    ) -> Self {
        Self {
            runner: StepRunner::new(client, artifacts, network),
            registry_path,
            redeploy: false,
        }
    }

    /// Redeploy contracts that already have a recorded address instead of
    /// skipping them. The prior registry entry is overwritten.
    pub fn redeploy(mut self, redeploy: bool) -> Self {
        self.redeploy = redeploy;
        self
    }

    /// Run every spec, topologically ordered, against the registry.
    pub async fn run(
        &self,
        specs: &[DeploymentSpec],
        registry: &mut AddressRegistry,
    ) -> Result<Vec<DeploymentResult>, DeployError> {
        let ordered = execution_order(specs)?;

        let mut results = Vec::new();
        for spec in ordered {
            if !self.redeploy {
                if let Some(existing) = registry.get(self.runner.network, &spec.contract_name) {
                    tracing::info!(
                        contract = %spec.contract_name,
                        "{} already deployed at {}, skipping",
                        spec.contract_name,
                        existing
                    );
                    continue;
                }
            }

            let result = match self.runner.deploy(spec, registry).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        contract = %spec.contract_name,
                        state = ?StepState::Failed,
                        "Deployment step failed"
                    );
                    return Err(e);
                }
            };

            registry.save_to_file(self.registry_path)?;
            results.push(result);
        }

        Ok(results)
    }
}
