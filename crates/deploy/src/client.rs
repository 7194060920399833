//! The seam between the pipeline and the chain.
//!
//! [`ChainClient`] is the narrow interface the step runner needs: the
//! deployer's address, creation-transaction submission, a confirmation
//! wait, and read-only calls. [`RpcChainClient`] is the production
//! implementation on the alloy provider stack; tests substitute their own.

use std::{future::Future, time::Duration};

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    sol_types::SolValue,
};

use crate::{config::ResolvedNetwork, error::DeployError};

/// Interval between receipt polls while awaiting confirmation.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A confirmed contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the created contract.
    pub address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
}

/// What the step runner requires from the chain. Signing, gas estimation,
/// nonce management, and RPC transport all live behind this trait.
pub trait ChainClient {
    /// The address the creation transactions are sent from.
    fn deployer_address(&self) -> Address;

    /// Submit a contract-creation transaction carrying `init_code`
    /// (creation bytecode with ABI-encoded constructor arguments
    /// appended). Returns the transaction hash once the transaction is
    /// accepted by the client.
    fn submit_deployment(
        &self,
        contract_name: &str,
        init_code: Bytes,
    ) -> impl Future<Output = Result<TxHash, DeployError>> + Send;

    /// Suspend until the creation transaction is included in a block.
    /// One confirmation is sufficient. There is no deadline: the wait
    /// ends when the client resolves or errors.
    fn await_confirmation(
        &self,
        contract_name: &str,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Deployment, DeployError>> + Send;

    /// Issue a read-only call against a deployed contract.
    fn view(
        &self,
        contract_name: &str,
        to: Address,
        calldata: Bytes,
    ) -> impl Future<Output = Result<Bytes, DeployError>> + Send;
}

/// ABI-encode constructor arguments. Every argument in this suite is an
/// address: one left-padded 32-byte word each, concatenated in order.
pub fn encode_constructor_args(args: &[Address]) -> Bytes {
    let mut encoded = Vec::with_capacity(args.len() * 32);
    for arg in args {
        encoded.extend_from_slice(&arg.abi_encode());
    }
    encoded.into()
}

/// Production [`ChainClient`] over an HTTP JSON-RPC endpoint, signing
/// locally with the configured key.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    deployer: Address,
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("deployer", &self.deployer)
            .finish_non_exhaustive()
    }
}

impl RpcChainClient {
    /// Connect to the resolved network.
    ///
    /// When the network pins a chain id, the endpoint's reported chain id
    /// is checked before anything is submitted; a mismatch is a
    /// configuration error.
    pub async fn connect(network: &ResolvedNetwork) -> Result<Self, DeployError> {
        let deployer = network.signer.address();
        let wallet = EthereumWallet::from(network.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(network.rpc_url.clone())
            .erased();

        if let Some(expected) = network.chain_id {
            let actual = provider.get_chain_id().await.map_err(|e| {
                DeployError::Config(format!(
                    "failed to query chain id of network `{}`: {e}",
                    network.name
                ))
            })?;
            if actual != expected {
                return Err(DeployError::Config(format!(
                    "network `{}` reports chain id {actual}, expected {expected}",
                    network.name
                )));
            }
        }

        Ok(Self { provider, deployer })
    }
}

impl ChainClient for RpcChainClient {
    fn deployer_address(&self) -> Address {
        self.deployer
    }

    async fn submit_deployment(
        &self,
        contract_name: &str,
        init_code: Bytes,
    ) -> Result<TxHash, DeployError> {
        let tx = TransactionRequest::default().with_deploy_code(init_code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| DeployError::Submission {
                contract: contract_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(*pending.tx_hash())
    }

    async fn await_confirmation(
        &self,
        contract_name: &str,
        tx_hash: TxHash,
    ) -> Result<Deployment, DeployError> {
        let confirmation_err = |reason: String| DeployError::Confirmation {
            contract: contract_name.to_string(),
            reason,
        };

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Err(e) => return Err(confirmation_err(e.to_string())),
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(confirmation_err(
                            "creation transaction reverted".to_string(),
                        ));
                    }
                    let address = receipt.contract_address.ok_or_else(|| {
                        confirmation_err("receipt carries no contract address".to_string())
                    })?;
                    return Ok(Deployment {
                        address,
                        transaction_hash: tx_hash,
                        block_number: receipt.block_number.unwrap_or_default(),
                    });
                }
                // Not yet included; keep waiting.
                Ok(None) => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
            }
        }
    }

    async fn view(
        &self,
        contract_name: &str,
        to: Address,
        calldata: Bytes,
    ) -> Result<Bytes, DeployError> {
        let tx = TransactionRequest::default().with_to(to).with_input(calldata);
        self.provider
            .call(tx)
            .await
            .map_err(|e| DeployError::ContractCall {
                contract: contract_name.to_string(),
                reason: e.to_string(),
            })
    }
}
