//! mocha-deploy - Deployment library for the Mocha exchange contract suite.
//!
//! This crate drives the sequenced deployment of the Mocha contracts
//! (WETH, MochaFactory, MochaRouter) against an Ethereum network: it
//! resolves network configuration, orders the deployment steps by their
//! declared dependencies, submits each creation transaction through the
//! chain client, and records the confirmed addresses in a per-network
//! registry file that later steps read their constructor arguments from.

mod artifact;
mod client;
mod config;
mod error;
mod plan;
mod registry;
mod runner;

pub use artifact::{ArtifactStore, ContractArtifact};
pub use client::{ChainClient, Deployment, RpcChainClient, encode_constructor_args};
pub use config::{MochaConfig, NetworkConfig, ResolvedNetwork, Secrets};
pub use error::DeployError;
pub use plan::{
    ConstructorArg, DeploymentSpec, FACTORY_CONTRACT, ROUTER_CONTRACT, ViewProbe, WETH_CONTRACT,
    execution_order, mocha_suite,
};
pub use registry::AddressRegistry;
pub use runner::{DeploymentResult, Pipeline, StepRunner, StepState};
