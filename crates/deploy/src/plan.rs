//! The deployment plan: which contracts to deploy, with which constructor
//! arguments, in which order.
//!
//! Ordering is not operator-remembered script numbering: each spec
//! declares what it depends on, and the driver sorts the specs
//! topologically before running them.

use std::collections::BTreeSet;

use alloy::primitives::{Address, keccak256};

use crate::error::DeployError;

/// Contract name of the wrapped-ether contract.
pub const WETH_CONTRACT: &str = "WETH";

/// Contract name of the pair factory.
pub const FACTORY_CONTRACT: &str = "MochaFactory";

/// Contract name of the swap router.
pub const ROUTER_CONTRACT: &str = "MochaRouter";

/// A single constructor argument: either a value fixed at
/// pipeline-authoring time, or the recorded address of a previously
/// deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A static address, e.g. the fee recipient.
    Literal(Address),
    /// The deployed address of the named contract, looked up in the
    /// registry for the active network.
    Deployed(String),
}

/// A read-only call issued against a contract right after deployment, with
/// the returned word logged. Used to surface the factory's pair init code
/// hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewProbe {
    /// Human-readable label for the log line.
    pub label: String,
    /// Solidity function signature, e.g. `pairCodeHash()`.
    pub signature: String,
}

impl ViewProbe {
    pub fn new(label: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            signature: signature.into(),
        }
    }

    /// The 4-byte function selector for the probe's signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

/// An immutable description of one deployment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSpec {
    /// Contract name; also the artifact and registry key.
    pub contract_name: String,
    /// Constructor arguments in declaration order.
    pub constructor_args: Vec<ConstructorArg>,
    /// Contracts whose addresses must be recorded before this step runs.
    /// Derived from the `Deployed` constructor arguments so the set can
    /// never disagree with the argument list.
    pub depends_on: BTreeSet<String>,
    /// Optional post-deployment view probe.
    pub probe: Option<ViewProbe>,
}

impl DeploymentSpec {
    pub fn new(contract_name: impl Into<String>, constructor_args: Vec<ConstructorArg>) -> Self {
        let depends_on = constructor_args
            .iter()
            .filter_map(|arg| match arg {
                ConstructorArg::Deployed(name) => Some(name.clone()),
                ConstructorArg::Literal(_) => None,
            })
            .collect();

        Self {
            contract_name: contract_name.into(),
            constructor_args,
            depends_on,
            probe: None,
        }
    }

    pub fn with_probe(mut self, probe: ViewProbe) -> Self {
        self.probe = Some(probe);
        self
    }
}

/// The Mocha exchange suite in declaration order: WETH, then the factory
/// (fee recipient), then the router (factory, WETH, fee recipient).
pub fn mocha_suite(fee_to: Address) -> Vec<DeploymentSpec> {
    vec![
        DeploymentSpec::new(WETH_CONTRACT, vec![]),
        DeploymentSpec::new(FACTORY_CONTRACT, vec![ConstructorArg::Literal(fee_to)])
            .with_probe(ViewProbe::new("init code hash", "pairCodeHash()")),
        DeploymentSpec::new(
            ROUTER_CONTRACT,
            vec![
                ConstructorArg::Deployed(FACTORY_CONTRACT.to_string()),
                ConstructorArg::Deployed(WETH_CONTRACT.to_string()),
                ConstructorArg::Literal(fee_to),
            ],
        ),
    ]
}

/// Order `specs` so that every spec runs after the specs it depends on.
///
/// Kahn's algorithm, stable with respect to input order. Dependencies that
/// are not among the given specs are treated as externally satisfied (the
/// runner resolves them from the registry, failing there if absent). A
/// cycle is an error.
pub fn execution_order(specs: &[DeploymentSpec]) -> Result<Vec<&DeploymentSpec>, DeployError> {
    let names: BTreeSet<&str> = specs.iter().map(|s| s.contract_name.as_str()).collect();
    let mut ordered: Vec<&DeploymentSpec> = Vec::with_capacity(specs.len());
    let mut placed: BTreeSet<&str> = BTreeSet::new();

    while ordered.len() < specs.len() {
        let mut progressed = false;
        for spec in specs {
            if placed.contains(spec.contract_name.as_str()) {
                continue;
            }
            let ready = spec
                .depends_on
                .iter()
                .all(|dep| placed.contains(dep.as_str()) || !names.contains(dep.as_str()));
            if ready {
                placed.insert(spec.contract_name.as_str());
                ordered.push(spec);
                progressed = true;
            }
        }
        if !progressed {
            let stuck = specs
                .iter()
                .find(|s| !placed.contains(s.contract_name.as_str()))
                .expect("at least one unplaced spec when not progressing");
            return Err(DeployError::DependencyCycle(stuck.contract_name.clone()));
        }
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_to() -> Address {
        Address::repeat_byte(0xfe)
    }

    #[test]
    fn depends_on_is_derived_from_args() {
        let suite = mocha_suite(fee_to());

        assert!(suite[0].depends_on.is_empty(), "WETH is dependency-free");
        assert!(
            suite[1].depends_on.is_empty(),
            "the factory only takes the static fee address"
        );
        assert_eq!(
            suite[2].depends_on,
            BTreeSet::from([FACTORY_CONTRACT.to_string(), WETH_CONTRACT.to_string()])
        );
    }

    #[test]
    fn router_args_are_factory_weth_fee_in_order() {
        let suite = mocha_suite(fee_to());
        let router = &suite[2];
        assert_eq!(router.contract_name, ROUTER_CONTRACT);
        assert_eq!(
            router.constructor_args,
            vec![
                ConstructorArg::Deployed(FACTORY_CONTRACT.to_string()),
                ConstructorArg::Deployed(WETH_CONTRACT.to_string()),
                ConstructorArg::Literal(fee_to()),
            ]
        );
    }

    #[test]
    fn factory_probe_is_pair_code_hash() {
        let suite = mocha_suite(fee_to());
        let probe = suite[1].probe.as_ref().expect("factory has a probe");
        assert_eq!(probe.signature, "pairCodeHash()");
        // Selector derivation is deterministic.
        assert_eq!(probe.selector(), probe.selector());
    }

    #[test]
    fn execution_order_of_suite_ends_with_router() {
        let suite = mocha_suite(fee_to());
        let order: Vec<&str> = execution_order(&suite)
            .unwrap()
            .iter()
            .map(|s| s.contract_name.as_str())
            .collect();
        assert_eq!(order, vec![WETH_CONTRACT, FACTORY_CONTRACT, ROUTER_CONTRACT]);
    }

    #[test]
    fn execution_order_repairs_reversed_input() {
        let mut suite = mocha_suite(fee_to());
        suite.reverse();
        let order: Vec<&str> = execution_order(&suite)
            .unwrap()
            .iter()
            .map(|s| s.contract_name.as_str())
            .collect();
        // Router declared first but must still run last.
        assert_eq!(order, vec![FACTORY_CONTRACT, WETH_CONTRACT, ROUTER_CONTRACT]);
    }

    #[test]
    fn execution_order_treats_missing_deps_as_external() {
        // Deploying the router alone: its dependencies resolve from the
        // registry at run time, not from the spec list.
        let suite = mocha_suite(fee_to());
        let router_only = vec![suite[2].clone()];
        let order = execution_order(&router_only).unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].contract_name, ROUTER_CONTRACT);
    }

    #[test]
    fn execution_order_rejects_cycles() {
        let a = DeploymentSpec::new("A", vec![ConstructorArg::Deployed("B".to_string())]);
        let b = DeploymentSpec::new("B", vec![ConstructorArg::Deployed("A".to_string())]);
        let err = execution_order(&[a, b]).unwrap_err();
        assert!(matches!(err, DeployError::DependencyCycle(_)));
    }
}
