//! Policy engine
//!
//! Holds the active policy set and turns access requests into decisions.
//! Policies are evaluated in priority order; the first policy whose target
//! matches and whose conditions all hold decides the request.
//!
//! ```text
//! load_policies ─▶ compile (registry.create + init) ─▶ publish Arc<PolicySet>
//!                                                          │
//! evaluate(&req) ─▶ snapshot Arc ─▶ target? ─▶ conditions? ─▶ Decision
//! ```
//!
//! Evaluation is synchronous and lock-free apart from cloning the snapshot
//! `Arc`; a reload swaps in a complete new set and never mutates one that
//! requests are reading.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::evaluator::EvaluatorRegistry;
use crate::policy::{CompiledPolicy, Policy, PolicyEffect};
use crate::types::{AccessRequest, Decision};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable, priority-ordered set of compiled policies
#[derive(Debug, Default)]
pub struct PolicySet {
    policies: Vec<CompiledPolicy>,
}

impl PolicySet {
    /// Compile policies and order them by descending priority
    ///
    /// Policies with equal priority keep their load order.
    pub fn compile(policies: Vec<Policy>, registry: &EvaluatorRegistry) -> Result<Self> {
        let mut compiled = policies
            .into_iter()
            .map(|policy| CompiledPolicy::compile(policy, registry))
            .collect::<Result<Vec<_>>>()?;

        compiled.sort_by(|a, b| b.policy().priority.cmp(&a.policy().priority));

        Ok(Self { policies: compiled })
    }

    /// Number of policies
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// First policy that applies to the request
    pub fn find_applicable(&self, request: &AccessRequest) -> Option<&CompiledPolicy> {
        self.policies.iter().find(|compiled| {
            if !compiled.matches_target(request) {
                return false;
            }

            let matched = compiled.conditions_matched(request);
            debug!(
                policy = %compiled.policy().id,
                priority = compiled.policy().priority,
                matched,
                "Evaluated policy conditions"
            );
            matched
        })
    }
}

/// Policy engine
pub struct PolicyEngine {
    registry: EvaluatorRegistry,
    policies: RwLock<Arc<PolicySet>>,
    default_decision: PolicyEffect,
}

impl PolicyEngine {
    /// Create an engine with no policies loaded
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let registry = config.build_registry()?;

        info!(
            default_decision = ?config.engine.default_decision,
            kinds = ?registry.kinds(),
            "PolicyEngine initialized"
        );

        Ok(Self {
            registry,
            policies: RwLock::new(Arc::new(PolicySet::default())),
            default_decision: config.engine.default_decision,
        })
    }

    /// Create an engine with a custom evaluator registry
    pub fn with_registry(registry: EvaluatorRegistry, default_decision: PolicyEffect) -> Self {
        Self {
            registry,
            policies: RwLock::new(Arc::new(PolicySet::default())),
            default_decision,
        }
    }

    /// Replace the active policy set
    ///
    /// The new set is fully compiled before it becomes visible. On error the
    /// previous set stays active.
    pub fn load_policies(&self, policies: Vec<Policy>) -> Result<()> {
        let set = Arc::new(PolicySet::compile(policies, &self.registry)?);
        let count = set.len();

        *self.policies.write() = set;

        info!(policies = count, "Policy set loaded");
        Ok(())
    }

    /// Current policy set
    pub fn snapshot(&self) -> Arc<PolicySet> {
        self.policies.read().clone()
    }

    /// Number of active policies
    pub fn policy_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Decide an access request
    pub fn evaluate(&self, request: &AccessRequest) -> Decision {
        let policies = self.snapshot();

        debug!(
            principal = %request.principal.id,
            resource = %request.resource.id,
            action = %request.action.name,
            "Evaluating access request"
        );

        let decision = match policies.find_applicable(request) {
            Some(compiled) => {
                let policy = compiled.policy();
                match policy.effect {
                    PolicyEffect::Allow => Decision::allow(
                        policy.id.clone(),
                        format!("Policy '{}' allows this action", policy.name),
                    ),
                    PolicyEffect::Deny => Decision::deny(
                        policy.id.clone(),
                        format!("Policy '{}' denies this action", policy.name),
                    ),
                }
            }
            None => self.fallback_decision("No policies matched conditions"),
        };

        debug!(
            allowed = decision.allowed,
            policy = %decision.policy_id,
            "Decision reached"
        );

        decision
    }

    fn fallback_decision(&self, reason: &str) -> Decision {
        match self.default_decision {
            PolicyEffect::Allow => Decision::allow("default", format!("{}, default allow", reason)),
            PolicyEffect::Deny => Decision::deny("default", format!("{}, default deny", reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Principal, Resource};

    #[test]
    fn test_engine_creation() {
        let engine = PolicyEngine::new(&EngineConfig::default()).unwrap();
        assert_eq!(engine.policy_count(), 0);
    }

    #[test]
    fn test_default_decision_when_empty() {
        let engine = PolicyEngine::with_registry(EvaluatorRegistry::new(), PolicyEffect::Allow);
        let request = AccessRequest::new(
            Principal::new("user:alice"),
            Resource::new("table:sales.orders"),
            Action::new("select"),
        );

        let decision = engine.evaluate(&request);
        assert!(decision.allowed);
        assert_eq!(decision.policy_id, "default");
    }
}
