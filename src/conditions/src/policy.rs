//! Policy definition and compilation

use crate::error::{ConditionError, Result};
use crate::evaluator::{ConditionEvaluator, EvaluatorRegistry};
use crate::types::{AccessRequest, Condition, PolicyId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyEffect {
    /// Allow the action
    Allow,
    /// Deny the action
    Deny,
}

/// Policy definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier
    pub id: PolicyId,

    /// Policy name
    pub name: String,

    /// Policy effect (allow or deny)
    pub effect: PolicyEffect,

    /// Principal pattern (e.g., "user:*", "service:etl-*")
    pub principal: String,

    /// Resource pattern (e.g., "table:sales.*")
    pub resource: String,

    /// Action pattern (e.g., "select", "*")
    pub action: String,

    /// Conditions that must all hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Policy priority (higher = evaluated first)
    #[serde(default)]
    pub priority: i32,
}

impl Policy {
    /// Check the definition is usable
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ConditionError::InvalidPolicy(
                "Policy id cannot be empty".to_string(),
            ));
        }

        for (field, pattern) in [
            ("principal", &self.principal),
            ("resource", &self.resource),
            ("action", &self.action),
        ] {
            if pattern.trim().is_empty() {
                return Err(ConditionError::InvalidPolicy(format!(
                    "Policy '{}' has an empty {} pattern",
                    self.id, field
                )));
            }
        }

        Ok(())
    }
}

/// Wildcard pattern compiled once at load time
#[derive(Debug, Clone)]
enum Pattern {
    Any,
    Exact(String),
    Glob(Regex),
}

impl Pattern {
    fn compile(pattern: &str) -> Result<Self> {
        if pattern == "*" {
            return Ok(Self::Any);
        }

        if !pattern.contains('*') {
            return Ok(Self::Exact(pattern.to_string()));
        }

        let regex_pattern = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        Regex::new(&format!("^{}$", regex_pattern))
            .map(Self::Glob)
            .map_err(|e| ConditionError::InvalidPolicy(format!("Invalid pattern '{}': {}", pattern, e)))
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == value,
            Self::Glob(regex) => regex.is_match(value),
        }
    }
}

/// Policy with target patterns compiled and condition evaluators initialized
///
/// Immutable once built; shared by every request thread until the policy
/// set is replaced.
pub struct CompiledPolicy {
    policy: Policy,
    principal: Pattern,
    resource: Pattern,
    action: Pattern,
    evaluators: Vec<Arc<dyn ConditionEvaluator>>,
}

impl CompiledPolicy {
    /// Validate the policy and build its evaluators
    pub fn compile(policy: Policy, registry: &EvaluatorRegistry) -> Result<Self> {
        policy.validate()?;

        let evaluators = policy
            .conditions
            .iter()
            .map(|condition| {
                registry.create(condition).map_err(|e| {
                    ConditionError::InvalidPolicy(format!("Policy '{}': {}", policy.id, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            principal: Pattern::compile(&policy.principal)?,
            resource: Pattern::compile(&policy.resource)?,
            action: Pattern::compile(&policy.action)?,
            evaluators,
            policy,
        })
    }

    /// Source definition
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Whether the principal, resource and action patterns all match
    pub fn matches_target(&self, request: &AccessRequest) -> bool {
        self.principal.matches(&request.principal.id)
            && self.resource.matches(&request.resource.id)
            && self.action.matches(&request.action.name)
    }

    /// Whether every condition holds (true when there are none)
    pub fn conditions_matched(&self, request: &AccessRequest) -> bool {
        self.evaluators.iter().all(|evaluator| evaluator.is_matched(request))
    }

    /// Number of condition evaluators
    pub fn condition_count(&self) -> usize {
        self.evaluators.len()
    }
}

impl fmt::Debug for CompiledPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPolicy")
            .field("id", &self.policy.id)
            .field("priority", &self.policy.priority)
            .field("evaluators", &self.evaluators)
            .finish()
    }
}
