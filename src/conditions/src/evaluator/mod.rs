//! Condition evaluators
//!
//! Every policy condition is backed by one [`ConditionEvaluator`] built from
//! the condition's kind. Evaluators follow a two-state lifecycle:
//!
//! ```text
//! Uninitialized ──init()──▶ Initialized ──is_matched(&req)──▶ bool
//! ```
//!
//! After `init` the evaluator is read-only, so one instance is shared across
//! all request threads without locking. Policy reloads build fresh instances
//! rather than touching ones that are in use.
//!
//! # Example
//!
//! ```rust
//! use cretoai_conditions::context::set_resource_tags;
//! use cretoai_conditions::evaluator::{ConditionEvaluator, NoneOfExpectedTagsPresent};
//! use cretoai_conditions::types::{AccessRequest, Action, Condition, Principal, Resource, ResourceTag};
//!
//! let condition = Condition::new("tags-none-present", ["PII", "SENSITIVE"]);
//! let mut evaluator = NoneOfExpectedTagsPresent::default();
//! evaluator.init(Some(&condition));
//!
//! let mut request = AccessRequest::new(
//!     Principal::new("user:alice"),
//!     Resource::new("table:sales.customers"),
//!     Action::new("select"),
//! );
//! set_resource_tags(&mut request.context, [ResourceTag::new("PUBLIC")]);
//!
//! assert!(evaluator.is_matched(&request));
//! ```

pub mod context_attribute;
pub mod registry;
pub mod tags;

pub use context_attribute::{ContextAttributeValueIn, ContextAttributeValueNotIn};
pub use registry::{EvaluatorFactory, EvaluatorRegistry};
pub use tags::{
    AllOf, AllOfExpectedTagsPresent, AnyOf, AnyOfExpectedTagsPresent, NoneOf,
    NoneOfExpectedTagsPresent, TagPresenceEvaluator, TagSetPredicate,
};

use crate::types::{AccessRequest, Condition};
use std::collections::HashSet;
use std::fmt;

/// Policy condition evaluator
///
/// Implementations must be cheap to call and must never fail: missing or
/// malformed request data degrades to a verdict, not an error.
pub trait ConditionEvaluator: Send + Sync + fmt::Debug {
    /// Evaluator name used in logs
    fn name(&self) -> &'static str;

    /// Configure the evaluator from its policy condition
    ///
    /// Called exactly once, before the evaluator is shared. An absent
    /// condition configures an empty expected set.
    fn init(&mut self, condition: Option<&Condition>);

    /// Whether the condition holds for this request
    ///
    /// Calling this before [`init`](Self::init) is a programming error.
    fn is_matched(&self, request: &AccessRequest) -> bool;
}

/// Normalized expected values shared by value-set evaluators
///
/// Values are trimmed and deduplicated; values that are blank after trimming
/// are dropped. Only membership is ever queried.
#[derive(Debug, Clone, Default)]
pub struct ExpectedValues {
    values: HashSet<String>,
    initialized: bool,
}

impl ExpectedValues {
    /// Build the expected set from a condition
    pub fn from_condition(condition: Option<&Condition>) -> Self {
        let values = condition
            .and_then(Condition::values)
            .unwrap_or_default()
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            values,
            initialized: true,
        }
    }

    /// Whether the set has been built from a condition
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Membership test
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Number of distinct expected values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are expected
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the expected values (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}
