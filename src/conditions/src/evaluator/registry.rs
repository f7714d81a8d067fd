//! Evaluator factory keyed by condition kind

use super::context_attribute::{ContextAttributeValueIn, ContextAttributeValueNotIn};
use super::tags::{AllOfExpectedTagsPresent, AnyOfExpectedTagsPresent, NoneOfExpectedTagsPresent};
use super::ConditionEvaluator;
use crate::error::{ConditionError, Result};
use crate::types::Condition;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Kind for [`NoneOfExpectedTagsPresent`]
pub const KIND_TAGS_NONE_PRESENT: &str = "tags-none-present";
/// Kind for [`AnyOfExpectedTagsPresent`]
pub const KIND_TAGS_ANY_PRESENT: &str = "tags-any-present";
/// Kind for [`AllOfExpectedTagsPresent`]
pub const KIND_TAGS_ALL_PRESENT: &str = "tags-all-present";
/// Kind for [`ContextAttributeValueIn`]
pub const KIND_CONTEXT_ATTRIBUTE_IN: &str = "context-attribute-in";
/// Kind for [`ContextAttributeValueNotIn`]
pub const KIND_CONTEXT_ATTRIBUTE_NOT_IN: &str = "context-attribute-not-in";

/// Builds an uninitialized evaluator
pub type EvaluatorFactory = fn() -> Box<dyn ConditionEvaluator>;

fn boxed<E: ConditionEvaluator + Default + 'static>() -> Box<dyn ConditionEvaluator> {
    Box::new(E::default())
}

/// Maps condition kinds to evaluator implementations
///
/// The registry is assembled once at startup and then only read. Evaluators
/// it hands out are already initialized.
#[derive(Clone)]
pub struct EvaluatorRegistry {
    factories: HashMap<String, EvaluatorFactory>,
    aliases: HashMap<String, String>,
}

impl EvaluatorRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Create a registry with all built-in evaluators
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(KIND_TAGS_NONE_PRESENT, boxed::<NoneOfExpectedTagsPresent>);
        registry.register(KIND_TAGS_ANY_PRESENT, boxed::<AnyOfExpectedTagsPresent>);
        registry.register(KIND_TAGS_ALL_PRESENT, boxed::<AllOfExpectedTagsPresent>);
        registry.register(KIND_CONTEXT_ATTRIBUTE_IN, boxed::<ContextAttributeValueIn>);
        registry.register(KIND_CONTEXT_ATTRIBUTE_NOT_IN, boxed::<ContextAttributeValueNotIn>);
        registry
    }

    /// Register (or replace) the evaluator for a kind
    pub fn register(&mut self, kind: impl Into<String>, factory: EvaluatorFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Let conditions authored as `alias` use the evaluator registered for `kind`
    pub fn register_alias(&mut self, alias: impl Into<String>, kind: &str) -> Result<()> {
        if !self.factories.contains_key(kind) {
            return Err(ConditionError::UnknownConditionKind(kind.to_string()));
        }

        self.aliases.insert(alias.into(), kind.to_string());
        Ok(())
    }

    /// Whether a kind (or alias) can be built
    pub fn contains(&self, kind: &str) -> bool {
        self.resolve(kind).is_some()
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build and initialize the evaluator for a condition
    pub fn create(&self, condition: &Condition) -> Result<Arc<dyn ConditionEvaluator>> {
        let factory = self
            .resolve(&condition.kind)
            .ok_or_else(|| ConditionError::UnknownConditionKind(condition.kind.clone()))?;

        let mut evaluator = factory();
        evaluator.init(Some(condition));

        debug!(
            kind = %condition.kind,
            evaluator = evaluator.name(),
            "Created condition evaluator"
        );

        Ok(Arc::from(evaluator))
    }

    fn resolve(&self, kind: &str) -> Option<EvaluatorFactory> {
        let kind = self.aliases.get(kind).map(String::as_str).unwrap_or(kind);
        self.factories.get(kind).copied()
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessRequest, Action, Principal, Resource};

    fn request() -> AccessRequest {
        AccessRequest::new(
            Principal::new("user:alice"),
            Resource::new("table:hr.salaries"),
            Action::new("select"),
        )
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = EvaluatorRegistry::new();
        assert_eq!(
            registry.kinds(),
            vec![
                KIND_CONTEXT_ATTRIBUTE_IN,
                KIND_CONTEXT_ATTRIBUTE_NOT_IN,
                KIND_TAGS_ALL_PRESENT,
                KIND_TAGS_ANY_PRESENT,
                KIND_TAGS_NONE_PRESENT,
            ]
        );
    }

    #[test]
    fn test_create_selects_variant_by_kind() {
        let registry = EvaluatorRegistry::new();

        let none_of = registry.create(&Condition::new(KIND_TAGS_NONE_PRESENT, ["PII"])).unwrap();
        let any_of = registry.create(&Condition::new(KIND_TAGS_ANY_PRESENT, ["PII"])).unwrap();

        assert_eq!(none_of.name(), "NoneOfExpectedTagsPresent");
        assert_eq!(any_of.name(), "AnyOfExpectedTagsPresent");

        // Created evaluators are initialized and usable immediately
        assert!(none_of.is_matched(&request()));
        assert!(!any_of.is_matched(&request()));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = EvaluatorRegistry::new();
        let result = registry.create(&Condition::new("ip-range", ["10.0.0.0/8"]));

        assert!(matches!(result, Err(ConditionError::UnknownConditionKind(kind)) if kind == "ip-range"));
    }

    #[test]
    fn test_aliases() {
        let mut registry = EvaluatorRegistry::new();
        registry.register_alias("__tagsNoneOf", KIND_TAGS_NONE_PRESENT).unwrap();

        assert!(registry.contains("__tagsNoneOf"));
        let evaluator = registry.create(&Condition::new("__tagsNoneOf", ["PII"])).unwrap();
        assert_eq!(evaluator.name(), "NoneOfExpectedTagsPresent");

        assert!(registry.register_alias("x", "missing-kind").is_err());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = EvaluatorRegistry::empty();
        assert!(!registry.contains(KIND_TAGS_ANY_PRESENT));

        registry.register("sensitive-any", boxed::<AnyOfExpectedTagsPresent>);
        let evaluator = registry.create(&Condition::new("sensitive-any", ["PII"])).unwrap();
        assert_eq!(evaluator.name(), "AnyOfExpectedTagsPresent");
    }
}
