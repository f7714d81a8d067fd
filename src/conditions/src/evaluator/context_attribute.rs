//! Context attribute evaluators
//!
//! Compare a single request-context attribute, named by the condition's
//! `attributeName` option, against the expected values. A request that does
//! not carry the attribute is not constrained by the condition.

use super::{ConditionEvaluator, ExpectedValues};
use crate::types::{AccessRequest, Condition};
use tracing::{debug, trace, warn};

/// Condition option naming the context attribute to compare
pub const OPTION_ATTRIBUTE_NAME: &str = "attributeName";

#[derive(Debug, Clone, Default)]
struct AttributeLookup {
    attribute: Option<String>,
    expected: ExpectedValues,
}

impl AttributeLookup {
    fn init(name: &'static str, condition: Option<&Condition>) -> Self {
        let attribute = condition
            .and_then(|c| c.option(OPTION_ATTRIBUTE_NAME))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        if attribute.is_none() {
            warn!(evaluator = name, "No '{}' option configured; condition always passes", OPTION_ATTRIBUTE_NAME);
        }

        let lookup = Self {
            attribute,
            expected: ExpectedValues::from_condition(condition),
        };

        debug!(
            evaluator = name,
            attribute = ?lookup.attribute,
            values = ?lookup.expected,
            "Initialized context attribute condition"
        );

        lookup
    }

    /// `None` when the attribute is unconfigured or absent from the request,
    /// otherwise whether its scalar value is expected
    fn value_expected(&self, name: &'static str, request: &AccessRequest) -> Option<bool> {
        debug_assert!(self.expected.is_initialized(), "{} evaluated before init", name);

        let attribute = self.attribute.as_deref()?;
        let value = request.context.get(attribute)?;

        Some(
            value
                .as_scalar()
                .map_or(false, |value| self.expected.contains(&value)),
        )
    }
}

/// Matches when the named context attribute holds one of the expected values
#[derive(Debug, Clone, Default)]
pub struct ContextAttributeValueIn {
    lookup: AttributeLookup,
}

impl ContextAttributeValueIn {
    const NAME: &'static str = "ContextAttributeValueIn";
}

impl ConditionEvaluator for ContextAttributeValueIn {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, condition: Option<&Condition>) {
        self.lookup = AttributeLookup::init(Self::NAME, condition);
    }

    fn is_matched(&self, request: &AccessRequest) -> bool {
        let matched = self.lookup.value_expected(Self::NAME, request).unwrap_or(true);
        trace!(evaluator = Self::NAME, matched, "Evaluated context attribute condition");
        matched
    }
}

/// Matches when the named context attribute holds none of the expected values
#[derive(Debug, Clone, Default)]
pub struct ContextAttributeValueNotIn {
    lookup: AttributeLookup,
}

impl ContextAttributeValueNotIn {
    const NAME: &'static str = "ContextAttributeValueNotIn";
}

impl ConditionEvaluator for ContextAttributeValueNotIn {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, condition: Option<&Condition>) {
        self.lookup = AttributeLookup::init(Self::NAME, condition);
    }

    fn is_matched(&self, request: &AccessRequest) -> bool {
        let matched = self
            .lookup
            .value_expected(Self::NAME, request)
            .map_or(true, |expected| !expected);
        trace!(evaluator = Self::NAME, matched, "Evaluated context attribute condition");
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::types::{Action, Principal, Resource};
    use serde_json::json;

    fn request(context: RequestContext) -> AccessRequest {
        AccessRequest::new(
            Principal::new("user:bob"),
            Resource::new("path:/data/raw"),
            Action::new("read"),
        )
        .with_context(context)
    }

    fn condition(values: &[&str]) -> Condition {
        Condition::new("context-attribute-in", values.iter().copied())
            .with_option(OPTION_ATTRIBUTE_NAME, "site")
    }

    #[test]
    fn test_value_in() {
        let mut eval = ContextAttributeValueIn::default();
        eval.init(Some(&condition(&["dc1", " dc2 "])));

        assert!(eval.is_matched(&request(RequestContext::new().with("site", json!("dc2")))));
        assert!(!eval.is_matched(&request(RequestContext::new().with("site", json!("dc3")))));
    }

    #[test]
    fn test_value_not_in() {
        let mut eval = ContextAttributeValueNotIn::default();
        eval.init(Some(&condition(&["dc1"])));

        assert!(!eval.is_matched(&request(RequestContext::new().with("site", json!("dc1")))));
        assert!(eval.is_matched(&request(RequestContext::new().with("site", json!("dc3")))));
    }

    #[test]
    fn test_missing_attribute_passes_both() {
        let mut value_in = ContextAttributeValueIn::default();
        value_in.init(Some(&condition(&["dc1"])));
        let mut value_not_in = ContextAttributeValueNotIn::default();
        value_not_in.init(Some(&condition(&["dc1"])));

        let req = request(RequestContext::new());
        assert!(value_in.is_matched(&req));
        assert!(value_not_in.is_matched(&req));
    }

    #[test]
    fn test_unconfigured_attribute_passes() {
        let mut eval = ContextAttributeValueIn::default();
        eval.init(Some(&Condition::new("context-attribute-in", ["dc1"])));

        assert!(eval.is_matched(&request(RequestContext::new().with("site", json!("dc9")))));
    }

    #[test]
    fn test_non_scalar_value_never_expected() {
        let mut value_in = ContextAttributeValueIn::default();
        value_in.init(Some(&condition(&["dc1"])));
        let mut value_not_in = ContextAttributeValueNotIn::default();
        value_not_in.init(Some(&condition(&["dc1"])));

        let req = request(RequestContext::new().with("site", json!(["dc1"])));
        assert!(!value_in.is_matched(&req));
        assert!(value_not_in.is_matched(&req));
    }

    #[test]
    fn test_numeric_values_compare_as_text() {
        let mut eval = ContextAttributeValueIn::default();
        eval.init(Some(&condition(&["443", "8443"])));

        assert!(eval.is_matched(&request(RequestContext::new().with("site", json!(443)))));
    }
}
