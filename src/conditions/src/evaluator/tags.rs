//! Tag-presence evaluators
//!
//! The none-of, any-of and all-of variants share initialization and tag
//! lookup through [`TagPresenceEvaluator`]; each variant only supplies the
//! set predicate.

use super::{ConditionEvaluator, ExpectedValues};
use crate::context::resource_tags;
use crate::types::{AccessRequest, Condition};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Set relation between expected tags and the resource's tag types
pub trait TagSetPredicate: Send + Sync + 'static {
    /// Evaluator name used in logs
    const NAME: &'static str;

    /// Decide the verdict from the expected set and the resource's tag types
    ///
    /// `tag_types` is empty when the request carries no tags.
    fn evaluate<'a, I>(expected: &ExpectedValues, tag_types: I) -> bool
    where
        I: Iterator<Item = &'a str>;
}

/// True iff no resource tag type is expected
#[derive(Debug, Clone, Copy)]
pub struct NoneOf;

impl TagSetPredicate for NoneOf {
    const NAME: &'static str = "NoneOfExpectedTagsPresent";

    fn evaluate<'a, I>(expected: &ExpectedValues, mut tag_types: I) -> bool
    where
        I: Iterator<Item = &'a str>,
    {
        if expected.is_empty() {
            return true;
        }

        !tag_types.any(|tag_type| expected.contains(tag_type))
    }
}

/// True iff at least one resource tag type is expected
#[derive(Debug, Clone, Copy)]
pub struct AnyOf;

impl TagSetPredicate for AnyOf {
    const NAME: &'static str = "AnyOfExpectedTagsPresent";

    fn evaluate<'a, I>(expected: &ExpectedValues, mut tag_types: I) -> bool
    where
        I: Iterator<Item = &'a str>,
    {
        if expected.is_empty() {
            return false;
        }

        tag_types.any(|tag_type| expected.contains(tag_type))
    }
}

/// True iff every expected tag type is present on the resource
#[derive(Debug, Clone, Copy)]
pub struct AllOf;

impl TagSetPredicate for AllOf {
    const NAME: &'static str = "AllOfExpectedTagsPresent";

    fn evaluate<'a, I>(expected: &ExpectedValues, tag_types: I) -> bool
    where
        I: Iterator<Item = &'a str>,
    {
        if expected.is_empty() {
            return true;
        }

        let mut found = HashSet::with_capacity(expected.len());
        for tag_type in tag_types {
            if expected.contains(tag_type) {
                found.insert(tag_type);
                if found.len() == expected.len() {
                    return true;
                }
            }
        }

        false
    }
}

/// Evaluator comparing expected tags against the resource's tags
pub struct TagPresenceEvaluator<P> {
    expected: ExpectedValues,
    _predicate: PhantomData<fn() -> P>,
}

/// Matches when the resource carries none of the expected tags
pub type NoneOfExpectedTagsPresent = TagPresenceEvaluator<NoneOf>;

/// Matches when the resource carries at least one expected tag
pub type AnyOfExpectedTagsPresent = TagPresenceEvaluator<AnyOf>;

/// Matches when the resource carries every expected tag
pub type AllOfExpectedTagsPresent = TagPresenceEvaluator<AllOf>;

impl<P: TagSetPredicate> TagPresenceEvaluator<P> {
    /// Create an uninitialized evaluator
    pub fn new() -> Self {
        Self {
            expected: ExpectedValues::default(),
            _predicate: PhantomData,
        }
    }

    /// Normalized expected tags
    pub fn expected(&self) -> &ExpectedValues {
        &self.expected
    }
}

impl<P: TagSetPredicate> Default for TagPresenceEvaluator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TagSetPredicate> fmt::Debug for TagPresenceEvaluator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(P::NAME)
            .field("expected", &self.expected)
            .finish()
    }
}

impl<P: TagSetPredicate> ConditionEvaluator for TagPresenceEvaluator<P> {
    fn name(&self) -> &'static str {
        P::NAME
    }

    fn init(&mut self, condition: Option<&Condition>) {
        self.expected = ExpectedValues::from_condition(condition);

        debug!(
            evaluator = P::NAME,
            tags = ?self.expected,
            "Initialized tag condition"
        );
    }

    fn is_matched(&self, request: &AccessRequest) -> bool {
        debug_assert!(
            self.expected.is_initialized(),
            "{} evaluated before init",
            P::NAME
        );

        let matched = match resource_tags(&request.context) {
            Some(tags) => P::evaluate(&self.expected, tags.iter().map(|tag| tag.tag_type.as_str())),
            None => P::evaluate(&self.expected, std::iter::empty()),
        };

        trace!(
            evaluator = P::NAME,
            resource = %request.resource.id,
            matched,
            "Evaluated tag condition"
        );

        matched
    }
}
