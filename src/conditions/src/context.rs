//! Per-request context and the resource-tag accessor
//!
//! Tags are resolved by an enrichment stage before conditions run and stored
//! in the request context under [`KEY_CONTEXT_TAGS`]. Evaluators only read
//! them through [`resource_tags`], so they never depend on how tags were found.

use crate::types::ResourceTag;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Context key holding the resource tag set
pub const KEY_CONTEXT_TAGS: &str = "TAGS";

/// A single context entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Resolved resource tags
    Tags(HashSet<ResourceTag>),

    /// Any other value computed earlier in the pipeline
    Value(Value),
}

impl ContextValue {
    /// Scalar string form used for value comparisons
    ///
    /// Strings are returned as-is, numbers and booleans as their JSON text.
    /// Tag sets, arrays, objects and nulls have no scalar form.
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            Self::Value(Value::String(s)) => Some(s.clone()),
            Self::Value(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Key-value store carrying data computed earlier in the authorization pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestContext {
    entries: HashMap<String, ContextValue>,
}

impl<'de> Deserialize<'de> for RequestContext {
    /// The [`KEY_CONTEXT_TAGS`] entry must parse as a tag set; a malformed
    /// tag payload is an error, never an empty context.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Value>::deserialize(deserializer)?;

        let entries = raw
            .into_iter()
            .map(|(key, value)| {
                if key == KEY_CONTEXT_TAGS {
                    let tags = serde_json::from_value::<HashSet<ResourceTag>>(value).map_err(|e| {
                        D::Error::custom(format!("invalid '{}' context entry: {}", KEY_CONTEXT_TAGS, e))
                    })?;
                    Ok((key, ContextValue::Tags(tags)))
                } else {
                    Ok((key, ContextValue::Value(value)))
                }
            })
            .collect::<Result<_, D::Error>>()?;

        Ok(Self { entries })
    }
}

impl RequestContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a context entry
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    /// Insert a context entry, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Option<ContextValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tags attached to the accessed resource, if enrichment stored any
///
/// Returns `None` when no tag entry exists or the entry under
/// [`KEY_CONTEXT_TAGS`] is not a tag set. Callers treat `None` as the empty set.
pub fn resource_tags(context: &RequestContext) -> Option<&HashSet<ResourceTag>> {
    match context.get(KEY_CONTEXT_TAGS) {
        Some(ContextValue::Tags(tags)) => Some(tags),
        _ => None,
    }
}

/// Store the resolved tag set for the current request
pub fn set_resource_tags<I>(context: &mut RequestContext, tags: I)
where
    I: IntoIterator<Item = ResourceTag>,
{
    context.insert(KEY_CONTEXT_TAGS, ContextValue::Tags(tags.into_iter().collect()));
}
