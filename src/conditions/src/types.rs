//! Core condition and request types

use crate::context::RequestContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Unique policy identifier
pub type PolicyId = String;

/// Policy-authored condition: which evaluator to build and what it expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Evaluator kind (e.g., "tags-none-present")
    #[serde(rename = "type")]
    pub kind: String,

    /// Expected values as authored; may repeat or carry whitespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    /// Evaluator options (e.g., "attributeName")
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, String>,
}

impl Condition {
    /// Create a condition with the given values
    pub fn new<I, S>(kind: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            values: Some(values.into_iter().map(Into::into).collect()),
            options: HashMap::new(),
        }
    }

    /// Create a condition with no values at all
    pub fn without_values(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            values: None,
            options: HashMap::new(),
        }
    }

    /// Add an evaluator option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Authored values, if any were configured
    pub fn values(&self) -> Option<&[String]> {
        self.values.as_deref()
    }

    /// Look up an evaluator option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// How a tagged resource relates to the resource being accessed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagMatchType {
    /// Tag is attached to the accessed resource itself
    #[default]
    #[serde(rename = "SELF")]
    SelfOnly,
    /// Tag is attached to a descendant of the accessed resource
    Descendant,
    /// Tag is attached to an ancestor of the accessed resource
    Ancestor,
    /// Tag is attached to the resource and applies to all its descendants
    SelfAndAllDescendants,
}

/// Tag attached to the resource being accessed
///
/// Identity for hashing is the tag type plus match type; attributes take part
/// in equality but not in the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTag {
    /// Tag type/name (e.g., "PII")
    #[serde(rename = "type")]
    pub tag_type: String,

    /// Tag attributes (e.g., expiry dates, classification level)
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,

    /// Relationship between the tagged and the accessed resource
    #[serde(default)]
    pub match_type: TagMatchType,
}

// JSON documents never contain NaN, so attribute equality is reflexive
impl Eq for ResourceTag {}

impl Hash for ResourceTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag_type.hash(state);
        self.match_type.hash(state);
    }
}

impl ResourceTag {
    /// Create a tag of the given type attached to the resource itself
    pub fn new(tag_type: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            attributes: BTreeMap::new(),
            match_type: TagMatchType::SelfOnly,
        }
    }

    /// Add an attribute to the tag
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the match type
    pub fn with_match_type(mut self, match_type: TagMatchType) -> Self {
        self.match_type = match_type;
        self
    }
}

/// Principal (user, service account, agent)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier (e.g., "user:alice@example.com")
    pub id: String,

    /// Principal type (user, service, agent, etc.)
    #[serde(rename = "type")]
    pub principal_type: String,

    /// Additional attributes (e.g., department, groups)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Principal {
    /// Create a new principal from an ID string
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let principal_type = id.split(':').next().unwrap_or("user").to_string();

        Self {
            id,
            principal_type,
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute to the principal
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Resource being accessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier (e.g., "table:sales.customers")
    pub id: String,

    /// Resource type (table, column, path, etc.)
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl Resource {
    /// Create a new resource from an ID string
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let resource_type = id.split(':').next().unwrap_or("resource").to_string();

        Self { id, resource_type }
    }
}

/// Action being performed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Action name (select, update, read, etc.)
    pub name: String,
}

impl Action {
    /// Create a new action
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Access request as seen by condition evaluators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Who is making the request
    pub principal: Principal,

    /// What resource is being accessed
    pub resource: Resource,

    /// What action is being performed
    pub action: Action,

    /// Values computed earlier in the pipeline (resolved tags, client IP, ...)
    #[serde(default)]
    pub context: RequestContext,
}

impl AccessRequest {
    /// Create a request with an empty context
    pub fn new(principal: Principal, resource: Resource, action: Action) -> Self {
        Self {
            principal,
            resource,
            action,
            context: RequestContext::new(),
        }
    }

    /// Replace the request context
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Authorization decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Unique decision identifier
    pub id: String,

    /// Whether the request is allowed
    pub allowed: bool,

    /// Policy that made the decision ("default" when none matched)
    pub policy_id: PolicyId,

    /// Reason for the decision
    pub reason: String,

    /// Decision timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl Decision {
    /// Create a new decision
    pub fn new(allowed: bool, policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4().to_string(),
            allowed,
            policy_id: policy_id.into(),
            reason: reason.into(),
            timestamp,
        }
    }

    /// Allow decision
    pub fn allow(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(true, policy_id, reason)
    }

    /// Deny decision
    pub fn deny(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(false, policy_id, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_deserialization() {
        let condition: Condition = serde_json::from_str(
            r#"{"type": "tags-none-present", "values": ["PII", " SENSITIVE "]}"#,
        )
        .unwrap();

        assert_eq!(condition.kind, "tags-none-present");
        assert_eq!(condition.values().map(<[String]>::len), Some(2));
        assert!(condition.options.is_empty());

        let bare: Condition = serde_json::from_str(r#"{"type": "tags-any-present"}"#).unwrap();
        assert!(bare.values().is_none());
    }

    #[test]
    fn test_resource_tag_defaults() {
        let tag: ResourceTag = serde_json::from_str(r#"{"type": "PII"}"#).unwrap();
        assert_eq!(tag.tag_type, "PII");
        assert_eq!(tag.match_type, TagMatchType::SelfOnly);
        assert!(tag.attributes.is_empty());

        let tag: ResourceTag = serde_json::from_str(
            r#"{"type": "EXPIRES_ON", "attributes": {"expiry_date": "2026-01-01"}, "match_type": "ANCESTOR"}"#,
        )
        .unwrap();
        assert_eq!(tag.match_type, TagMatchType::Ancestor);
        assert_eq!(tag.attributes.get("expiry_date").and_then(Value::as_str), Some("2026-01-01"));
    }

    #[test]
    fn test_resource_tag_attributes_accept_any_json() {
        let tag: ResourceTag = serde_json::from_str(
            r#"{"type": "PUBLIC", "attributes": {"level": 3, "owners": ["ops"], "reviewed": true}}"#,
        )
        .unwrap();

        assert_eq!(tag.attributes.get("level").and_then(Value::as_u64), Some(3));
        assert_eq!(tag.attributes.len(), 3);
    }

    #[test]
    fn test_resource_tag_hash_ignores_attributes() {
        use std::collections::HashSet;

        let plain = ResourceTag::new("PII");
        let annotated = ResourceTag::new("PII").with_attribute("level", 3);

        let tags: HashSet<ResourceTag> = [plain.clone(), annotated.clone(), plain].into_iter().collect();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&annotated));
    }

    #[test]
    fn test_unknown_match_type_rejected() {
        let result = serde_json::from_str::<ResourceTag>(r#"{"type": "PII", "match_type": "self"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_principal_and_resource_types() {
        let principal = Principal::new("user:alice@example.com").with_attribute("dept", "finance");
        assert_eq!(principal.principal_type, "user");
        assert_eq!(principal.attributes.get("dept"), Some(&"finance".to_string()));

        let resource = Resource::new("table:sales.customers");
        assert_eq!(resource.resource_type, "table");
    }

    #[test]
    fn test_decision_creation() {
        let decision = Decision::allow("policy-1", "Policy 'policy-1' allows this action");
        assert!(decision.allowed);
        assert_eq!(decision.policy_id, "policy-1");
        assert!(!decision.id.is_empty());

        let deny = Decision::deny("default", "No policies match, default deny");
        assert!(!deny.allowed);
    }
}
