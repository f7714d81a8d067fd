//! # CretoAI Condition Evaluation
//!
//! Tag-based policy conditions for the authorization hot path.
//!
//! ## Features
//!
//! - **Pluggable evaluators** sharing one `init` / `is_matched` lifecycle
//! - **Resource tags** read from the per-request context, never computed here
//! - **Lock-free evaluation**: evaluators are immutable once initialized
//! - **Atomic reload**: policy sets are compiled then swapped in whole
//!
//! ## Example
//!
//! ```rust
//! use cretoai_conditions::{
//!     context::set_resource_tags, AccessRequest, Action, Condition, EngineConfig,
//!     Policy, PolicyEffect, PolicyEngine, Principal, Resource, ResourceTag,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = PolicyEngine::new(&EngineConfig::default())?;
//!
//! engine.load_policies(vec![Policy {
//!     id: "analysts-no-pii".to_string(),
//!     name: "Analysts may read tables without PII".to_string(),
//!     effect: PolicyEffect::Allow,
//!     principal: "user:*".to_string(),
//!     resource: "table:*".to_string(),
//!     action: "select".to_string(),
//!     conditions: vec![Condition::new("tags-none-present", ["PII", "SENSITIVE"])],
//!     priority: 10,
//! }])?;
//!
//! let mut request = AccessRequest::new(
//!     Principal::new("user:alice@example.com"),
//!     Resource::new("table:sales.orders"),
//!     Action::new("select"),
//! );
//! set_resource_tags(&mut request.context, [ResourceTag::new("PUBLIC")]);
//!
//! let decision = engine.evaluate(&request);
//! assert!(decision.allowed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use context::{RequestContext, ContextValue};
pub use engine::{PolicyEngine, PolicySet};
pub use error::{ConditionError, Result};
pub use evaluator::{ConditionEvaluator, EvaluatorRegistry, ExpectedValues};
pub use policy::{CompiledPolicy, Policy, PolicyEffect};
pub use types::{
    AccessRequest, Action, Condition, Decision, PolicyId, Principal, Resource,
    ResourceTag, TagMatchType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
