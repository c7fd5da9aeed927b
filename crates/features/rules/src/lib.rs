//! # Division Rules
//!
//! The editable side of a division request.
//!
//! 1.  **Builder ([`builder`]):** an in-memory tree of rules and conditions with stable
//!     identifiers. Every rule keeps at least one condition while being edited.
//! 2.  **Serializer ([`serializer`]):** turns the tree plus the top-level parameters into
//!     one immutable [`DivisionConfig`](cohort_domain::division::DivisionConfig).
//!     Transient invalid edits (conditions without categories, rules left empty) are
//!     dropped silently rather than rejected.

pub mod builder;
mod error;
pub mod serializer;

pub use crate::builder::{ConditionDraft, ConditionId, RuleBuilder, RuleDraft, RuleId};
pub use crate::error::{BuilderError, BuilderErrorExt};
pub use crate::serializer::{TopLevelParams, serialize};
