//! Wire model of the subgroup division workflow.
//!
//! Every type here crosses the HTTP boundary between the division controller and the
//! division engine. Field names are the JSON names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a condition's categories combine when matching a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Member belongs to at least one listed category.
    #[serde(alias = "OR", alias = "or")]
    Any,
    /// Member belongs to every listed category.
    #[default]
    #[serde(alias = "AND", alias = "and")]
    All,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category-count constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Condition {
    pub categories: Vec<String>,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub min: usize,
    /// Absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Rule {
    pub conditions: Vec<Condition>,
}

/// Immutable request payload of a generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct DivisionConfig {
    pub num_groups: usize,
    /// `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group_size: Option<usize>,
    #[serde(default)]
    pub allow_multiple_membership: bool,
    #[serde(default = "default_require_all")]
    pub require_all_members: bool,
    /// Fraction in `[0, 1]`.
    #[serde(default)]
    pub compatibility_threshold: f64,
    #[serde(default)]
    pub category_rules: Vec<Rule>,
}

const fn default_require_all() -> bool {
    true
}

impl DivisionConfig {
    /// All conditions of all rules, in submission order.
    ///
    /// The 1-based position in this sequence is the `rule` identifier reported back in
    /// [`RuleStatus`] and [`DivisionJob::unfulfilled_rules`].
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.category_rules.iter().flat_map(|rule| rule.conditions.iter())
    }
}

/// A member as rendered inside a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub categories: Vec<String>,
    pub availability_count: usize,
}

/// Observed state of one condition inside one group. `fulfilled` is computed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct RuleStatus {
    pub rule: usize,
    pub count: usize,
    pub min: usize,
    #[serde(default)]
    pub max: Option<usize>,
    pub fulfilled: bool,
    pub categories: Vec<String>,
    pub operator: Operator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ProposedGroup {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    /// Average pairwise compatibility in `[0, 1]`, three decimals.
    pub compatibility_avg: f64,
    pub rules_status: Vec<RuleStatus>,
}

/// Response of a generate call: a computed, not yet persisted partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct DivisionJob {
    pub job_id: String,
    pub total_members_assigned: usize,
    pub total_members_available: usize,
    pub unfulfilled_rules: Vec<usize>,
    pub groups: Vec<ProposedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ConfirmRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ConfirmResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub subgroups: Vec<Subgroup>,
}

/// A persisted subgroup, owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Subgroup {
    pub id: u64,
    pub name: String,
    /// Job id of the division that created this subgroup.
    pub division: String,
    pub compatibility_avg: f64,
    pub rules_status: Vec<RuleStatus>,
    pub members: Vec<SubgroupMember>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct SubgroupMember {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct UndoResponse {
    pub message: String,
    /// Confirmed divisions still on the group's undo stack.
    #[serde(default)]
    pub remaining_divisions: usize,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

/// Presentation tier of a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatibilityTier {
    Good,
    Fair,
    Poor,
}

impl CompatibilityTier {
    pub const GOOD_FROM: f64 = 0.70;
    pub const FAIR_FROM: f64 = 0.40;

    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= Self::GOOD_FROM {
            Self::Good
        } else if score >= Self::FAIR_FROM {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for CompatibilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
