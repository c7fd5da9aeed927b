//! # Division Plans
//!
//! A plan file mirrors the rule builder's inputs:
//!
//! ```toml
//! num_groups = 3
//! max_group_size = 4
//! require_all_members = true
//! threshold_percent = 40
//!
//! [[rules]]
//! [[rules.conditions]]
//! categories = ["leader"]
//! min = 1
//! ```
//!
//! Counts may be written as numbers or as text; text goes through the same lenient parsing
//! as a form field would.

use anyhow::{Context, Result};
use cohort::domain::division::{DivisionConfig, Operator};
use cohort::features::rules::{ConditionDraft, RuleBuilder, TopLevelParams, serialize};
use serde::Deserialize;
use std::path::Path;

/// A count as typed in the plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Int(i64),
    Text(String),
}

impl Count {
    fn into_input(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

fn input(count: Option<Count>) -> String {
    count.map(Count::into_input).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub num_groups: Option<Count>,
    pub max_group_size: Option<Count>,
    pub allow_multiple_membership: bool,
    pub require_all_members: bool,
    pub threshold_percent: f64,
    pub rules: Vec<PlanRule>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            num_groups: None,
            max_group_size: None,
            allow_multiple_membership: false,
            require_all_members: true,
            threshold_percent: 0.0,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanRule {
    pub conditions: Vec<PlanCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanCondition {
    pub categories: Vec<String>,
    pub operator: Operator,
    pub min: Option<Count>,
    pub max: Option<Count>,
}

impl Plan {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Malformed plan {}", path.display()))
    }

    /// Replays the plan into a rule builder, one edit at a time.
    pub fn builder(&self) -> Result<RuleBuilder> {
        let mut builder = RuleBuilder::new();
        for rule in &self.rules {
            let rule_id = builder.add_rule();
            for (index, condition) in rule.conditions.iter().enumerate() {
                // a new rule already holds one empty condition
                let existing = (index == 0)
                    .then(|| builder.rule(rule_id).and_then(|r| r.conditions().first()))
                    .flatten()
                    .map(ConditionDraft::id);
                let condition_id = match existing {
                    Some(id) => id,
                    None => builder.add_condition(rule_id)?,
                };
                builder
                    .condition_mut(rule_id, condition_id)?
                    .set_categories(condition.categories.iter().map(String::as_str))
                    .set_operator(condition.operator)
                    .set_min(input(condition.min.clone()))
                    .set_max(input(condition.max.clone()));
            }
        }
        Ok(builder)
    }

    pub fn params(&self) -> TopLevelParams {
        TopLevelParams {
            num_groups: self.num_groups.clone().map_or_else(|| "2".to_owned(), Count::into_input),
            max_group_size: input(self.max_group_size.clone()),
            allow_multiple_membership: self.allow_multiple_membership,
            require_all_members: self.require_all_members,
            threshold_percent: self.threshold_percent,
        }
    }

    pub fn to_config(&self) -> Result<DivisionConfig> {
        Ok(serialize(&self.builder()?, &self.params()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_text_are_both_accepted() {
        let plan: Plan = toml::from_str(
            r#"
            num_groups = "3"
            max_group_size = 4
            threshold_percent = 55

            [[rules]]
            [[rules.conditions]]
            categories = ["leader", "mentor"]
            operator = "any"
            min = 1
            max = "2"

            [[rules.conditions]]
            categories = []
            "#,
        )
        .unwrap();

        let config = plan.to_config().unwrap();
        assert_eq!(config.num_groups, 3);
        assert_eq!(config.max_group_size, Some(4));
        assert!((config.compatibility_threshold - 0.55).abs() < 1e-9);
        assert!(config.require_all_members);

        assert_eq!(config.category_rules.len(), 1);
        let conditions = &config.category_rules[0].conditions;
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].operator, Operator::Any);
        assert_eq!((conditions[0].min, conditions[0].max), (1, Some(2)));
    }

    #[test]
    fn empty_plan_uses_builder_defaults() {
        let config = Plan::default().to_config().unwrap();
        assert_eq!(config.num_groups, 2);
        assert_eq!(config.max_group_size, None);
        assert!(config.category_rules.is_empty());
    }

    #[tokio::test]
    async fn plans_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        tokio::fs::write(&path, "num_groups = 5\n").await.unwrap();

        assert_eq!(Plan::load(&path).await.unwrap().num_groups, Some(Count::Int(5)));
        assert!(Plan::load(&dir.path().join("missing.toml")).await.is_err());
    }
}
