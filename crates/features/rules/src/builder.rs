//! Editable rule tree.
//!
//! Identifiers come from one counter per builder, so an id is never handed out twice even
//! after the rule or condition it named was removed.

use crate::error::BuilderError;
use cohort_domain::division::Operator;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionId(u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule-{}", self.0)
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition-{}", self.0)
    }
}

/// A condition as the user is editing it. `min`/`max` hold the raw text typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionDraft {
    id: ConditionId,
    categories: Vec<String>,
    operator: Operator,
    min: String,
    max: String,
}

impl ConditionDraft {
    const fn new(id: ConditionId) -> Self {
        Self {
            id,
            categories: Vec::new(),
            operator: Operator::All,
            min: String::new(),
            max: String::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ConditionId {
        self.id
    }

    /// Selected categories, in selection order, without duplicates.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn min_input(&self) -> &str {
        &self.min
    }

    #[must_use]
    pub fn max_input(&self) -> &str {
        &self.max
    }

    /// Replaces the selection. Duplicates and blank names are skipped.
    pub fn set_categories<I, S>(&mut self, categories: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.clear();
        for category in categories {
            let category = category.into();
            if !category.trim().is_empty() && !self.categories.contains(&category) {
                self.categories.push(category);
            }
        }
        self
    }

    /// Flips one category in or out of the selection. Returns whether it is now selected.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if let Some(pos) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(pos);
            false
        } else if category.trim().is_empty() {
            false
        } else {
            self.categories.push(category.to_owned());
            true
        }
    }

    pub const fn set_operator(&mut self, operator: Operator) -> &mut Self {
        self.operator = operator;
        self
    }

    pub fn set_min(&mut self, raw: impl Into<String>) -> &mut Self {
        self.min = raw.into();
        self
    }

    pub fn set_max(&mut self, raw: impl Into<String>) -> &mut Self {
        self.max = raw.into();
        self
    }
}

/// One rule: an ordered, never empty list of conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    id: RuleId,
    conditions: Vec<ConditionDraft>,
}

impl RuleDraft {
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    #[must_use]
    pub fn conditions(&self) -> &[ConditionDraft] {
        &self.conditions
    }

    #[must_use]
    pub fn condition(&self, id: ConditionId) -> Option<&ConditionDraft> {
        self.conditions.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    rules: Vec<RuleDraft>,
    next_id: u32,
}

impl RuleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rules(&self) -> &[RuleDraft] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&RuleDraft> {
        self.rules.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Appends a rule holding one default condition.
    pub fn add_rule(&mut self) -> RuleId {
        let id = RuleId(self.bump());
        let condition = ConditionDraft::new(ConditionId(self.bump()));
        self.rules.push(RuleDraft { id, conditions: vec![condition] });
        debug!(%id, "Rule added");
        id
    }

    /// Deletes a rule. Returns `false` if it did not exist.
    pub fn remove_rule(&mut self, id: RuleId) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        let removed = self.rules.len() != before;
        if removed {
            debug!(%id, "Rule removed");
        }
        removed
    }

    /// Appends a default condition to `rule_id`.
    ///
    /// # Errors
    /// [`BuilderError::UnknownRule`] if the rule does not exist.
    pub fn add_condition(&mut self, rule_id: RuleId) -> Result<ConditionId, BuilderError> {
        let Some(index) = self.rules.iter().position(|r| r.id == rule_id) else {
            return Err(unknown_rule(rule_id));
        };
        let id = ConditionId(self.bump());
        self.rules[index].conditions.push(ConditionDraft::new(id));
        debug!(rule = %rule_id, condition = %id, "Condition added");
        Ok(id)
    }

    /// Removes a condition unless it is the last one of its rule.
    ///
    /// # Errors
    /// * [`BuilderError::UnknownRule`] / [`BuilderError::UnknownCondition`] for unknown ids.
    /// * [`BuilderError::LastCondition`] if the rule would be left empty.
    pub fn remove_condition(
        &mut self,
        rule_id: RuleId,
        condition_id: ConditionId,
    ) -> Result<(), BuilderError> {
        let rule = self.rule_mut(rule_id)?;
        let Some(pos) = rule.conditions.iter().position(|c| c.id == condition_id) else {
            return Err(unknown_condition(rule_id, condition_id));
        };
        if rule.conditions.len() == 1 {
            return Err(BuilderError::LastCondition {
                message: rule_id.to_string().into(),
                context: None,
            });
        }
        rule.conditions.remove(pos);
        debug!(rule = %rule_id, condition = %condition_id, "Condition removed");
        Ok(())
    }

    /// Mutable access to one condition for editing.
    ///
    /// # Errors
    /// [`BuilderError::UnknownRule`] / [`BuilderError::UnknownCondition`] for unknown ids.
    pub fn condition_mut(
        &mut self,
        rule_id: RuleId,
        condition_id: ConditionId,
    ) -> Result<&mut ConditionDraft, BuilderError> {
        self.rule_mut(rule_id)?
            .conditions
            .iter_mut()
            .find(|c| c.id == condition_id)
            .ok_or_else(|| unknown_condition(rule_id, condition_id))
    }

    fn rule_mut(&mut self, rule_id: RuleId) -> Result<&mut RuleDraft, BuilderError> {
        self.rules.iter_mut().find(|r| r.id == rule_id).ok_or_else(|| unknown_rule(rule_id))
    }

    const fn bump(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn unknown_rule(id: RuleId) -> BuilderError {
    BuilderError::UnknownRule { message: id.to_string().into(), context: None }
}

fn unknown_condition(rule: RuleId, condition: ConditionId) -> BuilderError {
    BuilderError::UnknownCondition {
        message: format!("{condition} in {rule}").into(),
        context: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rule_starts_with_one_default_condition() {
        let mut builder = RuleBuilder::new();
        let id = builder.add_rule();

        let rule = builder.rule(id).unwrap();
        assert_eq!(rule.conditions().len(), 1);
        let condition = &rule.conditions()[0];
        assert!(condition.categories().is_empty());
        assert_eq!(condition.operator(), Operator::All);
        assert_eq!(condition.min_input(), "");
        assert_eq!(condition.max_input(), "");
    }

    #[test]
    fn last_condition_cannot_be_removed() {
        let mut builder = RuleBuilder::new();
        let rule = builder.add_rule();
        let only = builder.rule(rule).unwrap().conditions()[0].id();

        let err = builder.remove_condition(rule, only).unwrap_err();
        assert!(matches!(err, BuilderError::LastCondition { .. }));
        assert_eq!(builder.rule(rule).unwrap().conditions().len(), 1);

        let second = builder.add_condition(rule).unwrap();
        builder.remove_condition(rule, only).unwrap();
        assert_eq!(builder.rule(rule).unwrap().conditions()[0].id(), second);
    }

    #[test]
    fn unknown_ids_are_rejected_without_changes() {
        let mut builder = RuleBuilder::new();
        let rule = builder.add_rule();
        let other = builder.add_rule();
        assert!(builder.remove_rule(other));
        assert!(!builder.remove_rule(other));

        assert!(matches!(builder.add_condition(other), Err(BuilderError::UnknownRule { .. })));

        let foreign = ConditionId(999);
        assert!(matches!(
            builder.remove_condition(rule, foreign),
            Err(BuilderError::UnknownCondition { .. })
        ));
        assert!(builder.condition_mut(rule, foreign).is_err());
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.rule(rule).unwrap().conditions().len(), 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut builder = RuleBuilder::new();
        let first = builder.add_rule();
        builder.remove_rule(first);
        let second = builder.add_rule();
        assert_ne!(first, second);
    }

    #[test]
    fn editing_categories_deduplicates_and_toggles() {
        let mut builder = RuleBuilder::new();
        let rule = builder.add_rule();
        let cond = builder.rule(rule).unwrap().conditions()[0].id();

        let draft = builder.condition_mut(rule, cond).unwrap();
        draft.set_categories(["leader", "leader", " ", "senior"]).set_operator(Operator::Any);
        assert_eq!(draft.categories(), ["leader", "senior"]);

        assert!(!draft.toggle_category("leader"));
        assert!(draft.toggle_category("junior"));
        assert_eq!(draft.categories(), ["senior", "junior"]);
        assert_eq!(draft.operator(), Operator::Any);
    }
}
