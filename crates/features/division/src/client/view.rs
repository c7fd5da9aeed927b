//! Derived presentation data for a preview. Pure; reads `fulfilled` from the engine.

use cohort_domain::division::{CompatibilityTier, DivisionJob, ProposedGroup, RuleStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBadge {
    pub rule: usize,
    /// `Rule 2: 1/2-3` or `Rule 2: 1/2+` when unbounded.
    pub label: String,
    pub fulfilled: bool,
}

impl RuleBadge {
    #[must_use]
    pub fn from_status(status: &RuleStatus) -> Self {
        let range = status
            .max
            .map_or_else(|| format!("{}+", status.min), |max| format!("{}-{max}", status.min));
        Self {
            rule: status.rule,
            label: format!("Rule {}: {}/{range}", status.rule, status.count),
            fulfilled: status.fulfilled,
        }
    }

    #[must_use]
    pub const fn mark(&self) -> char {
        if self.fulfilled { '✓' } else { '✗' }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub member_count: usize,
    pub member_names: Vec<String>,
    pub compatibility_percent: u8,
    pub tier: CompatibilityTier,
    pub badges: Vec<RuleBadge>,
}

impl GroupView {
    #[must_use]
    pub fn from_group(group: &ProposedGroup) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            member_count: group.members.len(),
            member_names: group.members.iter().map(|m| m.name.clone()).collect(),
            compatibility_percent: percent(group.compatibility_avg),
            tier: CompatibilityTier::from_score(group.compatibility_avg),
            badges: group.rules_status.iter().map(RuleBadge::from_status).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub job_id: String,
    pub assigned: usize,
    pub available: usize,
    pub unfulfilled_rules: Vec<usize>,
    pub groups: Vec<GroupView>,
}

impl PreviewView {
    #[must_use]
    pub fn from_job(job: &DivisionJob) -> Self {
        Self {
            job_id: job.job_id.clone(),
            assigned: job.total_members_assigned,
            available: job.total_members_available,
            unfulfilled_rules: job.unfulfilled_rules.clone(),
            groups: job.groups.iter().map(GroupView::from_group).collect(),
        }
    }

    #[must_use]
    pub fn all_rules_fulfilled(&self) -> bool {
        self.unfulfilled_rules.is_empty()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(score: f64) -> u8 {
    if score.is_finite() { (score.clamp(0.0, 1.0) * 100.0).round() as u8 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_domain::division::Operator;

    fn status(rule: usize, count: usize, min: usize, max: Option<usize>, fulfilled: bool) -> RuleStatus {
        RuleStatus {
            rule,
            count,
            min,
            max,
            fulfilled,
            categories: vec!["leader".into()],
            operator: Operator::All,
        }
    }

    #[test]
    fn badges_show_bounded_and_open_ranges() {
        let bounded = RuleBadge::from_status(&status(1, 2, 1, Some(3), true));
        assert_eq!(bounded.label, "Rule 1: 2/1-3");
        assert_eq!(bounded.mark(), '✓');

        let open = RuleBadge::from_status(&status(2, 1, 2, None, false));
        assert_eq!(open.label, "Rule 2: 1/2+");
        assert!(!open.fulfilled);
    }

    #[test]
    fn fulfilled_flag_is_taken_from_the_engine() {
        // count within range but the engine said otherwise: the view does not second-guess it
        let badge = RuleBadge::from_status(&status(1, 2, 1, Some(3), false));
        assert!(!badge.fulfilled);
    }

    #[test]
    fn percentages_are_rounded_and_clamped() {
        assert_eq!(percent(0.826), 83);
        assert_eq!(percent(0.1), 10);
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(f64::NAN), 0);
    }
}
