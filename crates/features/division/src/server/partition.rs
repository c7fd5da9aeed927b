//! Greedy-then-repair partition heuristic and preview assembly.
//!
//! Members are placed one at a time, most available first. A slot is a candidate when it
//! has room, no condition maximum would be exceeded, and the member's average
//! compatibility with its occupants reaches the threshold. Candidates that still help a
//! condition reach its minimum win, then the higher score, then the lower slot index.
//! A bounded repair phase afterwards moves (or, with multiple membership, copies) matching
//! members into slots that miss a minimum.

use crate::server::compat::CompatibilityMatrix;
use crate::server::error::EngineError;
use crate::server::roster::RosterMember;
use cohort_domain::division::{
    Condition, DivisionConfig, DivisionJob, Member, Operator, ProposedGroup, RuleStatus,
};
use fxhash::FxHashSet;
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;
use tracing::debug;

/// Upper bound on `num_groups` accepted by the engine.
pub const MAX_GROUPS: usize = 1_000;

/// Rejects configurations the heuristic cannot act on.
///
/// # Errors
/// * [`EngineError::InvalidConfig`] for out-of-range parameters or malformed conditions.
/// * [`EngineError::Infeasible`] when every member must be placed but the bounded group
///   size leaves too few seats.
pub fn validate(config: &DivisionConfig, population: usize) -> Result<(), EngineError> {
    let invalid = |message: String| EngineError::InvalidConfig { message: message.into(), context: None };

    if config.num_groups < 2 {
        return Err(invalid("num_groups must be at least 2".to_owned()));
    }
    if config.num_groups > MAX_GROUPS {
        return Err(invalid(format!("num_groups must not exceed {MAX_GROUPS}")));
    }
    if config.max_group_size == Some(0) {
        return Err(invalid("max_group_size must be at least 1".to_owned()));
    }
    let threshold = config.compatibility_threshold;
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(invalid("compatibility_threshold must be between 0 and 1".to_owned()));
    }

    for (index, condition) in config.conditions().enumerate() {
        let rule = index + 1;
        if condition.categories.is_empty() {
            return Err(invalid(format!("rule {rule} has no categories")));
        }
        if let Some(max) = condition.max
            && max < condition.min
        {
            return Err(invalid(format!("rule {rule}: max ({max}) is below min ({})", condition.min)));
        }
    }

    if config.require_all_members
        && let Some(size) = config.max_group_size
    {
        let seats = config.num_groups.saturating_mul(size);
        if seats < population {
            return Err(EngineError::Infeasible {
                message: format!(
                    "{population} members cannot fit in {} groups of at most {size}",
                    config.num_groups
                )
                .into(),
                context: None,
            });
        }
    }
    Ok(())
}

/// Runs the heuristic over one group's roster.
#[derive(Debug)]
pub struct Partitioner<'a> {
    members: &'a [RosterMember],
    categories: Vec<FxHashSet<&'a str>>,
    conditions: Vec<&'a Condition>,
    config: &'a DivisionConfig,
    matrix: CompatibilityMatrix,
    repair_iterations: usize,
}

impl<'a> Partitioner<'a> {
    #[must_use]
    pub fn new(members: &'a [RosterMember], config: &'a DivisionConfig, repair_iterations: usize) -> Self {
        Self {
            members,
            categories: members
                .iter()
                .map(|m| m.categories.iter().map(String::as_str).collect())
                .collect(),
            conditions: config.conditions().collect(),
            config,
            matrix: CompatibilityMatrix::new(members),
            repair_iterations,
        }
    }

    /// Slots of roster positions, `num_groups` long; some may be empty.
    #[must_use]
    pub fn assign(&self) -> Vec<Vec<usize>> {
        let mut slots = self.greedy();
        self.repair(&mut slots);
        slots
    }

    /// Assembles the preview for `slots`, skipping empty ones.
    #[must_use]
    pub fn preview(&self, job_id: String, slots: &[Vec<usize>]) -> DivisionJob {
        let mut unfulfilled = BTreeSet::new();
        let groups: Vec<ProposedGroup> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
            .map(|(index, slot)| {
                let rules_status = self.statuses(slot);
                unfulfilled.extend(rules_status.iter().filter(|s| !s.fulfilled).map(|s| s.rule));
                ProposedGroup {
                    id: format!("preview-{}", index + 1),
                    name: format!("Subgroup {}", index + 1),
                    members: slot.iter().map(|&m| self.member(m)).collect(),
                    compatibility_avg: round3(self.matrix.group_average(slot)),
                    rules_status,
                }
            })
            .collect();

        DivisionJob {
            job_id,
            total_members_assigned: groups.iter().map(|g| g.members.len()).sum(),
            total_members_available: self.members.len(),
            unfulfilled_rules: unfulfilled.into_iter().collect(),
            groups,
        }
    }

    fn greedy(&self) -> Vec<Vec<usize>> {
        let mut slots = vec![Vec::new(); self.config.num_groups];
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by_key(|&m| Reverse(self.members[m].slots().len()));

        for member in order {
            if let Some(index) = self.best_slot(member, &slots) {
                slots[index].push(member);
            } else if self.config.require_all_members {
                if let Some(index) = self.smallest_open_slot(&slots) {
                    debug!(member = self.members[member].id, slot = index, "Forced placement");
                    slots[index].push(member);
                }
            } else {
                debug!(member = self.members[member].id, "Left unassigned");
            }
        }
        slots
    }

    fn best_slot(&self, member: usize, slots: &[Vec<usize>]) -> Option<usize> {
        let mut best: Option<(bool, f64, usize)> = None;
        let joins = self.matches_per_condition(member);

        for (index, slot) in slots.iter().enumerate() {
            if self.is_full(slot) {
                continue;
            }
            let tentative: Vec<usize> =
                self.conditions.iter().zip(&joins).map(|(c, &j)| self.count(slot, c) + usize::from(j)).collect();

            let exceeds_max =
                self.conditions.iter().zip(&tentative).any(|(c, &n)| c.max.is_some_and(|max| n > max));
            if exceeds_max {
                continue;
            }
            let helps_min =
                self.conditions.iter().zip(&tentative).any(|(c, &n)| c.min > 0 && n <= c.min);

            let score = self.matrix.affinity(member, slot);
            if score < self.config.compatibility_threshold {
                continue;
            }

            let better = best.is_none_or(|(best_helps, best_score, _)| {
                match helps_min.cmp(&best_helps) {
                    Ordering::Equal => score.total_cmp(&best_score) == Ordering::Greater,
                    ordering => ordering == Ordering::Greater,
                }
            });
            if better {
                best = Some((helps_min, score, index));
            }
        }
        best.map(|(_, _, index)| index)
    }

    fn smallest_open_slot(&self, slots: &[Vec<usize>]) -> Option<usize> {
        slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !self.is_full(slot))
            .min_by_key(|(index, slot)| (slot.len(), *index))
            .map(|(index, _)| index)
    }

    fn repair(&self, slots: &mut [Vec<usize>]) {
        for iteration in 0..self.repair_iterations {
            if !self.repair_step(slots) {
                debug!(iteration, "Repair converged");
                return;
            }
        }
    }

    /// Performs at most one move or copy. Returns whether anything changed.
    fn repair_step(&self, slots: &mut [Vec<usize>]) -> bool {
        for condition in self.conditions.iter().copied().filter(|c| c.min > 0) {
            for target in 0..slots.len() {
                if self.count(&slots[target], condition) >= condition.min || self.is_full(&slots[target]) {
                    continue;
                }
                for donor in (0..slots.len()).filter(|&d| d != target) {
                    if let Some(pos) = self.transferable(condition, &slots[donor], &slots[target]) {
                        let member = slots[donor][pos];
                        if !self.config.allow_multiple_membership {
                            slots[donor].remove(pos);
                        }
                        slots[target].push(member);
                        debug!(
                            member = self.members[member].id,
                            from = donor,
                            to = target,
                            copied = self.config.allow_multiple_membership,
                            "Repair transfer"
                        );
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Position in `donor` of a member matching `condition` that may join `target`.
    ///
    /// The member must not already sit in `target` and must not push any of its conditions
    /// over a maximum. When moving, the donor has to keep every minimum it currently meets.
    fn transferable(&self, condition: &Condition, donor: &[usize], target: &[usize]) -> Option<usize> {
        let copying = self.config.allow_multiple_membership;
        donor.iter().position(|&member| {
            if !self.matches(member, condition) || target.contains(&member) {
                return false;
            }
            let joins = self.matches_per_condition(member);
            let fits = self
                .conditions
                .iter()
                .zip(&joins)
                .all(|(c, &j)| !j || c.max.is_none_or(|max| self.count(target, c) < max));
            if !fits {
                return false;
            }
            copying
                || self.conditions.iter().zip(&joins).all(|(c, &j)| {
                    let before = self.count(donor, c);
                    !j || before < c.min || before > c.min
                })
        })
    }

    fn statuses(&self, slot: &[usize]) -> Vec<RuleStatus> {
        self.conditions
            .iter()
            .enumerate()
            .map(|(index, condition)| {
                let count = self.count(slot, condition);
                RuleStatus {
                    rule: index + 1,
                    count,
                    min: condition.min,
                    max: condition.max,
                    fulfilled: condition.min <= count && condition.max.is_none_or(|max| count <= max),
                    categories: condition.categories.clone(),
                    operator: condition.operator,
                }
            })
            .collect()
    }

    fn member(&self, index: usize) -> Member {
        let m = &self.members[index];
        Member {
            id: m.id,
            name: m.name.clone(),
            email: m.email.clone(),
            categories: m.categories.clone(),
            availability_count: m.slots().len(),
        }
    }

    fn matches_per_condition(&self, member: usize) -> Vec<bool> {
        self.conditions.iter().map(|c| self.matches(member, c)).collect()
    }

    fn matches(&self, member: usize, condition: &Condition) -> bool {
        let categories = &self.categories[member];
        match condition.operator {
            Operator::All => condition.categories.iter().all(|c| categories.contains(c.as_str())),
            Operator::Any => condition.categories.iter().any(|c| categories.contains(c.as_str())),
        }
    }

    fn count(&self, slot: &[usize], condition: &Condition) -> usize {
        slot.iter().filter(|&&m| self.matches(m, condition)).count()
    }

    fn is_full(&self, slot: &[usize]) -> bool {
        self.config.max_group_size.is_some_and(|max| slot.len() >= max)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Validates, partitions and assembles the preview in one go.
///
/// # Errors
/// See [`validate`].
pub fn generate(
    members: &[RosterMember],
    config: &DivisionConfig,
    repair_iterations: usize,
    job_id: String,
) -> Result<DivisionJob, EngineError> {
    validate(config, members.len())?;
    let partitioner = Partitioner::new(members, config, repair_iterations);
    let slots = partitioner.assign();
    Ok(partitioner.preview(job_id, &slots))
}
