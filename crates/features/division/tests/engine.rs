use cohort_division::server::partition::{self, Partitioner};
use cohort_division::server::{AvailabilitySlot, DivisionStore, EngineError, RosterMember};
use cohort_domain::division::{Condition, DivisionConfig, Operator, Rule};
use std::collections::HashSet;
use std::time::Duration;

fn member(id: u64, categories: &[&str], slots: &[(u8, u8)]) -> RosterMember {
    RosterMember {
        id,
        name: format!("Member {id}"),
        email: format!("m{id}@example.com"),
        categories: categories.iter().map(|&c| c.to_owned()).collect(),
        availability: slots.iter().map(|&(weekday, hour)| AvailabilitySlot { weekday, hour }).collect(),
    }
}

fn config(num_groups: usize, max_group_size: Option<usize>) -> DivisionConfig {
    DivisionConfig {
        num_groups,
        max_group_size,
        allow_multiple_membership: false,
        require_all_members: true,
        compatibility_threshold: 0.0,
        category_rules: Vec::new(),
    }
}

fn min_rule(category: &str, min: usize) -> Rule {
    Rule {
        conditions: vec![Condition {
            categories: vec![category.to_owned()],
            operator: Operator::All,
            min,
            max: None,
        }],
    }
}

/// Four leaders followed by five other members, all free on Monday morning.
fn leader_roster() -> Vec<RosterMember> {
    (1..=9)
        .map(|id| {
            let categories: &[&str] = if id <= 4 { &["leader"] } else { &["member"] };
            member(id, categories, &[(0, 9), (0, 10)])
        })
        .collect()
}

#[test]
fn too_few_leaders_for_every_group_is_reported_as_unfulfilled() {
    let roster = leader_roster();
    let mut cfg = config(3, Some(3));
    cfg.category_rules = vec![min_rule("leader", 2)];

    let job = partition::generate(&roster, &cfg, 50, "job".into()).unwrap();

    assert_eq!(job.groups.len(), 3);
    assert_eq!(job.unfulfilled_rules, vec![1]);
    assert_eq!(job.total_members_assigned, 9);
    assert_eq!(job.total_members_available, 9);
    let (fulfilled, unfulfilled): (Vec<_>, Vec<_>) =
        job.groups.iter().map(|g| &g.rules_status[0]).partition(|status| status.fulfilled);
    assert_eq!(fulfilled.len(), 2);
    assert!(fulfilled.iter().all(|status| status.count == 2));
    assert_eq!(unfulfilled.len(), 1);
    assert_eq!(unfulfilled[0].count, 0);
    assert!(job.groups.iter().all(|g| g.members.len() == 3));
    assert!(job.groups.iter().all(|g| g.rules_status[0].rule == 1 && g.rules_status[0].min == 2));
}

#[test]
fn group_size_bound_holds_and_everyone_is_placed() {
    let roster: Vec<_> = (1..=10).map(|id| member(id, &[], &[(id as u8 % 3, 9)])).collect();
    let job = partition::generate(&roster, &config(3, Some(4)), 50, "job".into()).unwrap();

    assert!(job.groups.iter().all(|g| g.members.len() <= 4));
    assert_eq!(job.total_members_assigned, 10);
    let ids: HashSet<u64> = job.groups.iter().flat_map(|g| g.members.iter().map(|m| m.id)).collect();
    assert_eq!(ids.len(), 10);
}

#[test]
fn seat_shortage_is_infeasible() {
    let roster = leader_roster();
    let err = partition::generate(&roster, &config(2, Some(4)), 50, "job".into()).unwrap_err();
    assert!(matches!(err, EngineError::Infeasible { .. }));
}

#[test]
fn strict_threshold_leaves_incompatible_members_out() {
    let roster = vec![member(1, &[], &[(0, 9)]), member(2, &[], &[(1, 9)]), member(3, &[], &[(2, 9)])];
    let mut cfg = config(2, None);
    cfg.require_all_members = false;
    cfg.compatibility_threshold = 1.0;

    let job = partition::generate(&roster, &cfg, 50, "job".into()).unwrap();
    assert_eq!(job.total_members_assigned, 2);
    assert_eq!(job.total_members_available, 3);
    assert!(job.groups.iter().all(|g| g.members.len() == 1));
}

#[test]
fn multiple_membership_copies_a_member_into_a_deficient_group() {
    let roster = vec![
        member(1, &["leader"], &[(0, 9)]),
        member(2, &[], &[(0, 9)]),
        member(3, &[], &[(0, 9)]),
        member(4, &[], &[(0, 9)]),
    ];
    let mut cfg = config(2, None);
    cfg.allow_multiple_membership = true;
    cfg.category_rules = vec![min_rule("leader", 1)];

    let job = partition::generate(&roster, &cfg, 50, "job".into()).unwrap();
    let leader_groups = job.groups.iter().filter(|g| g.members.iter().any(|m| m.id == 1)).count();

    assert_eq!(job.groups.len(), 2);
    assert_eq!(leader_groups, 2);
    assert_eq!(job.total_members_assigned, 5);
    assert!(job.unfulfilled_rules.is_empty());
}

#[test]
fn repair_never_breaks_a_met_minimum_when_moving() {
    let roster = leader_roster();
    let mut cfg = config(3, None);
    cfg.category_rules = vec![min_rule("leader", 2)];

    let partitioner = Partitioner::new(&roster, &cfg, 50);
    let slots = partitioner.assign();
    let job = partitioner.preview("job".into(), &slots);

    // with unbounded groups the third slot cannot be fed without starving a donor
    for group in &job.groups {
        assert!(group.rules_status[0].count >= 2 || group.rules_status[0].count == 0);
    }
    assert!((0.0..=1.0).contains(&job.groups[0].compatibility_avg));
}

#[test]
fn confirm_is_idempotent_and_undo_removes_only_its_subgroups() {
    let roster = leader_roster();
    let store = DivisionStore::new(16, Duration::from_secs(60));

    let first = partition::generate(&roster, &config(3, Some(3)), 50, "first".into()).unwrap();
    store.save_pending(7, first);
    let created = store.confirm(7, "first").unwrap();
    let again = store.confirm(7, "first").unwrap();
    assert_eq!(created, again);
    assert_eq!(store.subgroups(7).len(), 3);

    let second = partition::generate(&roster, &config(2, None), 50, "second".into()).unwrap();
    let second_groups = second.groups.len();
    store.save_pending(7, second);
    store.confirm(7, "second").unwrap();
    assert_eq!(store.subgroups(7).len(), 3 + second_groups);

    let undone = store.undo(7).unwrap();
    assert_eq!(undone.message, format!("Removed {second_groups} subgroups."));
    assert_eq!(undone.remaining_divisions, 1);
    assert_eq!(store.subgroups(7), created);
}

#[test]
fn confirmed_subgroups_keep_preview_members() {
    let roster = leader_roster();
    let store = DivisionStore::new(16, Duration::from_secs(60));
    let job = partition::generate(&roster, &config(3, Some(3)), 50, "job".into()).unwrap();
    let expected: Vec<Vec<u64>> =
        job.groups.iter().map(|g| g.members.iter().map(|m| m.id).collect()).collect();

    store.save_pending(1, job);
    let subgroups = store.confirm(1, "job").unwrap();
    let actual: Vec<Vec<u64>> =
        subgroups.iter().map(|s| s.members.iter().map(|m| m.id).collect()).collect();

    assert_eq!(actual, expected);
    assert!(subgroups.iter().all(|s| s.division == "job" && !s.created_at.is_empty()));
}
