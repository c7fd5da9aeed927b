//! Plain-text rendering of previews and subgroups.

use cohort::domain::division::Subgroup;
use cohort::features::division::client::view::PreviewView;
use std::fmt::Write as _;

pub fn preview(view: &PreviewView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Preview {}: {} of {} members assigned to {} subgroups",
        view.job_id,
        view.assigned,
        view.available,
        view.groups.len()
    );

    for group in &view.groups {
        let _ = writeln!(
            out,
            "\n  {} ({} members, {}% {} compatibility)",
            group.name, group.member_count, group.compatibility_percent, group.tier
        );
        if !group.badges.is_empty() {
            let badges: Vec<String> =
                group.badges.iter().map(|b| format!("{} {}", b.label, b.mark())).collect();
            let _ = writeln!(out, "    {}", badges.join("   "));
        }
        let _ = writeln!(out, "    {}", group.member_names.join(", "));
    }

    if !view.all_rules_fulfilled() {
        let rules: Vec<String> = view.unfulfilled_rules.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "\nWarning: rules not met in every subgroup: {}", rules.join(", "));
    }
    out
}

pub fn subgroups(subgroups: &[Subgroup]) -> String {
    if subgroups.is_empty() {
        return "No subgroups yet.\n".to_owned();
    }
    let mut out = String::new();
    for subgroup in subgroups {
        let names: Vec<&str> = subgroup.members.iter().map(|m| m.name.as_str()).collect();
        let _ = writeln!(
            out,
            "#{} {} [{}] created {}: {}",
            subgroup.id,
            subgroup.name,
            subgroup.division,
            subgroup.created_at,
            names.join(", ")
        );
    }
    out
}

/// Number of distinct confirmed divisions behind `subgroups`.
pub fn division_count(subgroups: &[Subgroup]) -> usize {
    let mut divisions: Vec<&str> = subgroups.iter().map(|s| s.division.as_str()).collect();
    divisions.sort_unstable();
    divisions.dedup();
    divisions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort::domain::division::{DivisionJob, Member, Operator, ProposedGroup, RuleStatus};

    fn job() -> DivisionJob {
        DivisionJob {
            job_id: "J1".into(),
            total_members_assigned: 2,
            total_members_available: 3,
            unfulfilled_rules: vec![1],
            groups: vec![ProposedGroup {
                id: "preview-1".into(),
                name: "Subgroup 1".into(),
                members: ["Ana", "Bo"]
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| Member {
                        id: i as u64,
                        name: name.into(),
                        email: String::new(),
                        categories: Vec::new(),
                        availability_count: 1,
                    })
                    .collect(),
                compatibility_avg: 0.5,
                rules_status: vec![RuleStatus {
                    rule: 1,
                    count: 0,
                    min: 1,
                    max: None,
                    fulfilled: false,
                    categories: vec!["leader".into()],
                    operator: Operator::All,
                }],
            }],
        }
    }

    #[test]
    fn preview_lists_groups_badges_and_warnings() {
        let text = preview(&PreviewView::from_job(&job()));
        assert!(text.starts_with("Preview J1: 2 of 3 members assigned to 1 subgroups"));
        assert!(text.contains("Subgroup 1 (2 members, 50% fair compatibility)"));
        assert!(text.contains("Rule 1: 0/1+ ✗"));
        assert!(text.contains("Ana, Bo"));
        assert!(text.contains("rules not met in every subgroup: 1"));
    }

    #[test]
    fn divisions_are_counted_once() {
        let subgroup = |id, division: &str| Subgroup {
            id,
            name: format!("Subgroup {id}"),
            division: division.into(),
            compatibility_avg: 1.0,
            rules_status: Vec::new(),
            members: Vec::new(),
            created_at: String::new(),
        };
        let list = [subgroup(1, "a"), subgroup(2, "a"), subgroup(3, "b")];
        assert_eq!(division_count(&list), 2);
        assert_eq!(subgroups(&[]), "No subgroups yet.\n");
    }
}
