//! CSV rendering of previews and persisted subgroups.

use cohort_domain::division::{DivisionJob, Subgroup};
use std::fmt::Write as _;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const PREVIEW_HEADER: [&str; 7] = [
    "Subgroup ID",
    "Subgroup Name",
    "Member ID",
    "Member Name",
    "Member Email",
    "Categories",
    "Average Compatibility",
];

const PERSISTED_HEADER: [&str; 6] =
    ["Subgroup ID", "Subgroup Name", "Member ID", "Member Name", "Member Email", "Added At"];

#[must_use]
pub fn filename(group_id: u64) -> String {
    format!("subgroups_group_{group_id}.csv")
}

#[must_use]
pub fn preview_csv(job: &DivisionJob) -> String {
    let mut out = String::new();
    push_row(&mut out, PREVIEW_HEADER);
    for group in &job.groups {
        let compatibility = format!("{:.3}", group.compatibility_avg);
        for member in &group.members {
            let id = member.id.to_string();
            let categories = member.categories.join(", ");
            push_row(
                &mut out,
                [
                    group.id.as_str(),
                    group.name.as_str(),
                    id.as_str(),
                    member.name.as_str(),
                    member.email.as_str(),
                    categories.as_str(),
                    compatibility.as_str(),
                ],
            );
        }
    }
    out
}

#[must_use]
pub fn persisted_csv(subgroups: &[Subgroup]) -> String {
    let mut out = String::new();
    push_row(&mut out, PERSISTED_HEADER);
    for subgroup in subgroups {
        let subgroup_id = subgroup.id.to_string();
        for member in &subgroup.members {
            let id = member.id.to_string();
            push_row(
                &mut out,
                [
                    subgroup_id.as_str(),
                    subgroup.name.as_str(),
                    id.as_str(),
                    member.name.as_str(),
                    member.email.as_str(),
                    member.added_at.as_str(),
                ],
            );
        }
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_with_separators_are_quoted() {
        let mut out = String::new();
        push_row(&mut out, ["plain", "a, b", "say \"hi\""]);
        assert_eq!(out, "plain,\"a, b\",\"say \"\"hi\"\"\"\r\n");
    }

    #[test]
    fn empty_exports_still_carry_headers() {
        let csv = persisted_csv(&[]);
        assert_eq!(csv, "Subgroup ID,Subgroup Name,Member ID,Member Name,Member Email,Added At\r\n");
        assert_eq!(filename(7), "subgroups_group_7.csv");
    }
}
