//! Builder state to [`DivisionConfig`].
//!
//! Numeric inputs are parsed leniently: leading whitespace, an optional sign, then the
//! leading run of digits. Anything else yields "no number".

use crate::builder::{ConditionDraft, RuleBuilder};
use cohort_domain::division::{Condition, DivisionConfig, Rule};
use tracing::debug;

/// Top-level form inputs. Numeric fields hold raw text, except the percentage slider.
#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelParams {
    pub num_groups: String,
    pub max_group_size: String,
    pub allow_multiple_membership: bool,
    pub require_all_members: bool,
    pub threshold_percent: f64,
}

impl Default for TopLevelParams {
    fn default() -> Self {
        Self {
            num_groups: "2".to_owned(),
            max_group_size: String::new(),
            allow_multiple_membership: false,
            require_all_members: true,
            threshold_percent: 0.0,
        }
    }
}

/// Builds the request payload. Deterministic and pure.
///
/// * Conditions without categories are skipped; rules left without conditions are dropped.
/// * `min` falls back to 0; a `max` or `max_group_size` that is zero, empty or not a
///   number means unbounded.
/// * `num_groups` falls back to 0, which the division controller rejects.
/// * The threshold percentage becomes a fraction clamped to `[0, 1]`.
#[must_use]
pub fn serialize(builder: &RuleBuilder, params: &TopLevelParams) -> DivisionConfig {
    let category_rules: Vec<Rule> = builder
        .rules()
        .iter()
        .filter_map(|rule| {
            let conditions: Vec<Condition> =
                rule.conditions().iter().filter_map(serialize_condition).collect();
            if conditions.is_empty() {
                debug!(rule = %rule.id(), "Dropping rule without valid conditions");
                None
            } else {
                Some(Rule { conditions })
            }
        })
        .collect();

    DivisionConfig {
        num_groups: parse_count(&params.num_groups).unwrap_or(0),
        max_group_size: parse_bound(&params.max_group_size),
        allow_multiple_membership: params.allow_multiple_membership,
        require_all_members: params.require_all_members,
        compatibility_threshold: threshold_fraction(params.threshold_percent),
        category_rules,
    }
}

fn serialize_condition(draft: &ConditionDraft) -> Option<Condition> {
    if draft.categories().is_empty() {
        return None;
    }
    Some(Condition {
        categories: draft.categories().to_vec(),
        operator: draft.operator(),
        min: parse_count(draft.min_input()).unwrap_or(0),
        max: parse_bound(draft.max_input()),
    })
}

/// Percentage to a `[0, 1]` fraction; non-finite input becomes 0.
#[must_use]
pub fn threshold_fraction(percent: f64) -> f64 {
    if percent.is_finite() { (percent / 100.0).clamp(0.0, 1.0) } else { 0.0 }
}

/// Lenient non-negative count; negative numbers clamp to 0.
fn parse_count(raw: &str) -> Option<usize> {
    parse_leading_int(raw).map(|n| usize::try_from(n).unwrap_or(0))
}

/// Positive upper bound, `None` for zero, negative or missing numbers.
fn parse_bound(raw: &str) -> Option<usize> {
    parse_leading_int(raw).and_then(|n| usize::try_from(n).ok()).filter(|&n| n > 0)
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }

    let value = digits[..end]
        .bytes()
        .fold(0_i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_parsing_is_lenient() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("  7 people"), Some(7));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("-4"), Some(-4));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn bounds_treat_zero_and_garbage_as_unbounded() {
        assert_eq!(parse_bound("5"), Some(5));
        assert_eq!(parse_bound("0"), None);
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("-2"), None);
        assert_eq!(parse_bound("n/a"), None);
    }

    #[test]
    fn counts_fall_back_to_zero() {
        assert_eq!(parse_count("2"), Some(2));
        assert_eq!(parse_count("-1"), Some(0));
        assert_eq!(parse_count("x"), None);
    }

    #[test]
    fn threshold_is_clamped_and_finite() {
        assert!((threshold_fraction(65.0) - 0.65).abs() < f64::EPSILON);
        assert!((threshold_fraction(150.0) - 1.0).abs() < f64::EPSILON);
        assert!(threshold_fraction(-10.0).abs() < f64::EPSILON);
        assert!(threshold_fraction(f64::NAN).abs() < f64::EPSILON);
    }
}
