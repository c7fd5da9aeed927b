//! Pairwise availability compatibility.

use crate::server::roster::{AvailabilitySlot, RosterMember};
use fxhash::FxHashSet;

/// Jaccard index of two slot sets; 0 when either is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &FxHashSet<AvailabilitySlot>, b: &FxHashSet<AvailabilitySlot>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}

/// Dense symmetric matrix over roster positions.
#[derive(Debug, Clone)]
pub struct CompatibilityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl CompatibilityMatrix {
    #[must_use]
    pub fn new(members: &[RosterMember]) -> Self {
        let slots: Vec<_> = members.iter().map(RosterMember::slots).collect();
        let size = slots.len();
        let mut scores = vec![0.0; size * size];

        for i in 0..size {
            scores[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let score = jaccard(&slots[i], &slots[j]);
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }
        Self { size, scores }
    }

    /// 1 for a member with itself.
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.scores[a * self.size + b]
    }

    /// Average compatibility of `candidate` with `occupants`; 1 for an empty group.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn affinity(&self, candidate: usize, occupants: &[usize]) -> f64 {
        if occupants.is_empty() {
            return 1.0;
        }
        let total: f64 = occupants.iter().map(|&m| self.get(candidate, m)).sum();
        total / occupants.len() as f64
    }

    /// Average over all unordered pairs; 1 for groups of size ≤ 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn group_average(&self, members: &[usize]) -> f64 {
        if members.len() <= 1 {
            return 1.0;
        }
        let mut total = 0.0;
        let mut pairs = 0_usize;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                total += self.get(a, b);
                pairs += 1;
            }
        }
        total / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, slots: &[(u8, u8)]) -> RosterMember {
        RosterMember {
            id,
            name: format!("m{id}"),
            email: String::new(),
            categories: Vec::new(),
            availability: slots
                .iter()
                .map(|&(weekday, hour)| AvailabilitySlot { weekday, hour })
                .collect(),
        }
    }

    #[test]
    fn jaccard_of_overlapping_sets() {
        let members = [member(1, &[(0, 9), (0, 10)]), member(2, &[(0, 10), (1, 9)]), member(3, &[])];
        let matrix = CompatibilityMatrix::new(&members);

        assert!((matrix.get(0, 1) - 1.0 / 3.0).abs() < 1e-9);
        assert!((matrix.get(1, 0) - matrix.get(0, 1)).abs() < f64::EPSILON);
        assert!(matrix.get(0, 2).abs() < f64::EPSILON);
        assert!((matrix.get(2, 2) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn averages_follow_group_size_conventions() {
        let members = [member(1, &[(0, 9)]), member(2, &[(0, 9)]), member(3, &[(3, 3)])];
        let matrix = CompatibilityMatrix::new(&members);

        assert!((matrix.group_average(&[0]) - 1.0).abs() < f64::EPSILON);
        assert!((matrix.group_average(&[0, 1]) - 1.0).abs() < f64::EPSILON);
        assert!((matrix.group_average(&[0, 1, 2]) - 1.0 / 3.0).abs() < 1e-9);
        assert!((matrix.affinity(2, &[]) - 1.0).abs() < f64::EPSILON);
        assert!((matrix.affinity(0, &[1, 2]) - 0.5).abs() < 1e-9);
    }
}
