use std::cmp::Ordering;

/// What a student is ranked on. Lower aggregates rank higher; a higher
/// average breaks ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    /// `None` ranks below every real aggregate.
    pub aggregate_points: Option<u32>,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into the slice passed to `rank_cohort`.
    pub index: usize,
    /// 1-based; tied keys share a position.
    pub position: u32,
}

pub fn compare_rank_keys(a: &RankKey, b: &RankKey) -> Ordering {
    let by_aggregate = match (a.aggregate_points, b.aggregate_points) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_aggregate.then_with(|| b.average_score.total_cmp(&a.average_score))
}

/// Numeric equality, so `0.0` and `-0.0` averages tie.
fn same_standing(a: &RankKey, b: &RankKey) -> bool {
    a.aggregate_points == b.aggregate_points && a.average_score == b.average_score
}

/// Orders a class best first and assigns competition positions (1, 2, 2, 4).
///
/// The sort is stable, so students with identical keys keep their input
/// order. A student shares the previous position only when both aggregate and
/// average match; otherwise the position is the count of students placed so
/// far.
pub fn rank_cohort(keys: &[RankKey]) -> Vec<Placement> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| compare_rank_keys(&keys[a], &keys[b]));

    let mut placements: Vec<Placement> = Vec::with_capacity(order.len());
    for (seen, &index) in order.iter().enumerate() {
        let position = match placements.last() {
            Some(prev) if same_standing(&keys[prev.index], &keys[index]) => prev.position,
            _ => seen as u32 + 1,
        };
        placements.push(Placement { index, position });
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(aggregate: u32, average: f64) -> RankKey {
        RankKey {
            aggregate_points: Some(aggregate),
            average_score: average,
        }
    }

    fn positions(keys: &[RankKey]) -> Vec<(usize, u32)> {
        rank_cohort(keys)
            .into_iter()
            .map(|p| (p.index, p.position))
            .collect()
    }

    #[test]
    fn ties_share_position_and_keep_input_order() {
        // A(10, 80), B(10, 80), C(8, 70)
        let keys = [key(10, 80.0), key(10, 80.0), key(8, 70.0)];
        assert_eq!(positions(&keys), vec![(2, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn position_resumes_at_count_after_tie() {
        let keys = [key(5, 90.0), key(9, 70.0), key(9, 70.0), key(12, 60.0)];
        let ranks: Vec<u32> = rank_cohort(&keys).iter().map(|p| p.position).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn average_breaks_aggregate_ties_higher_first() {
        let keys = [key(14, 61.5), key(14, 72.25), key(14, 61.5)];
        assert_eq!(positions(&keys), vec![(1, 1), (0, 2), (2, 2)]);
    }

    #[test]
    fn same_aggregate_different_average_is_not_a_tie() {
        let keys = [key(20, 55.0), key(20, 55.01)];
        assert_eq!(positions(&keys), vec![(1, 1), (0, 2)]);
    }

    #[test]
    fn signed_zero_averages_share_a_position() {
        let keys = [key(36, 0.0), key(36, -0.0)];
        let ranks: Vec<u32> = rank_cohort(&keys).iter().map(|p| p.position).collect();
        assert_eq!(ranks, vec![1, 1]);
    }

    #[test]
    fn missing_aggregate_ranks_last() {
        let keys = [
            RankKey {
                aggregate_points: None,
                average_score: 99.0,
            },
            key(36, 10.0),
            key(4, 95.0),
        ];
        assert_eq!(positions(&keys), vec![(2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn empty_class_has_no_placements() {
        assert!(rank_cohort(&[]).is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let keys = [key(18, 66.4), key(7, 81.0), key(18, 66.4), key(30, 40.0), key(7, 79.5)];
        assert_eq!(rank_cohort(&keys), rank_cohort(&keys));
        assert_eq!(
            positions(&keys),
            vec![(1, 1), (4, 2), (0, 3), (2, 3), (3, 5)]
        );
    }
}
