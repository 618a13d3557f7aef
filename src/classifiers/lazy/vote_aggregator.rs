use crate::classifiers::lazy::neighbour_search::Neighbour;
use crate::core::instances::Instance;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoteMode {
    #[default]
    Unweighted,
    InverseDistance,
}

/// Turns a neighbour list into a per-class vote vector.
///
/// `Unweighted` counts one vote per neighbour. `InverseDistance` sums the plain
/// (unnormalized) Euclidean distance of each class's neighbours to the query
/// and inverts the sums; a class whose neighbours all sit at distance zero
/// keeps a vote of `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoteAggregator {
    mode: VoteMode,
}

impl VoteAggregator {
    pub fn new(mode: VoteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> VoteMode {
        self.mode
    }

    pub fn aggregate(
        &self,
        query: &dyn Instance,
        neighbours: &[Neighbour<'_>],
        num_votes: usize,
    ) -> Vec<f64> {
        let mut votes = vec![0.0; num_votes];

        match self.mode {
            VoteMode::Unweighted => {
                for neighbour in neighbours {
                    if let Some(vote) = neighbour.class_index().and_then(|c| votes.get_mut(c)) {
                        *vote += 1.0;
                    }
                }
            }
            VoteMode::InverseDistance => {
                let target = query.to_vec();
                let class_index = query.class_index();
                for neighbour in neighbours {
                    let distance = plain_distance(neighbour.instance.values(), &target, class_index);
                    if let Some(vote) = neighbour.class_index().and_then(|c| votes.get_mut(c)) {
                        *vote += distance;
                    }
                }
                for vote in votes.iter_mut() {
                    *vote = if vote.is_finite() && *vote > 0.0 { 1.0 / *vote } else { 0.0 };
                }
            }
        }

        votes
    }
}

/// Unnormalized Euclidean distance over features. Pairs with a missing side
/// contribute nothing.
fn plain_distance(a: &[f64], b: &[f64], class_index: usize) -> f64 {
    a.iter()
        .zip(b)
        .enumerate()
        .filter(|(i, (x, y))| *i != class_index && !x.is_nan() && !y.is_nan())
        .map(|(_, (x, y))| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instances::DenseInstance;
    use crate::testing::numeric_header;
    use std::sync::Arc;

    fn stored(rows: &[(f64, f64)]) -> Vec<DenseInstance> {
        let header = numeric_header(1, 3);
        rows.iter()
            .map(|&(x, c)| DenseInstance::new(Arc::clone(&header), vec![x, c], 1.0))
            .collect()
    }

    fn neighbours(stored: &[DenseInstance]) -> Vec<Neighbour<'_>> {
        stored.iter().map(|s| Neighbour::new(s, 0.0)).collect()
    }

    fn query(x: f64) -> DenseInstance {
        DenseInstance::new(numeric_header(1, 3), vec![x, f64::NAN], 1.0)
    }

    #[test]
    fn missing_features_leave_weighted_votes_finite() {
        let header = numeric_header(2, 2);
        let rows: Vec<DenseInstance> = [[1.0, 2.0, 0.0], [3.0, 4.0, 1.0]]
            .into_iter()
            .map(|v| DenseInstance::new(Arc::clone(&header), v.to_vec(), 1.0))
            .collect();
        let q = DenseInstance::new(Arc::clone(&header), vec![f64::NAN, 2.0, f64::NAN], 1.0);

        let votes = VoteAggregator::new(VoteMode::InverseDistance).aggregate(&q, &neighbours(&rows), 2);
        // only the second feature counts: |2-2| = 0 and |4-2| = 2
        assert_eq!(votes, vec![0.0, 0.5]);
        assert!(votes.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn infinite_distance_gives_no_vote() {
        let rows = stored(&[(f64::INFINITY, 0.0), (2.0, 1.0)]);
        let votes = VoteAggregator::new(VoteMode::InverseDistance)
            .aggregate(&query(0.0), &neighbours(&rows), 3);
        assert_eq!(votes, vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn unweighted_counts_classes() {
        let rows = stored(&[(1.0, 0.0), (2.0, 1.0), (3.0, 0.0)]);
        let votes = VoteAggregator::new(VoteMode::Unweighted).aggregate(&query(0.0), &neighbours(&rows), 3);
        assert_eq!(votes, vec![2.0, 1.0, 0.0]);
        assert_eq!(votes.iter().sum::<f64>(), rows.len() as f64);
    }

    #[test]
    fn inverse_distance_inverts_accumulated_distance() {
        let rows = stored(&[(1.0, 0.0), (3.0, 0.0), (4.0, 1.0)]);
        let votes = VoteAggregator::new(VoteMode::InverseDistance)
            .aggregate(&query(0.0), &neighbours(&rows), 3);
        assert_eq!(votes, vec![1.0 / 4.0, 1.0 / 4.0, 0.0]);
    }

    #[test]
    fn exact_match_gives_no_vote() {
        let rows = stored(&[(5.0, 0.0), (7.0, 1.0)]);
        let votes = VoteAggregator::new(VoteMode::InverseDistance)
            .aggregate(&query(5.0), &neighbours(&rows), 2);
        assert_eq!(votes, vec![0.0, 0.5]);
    }

    #[test]
    fn class_beyond_vote_length_is_ignored() {
        let rows = stored(&[(1.0, 2.0), (1.0, 0.0)]);
        let votes = VoteAggregator::default().aggregate(&query(0.0), &neighbours(&rows), 1);
        assert_eq!(votes, vec![1.0]);
    }

    #[test]
    fn no_neighbours_gives_zeros() {
        let votes = VoteAggregator::new(VoteMode::InverseDistance).aggregate(&query(0.0), &[], 2);
        assert_eq!(votes, vec![0.0, 0.0]);
    }
}
