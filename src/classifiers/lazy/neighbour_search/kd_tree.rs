use crate::classifiers::lazy::Window;
use crate::classifiers::lazy::neighbour_search::{
    EuclideanDistance, NearestNeighbourSearch, Neighbour, SearchError, validate_query,
};
use crate::core::instances::{DenseInstance, Instance};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const MAX_INSTANCES_IN_LEAF: usize = 40;

/// KD-tree search over range-normalized numeric features.
///
/// The tree is rebuilt from the window on every query, splitting the widest
/// dimension at its median. Results match [`LinearNNSearch`] exactly,
/// including the tie order.
///
/// [`LinearNNSearch`]: crate::classifiers::lazy::neighbour_search::LinearNNSearch
#[derive(Clone, Debug)]
pub struct KdTree {
    normalize: bool,
    max_leaf_size: usize,
}

enum KdNode {
    Leaf(Vec<usize>),
    Split {
        dim: usize,
        value: f64,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    distance: f64,
    position: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl KdTree {
    pub fn new() -> Self {
        Self {
            normalize: true,
            max_leaf_size: MAX_INSTANCES_IN_LEAF,
        }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size.max(1);
        self
    }

    fn project(
        distance: &EuclideanDistance,
        features: &[usize],
        values: &[f64],
    ) -> Result<Vec<f64>, SearchError> {
        features
            .iter()
            .map(|&index| {
                let v = values[index];
                if v.is_nan() {
                    Err(SearchError::MissingValue { index })
                } else {
                    Ok(distance.norm(index, v))
                }
            })
            .collect()
    }

    fn build(&self, points: &[Vec<f64>], indices: &mut [usize]) -> KdNode {
        if indices.len() <= self.max_leaf_size {
            return KdNode::Leaf(indices.to_vec());
        }

        let dims = points[indices[0]].len();
        let mut widest: Option<(usize, f64)> = None;
        for dim in 0..dims {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &p| {
                (acc.0.min(points[p][dim]), acc.1.max(points[p][dim]))
            });
            let spread = hi - lo;
            if widest.is_none_or(|(_, best)| spread > best) {
                widest = Some((dim, spread));
            }
        }

        let Some((dim, spread)) = widest.filter(|&(_, spread)| spread > 0.0) else {
            return KdNode::Leaf(indices.to_vec());
        };
        debug_assert!(spread > 0.0);

        indices.sort_unstable_by(|&a, &b| {
            points[a][dim]
                .total_cmp(&points[b][dim])
                .then(a.cmp(&b))
        });
        let mid = indices.len() / 2;
        let value = points[indices[mid]][dim];
        let (left, right) = indices.split_at_mut(mid);

        KdNode::Split {
            dim,
            value,
            left: Box::new(self.build(points, left)),
            right: Box::new(self.build(points, right)),
        }
    }

    fn search(
        node: &KdNode,
        points: &[Vec<f64>],
        target: &[f64],
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        match node {
            KdNode::Leaf(positions) => {
                for &position in positions {
                    let candidate = Candidate {
                        distance: euclidean(&points[position], target),
                        position,
                    };
                    offer(heap, k, candidate);
                }
            }
            KdNode::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = target[*dim] - value;
                let (near, far) = if diff < 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };

                Self::search(near, points, target, k, heap);

                let explore_far = match heap.peek() {
                    Some(worst) if heap.len() >= k => within(diff.abs(), worst.distance),
                    _ => true,
                };
                if explore_far {
                    Self::search(far, points, target, k, heap);
                }
            }
        }
    }
}

impl Default for KdTree {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn euclidean(point: &[f64], target: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (p, t) in point.iter().zip(target) {
        let diff = p - t;
        sum += diff * diff;
    }
    sum.sqrt()
}

// the plane distance may exceed the float distance it bounds by an ulp
#[inline]
fn within(plane: f64, worst: f64) -> bool {
    plane <= worst * (1.0 + 1e-12) + f64::MIN_POSITIVE
}

fn offer(heap: &mut BinaryHeap<Candidate>, k: usize, candidate: Candidate) {
    if heap.len() < k {
        heap.push(candidate);
    } else if heap.peek().is_some_and(|worst| candidate < *worst) {
        heap.pop();
        heap.push(candidate);
    }
}

impl NearestNeighbourSearch for KdTree {
    fn k_nearest_neighbours<'a>(
        &self,
        window: &'a Window,
        query: &dyn Instance,
        k: usize,
    ) -> Result<Vec<Neighbour<'a>>, SearchError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        validate_query(window, query, k)?;

        let header = window.header();
        let features: Vec<usize> = header.feature_indices().collect();
        if let Some(&index) = features
            .iter()
            .find(|&&i| !header.attributes[i].is_numeric())
        {
            return Err(SearchError::NonNumericAttribute { index });
        }

        let distance = EuclideanDistance::fit(window, self.normalize);
        let stored: Vec<&'a DenseInstance> = window.iter().collect();
        let points = stored
            .iter()
            .map(|s| Self::project(&distance, &features, s.values()))
            .collect::<Result<Vec<_>, _>>()?;
        let target = Self::project(&distance, &features, &query.to_vec())?;

        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = self.build(&points, &mut indices);

        let mut heap = BinaryHeap::with_capacity(k + 1);
        Self::search(&root, &points, &target, k, &mut heap);

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbour::new(stored[c.position], c.distance))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::lazy::neighbour_search::LinearNNSearch;
    use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
    use crate::core::instance_header::InstanceHeader;
    use crate::testing::numeric_header;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn positions(window: &Window, found: &[Neighbour<'_>]) -> Vec<usize> {
        found
            .iter()
            .map(|n| {
                window
                    .iter()
                    .position(|s| std::ptr::eq(s, n.instance))
                    .expect("neighbour comes from window")
            })
            .collect()
    }

    #[test]
    fn matches_linear_scan_on_random_data() {
        let header = numeric_header(3, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let mut window = Window::new(Arc::clone(&header), 300);
        for _ in 0..300 {
            let values = vec![
                rng.random_range(0.0..10.0),
                rng.random_range(-5.0..5.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0..4) as f64,
            ];
            window.add(&DenseInstance::new(Arc::clone(&header), values, 1.0));
        }

        let tree = KdTree::new().with_max_leaf_size(4);
        let linear = LinearNNSearch::new();
        for _ in 0..25 {
            let query = DenseInstance::new(
                Arc::clone(&header),
                vec![
                    rng.random_range(0.0..10.0),
                    rng.random_range(-5.0..5.0),
                    rng.random_range(0.0..1.0),
                    f64::NAN,
                ],
                1.0,
            );
            for k in [1, 5, 17] {
                let a = tree.k_nearest_neighbours(&window, &query, k).unwrap();
                let b = linear.k_nearest_neighbours(&window, &query, k).unwrap();
                assert_eq!(positions(&window, &a), positions(&window, &b));
                let da: Vec<u64> = a.iter().map(|n| n.distance.to_bits()).collect();
                let db: Vec<u64> = b.iter().map(|n| n.distance.to_bits()).collect();
                assert_eq!(da, db);
            }
        }
    }

    #[test]
    fn duplicate_points_keep_window_order() {
        let header = numeric_header(1, 2);
        let mut window = Window::new(Arc::clone(&header), 10);
        for c in [0.0, 1.0, 0.0, 1.0, 1.0] {
            window.add(&DenseInstance::new(Arc::clone(&header), vec![2.0, c], 1.0));
        }
        window.add(&DenseInstance::new(Arc::clone(&header), vec![9.0, 0.0], 1.0));

        let query = DenseInstance::new(Arc::clone(&header), vec![2.0, f64::NAN], 1.0);
        let found = KdTree::new()
            .with_max_leaf_size(1)
            .k_nearest_neighbours(&window, &query, 3)
            .unwrap();
        assert_eq!(positions(&window, &found), vec![0, 1, 2]);
    }

    #[test]
    fn nominal_feature_is_rejected() {
        let header = Arc::new(InstanceHeader::new(
            "r".into(),
            vec![
                Arc::new(NominalAttribute::from_labels(
                    "colour".into(),
                    vec!["red".into(), "blue".into()],
                )) as AttributeRef,
                Arc::new(NumericAttribute::new("x".into())) as AttributeRef,
                Arc::new(NominalAttribute::from_labels(
                    "class".into(),
                    vec!["a".into(), "b".into()],
                )) as AttributeRef,
            ],
            2,
        ));
        let mut window = Window::new(Arc::clone(&header), 4);
        window.add(&DenseInstance::new(Arc::clone(&header), vec![0.0, 1.0, 0.0], 1.0));
        let query = DenseInstance::new(header, vec![1.0, 1.0, 0.0], 1.0);

        let err = KdTree::new()
            .k_nearest_neighbours(&window, &query, 1)
            .unwrap_err();
        assert_eq!(err, SearchError::NonNumericAttribute { index: 0 });
    }

    #[test]
    fn missing_feature_is_rejected() {
        let header = numeric_header(2, 2);
        let mut window = Window::new(Arc::clone(&header), 4);
        window.add(&DenseInstance::new(Arc::clone(&header), vec![0.0, 1.0, 0.0], 1.0));
        let query = DenseInstance::new(header, vec![f64::NAN, 1.0, 0.0], 1.0);

        let err = KdTree::new()
            .k_nearest_neighbours(&window, &query, 1)
            .unwrap_err();
        assert_eq!(err, SearchError::MissingValue { index: 0 });
    }
}
