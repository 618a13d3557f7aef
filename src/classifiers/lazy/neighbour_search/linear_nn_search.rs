use crate::classifiers::lazy::Window;
use crate::classifiers::lazy::neighbour_search::{
    EuclideanDistance, NearestNeighbourSearch, Neighbour, SearchError, validate_query,
};
use crate::core::instances::Instance;

/// Exhaustive scan over the window.
#[derive(Clone, Debug)]
pub struct LinearNNSearch {
    normalize: bool,
}

impl LinearNNSearch {
    pub fn new() -> Self {
        Self { normalize: true }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

impl Default for LinearNNSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestNeighbourSearch for LinearNNSearch {
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

        let distance = EuclideanDistance::fit(window, self.normalize);
        let target = query.to_vec();

        let mut neighbours: Vec<Neighbour<'a>> = window
            .iter()
            .map(|stored| Neighbour::new(stored, distance.distance(stored.values(), &target)))
            .collect();

        // stable: equal distances keep window order
        neighbours.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbours.truncate(k);
        Ok(neighbours)
    }
}
