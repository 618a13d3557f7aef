use crate::classifiers::lazy::Window;
use crate::classifiers::lazy::neighbour_search::{NearestNeighbourSearch, Neighbour, SearchError};
use crate::core::instances::Instance;

/// Search that rejects every query.
pub struct FailingSearch;

impl NearestNeighbourSearch for FailingSearch {
    fn k_nearest_neighbours<'a>(
        &self,
        _window: &'a Window,
        _query: &dyn Instance,
        _k: usize,
    ) -> Result<Vec<Neighbour<'a>>, SearchError> {
        Err(SearchError::NonNumericAttribute { index: 0 })
    }
}
