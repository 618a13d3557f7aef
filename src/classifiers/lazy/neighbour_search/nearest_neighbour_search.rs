use crate::classifiers::lazy::Window;
use crate::classifiers::lazy::neighbour_search::{KdTree, LinearNNSearch};
use crate::core::instances::{DenseInstance, Instance};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("cannot search {k} neighbours in an empty window")]
    EmptyWindow { k: usize },

    #[error("query has {found} attributes, window stores {expected}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("attribute #{index} is not numeric")]
    NonNumericAttribute { index: usize },

    #[error("missing value at attribute #{index}")]
    MissingValue { index: usize },
}

/// A stored instance paired with its distance to the query.
#[derive(Clone, Copy, Debug)]
pub struct Neighbour<'a> {
    pub instance: &'a DenseInstance,
    pub distance: f64,
}

impl<'a> Neighbour<'a> {
    pub fn new(instance: &'a DenseInstance, distance: f64) -> Self {
        Self { instance, distance }
    }

    pub fn class_index(&self) -> Option<usize> {
        self.instance.class_value().map(|c| c as usize)
    }
}

pub trait NearestNeighbourSearch {
    /// Returns the `min(k, window.len())` stored instances closest to `query`,
    /// ordered by ascending distance. Ties keep window order (oldest first).
    fn k_nearest_neighbours<'a>(
        &self,
        window: &'a Window,
        query: &dyn Instance,
        k: usize,
    ) -> Result<Vec<Neighbour<'a>>, SearchError>;
}

/// Checks shared by every search before any distance is computed.
pub fn validate_query(window: &Window, query: &dyn Instance, k: usize) -> Result<(), SearchError> {
    if window.is_empty() {
        return Err(SearchError::EmptyWindow { k });
    }
    let expected = window.header().number_of_attributes();
    let found = query.number_of_attributes();
    if expected != found {
        return Err(SearchError::ArityMismatch { expected, found });
    }
    Ok(())
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SearchAlgorithm {
    #[default]
    LinearNn,
    KdTree,
}

impl SearchAlgorithm {
    pub fn build(self) -> Box<dyn NearestNeighbourSearch> {
        match self {
            SearchAlgorithm::LinearNn => Box::new(LinearNNSearch::new()),
            SearchAlgorithm::KdTree => Box::new(KdTree::new()),
        }
    }
}
