use crate::classifiers::classifier::{Classifier, ClassifierError};
use crate::classifiers::lazy::neighbour_search::{NearestNeighbourSearch, SearchError};
use crate::classifiers::lazy::{Standardizer, VoteAggregator, VoteMode, Window};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::mem::size_of;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnnState {
    Uninitialized,
    Empty,
    Populated,
}

#[derive(Debug, Error)]
enum PredictionError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("standardization failed: {0}")]
    Standardize(#[from] std::io::Error),
}

/// Streaming k-nearest-neighbour classifier over a sliding window of the most
/// recent training instances.
///
/// Predictions may standardize the query in place using running statistics
/// over every predicted instance. A prediction that fails (search error,
/// inconsistent instance) degrades to a zero vote vector sized by the query's
/// class count.
pub struct Knn {
    k: usize,
    limit: usize,
    standardize: bool,
    votes: VoteAggregator,
    search: Box<dyn NearestNeighbourSearch>,
    window: Option<Window>,
    standardizer: Standardizer,
    max_class_seen: Option<usize>,
    predictions: u64,
}

impl Knn {
    pub fn new(
        k: usize,
        limit: usize,
        vote_mode: VoteMode,
        standardize: bool,
        search: Box<dyn NearestNeighbourSearch>,
    ) -> Result<Self, ClassifierError> {
        if k == 0 {
            return Err(ClassifierError::InvalidParameter {
                name: "k",
                reason: "must be at least 1".into(),
            });
        }
        if limit == 0 {
            return Err(ClassifierError::InvalidParameter {
                name: "limit",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            k,
            limit,
            standardize,
            votes: VoteAggregator::new(vote_mode),
            search,
            window: None,
            standardizer: Standardizer::new(),
            max_class_seen: None,
            predictions: 0,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn state(&self) -> KnnState {
        match &self.window {
            None => KnnState::Uninitialized,
            Some(window) if window.is_empty() => KnnState::Empty,
            Some(_) => KnnState::Populated,
        }
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn max_class_seen(&self) -> Option<usize> {
        self.max_class_seen
    }

    /// Number of predictions since construction or the last reset.
    pub fn predictions(&self) -> u64 {
        self.predictions
    }

    pub fn standardizer(&self) -> &Standardizer {
        &self.standardizer
    }

    fn vote_len(&self) -> usize {
        self.max_class_seen.map_or(0, |c| c + 1)
    }

    fn predict(&mut self, instance: &mut dyn Instance) -> Result<Vec<f64>, PredictionError> {
        if self.standardize {
            let window_is_empty = self.window.as_ref().is_none_or(Window::is_empty);
            self.standardizer
                .standardize(instance, self.predictions, window_is_empty)?;
        }

        let num_votes = self.vote_len();
        let window = match &self.window {
            Some(window) if !window.is_empty() => window,
            _ => return Ok(vec![0.0; num_votes]),
        };

        let k = self.k.min(window.len());
        let neighbours = self.search.k_nearest_neighbours(window, instance, k)?;
        Ok(self.votes.aggregate(instance, &neighbours, num_votes))
    }
}

impl Classifier for Knn {
    fn get_votes_for_instance(&mut self, instance: &mut dyn Instance) -> Vec<f64> {
        self.predictions += 1;
        self.predict(instance)
            .unwrap_or_else(|_| vec![0.0; instance.number_of_classes()])
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) -> Result<(), ClassifierError> {
        let attributes = header.number_of_attributes();
        if attributes == 0 {
            return Err(ClassifierError::EmptyHeader);
        }
        let class_index = header.class_index();
        if class_index >= attributes {
            return Err(ClassifierError::ClassIndexOutOfRange {
                class_index,
                attributes,
            });
        }
        if header.number_of_classes() == 0 {
            return Err(ClassifierError::NonNominalClass { class_index });
        }

        self.window = Some(Window::new(header, self.limit));
        Ok(())
    }

    fn train_on_instance(&mut self, instance: &dyn Instance) {
        let Some(class) = instance.class_value() else {
            return;
        };
        if !(class >= 0.0 && class < instance.number_of_classes() as f64) {
            return;
        }

        let window = self
            .window
            .get_or_insert_with(|| Window::new(Arc::new(instance.header().clone()), self.limit));
        if window.header().number_of_attributes() != instance.number_of_attributes() {
            return;
        }

        let class = class as usize;
        self.max_class_seen = Some(self.max_class_seen.map_or(class, |seen| seen.max(class)));
        window.add(instance);
    }

    fn reset(&mut self) {
        self.window = None;
        self.standardizer.reset();
        self.max_class_seen = None;
        self.predictions = 0;
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for Knn {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        total += meter.measure_field(&self.window);
        total += meter.measure_field(&self.standardizer);
        total
    }
}
