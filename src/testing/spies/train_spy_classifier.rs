use crate::classifiers::{Classifier, ClassifierError};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub struct TrainSpyHandle {
    trained: Arc<AtomicU64>,
    predicted: Arc<AtomicU64>,
}

impl TrainSpyHandle {
    pub fn count(&self) -> u64 {
        self.trained.load(Ordering::Relaxed)
    }

    pub fn predictions(&self) -> u64 {
        self.predicted.load(Ordering::Relaxed)
    }
}

/// Counts training and prediction calls; votes for nothing.
pub struct TrainSpyClassifier {
    trained: Arc<AtomicU64>,
    predicted: Arc<AtomicU64>,
    num_classes: usize,
}

impl TrainSpyClassifier {
    pub fn new() -> (Self, TrainSpyHandle) {
        let trained = Arc::new(AtomicU64::new(0));
        let predicted = Arc::new(AtomicU64::new(0));
        (
            Self {
                trained: Arc::clone(&trained),
                predicted: Arc::clone(&predicted),
                num_classes: 2,
            },
            TrainSpyHandle { trained, predicted },
        )
    }
}

impl Classifier for TrainSpyClassifier {
    fn get_votes_for_instance(&mut self, _instance: &mut dyn Instance) -> Vec<f64> {
        self.predicted.fetch_add(1, Ordering::Relaxed);
        vec![0.0; self.num_classes]
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) -> Result<(), ClassifierError> {
        self.num_classes = header.number_of_classes().max(2);
        Ok(())
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {
        self.trained.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&mut self) {}

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
