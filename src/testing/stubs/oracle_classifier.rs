use crate::classifiers::{Classifier, ClassifierError};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;

/// Reads the true class off the instance and votes for it.
#[derive(Default)]
pub struct OracleClassifier {
    num_classes: usize,
}

impl Classifier for OracleClassifier {
    fn get_votes_for_instance(&mut self, instance: &mut dyn Instance) -> Vec<f64> {
        let mut votes = vec![0.0; self.num_classes.max(2)];
        if let Some(vote) = instance
            .class_value()
            .and_then(|y| votes.get_mut(y as usize))
        {
            *vote = 1.0;
        }
        votes
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) -> Result<(), ClassifierError> {
        self.num_classes = header.number_of_classes();
        Ok(())
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {}

    fn reset(&mut self) {
        self.num_classes = 0;
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
