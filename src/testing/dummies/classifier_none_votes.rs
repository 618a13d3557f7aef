use crate::classifiers::{Classifier, ClassifierError};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;

/// Never votes, never learns.
#[derive(Default)]
pub struct ClassifierNoneVotes;

impl Classifier for ClassifierNoneVotes {
    fn get_votes_for_instance(&mut self, _instance: &mut dyn Instance) -> Vec<f64> {
        Vec::new()
    }

    fn set_model_context(&mut self, _header: Arc<InstanceHeader>) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {}

    fn reset(&mut self) {}

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
