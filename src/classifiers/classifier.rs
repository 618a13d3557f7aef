use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("instance header declares no attributes")]
    EmptyHeader,

    #[error("class index {class_index} is out of range for {attributes} attributes")]
    ClassIndexOutOfRange {
        class_index: usize,
        attributes: usize,
    },

    #[error("class attribute at index {class_index} is not nominal")]
    NonNominalClass { class_index: usize },
}

/// Votes may rewrite the instance in place (e.g. online standardization), so
/// callers that test-then-train hand the same, possibly modified, instance to
/// `train_on_instance` afterwards.
pub trait Classifier {
    fn get_votes_for_instance(&mut self, instance: &mut dyn Instance) -> Vec<f64>;
    fn set_model_context(&mut self, header: Arc<InstanceHeader>) -> Result<(), ClassifierError>;
    fn train_on_instance(&mut self, instance: &dyn Instance);
    fn reset(&mut self);
    fn is_randomizable(&self) -> bool {
        false
    }
    fn calc_memory_size(&self) -> usize;
}
