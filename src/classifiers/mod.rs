pub mod classifier;
pub mod lazy;

pub use classifier::{Classifier, ClassifierError};
