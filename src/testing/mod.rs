mod dummies;
mod spies;
mod stubs;

pub use dummies::ClassifierNoneVotes;
pub use spies::{TrainSpyClassifier, TrainSpyHandle};
pub use stubs::{FailingSearch, OracleClassifier, VecStream};

use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use std::sync::Arc;

/// `num_features` numeric attributes `x0..` followed by a nominal `class`
/// attribute with labels `"0".."num_classes-1"`.
pub fn numeric_header(num_features: usize, num_classes: usize) -> Arc<InstanceHeader> {
    let mut attributes: Vec<AttributeRef> = (0..num_features)
        .map(|i| Arc::new(NumericAttribute::new(format!("x{i}"))) as AttributeRef)
        .collect();
    attributes.push(Arc::new(NominalAttribute::from_labels(
        "class".into(),
        (0..num_classes).map(|c| c.to_string()).collect(),
    )));
    Arc::new(InstanceHeader::new("test".into(), attributes, num_features))
}
