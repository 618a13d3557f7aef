use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::Stream;
use crate::testing::numeric_header;
use std::io::Error;
use std::sync::Arc;

/// In-memory stream of one-feature instances `[label, label]`.
pub struct VecStream {
    header: Arc<InstanceHeader>,
    labels: Vec<usize>,
    position: usize,
}

impl VecStream {
    pub fn new(labels: Vec<usize>) -> Self {
        let num_classes = labels.iter().copied().max().map_or(2, |m| (m + 1).max(2));
        Self {
            header: numeric_header(1, num_classes),
            labels,
            position: 0,
        }
    }
}

impl Stream for VecStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.position < self.labels.len()
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        let label = *self.labels.get(self.position)? as f64;
        self.position += 1;
        Some(Box::new(DenseInstance::new(
            Arc::clone(&self.header),
            vec![label, label],
            1.0,
        )))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.position = 0;
        Ok(())
    }
}
