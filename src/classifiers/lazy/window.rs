use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::collections::VecDeque;
use std::collections::vec_deque::Iter;
use std::mem::size_of;
use std::sync::Arc;

/// Bounded FIFO memory of the most recent training instances.
///
/// Insertion order is recency order: index 0 is the oldest instance and the
/// one evicted when a new instance arrives at full capacity.
#[derive(Clone, Debug)]
pub struct Window {
    header: Arc<InstanceHeader>,
    limit: usize,
    instances: VecDeque<DenseInstance>,
}

impl Window {
    /// `limit` is clamped to at least one slot.
    pub fn new(header: Arc<InstanceHeader>, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            header,
            limit,
            instances: VecDeque::with_capacity(limit.min(1024)),
        }
    }

    /// Stores a copy of `instance` with unit weight, evicting the oldest
    /// entry first when full. Returns the evicted instance, if any.
    pub fn add(&mut self, instance: &dyn Instance) -> Option<DenseInstance> {
        let evicted = if self.instances.len() >= self.limit {
            self.instances.pop_front()
        } else {
            None
        };

        let stored = DenseInstance::new(Arc::clone(&self.header), instance.to_vec(), 1.0);
        self.instances.push_back(stored);
        evicted
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn header(&self) -> &InstanceHeader {
        &self.header
    }

    pub fn shared_header(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    pub fn get(&self, index: usize) -> Option<&DenseInstance> {
        self.instances.get(index)
    }

    pub fn iter(&self) -> Iter<'_, DenseInstance> {
        self.instances.iter()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = &'a DenseInstance;
    type IntoIter = Iter<'a, DenseInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl MemorySized for Window {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.header) + meter.measure_field(&self.instances)
    }
}
