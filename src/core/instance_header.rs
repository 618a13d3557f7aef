use crate::core::attributes::{Attribute, AttributeRef, NominalAttribute};
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::fmt;
use std::mem::size_of;

#[derive(Clone)]
pub struct InstanceHeader {
    relation_name: String,
    pub attributes: Vec<AttributeRef>,
    class_index: usize,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<AttributeRef>,
        class_index: usize,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_index,
        }
    }

    pub fn class_attribute(&self) -> Option<&dyn Attribute> {
        self.attribute_at_index(self.class_index)
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        self.attributes
            .get(index)
            .map(|attr| attr.as_ref() as &dyn Attribute)
    }

    pub fn attribute_ref(&self, index: usize) -> Option<&AttributeRef> {
        self.attributes.get(index)
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name() == name)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Domain size of the nominal class attribute, 0 when the class is not nominal.
    pub fn number_of_classes(&self) -> usize {
        self.attributes
            .get(self.class_index)
            .and_then(|attr| attr.as_any().downcast_ref::<NominalAttribute>())
            .map_or(0, NominalAttribute::number_of_values)
    }

    /// Indices of every attribute except the class.
    pub fn feature_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.attributes.len()).filter(move |&i| i != self.class_index)
    }
}

impl MemorySized for InstanceHeader {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.relation_name) + meter.measure_field(&self.attributes)
    }
}

impl fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field("class_index", &self.class_index)
            .field("n_attributes", &self.attributes.len())
            .finish()
    }
}
