use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::stream::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::sync::Arc;

const THRESHOLDS: [f64; 4] = [8.0, 9.0, 7.0, 9.5];
const NUM_ATTRIBUTES: usize = 3;
const ATTRIBUTE_RANGE: f64 = 10.0;

/// SEA concepts generator: three numeric attributes uniform in `[0, 10)`,
/// class `groupA` when `x1 + x2 <= threshold` and `groupB` otherwise. Only the
/// first two attributes are relevant.
#[derive(Debug)]
pub struct SeaGenerator {
    header: Arc<InstanceHeader>,
    threshold: f64,
    balance: bool,
    noise_pct: f32,
    max_instances: Option<u64>,
    seed: u64,
    rng: StdRng,
    produced: u64,
    next_class_should_be_zero: bool,
}

impl SeaGenerator {
    pub fn new(
        function_id: u8,
        balance: bool,
        noise_pct: f32,
        max_instances: Option<u64>,
        seed: u64,
    ) -> Result<Self, Error> {
        let threshold = usize::from(function_id)
            .checked_sub(1)
            .and_then(|i| THRESHOLDS.get(i))
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("SEA function must be in 1..=4, got {function_id}"),
                )
            })?;
        if !(0.0..=1.0).contains(&noise_pct) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("noise_pct must be in [0, 1], got {noise_pct}"),
            ));
        }

        Ok(Self {
            header: Arc::new(Self::build_header()),
            threshold,
            balance,
            noise_pct,
            max_instances,
            seed,
            rng: StdRng::seed_from_u64(seed),
            produced: 0,
            next_class_should_be_zero: false,
        })
    }

    fn build_header() -> InstanceHeader {
        let mut attributes: Vec<AttributeRef> = (1..=NUM_ATTRIBUTES)
            .map(|i| Arc::new(NumericAttribute::new(format!("attrib{i}"))) as AttributeRef)
            .collect();
        attributes.push(Arc::new(NominalAttribute::from_labels(
            "class".into(),
            vec!["groupA".into(), "groupB".into()],
        )));
        InstanceHeader::new("SEAGenerator".into(), attributes, NUM_ATTRIBUTES)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn determine_class(&self, x1: f64, x2: f64) -> usize {
        if x1 + x2 <= self.threshold { 0 } else { 1 }
    }

    fn draw(&mut self) -> ([f64; NUM_ATTRIBUTES], usize) {
        loop {
            let x = [
                self.rng.random::<f64>() * ATTRIBUTE_RANGE,
                self.rng.random::<f64>() * ATTRIBUTE_RANGE,
                self.rng.random::<f64>() * ATTRIBUTE_RANGE,
            ];
            let group = self.determine_class(x[0], x[1]);
            if !self.balance {
                return (x, group);
            }
            if (group == 0) == self.next_class_should_be_zero {
                self.next_class_should_be_zero = !self.next_class_should_be_zero;
                return (x, group);
            }
        }
    }
}

impl Stream for SeaGenerator {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.max_instances.is_none_or(|max| self.produced < max)
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        if !self.has_more_instances() {
            return None;
        }

        let (x, mut group) = self.draw();
        if self.noise_pct > 0.0 && self.rng.random::<f32>() < self.noise_pct {
            group = 1 - group;
        }
        self.produced += 1;

        let mut values = x.to_vec();
        values.push(group as f64);
        Some(Box::new(DenseInstance::new(
            Arc::clone(&self.header),
            values,
            1.0,
        )))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        self.next_class_should_be_zero = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(generator: &mut SeaGenerator, n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| generator.next_instance().expect("instance").to_vec())
            .collect()
    }

    #[test]
    fn rejects_bad_function_and_noise() {
        assert_eq!(
            SeaGenerator::new(0, false, 0.0, None, 1).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SeaGenerator::new(5, false, 0.0, None, 1).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SeaGenerator::new(1, false, 1.5, None, 1).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn header_shape() {
        let generator = SeaGenerator::new(1, false, 0.0, None, 1).unwrap();
        let h = generator.header();
        assert_eq!(h.number_of_attributes(), 4);
        assert_eq!(h.class_index(), 3);
        assert_eq!(h.number_of_classes(), 2);
        assert_eq!(generator.threshold(), 8.0);
    }

    #[test]
    fn labels_follow_threshold_rule() {
        for function_id in 1..=4u8 {
            let mut generator = SeaGenerator::new(function_id, false, 0.0, None, 11).unwrap();
            let threshold = generator.threshold();
            for row in take(&mut generator, 500) {
                assert!(row[..3].iter().all(|v| (0.0..10.0).contains(v)));
                let expected = if row[0] + row[1] <= threshold { 0.0 } else { 1.0 };
                assert_eq!(row[3], expected);
            }
        }
    }

    #[test]
    fn same_seed_same_stream_and_restart_replays() {
        let mut a = SeaGenerator::new(2, true, 0.1, None, 42).unwrap();
        let mut b = SeaGenerator::new(2, true, 0.1, None, 42).unwrap();
        let first = take(&mut a, 50);
        assert_eq!(first, take(&mut b, 50));

        a.restart().unwrap();
        assert_eq!(take(&mut a, 50), first);
    }

    #[test]
    fn balance_alternates_classes() {
        let mut generator = SeaGenerator::new(3, true, 0.0, None, 5).unwrap();
        let classes: Vec<f64> = take(&mut generator, 20).iter().map(|r| r[3]).collect();
        for pair in classes.chunks(2) {
            assert_eq!(pair, [1.0, 0.0]);
        }
    }

    #[test]
    fn full_noise_flips_every_label() {
        let mut generator = SeaGenerator::new(1, false, 1.0, None, 3).unwrap();
        for row in take(&mut generator, 200) {
            let clean = if row[0] + row[1] <= 8.0 { 0.0 } else { 1.0 };
            assert_eq!(row[3], 1.0 - clean);
        }
    }

    #[test]
    fn max_instances_caps_the_stream() {
        let mut generator = SeaGenerator::new(1, false, 0.0, Some(3), 9).unwrap();
        assert_eq!(take(&mut generator, 3).len(), 3);
        assert!(!generator.has_more_instances());
        assert!(generator.next_instance().is_none());
    }
}
