use crate::utils::memory::{MemoryMeter, MemorySized};

/// Per-attribute running sum and sum of squares.
///
/// The class slot is carried along so indices line up with instance values,
/// but it is never accumulated. Missing (`NaN`) values are skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct RunningStats {
    class_index: usize,
    sum: Vec<f64>,
    sum_of_squares: Vec<f64>,
}

impl RunningStats {
    /// Seeds the sums with the raw values of a first observation.
    pub fn from_first(values: &[f64], class_index: usize) -> Self {
        let mut stats = Self {
            class_index,
            sum: vec![0.0; values.len()],
            sum_of_squares: vec![0.0; values.len()],
        };
        stats.accumulate(values);
        stats
    }

    pub fn accumulate(&mut self, values: &[f64]) {
        for (f, &x) in values.iter().enumerate().take(self.sum.len()) {
            if f == self.class_index || x.is_nan() {
                continue;
            }
            self.sum[f] += x;
            self.sum_of_squares[f] += x * x;
        }
    }

    pub fn len(&self) -> usize {
        self.sum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sum.is_empty()
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn sum(&self, f: usize) -> f64 {
        self.sum[f]
    }

    pub fn sum_of_squares(&self, f: usize) -> f64 {
        self.sum_of_squares[f]
    }

    /// `sum / n`.
    pub fn mean(&self, f: usize, n: f64) -> f64 {
        self.sum[f] / n
    }

    /// Sample variance `(sum_sq - sum^2 / n) / (n - 1)`. Not finite for `n <= 1`.
    pub fn variance(&self, f: usize, n: f64) -> f64 {
        (self.sum_of_squares[f] - self.sum[f] * self.sum[f] / n) / (n - 1.0)
    }
}

impl MemorySized for RunningStats {
    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.sum) + meter.measure_field(&self.sum_of_squares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn first_observation_seeds_sums_without_class() {
        let stats = RunningStats::from_first(&[2.0, -3.0, 1.0], 2);
        assert_eq!(stats.sum(0), 2.0);
        assert_eq!(stats.sum(1), -3.0);
        assert_eq!(stats.sum_of_squares(1), 9.0);
        assert_eq!(stats.sum(2), 0.0);
        assert_eq!(stats.sum_of_squares(2), 0.0);
    }

    #[test]
    fn accumulate_skips_class_slot() {
        let mut stats = RunningStats::from_first(&[1.0, 0.0], 1);
        stats.accumulate(&[3.0, 1.0]);
        assert_eq!(stats.sum(0), 4.0);
        assert_eq!(stats.sum_of_squares(0), 10.0);
        assert_eq!(stats.sum(1), 0.0);
    }

    #[test]
    fn missing_values_are_not_accumulated() {
        let mut stats = RunningStats::from_first(&[f64::NAN, 2.0, 0.0], 2);
        stats.accumulate(&[1.0, f64::NAN, 1.0]);
        assert_eq!(stats.sum(0), 1.0);
        assert_eq!(stats.sum_of_squares(0), 1.0);
        assert_eq!(stats.sum(1), 2.0);
        assert_eq!(stats.sum_of_squares(1), 4.0);
    }

    #[test]
    fn mean_and_sample_variance() {
        let mut stats = RunningStats::from_first(&[-1.0, 0.0], 1);
        stats.accumulate(&[0.0, 0.0]);
        stats.accumulate(&[1.0, 0.0]);
        assert!((stats.mean(0, 3.0) - 0.0).abs() < EPS);
        assert!((stats.variance(0, 3.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn variance_with_single_observation_is_not_finite() {
        let stats = RunningStats::from_first(&[5.0, 0.0], 1);
        assert!(!stats.variance(0, 1.0).is_finite());
    }
}
