use crate::classifiers::lazy::RunningStats;
use crate::core::instances::Instance;
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::io::{Error, ErrorKind};

/// Online z-score standardization driven by [`RunningStats`].
///
/// The running count `n` is supplied by the caller (the classifier's
/// prediction counter). The first call only seeds the statistics; later calls
/// accumulate the instance and rewrite its features as
/// `(x - mean) / sqrt(variance)`. While the window is still empty every
/// feature is zeroed instead.
///
/// A feature whose variance is not strictly positive and finite (constant
/// stream, `n < 2`) standardizes to `0.0` rather than to `NaN` or infinity.
/// Missing values are left out of the statistics and stay missing.
#[derive(Clone, Debug, Default)]
pub struct Standardizer {
    stats: Option<RunningStats>,
    mean: Vec<f64>,
    variance: Vec<f64>,
    standardized: Vec<f64>,
}

impl Standardizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standardize(
        &mut self,
        instance: &mut dyn Instance,
        n: u64,
        window_is_empty: bool,
    ) -> Result<(), Error> {
        let values = instance.to_vec();
        let class_index = instance.class_index();

        let first_call = match &self.stats {
            None => {
                self.stats = Some(RunningStats::from_first(&values, class_index));
                self.mean = vec![0.0; values.len()];
                self.variance = vec![0.0; values.len()];
                self.standardized = vec![0.0; values.len()];
                true
            }
            Some(stats) if stats.len() != values.len() => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "instance has {} values, running statistics track {}",
                        values.len(),
                        stats.len()
                    ),
                ));
            }
            Some(_) => false,
        };

        if window_is_empty {
            for f in feature_indices(values.len(), class_index) {
                instance.set_value_at_index(f, 0.0)?;
            }
            return Ok(());
        }

        if first_call {
            return Ok(());
        }

        let Some(stats) = self.stats.as_mut() else {
            return Ok(());
        };
        stats.accumulate(&values);

        let n = n as f64;
        for f in feature_indices(values.len(), class_index) {
            self.mean[f] = stats.mean(f, n);
            self.variance[f] = stats.variance(f, n);
            if values[f].is_nan() {
                continue;
            }
            self.standardized[f] = z_score(values[f], self.mean[f], self.variance[f], n);
            instance.set_value_at_index(f, self.standardized[f])?;
        }
        Ok(())
    }

    pub fn stats(&self) -> Option<&RunningStats> {
        self.stats.as_ref()
    }

    /// Mean computed for each attribute by the latest standardizing call.
    pub fn means(&self) -> &[f64] {
        &self.mean
    }

    /// Variance computed for each attribute by the latest standardizing call.
    pub fn variances(&self) -> &[f64] {
        &self.variance
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn feature_indices(len: usize, class_index: usize) -> impl Iterator<Item = usize> {
    (0..len).filter(move |&f| f != class_index)
}

#[inline]
fn z_score(x: f64, mean: f64, variance: f64, n: f64) -> f64 {
    if n < 2.0 || !(variance.is_finite() && variance > 0.0) {
        return 0.0;
    }
    (x - mean) / variance.sqrt()
}

impl MemorySized for Standardizer {
    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        if let Some(stats) = &self.stats {
            total += meter.measure_field(stats);
        }
        total += meter.measure_field(&self.mean);
        total += meter.measure_field(&self.variance);
        total += meter.measure_field(&self.standardized);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instances::DenseInstance;
    use crate::testing::numeric_header;

    const EPS: f64 = 1e-12;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS
    }

    fn inst(x: f64, y: f64, class: f64) -> DenseInstance {
        DenseInstance::new(numeric_header(2, 2), vec![x, y, class], 1.0)
    }

    #[test]
    fn first_call_with_empty_window_zeroes_features() {
        let mut s = Standardizer::new();
        let mut i = inst(3.0, -4.0, 1.0);
        s.standardize(&mut i, 1, true).unwrap();
        assert_eq!(i.values(), &[0.0, 0.0, 1.0]);
        let stats = s.stats().expect("seeded");
        assert_eq!(stats.sum(0), 3.0);
        assert_eq!(stats.sum_of_squares(1), 16.0);
    }

    #[test]
    fn first_call_with_populated_window_only_seeds() {
        let mut s = Standardizer::new();
        let mut i = inst(3.0, -4.0, 1.0);
        s.standardize(&mut i, 1, false).unwrap();
        assert_eq!(i.values(), &[3.0, -4.0, 1.0]);
        assert_eq!(s.stats().unwrap().sum(0), 3.0);
    }

    #[test]
    fn later_calls_standardize_with_running_moments() {
        let mut s = Standardizer::new();
        s.standardize(&mut inst(1.0, 10.0, 0.0), 1, true).unwrap();

        let mut second = inst(3.0, 10.0, 1.0);
        s.standardize(&mut second, 2, false).unwrap();

        // x: sum 4, sum_sq 10, mean 2, variance (10 - 8) / 1 = 2
        assert!(approx(s.means()[0], 2.0));
        assert!(approx(s.variances()[0], 2.0));
        assert!(approx(second.values()[0], 1.0 / 2.0_f64.sqrt()));
        // y is constant: zero variance standardizes to 0
        assert_eq!(second.values()[1], 0.0);
        assert_eq!(second.values()[2], 1.0);
    }

    #[test]
    fn empty_window_after_seeding_still_zeroes_and_skips_accumulation() {
        let mut s = Standardizer::new();
        s.standardize(&mut inst(1.0, 1.0, 0.0), 1, true).unwrap();
        let mut i = inst(5.0, 5.0, 0.0);
        s.standardize(&mut i, 2, true).unwrap();
        assert_eq!(i.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(s.stats().unwrap().sum(0), 1.0);
    }

    #[test]
    fn missing_value_does_not_erase_the_feature() {
        let mut s = Standardizer::new();
        s.standardize(&mut inst(1.0, 0.0, 0.0), 1, true).unwrap();

        let mut gap = inst(f64::NAN, 1.0, 0.0);
        s.standardize(&mut gap, 2, false).unwrap();
        assert!(gap.values()[0].is_nan());
        assert_eq!(s.stats().unwrap().sum(0), 1.0);

        let mut outs = Vec::new();
        for (n, x) in [(3, 5.0), (4, -7.0), (5, 100.0)] {
            let mut i = inst(x, 0.0, 0.0);
            s.standardize(&mut i, n, false).unwrap();
            outs.push(i.values()[0]);
        }
        assert!(s.stats().unwrap().sum(0).is_finite());
        assert!(outs.iter().all(|v| v.is_finite() && *v != 0.0), "{outs:?}");
    }

    #[test]
    fn single_observation_guard_yields_zero() {
        assert_eq!(z_score(4.0, 1.0, f64::NAN, 1.0), 0.0);
        assert_eq!(z_score(4.0, 1.0, f64::INFINITY, 3.0), 0.0);
        assert_eq!(z_score(4.0, 1.0, 0.0, 3.0), 0.0);
        assert!(approx(z_score(4.0, 1.0, 9.0, 3.0), 1.0));
    }

    #[test]
    fn arity_change_is_rejected() {
        let mut s = Standardizer::new();
        s.standardize(&mut inst(1.0, 1.0, 0.0), 1, true).unwrap();
        let mut wider = DenseInstance::new(numeric_header(3, 2), vec![1.0, 2.0, 3.0, 0.0], 1.0);
        let err = s.standardize(&mut wider, 2, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn replay_is_bit_identical() {
        let stream = [(1.0, 2.0), (2.5, -1.0), (0.5, 4.0), (3.0, 3.0)];
        let run = || {
            let mut s = Standardizer::new();
            let mut out = Vec::new();
            for (n, &(x, y)) in stream.iter().enumerate() {
                let mut i = inst(x, y, 0.0);
                s.standardize(&mut i, n as u64 + 1, n == 0).unwrap();
                out.push(i.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>());
            }
            out
        };
        assert_eq!(run(), run());
    }
}
