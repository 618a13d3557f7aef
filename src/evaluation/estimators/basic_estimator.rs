use crate::evaluation::Estimator;

/// Weighted mean of every observation since the last reset.
#[derive(Clone, Debug, Default)]
pub struct BasicEstimator {
    weighted_sum: f64,
    weight_sum: f64,
}

impl Estimator for BasicEstimator {
    fn add(&mut self, value: f64, weight: f64) {
        self.weighted_sum += value * weight;
        self.weight_sum += weight;
    }

    fn estimation(&self) -> f64 {
        if self.weight_sum > 0.0 {
            self.weighted_sum / self.weight_sum
        } else {
            f64::NAN
        }
    }

    fn total_weight(&self) -> f64 {
        self.weight_sum
    }

    fn reset(&mut self) {
        self.weighted_sum = 0.0;
        self.weight_sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_estimate_is_nan() {
        assert!(BasicEstimator::default().estimation().is_nan());
    }

    #[test]
    fn weighted_mean() {
        let mut e = BasicEstimator::default();
        e.add(1.0, 1.0);
        e.add(0.0, 3.0);
        assert_eq!(e.estimation(), 0.25);
        assert_eq!(e.total_weight(), 4.0);

        e.reset();
        assert!(e.estimation().is_nan());
    }
}
