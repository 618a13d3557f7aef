use crate::classifiers::lazy::Window;

/// Euclidean distance over every non-class attribute, with numeric values
/// rescaled to `[0, 1]` by the ranges observed in the window.
///
/// Nominal attributes contribute 0 when equal and 1 otherwise. A missing
/// value contributes the largest difference still possible given the other
/// value.
#[derive(Clone, Debug)]
pub struct EuclideanDistance {
    class_index: usize,
    nominal: Vec<bool>,
    ranges: Vec<Option<(f64, f64)>>,
    normalize: bool,
}

impl EuclideanDistance {
    pub fn fit(window: &Window, normalize: bool) -> Self {
        let header = window.header();
        let n = header.number_of_attributes();
        let class_index = header.class_index();

        let nominal: Vec<bool> = header.attributes.iter().map(|a| a.is_nominal()).collect();

        let mut ranges: Vec<Option<(f64, f64)>> = vec![None; n];
        for instance in window {
            for (i, &v) in instance.values().iter().enumerate().take(n) {
                if i == class_index || nominal[i] || v.is_nan() {
                    continue;
                }
                ranges[i] = Some(match ranges[i] {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }

        Self {
            class_index,
            nominal,
            ranges,
            normalize,
        }
    }

    pub fn is_nominal(&self, index: usize) -> bool {
        self.nominal.get(index).copied().unwrap_or(false)
    }

    pub fn range(&self, index: usize) -> Option<(f64, f64)> {
        self.ranges.get(index).copied().flatten()
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Value of attribute `index` in normalized space. A degenerate range maps to 0.
    #[inline]
    pub fn norm(&self, index: usize, v: f64) -> f64 {
        if !self.normalize {
            return v;
        }
        match self.range(index) {
            Some((lo, hi)) if hi > lo => (v - lo) / (hi - lo),
            _ => 0.0,
        }
    }

    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let mut sum = 0.0;
        for index in 0..self.nominal.len().min(a.len()).min(b.len()) {
            if index == self.class_index {
                continue;
            }
            let diff = self.difference(index, a[index], b[index]);
            sum += diff * diff;
        }
        sum.sqrt()
    }

    fn difference(&self, index: usize, a: f64, b: f64) -> f64 {
        if self.nominal[index] {
            return if a.is_nan() || b.is_nan() || a != b {
                1.0
            } else {
                0.0
            };
        }

        match (a.is_nan(), b.is_nan()) {
            (true, true) => 1.0,
            (true, false) => self.missing_difference(index, b),
            (false, true) => self.missing_difference(index, a),
            (false, false) => self.norm(index, a) - self.norm(index, b),
        }
    }

    fn missing_difference(&self, index: usize, present: f64) -> f64 {
        let v = self.norm(index, present);
        if self.normalize {
            v.max(1.0 - v)
        } else {
            v.abs()
        }
    }
}
