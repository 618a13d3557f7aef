/// Running estimate of a weighted quantity.
pub trait Estimator {
    fn add(&mut self, value: f64, weight: f64);

    /// Current estimate, `NaN` before any weight was observed.
    fn estimation(&self) -> f64;

    fn total_weight(&self) -> f64;

    fn reset(&mut self);
}
