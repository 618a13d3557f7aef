use crate::core::instances::Instance;
use crate::evaluation::Measurement;

pub trait PerformanceEvaluator {
    fn reset(&mut self);

    /// Scores one prediction. `votes` may be empty when the learner abstains.
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>);

    fn performance(&self) -> Vec<Measurement>;
}
