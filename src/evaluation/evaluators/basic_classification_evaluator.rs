use crate::core::instances::Instance;
use crate::evaluation::{Estimator, Measurement, PerformanceEvaluator};

/// Accuracy and Cohen's kappa over every scored instance, plus kappa against
/// the no-change (`kappa_t`) and majority-class (`kappa_m`) baselines.
/// Macro precision, recall and F1 are reported when enabled.
///
/// The predicted class is the first index holding the maximum vote.
pub struct BasicClassificationEvaluator<E: Estimator + Default> {
    num_classes: usize,
    precision_recall_output: bool,

    weight_correct: E,
    row_kappa: Vec<E>,
    column_kappa: Vec<E>,
    precision: Vec<E>,
    recall: Vec<E>,

    weight_correct_no_change: E,
    weight_majority: E,
    last_seen_class: Option<usize>,
    class_weights: Vec<f64>,
    total_weight: f64,
}

impl<E: Estimator + Default> BasicClassificationEvaluator<E> {
    pub fn new(num_classes: usize, precision_recall_output: bool) -> Self {
        let mut evaluator = Self {
            num_classes,
            precision_recall_output,
            weight_correct: E::default(),
            row_kappa: Vec::new(),
            column_kappa: Vec::new(),
            precision: Vec::new(),
            recall: Vec::new(),
            weight_correct_no_change: E::default(),
            weight_majority: E::default(),
            last_seen_class: None,
            class_weights: Vec::new(),
            total_weight: 0.0,
        };
        evaluator.reset();
        evaluator
    }

    pub fn new_with_default_flags(num_classes: usize) -> Self {
        Self::new(num_classes, false)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn grow_to(&mut self, num_classes: usize) {
        if num_classes <= self.num_classes {
            return;
        }
        self.num_classes = num_classes;
        self.row_kappa.resize_with(num_classes, E::default);
        self.column_kappa.resize_with(num_classes, E::default);
        self.precision.resize_with(num_classes, E::default);
        self.recall.resize_with(num_classes, E::default);
        self.class_weights.resize(num_classes, 0.0);
    }

    fn majority_class(&self) -> Option<usize> {
        argmax(&self.class_weights).filter(|&c| self.class_weights[c] > 0.0)
    }

    pub fn accuracy(&self) -> f64 {
        self.weight_correct.estimation()
    }

    pub fn kappa(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let pc: f64 = self
            .row_kappa
            .iter()
            .zip(&self.column_kappa)
            .map(|(row, column)| or_zero(row.estimation()) * or_zero(column.estimation()))
            .sum();
        relative_gain(self.accuracy(), pc)
    }

    pub fn kappa_temporal(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        relative_gain(self.accuracy(), self.weight_correct_no_change.estimation())
    }

    pub fn kappa_majority(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        relative_gain(self.accuracy(), self.weight_majority.estimation())
    }

    fn macro_average(per_class: &[E]) -> f64 {
        let defined: Vec<f64> = per_class
            .iter()
            .map(Estimator::estimation)
            .filter(|v| !v.is_nan())
            .collect();
        if defined.is_empty() {
            f64::NAN
        } else {
            defined.iter().sum::<f64>() / defined.len() as f64
        }
    }

    pub fn precision(&self) -> f64 {
        Self::macro_average(&self.precision)
    }

    pub fn recall(&self) -> f64 {
        Self::macro_average(&self.recall)
    }

    pub fn f1(&self) -> f64 {
        let per_class: Vec<f64> = self
            .precision
            .iter()
            .zip(&self.recall)
            .filter_map(|(p, r)| {
                let (p, r) = (p.estimation(), r.estimation());
                if p.is_nan() || r.is_nan() {
                    None
                } else if p + r > 0.0 {
                    Some(2.0 * p * r / (p + r))
                } else {
                    Some(0.0)
                }
            })
            .collect();
        if per_class.is_empty() {
            f64::NAN
        } else {
            per_class.iter().sum::<f64>() / per_class.len() as f64
        }
    }
}

impl<E: Estimator + Default> PerformanceEvaluator for BasicClassificationEvaluator<E> {
    fn reset(&mut self) {
        let n = self.num_classes;
        self.weight_correct = E::default();
        self.row_kappa = (0..n).map(|_| E::default()).collect();
        self.column_kappa = (0..n).map(|_| E::default()).collect();
        self.precision = (0..n).map(|_| E::default()).collect();
        self.recall = (0..n).map(|_| E::default()).collect();
        self.weight_correct_no_change = E::default();
        self.weight_majority = E::default();
        self.last_seen_class = None;
        self.class_weights = vec![0.0; n];
        self.total_weight = 0.0;
    }

    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>) {
        let weight = instance.weight();
        if weight <= 0.0 {
            return;
        }
        let Some(true_class) = instance.class_value().map(|c| c as usize) else {
            return;
        };
        let Some(predicted) = argmax(&votes) else {
            return;
        };

        self.grow_to(votes.len().max(true_class + 1).max(instance.number_of_classes()));

        let hit = |ok: bool| if ok { 1.0 } else { 0.0 };
        let correct = predicted == true_class;

        self.weight_correct.add(hit(correct), weight);
        for class in 0..self.num_classes {
            self.row_kappa[class].add(hit(predicted == class), weight);
            self.column_kappa[class].add(hit(true_class == class), weight);
        }
        self.precision[predicted].add(hit(correct), weight);
        self.recall[true_class].add(hit(correct), weight);

        let no_change_hit = hit(self.last_seen_class == Some(true_class));
        let majority_hit = hit(self.majority_class() == Some(true_class));
        self.weight_correct_no_change.add(no_change_hit, weight);
        self.weight_majority.add(majority_hit, weight);

        self.last_seen_class = Some(true_class);
        self.class_weights[true_class] += weight;
        self.total_weight += weight;
    }

    fn performance(&self) -> Vec<Measurement> {
        let mut out = vec![
            Measurement::new("accuracy", self.accuracy()),
            Measurement::new("kappa", self.kappa()),
            Measurement::new("kappa_t", self.kappa_temporal()),
            Measurement::new("kappa_m", self.kappa_majority()),
        ];
        if self.precision_recall_output {
            out.push(Measurement::new("precision", self.precision()));
            out.push(Measurement::new("recall", self.recall()));
            out.push(Measurement::new("f1", self.f1()));
        }
        out
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

fn or_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

/// `(observed - baseline) / (1 - baseline)`, 0 when the baseline is already perfect.
fn relative_gain(observed: f64, baseline: f64) -> f64 {
    if baseline < 1.0 {
        (observed - baseline) / (1.0 - baseline)
    } else {
        0.0
    }
}
