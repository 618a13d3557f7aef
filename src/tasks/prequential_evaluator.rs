use crate::classifiers::Classifier;
use crate::evaluation::{LearningCurve, PerformanceEvaluator, Snapshot};
use crate::streams::Stream;
use cpu_time::ThreadTime;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::sync::mpsc::Sender;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Test-then-train loop: every instance is first predicted and scored, then
/// handed to the learner. The learner may rewrite the instance while
/// predicting, and it trains on that rewritten instance.
pub struct PrequentialEvaluator {
    learner: Box<dyn Classifier>,
    stream: Box<dyn Stream>,
    evaluator: Box<dyn PerformanceEvaluator>,

    curve: LearningCurve,

    max_instances: Option<u64>,
    max_seconds: Option<u64>,
    sample_frequency: u64,
    mem_check_frequency: u64,

    processed: u64,

    start_cpu: ThreadTime,
    last_cpu_mem: ThreadTime,

    ram_hours: f64,
    progress_tx: Option<Sender<Snapshot>>,
}

impl PrequentialEvaluator {
    pub fn new(
        mut learner: Box<dyn Classifier>,
        stream: Box<dyn Stream>,
        evaluator: Box<dyn PerformanceEvaluator>,
        max_instances: Option<u64>,
        max_seconds: Option<u64>,
        sample_frequency: u64,
        mem_check_frequency: u64,
    ) -> Result<Self, Error> {
        if sample_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "sample_frequency must be > 0",
            ));
        }
        if mem_check_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "mem_check_frequency must be > 0",
            ));
        }

        learner
            .set_model_context(Arc::new(stream.header().clone()))
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;

        let now = ThreadTime::now();
        Ok(Self {
            learner,
            stream,
            evaluator,
            curve: LearningCurve::default(),
            max_instances,
            max_seconds,
            sample_frequency,
            mem_check_frequency,
            processed: 0,
            start_cpu: now,
            last_cpu_mem: now,
            ram_hours: 0.0,
            progress_tx: None,
        })
    }

    pub fn with_progress(mut self, tx: Sender<Snapshot>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    fn limit_reached(&self) -> bool {
        self.max_instances.is_some_and(|n| self.processed >= n)
            || self
                .max_seconds
                .is_some_and(|s| self.start_cpu.elapsed().as_secs() >= s)
    }

    pub fn run(&mut self) -> Result<(), Error> {
        self.start_cpu = ThreadTime::now();
        self.last_cpu_mem = self.start_cpu;

        while self.stream.has_more_instances() && !self.limit_reached() {
            let Some(mut instance) = self.stream.next_instance() else {
                break;
            };
            self.processed += 1;

            let votes = self.learner.get_votes_for_instance(instance.as_mut());
            self.evaluator.add_result(instance.as_ref(), votes);
            self.learner.train_on_instance(instance.as_ref());

            if self.processed % self.mem_check_frequency == 0 {
                self.accumulate_ram_hours();
            }
            if self.processed % self.sample_frequency == 0 {
                self.record_snapshot();
            }
        }

        self.accumulate_ram_hours();
        self.record_snapshot();
        Ok(())
    }

    fn record_snapshot(&mut self) {
        let mut accuracy = f64::NAN;
        let mut kappa = f64::NAN;
        let mut extras = BTreeMap::new();

        for m in self.evaluator.performance() {
            match m.name.as_str() {
                "accuracy" => accuracy = m.value,
                "kappa" => kappa = m.value,
                _ => {
                    extras.insert(m.name, m.value);
                }
            }
        }

        let snapshot = Snapshot {
            instances_seen: self.processed,
            accuracy,
            kappa,
            ram_hours: self.ram_hours,
            seconds: self.start_cpu.elapsed().as_secs_f64(),
            extras,
        };

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(snapshot.clone());
        }
        self.curve.push(snapshot);
    }

    fn accumulate_ram_hours(&mut self) {
        let hours = self.last_cpu_mem.elapsed().as_secs_f64() / 3600.0;
        self.last_cpu_mem = ThreadTime::now();

        let model_gb = self.learner.calc_memory_size() as f64 / BYTES_PER_GB;
        self.ram_hours += model_gb * hours;
    }
}
