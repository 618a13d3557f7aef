use anyhow::{Context, Result};

use crate::classifiers::Classifier;
use crate::classifiers::lazy::{Knn, VoteMode};
use crate::evaluation::{BasicClassificationEvaluator, BasicEstimator, PerformanceEvaluator};
use crate::streams::{ArffFileStream, SeaGenerator, Stream};
use crate::ui::types::choices::{EvaluatorChoice, LearnerChoice, StreamChoice};

pub fn build_learner(choice: LearnerChoice) -> Result<Box<dyn Classifier>> {
    match choice {
        LearnerChoice::Knn(p) => {
            let vote_mode = if p.weighted_vote {
                VoteMode::InverseDistance
            } else {
                VoteMode::Unweighted
            };
            let knn = Knn::new(
                p.k,
                p.limit,
                vote_mode,
                p.standardize_data,
                p.search_algorithm.build(),
            )?;
            Ok(Box::new(knn))
        }
    }
}

pub fn build_stream(choice: StreamChoice) -> Result<Box<dyn Stream>> {
    match choice {
        StreamChoice::ArffFile(p) => {
            let stream = ArffFileStream::new(p.path.clone(), p.class_index)
                .with_context(|| format!("cannot open {}", p.path.display()))?;
            Ok(Box::new(stream))
        }
        StreamChoice::SeaGenerator(p) => Ok(Box::new(SeaGenerator::new(
            p.function_id,
            p.balance,
            p.noise_pct,
            p.max_instances,
            p.seed,
        )?)),
    }
}

/// The evaluator starts with no classes and grows to those it sees.
pub fn build_evaluator(choice: EvaluatorChoice) -> Result<Box<dyn PerformanceEvaluator>> {
    match choice {
        EvaluatorChoice::BasicClassification(p) => Ok(Box::new(
            BasicClassificationEvaluator::<BasicEstimator>::new(0, p.precision_recall_output),
        )),
    }
}
