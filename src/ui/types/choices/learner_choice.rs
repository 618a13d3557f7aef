use crate::classifiers::lazy::neighbour_search::SearchAlgorithm;
use crate::ui::types::choices::{UIChoice, params_value};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

fn default_k() -> usize {
    10
}

fn default_limit() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct KnnParameters {
    #[serde(default = "default_k")]
    #[schemars(
        title = "k",
        description = "Number of neighbours used in search",
        range(min = 1),
        default = "default_k"
    )]
    pub k: usize,

    #[serde(default = "default_limit")]
    #[schemars(
        title = "Limit",
        description = "Maximum number of instances to store",
        range(min = 1),
        default = "default_limit"
    )]
    pub limit: usize,

    #[serde(default)]
    #[schemars(
        title = "Weighted Vote",
        description = "Weight neighbour votes by inverse accumulated distance?"
    )]
    pub weighted_vote: bool,

    #[serde(default)]
    #[schemars(
        title = "Standardize Data",
        description = "Standardize features with running mean and variance?"
    )]
    pub standardize_data: bool,

    #[serde(default)]
    #[schemars(
        title = "Nearest Neighbour Search",
        description = "Brute force scan or KD-tree"
    )]
    pub search_algorithm: SearchAlgorithm,
}

impl Default for KnnParameters {
    fn default() -> Self {
        Self {
            k: default_k(),
            limit: default_limit(),
            weighted_vote: false,
            standardize_data: false,
            search_algorithm: SearchAlgorithm::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(LearnerKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum LearnerChoice {
    #[strum_discriminants(strum(
        message = "kNN",
        detailed_message = "k-nearest neighbours over a sliding window of recent instances."
    ))]
    Knn(KnnParameters),
}

impl UIChoice for LearnerChoice {
    type Kind = LearnerKind;

    fn schema() -> Schema {
        schema_for!(LearnerChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a learner:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            LearnerKind::Knn => params_value(KnnParameters::default()),
        }
    }
}
