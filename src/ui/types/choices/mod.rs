mod evaluator_choice;
mod learner_choice;
mod schema;
mod stream_choice;
mod task_choice;

pub use evaluator_choice::{BasicClassificationParameters, EvaluatorChoice, EvaluatorKind};
pub use learner_choice::{KnnParameters, LearnerChoice, LearnerKind};
pub use schema::{FieldKind, FieldSpec, PathRule, schema_of, specs_for_kind};
pub use stream_choice::{ArffParameters, SeaParameters, StreamChoice, StreamKind};
pub use task_choice::{DumpFormat, PrequentialParams, TaskChoice, TaskKind};

use crate::ui::cli::drivers::PromptDriver;
use anyhow::Result;
use schemars::{JsonSchema, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{EnumMessage, IntoEnumIterator};

/// Parameters of a variant that takes none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// A `{"type": .., "params": ..}` tagged enum the wizard and the CLI can build
/// from a kind plus a JSON parameter object.
pub trait UIChoice: Sized + Serialize + DeserializeOwned + JsonSchema {
    type Kind: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator;

    fn schema() -> Schema;

    fn prompt_label() -> &'static str;

    fn prompt_help() -> Option<&'static str> {
        None
    }

    fn default_params(kind: Self::Kind) -> Value;

    /// Extra fields that need prompts of their own (nested choices).
    fn subprompts<D: PromptDriver>(
        _driver: &D,
        _kind: Self::Kind,
    ) -> Result<Option<Map<String, Value>>> {
        Ok(None)
    }

    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let tag: &'static str = kind.into();
        Ok(serde_json::from_value(json!({ "type": tag, "params": params }))?)
    }
}

/// Serializes a parameter struct; these are plain data and always representable.
pub(crate) fn params_value<T: Serialize>(params: T) -> Value {
    serde_json::to_value(params).unwrap_or(Value::Null)
}
