use crate::evaluation::CurveFormat;
use crate::ui::cli::drivers::PromptDriver;
use crate::ui::cli::wizard::prompt_choice;
use crate::ui::types::choices::{EvaluatorChoice, LearnerChoice, StreamChoice, UIChoice};
use anyhow::Result;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DumpFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl From<DumpFormat> for CurveFormat {
    fn from(value: DumpFormat) -> Self {
        match value {
            DumpFormat::Csv => CurveFormat::Csv,
            DumpFormat::Tsv => CurveFormat::Tsv,
            DumpFormat::Json => CurveFormat::Json,
        }
    }
}

fn default_frequency() -> u64 {
    100_000
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrequentialParams {
    #[schemars(skip)]
    pub learner: LearnerChoice,
    #[schemars(skip)]
    pub stream: StreamChoice,
    #[schemars(skip)]
    pub evaluator: EvaluatorChoice,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Stop after this many instances (empty = unlimited)"
    )]
    pub max_instances: Option<u64>,

    #[serde(default)]
    #[schemars(
        title = "Max Seconds",
        description = "Stop after this many seconds of CPU time (empty = unlimited)"
    )]
    pub max_seconds: Option<u64>,

    #[serde(default = "default_frequency")]
    #[schemars(
        title = "Sample Frequency",
        description = "Record a learning curve snapshot every N instances",
        range(min = 1),
        default = "default_frequency"
    )]
    pub sample_frequency: u64,

    #[serde(default = "default_frequency")]
    #[schemars(
        title = "Memory Check Frequency",
        description = "Measure model size every N instances",
        range(min = 1),
        default = "default_frequency"
    )]
    pub mem_check_frequency: u64,

    #[serde(default)]
    #[schemars(
        with = "String",
        title = "Dump file",
        description = "If set, write the learning curve to this file at the end",
        extend("format" = "path", "x-file" = true, "x-must-exist" = false)
    )]
    pub dump_file: Option<PathBuf>,

    #[serde(default)]
    #[schemars(title = "Dump format", description = "csv / tsv / json (default: csv)")]
    pub dump_format: DumpFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(TaskKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum TaskChoice {
    #[strum_discriminants(strum(
        message = "Evaluate Prequential",
        detailed_message = "Test then train on every instance, sampling the learning curve."
    ))]
    EvaluatePrequential(PrequentialParams),
}

impl UIChoice for TaskChoice {
    type Kind = TaskKind;

    fn schema() -> Schema {
        schema_for!(TaskChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a task:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            TaskKind::EvaluatePrequential => json!({
                "max_instances": null,
                "max_seconds": null,
                "sample_frequency": default_frequency(),
                "mem_check_frequency": default_frequency(),
                "dump_file": null,
                "dump_format": "csv"
            }),
        }
    }

    fn subprompts<D: PromptDriver>(driver: &D, kind: Self::Kind) -> Result<Option<Map<String, Value>>> {
        match kind {
            TaskKind::EvaluatePrequential => {
                let learner = prompt_choice::<LearnerChoice, _>(driver)?;
                let stream = prompt_choice::<StreamChoice, _>(driver)?;
                let evaluator = prompt_choice::<EvaluatorChoice, _>(driver)?;

                let mut m = Map::new();
                m.insert("learner".into(), serde_json::to_value(learner)?);
                m.insert("stream".into(), serde_json::to_value(stream)?);
                m.insert("evaluator".into(), serde_json::to_value(evaluator)?);
                Ok(Some(m))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::types::choices::{EvaluatorKind, LearnerKind, StreamKind};

    fn props_of<T: JsonSchema>() -> Value {
        let v = serde_json::to_value(schema_for!(T)).expect("schema to JSON");
        v.get("properties").cloned().unwrap_or_else(|| json!({}))
    }

    fn make_choice_json<C: UIChoice>(kind: C::Kind) -> Value {
        let params = C::default_params(kind);
        let choice = C::from_parts(kind, params).expect("from_parts");
        serde_json::to_value(choice).expect("choice -> json")
    }

    fn nested_defaults() -> (Value, Value, Value) {
        (
            make_choice_json::<LearnerChoice>(LearnerKind::Knn),
            make_choice_json::<StreamChoice>(StreamKind::SeaGenerator),
            make_choice_json::<EvaluatorChoice>(EvaluatorKind::BasicClassification),
        )
    }

    #[test]
    fn default_params_have_expected_sampling_values() {
        let v = TaskChoice::default_params(TaskKind::EvaluatePrequential);
        assert_eq!(v["max_instances"], Value::Null);
        assert_eq!(v["max_seconds"], Value::Null);
        assert_eq!(v["sample_frequency"].as_u64(), Some(100_000));
        assert_eq!(v["mem_check_frequency"].as_u64(), Some(100_000));
        assert_eq!(v["dump_format"], "csv");
    }

    #[test]
    fn from_parts_builds_prequential_with_nested_choices() {
        let (learner, stream, evaluator) = nested_defaults();
        let params = json!({
            "learner": learner,
            "stream": stream,
            "evaluator": evaluator,
            "max_instances": 123u64,
            "sample_frequency": 10u64,
        });

        let TaskChoice::EvaluatePrequential(p) =
            TaskChoice::from_parts(TaskKind::EvaluatePrequential, params).expect("from_parts");

        assert_eq!(p.max_instances, Some(123));
        assert_eq!(p.max_seconds, None);
        assert_eq!(p.sample_frequency, 10);
        assert_eq!(p.mem_check_frequency, 100_000);
        assert_eq!(p.dump_format, DumpFormat::Csv);
        assert!(matches!(p.learner, LearnerChoice::Knn(_)));
        assert!(matches!(p.stream, StreamChoice::SeaGenerator(_)));
        assert!(matches!(p.evaluator, EvaluatorChoice::BasicClassification(_)));
    }

    #[test]
    fn task_choice_serializes_as_tagged_enum() {
        let (learner, stream, evaluator) = nested_defaults();
        let p = PrequentialParams {
            learner: serde_json::from_value(learner).unwrap(),
            stream: serde_json::from_value(stream).unwrap(),
            evaluator: serde_json::from_value(evaluator).unwrap(),
            max_instances: None,
            max_seconds: None,
            sample_frequency: 1000,
            mem_check_frequency: 1000,
            dump_file: None,
            dump_format: DumpFormat::Tsv,
        };

        let v = serde_json::to_value(TaskChoice::EvaluatePrequential(p)).unwrap();
        assert_eq!(v["type"], "evaluate-prequential");
        assert_eq!(v["params"]["learner"]["type"], "knn");
        assert_eq!(v["params"]["dump_format"], "tsv");
    }

    #[test]
    fn prequential_schema_hides_nested_choices() {
        let props = props_of::<PrequentialParams>();
        let obj = props.as_object().unwrap();

        assert!(!obj.contains_key("learner"));
        assert!(!obj.contains_key("stream"));
        assert!(!obj.contains_key("evaluator"));
        assert_eq!(obj["sample_frequency"]["minimum"].as_u64(), Some(1));
        assert_eq!(obj["mem_check_frequency"]["title"], "Memory Check Frequency");
        assert_eq!(obj["dump_file"]["x-must-exist"], false);
    }

    #[test]
    fn dump_format_maps_to_curve_format() {
        assert_eq!(CurveFormat::from(DumpFormat::default()), CurveFormat::Csv);
        assert_eq!(CurveFormat::from(DumpFormat::Json), CurveFormat::Json);
    }
}
