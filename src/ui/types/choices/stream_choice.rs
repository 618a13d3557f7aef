use crate::ui::types::choices::{UIChoice, params_value};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 1;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_sea_function() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct ArffParameters {
    #[schemars(
        with = "String",
        title = "ARFF Path",
        description = "Path to .arff file",
        extend(
            "format" = "path",
            "x-file" = true,
            "x-must-exist" = true,
            "x-extensions" = ["arff"]
        )
    )]
    pub path: PathBuf,

    #[serde(default)]
    #[schemars(
        title = "Class Index",
        description = "Zero-based index of the class column (empty = last attribute)"
    )]
    pub class_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SeaParameters {
    #[serde(default = "default_sea_function")]
    #[schemars(
        title = "Function",
        description = "Classification function used, as defined in the original paper (1-4)",
        range(min = 1, max = 4),
        default = "default_sea_function"
    )]
    pub function_id: u8,

    #[serde(default)]
    #[schemars(title = "Balance", description = "Balance the number of instances of each class?")]
    pub balance: bool,

    #[serde(default)]
    #[schemars(
        title = "Noise",
        description = "Fraction of labels flipped (0.0-1.0)",
        range(min = 0.0, max = 1.0)
    )]
    pub noise_pct: f32,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Stop generating after this many instances (empty = infinite)"
    )]
    pub max_instances: Option<u64>,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "Seed for random generation of instances", default = "default_seed")]
    pub seed: u64,
}

impl Default for SeaParameters {
    fn default() -> Self {
        Self {
            function_id: default_sea_function(),
            balance: false,
            noise_pct: 0.1,
            max_instances: None,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StreamKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum StreamChoice {
    #[strum_discriminants(strum(
        message = "Arff File Stream",
        detailed_message = "A stream read from an ARFF file."
    ))]
    ArffFile(ArffParameters),

    #[strum_discriminants(strum(
        message = "SEA Generator",
        detailed_message = "Generates SEA concept functions."
    ))]
    SeaGenerator(SeaParameters),
}

impl UIChoice for StreamChoice {
    type Kind = StreamKind;

    fn schema() -> Schema {
        schema_for!(StreamChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a stream:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            StreamKind::ArffFile => params_value(ArffParameters::default()),
            StreamKind::SeaGenerator => params_value(SeaParameters::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::EnumMessage;

    fn properties_of<T: JsonSchema>() -> Value {
        let v = serde_json::to_value(schema_for!(T)).expect("schema to JSON");
        v.get("properties").cloned().unwrap_or_else(|| json!({}))
    }

    #[test]
    fn sea_defaults_survive_from_parts() {
        let params = StreamChoice::default_params(StreamKind::SeaGenerator);
        let StreamChoice::SeaGenerator(sea) =
            StreamChoice::from_parts(StreamKind::SeaGenerator, params).unwrap()
        else {
            panic!("expected SEA parameters");
        };
        assert_eq!(sea, SeaParameters::default());
    }

    #[test]
    fn sea_missing_fields_take_serde_defaults() {
        let sea: SeaParameters = serde_json::from_value(json!({"balance": true})).unwrap();
        assert_eq!(sea.function_id, 1);
        assert_eq!(sea.seed, DEFAULT_SEED);
        assert_eq!(sea.noise_pct, 0.0);
        assert!(sea.balance);
    }

    #[test]
    fn arff_class_index_is_optional() {
        let choice = StreamChoice::from_parts(StreamKind::ArffFile, json!({"path": "data/a.arff"}))
            .unwrap();
        let StreamChoice::ArffFile(p) = choice else {
            panic!("expected ARFF parameters");
        };
        assert_eq!(p.path, PathBuf::from("data/a.arff"));
        assert_eq!(p.class_index, None);
    }

    #[test]
    fn tags_are_kebab_case() {
        let v = serde_json::to_value(StreamChoice::SeaGenerator(SeaParameters::default())).unwrap();
        assert_eq!(v["type"], "sea-generator");
        let v = serde_json::to_value(StreamChoice::ArffFile(ArffParameters::default())).unwrap();
        assert_eq!(v["type"], "arff-file");
    }

    #[test]
    fn arff_path_schema_has_vendor_extensions() {
        let props = properties_of::<ArffParameters>();
        let path = &props["path"];
        assert_eq!(path["type"], "string");
        assert_eq!(path["format"], "path");
        assert_eq!(path["x-file"], true);
        assert_eq!(path["x-extensions"], json!(["arff"]));
    }

    #[test]
    fn sea_schema_has_ranges_and_defaults() {
        let props = properties_of::<SeaParameters>();
        assert_eq!(props["function_id"]["default"], 1);
        assert_eq!(props["function_id"]["minimum"], 1);
        assert_eq!(props["function_id"]["maximum"], 4);
        assert_eq!(props["noise_pct"]["maximum"].as_f64(), Some(1.0));
    }

    #[test]
    fn stream_kind_messages() {
        assert_eq!(StreamKind::ArffFile.get_message(), Some("Arff File Stream"));
        assert_eq!(StreamKind::SeaGenerator.get_message(), Some("SEA Generator"));
        assert!(StreamKind::SeaGenerator.get_detailed_message().is_some());
    }
}
