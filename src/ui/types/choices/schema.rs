use anyhow::{Context, Result, anyhow};
use schemars::{JsonSchema, Schema, schema_for};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// One promptable parameter of a choice variant, read off its JSON schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed: Option<Vec<String>>,
    pub path: Option<PathRule>,
}

/// File constraints carried by `x-file` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    pub must_exist: bool,
    pub extensions: Vec<String>,
}

/// Whole tagged-enum schema for `T`.
pub fn schema_of<T: JsonSchema>() -> Schema {
    schema_for!(T)
}

type Object = Map<String, Value>;

/// Field specs for the variant whose `type` tag is `kind_key`. Variants
/// without a `params` object yield no fields.
pub fn specs_for_kind(root: &Schema, kind_key: &str) -> Result<Vec<FieldSpec>> {
    let root_obj = root.as_object().context("root schema is not an object")?;
    let branch_props = find_branch(root_obj, kind_key)?;

    let Some(params) = branch_props
        .get("params")
        .and_then(Value::as_object)
        .and_then(|p| resolve_ref_obj(root_obj, p))
    else {
        return Ok(Vec::new());
    };
    let Some(properties) = params.get("properties").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let required: Vec<&str> = params
        .get("required")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut out = Vec::with_capacity(properties.len());
    for (name, field) in properties {
        let field = field
            .as_object()
            .with_context(|| format!("schema of '{name}' is not an object"))?;
        if let Some(spec) = field_spec(root_obj, name, field, required.contains(&name.as_str()))? {
            out.push(spec);
        }
    }
    Ok(out)
}

fn find_branch<'a>(root_obj: &'a Object, kind_key: &str) -> Result<&'a Object> {
    let branches = root_obj
        .get("oneOf")
        .or_else(|| root_obj.get("anyOf"))
        .and_then(Value::as_array)
        .context("missing oneOf/anyOf")?;

    branches
        .iter()
        .filter_map(|b| b.as_object()?.get("properties")?.as_object())
        .find(|props| discriminant_matches(props, kind_key))
        .ok_or_else(|| anyhow!("no branch found for type={kind_key}"))
}

/// Builds a spec from a property schema. Annotations on the property win over
/// those of a `$ref` target; unsupported types are skipped.
fn field_spec(
    root_obj: &Object,
    name: &str,
    field: &Object,
    required: bool,
) -> Result<Option<FieldSpec>> {
    let target = if field.contains_key("$ref") {
        resolve_ref_obj(root_obj, field)
            .ok_or_else(|| anyhow!("failed to resolve field $ref for '{name}'"))?
    } else {
        field
    };
    let lookup = |key: &str| field.get(key).or_else(|| target.get(key));

    let Some(kind) = detect_field_kind(target.get("type")) else {
        return Ok(None);
    };

    let bound = |inclusive: &str, exclusive: &str| {
        lookup(inclusive)
            .or_else(|| lookup(exclusive))
            .and_then(Value::as_f64)
    };

    Ok(Some(FieldSpec {
        name: name.to_string(),
        title: lookup("title")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        description: lookup("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        required,
        kind,
        default: lookup("default").cloned(),
        min: bound("minimum", "exclusiveMinimum"),
        max: bound("maximum", "exclusiveMaximum"),
        allowed: target.get("enum").and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        }),
        path: path_rule(field),
    }))
}

fn path_rule(field: &Object) -> Option<PathRule> {
    if field.get("x-file").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    Some(PathRule {
        must_exist: field
            .get("x-must-exist")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        extensions: field
            .get("x-extensions")
            .and_then(Value::as_array)
            .map(|exts| exts.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
    })
}

fn discriminant_matches(props: &Object, kind_key: &str) -> bool {
    let Some(tag) = props.get("type").and_then(Value::as_object) else {
        return false;
    };
    if tag.get("const").and_then(Value::as_str) == Some(kind_key) {
        return true;
    }
    matches!(
        tag.get("enum").and_then(Value::as_array).map(Vec::as_slice),
        Some([only]) if only.as_str() == Some(kind_key)
    )
}

/// Follows a local `$ref` such as `#/$defs/SeaParameters`; objects without a
/// `$ref` resolve to themselves.
fn resolve_ref_obj<'a>(root_obj: &'a Object, obj: &'a Object) -> Option<&'a Object> {
    let Some(reference) = obj.get("$ref") else {
        return Some(obj);
    };
    let path = reference.as_str()?.strip_prefix("#/")?;
    path.split('/').try_fold(root_obj, |cur, raw| {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        cur.get(&segment)?.as_object()
    })
}

fn primitive_kind(name: &str) -> Option<FieldKind> {
    match name {
        "string" => Some(FieldKind::String),
        "integer" => Some(FieldKind::Integer),
        "number" => Some(FieldKind::Number),
        "boolean" => Some(FieldKind::Boolean),
        _ => None,
    }
}

/// Reads `type`, accepting nullable unions like `["integer", "null"]`.
fn detect_field_kind(ty: Option<&Value>) -> Option<FieldKind> {
    match ty? {
        Value::String(s) => primitive_kind(s),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find_map(primitive_kind),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::types::choices::{LearnerChoice, NoParams, StreamChoice};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
    #[serde(tag = "type", content = "params", rename_all = "kebab-case")]
    enum TinyChoice {
        Unit(NoParams),
    }

    fn obj(v: Value) -> Object {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn detect_field_kind_primitives_and_unions() {
        assert_eq!(detect_field_kind(Some(&json!("string"))), Some(FieldKind::String));
        assert_eq!(detect_field_kind(Some(&json!("integer"))), Some(FieldKind::Integer));
        assert_eq!(detect_field_kind(Some(&json!("number"))), Some(FieldKind::Number));
        assert_eq!(detect_field_kind(Some(&json!("boolean"))), Some(FieldKind::Boolean));
        assert_eq!(detect_field_kind(Some(&json!("object"))), None);
        assert_eq!(detect_field_kind(None), None);
        assert_eq!(
            detect_field_kind(Some(&json!(["null", "integer"]))),
            Some(FieldKind::Integer)
        );
    }

    #[test]
    fn resolve_ref_follows_escaped_pointer() {
        let root = obj(json!({"$defs": {"a~b": {"inner/seg": {"type": "number"}}}}));
        let me = obj(json!({"type": "integer"}));
        assert_eq!(resolve_ref_obj(&root, &me), Some(&me));

        let reference = obj(json!({"$ref": "#/$defs/a~0b/inner~1seg"}));
        let out = resolve_ref_obj(&root, &reference).expect("ref resolved");
        assert_eq!(out.get("type").and_then(Value::as_str), Some("number"));
    }

    #[test]
    fn discriminant_matches_const_or_single_enum() {
        let by_const = obj(json!({"type": {"const": "knn"}}));
        let by_enum = obj(json!({"type": {"enum": ["knn"]}}));
        assert!(discriminant_matches(&by_const, "knn"));
        assert!(discriminant_matches(&by_enum, "knn"));
        assert!(!discriminant_matches(&by_const, "other"));
    }

    #[test]
    fn unit_params_have_no_fields() {
        let root = schema_of::<TinyChoice>();
        assert!(specs_for_kind(&root, "unit").unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_errors() {
        let root = schema_of::<StreamChoice>();
        let msg = specs_for_kind(&root, "does-not-exist").unwrap_err().to_string();
        assert!(msg.contains("no branch found"), "msg was: {msg}");
        assert!(specs_for_kind(&root, "sea-generator").is_ok());
    }

    #[test]
    fn arff_path_spec_carries_file_rule() {
        let root = schema_of::<StreamChoice>();
        let specs = specs_for_kind(&root, "arff-file").unwrap();
        let path = specs.iter().find(|s| s.name == "path").unwrap();
        assert_eq!(path.kind, FieldKind::String);
        assert_eq!(
            path.path,
            Some(PathRule {
                must_exist: true,
                extensions: vec!["arff".to_string()],
            })
        );
        let class_index = specs.iter().find(|s| s.name == "class_index").unwrap();
        assert_eq!(class_index.kind, FieldKind::Integer);
        assert!(!class_index.required);
    }

    #[test]
    fn knn_specs_expose_bounds_and_search_options() {
        let root = schema_of::<LearnerChoice>();
        let specs = specs_for_kind(&root, "knn").unwrap();
        let by_name = |n: &str| specs.iter().find(|s| s.name == n).cloned().unwrap();

        let k = by_name("k");
        assert_eq!(k.kind, FieldKind::Integer);
        assert_eq!(k.min, Some(1.0));
        assert_eq!(k.default, Some(json!(10)));

        assert_eq!(by_name("weighted_vote").kind, FieldKind::Boolean);
        assert_eq!(by_name("limit").path, None);

        let search = by_name("search_algorithm");
        assert_eq!(search.kind, FieldKind::String);
        assert_eq!(
            search.allowed,
            Some(vec!["linear-nn".to_string(), "kd-tree".to_string()])
        );
    }
}
