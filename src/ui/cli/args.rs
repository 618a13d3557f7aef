use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueHint};
use serde_json::{Map, Value};

use crate::ui::types::choices::{
    DumpFormat, EvaluatorChoice, LearnerChoice, PrequentialParams, StreamChoice, TaskChoice,
    TaskKind, UIChoice,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prequential evaluation of a streaming kNN classifier, interactive or scripted"
)]
pub struct Cli {
    /// Without a subcommand the interactive wizard starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a task straight from the command line
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Task to execute
    #[arg(long, default_value = "evaluate-prequential", value_name = "TASK")]
    pub task: String,

    /// Learner kind (knn)
    #[arg(long, default_value = "knn", value_name = "LEARNER")]
    pub learner: String,

    /// Stream kind (sea-generator, arff-file)
    #[arg(long, default_value = "sea-generator", value_name = "STREAM")]
    pub stream: String,

    /// Evaluator kind (basic-classification)
    #[arg(long, default_value = "basic-classification", value_name = "EVALUATOR")]
    pub evaluator: String,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// When to stop, how often to sample and where the learning curve goes.
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Stop after this many instances (omit for unlimited)
    #[arg(long, value_name = "N")]
    pub max_instances: Option<u64>,

    /// Stop after this many seconds of CPU time (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub max_seconds: Option<u64>,

    /// Record a learning curve snapshot every N instances
    #[arg(
        long,
        default_value_t = 100_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub sample_frequency: u64,

    /// Measure model size every N instances
    #[arg(
        long,
        default_value_t = 100_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub mem_check_frequency: u64,

    /// Write the learning curve to this file when the run ends
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Learning curve file format (csv, tsv, json)
    #[arg(long, value_name = "FORMAT", value_parser = parse_dump_format)]
    pub dump_format: Option<DumpFormat>,
}

/// `KEY=VALUE` pairs laid over each component's default parameters.
/// Dotted keys reach into nested objects.
#[derive(Debug, Args)]
pub struct OverrideArgs {
    /// Learner parameter, e.g. `k=5` or `search_algorithm=kd-tree`
    #[arg(
        id = "learner_param",
        long = "learner-param",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub learner: Vec<KeyValue>,

    /// Stream parameter, e.g. `function_id=3`
    #[arg(
        id = "stream_param",
        long = "stream-param",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub stream: Vec<KeyValue>,

    /// Evaluator parameter, e.g. `precision_recall_output=true`
    #[arg(
        id = "evaluator_param",
        long = "evaluator-param",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub evaluator: Vec<KeyValue>,
}

#[derive(Clone, Debug)]
pub struct KeyValue {
    key: String,
    value: Value,
}

impl RunArgs {
    pub fn into_task_choice(self) -> Result<TaskChoice> {
        let kind = parse_kind::<TaskKind>(&self.task)
            .with_context(|| format!("invalid task '{}'", self.task))?;

        match kind {
            TaskKind::EvaluatePrequential => {
                let overrides = &self.overrides;
                let learner =
                    component::<LearnerChoice>("learner", &self.learner, &overrides.learner)?;
                let stream =
                    component::<StreamChoice>("stream", &self.stream, &overrides.stream)?;
                let evaluator = component::<EvaluatorChoice>(
                    "evaluator",
                    &self.evaluator,
                    &overrides.evaluator,
                )?;

                let schedule = self.schedule;
                Ok(TaskChoice::EvaluatePrequential(PrequentialParams {
                    learner,
                    stream,
                    evaluator,
                    max_instances: schedule.max_instances,
                    max_seconds: schedule.max_seconds,
                    sample_frequency: schedule.sample_frequency,
                    mem_check_frequency: schedule.mem_check_frequency,
                    dump_file: schedule.dump_file,
                    dump_format: schedule.dump_format.unwrap_or_default(),
                }))
            }
        }
    }
}

/// Default parameters of the named kind with the overrides applied.
fn component<C>(role: &str, kind_input: &str, overrides: &[KeyValue]) -> Result<C>
where
    C: UIChoice,
    C::Kind: FromStr,
{
    let build = || -> Result<C> {
        let kind = parse_kind::<C::Kind>(kind_input)?;
        let mut params = C::default_params(kind);
        for kv in overrides {
            set_path(&mut params, &kv.key, kv.value.clone())
                .with_context(|| format!("failed to set '{}'", kv.key))?;
        }
        C::from_parts(kind, params)
    };
    build().with_context(|| format!("invalid {role} '{kind_input}'"))
}

/// Accepts `kd-tree`, `KdTree`, `kd_tree` and similar spellings.
fn parse_kind<T: FromStr>(raw: &str) -> Result<T> {
    let trimmed = raw.trim();
    [
        trimmed.to_string(),
        trimmed.to_lowercase(),
        kebab_from_token(trimmed),
    ]
    .iter()
    .find_map(|cand| cand.parse::<T>().ok())
    .ok_or_else(|| anyhow!("could not parse value '{raw}'"))
}

/// `SeaGenerator` and `sea_generator` both become `sea-generator`.
fn kebab_from_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 4);
    let mut after_word_char = false;
    for ch in token.chars() {
        if ch == '_' || ch == '-' {
            out.push('-');
            after_word_char = false;
        } else if ch.is_uppercase() {
            if after_word_char {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            after_word_char = false;
        } else {
            out.push(ch);
            after_word_char = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

fn parse_dump_format(input: &str) -> Result<DumpFormat, String> {
    match input.trim().to_lowercase().as_str() {
        "csv" => Ok(DumpFormat::Csv),
        "tsv" => Ok(DumpFormat::Tsv),
        "json" => Ok(DumpFormat::Json),
        other => Err(format!("unknown format '{other}' (expected csv, tsv or json)")),
    }
}

/// Sets `a.b.c` inside `target`, creating intermediate objects where the
/// path crosses `null`.
fn set_path(target: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let mut segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.pop() else {
        bail!("empty key is not allowed");
    };

    let mut current = target;
    for seg in segments {
        current = as_object(current)?
            .entry(seg.to_string())
            .or_insert(Value::Null);
    }
    as_object(current)?.insert(last.to_string(), new_value);
    Ok(())
}

fn as_object(value: &mut Value) -> Result<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("cannot set nested field on non-object value: {other}"),
    }
}

fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    Ok(KeyValue {
        key: key.to_string(),
        value: parse_literal(value.trim()),
    })
}

/// JSON literals (`5`, `true`, `null`, `"x"`) parse as such; anything else is
/// taken as a bare string.
fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
