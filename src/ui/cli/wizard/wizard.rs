use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strum::{EnumMessage, IntoEnumIterator};

use crate::ui::cli::drivers::PromptDriver;
use crate::ui::types::choices::{FieldKind, FieldSpec, PathRule, UIChoice, specs_for_kind};

const DIM_ITALIC: &str = "\x1b[2m\x1b[3m";
const RESET: &str = "\x1b[0m";
const NONE_ENTRY: &str = "(none)";

/// Walks the user through picking a variant of `C` and filling its
/// parameters, then any nested choices the variant needs.
pub fn prompt_choice<C: UIChoice, D: PromptDriver>(driver: &D) -> Result<C> {
    let kind = select_kind::<C::Kind, D>(driver, C::prompt_label(), C::prompt_help())?;

    let key: &'static str = kind.into();
    let specs = specs_for_kind(&C::schema(), key)?;
    let defaults = C::default_params(kind);

    let mut params = Map::new();
    for spec in &specs {
        let init = spec
            .default
            .clone()
            .or_else(|| defaults.get(&spec.name).cloned());
        if let Some(value) = prompt_field(driver, spec, init)? {
            params.insert(spec.name.clone(), value);
        }
    }

    if let Some(extra) = C::subprompts(driver, kind)? {
        params.extend(extra);
    }

    C::from_parts(kind, Value::Object(params))
}

fn kind_label<K>(kind: K) -> String
where
    K: Copy + Into<&'static str> + EnumMessage,
{
    let label = kind.get_message().unwrap_or_else(|| kind.into());
    match kind.get_detailed_message() {
        Some(desc) if !desc.is_empty() => format!("{label}  {DIM_ITALIC}{desc}{RESET}"),
        _ => label.to_string(),
    }
}

fn select_kind<K, D>(driver: &D, label: &str, help: Option<&str>) -> Result<K>
where
    K: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator,
    D: PromptDriver,
{
    let kinds: Vec<K> = K::iter().collect();
    let options = kinds.iter().map(|k| kind_label(*k)).collect();
    let idx = driver.ask_select(label, help.unwrap_or(""), options, 0)?;
    kinds
        .get(idx)
        .copied()
        .ok_or_else(|| anyhow!("selection {idx} out of range"))
}

/// Asks for one field. `None` leaves the field out so serde defaults apply.
fn prompt_field<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    init: Option<Value>,
) -> Result<Option<Value>> {
    let help = spec.description.as_deref().unwrap_or("");
    let init = init.filter(|v| !v.is_null());

    if !spec.required
        && init.is_none()
        && matches!(spec.kind, FieldKind::Integer | FieldKind::Number)
    {
        return prompt_optional_number(driver, spec, help);
    }

    let value = match spec.kind {
        FieldKind::Boolean => {
            let def = init.as_ref().and_then(Value::as_bool).unwrap_or(false);
            Value::Bool(driver.ask_bool(&spec.title, help, def)?)
        }
        FieldKind::Integer => {
            let def = init.as_ref().and_then(Value::as_u64).unwrap_or(0);
            let min = spec.min.map(|x| x.max(0.0) as u64);
            let max = spec.max.map(|x| x.max(0.0) as u64);
            Value::from(driver.ask_u64(&spec.title, help, def, min, max)?)
        }
        FieldKind::Number => {
            let def = init.as_ref().and_then(Value::as_f64).unwrap_or(0.0);
            Value::from(driver.ask_f64(&spec.title, help, def, spec.min, spec.max)?)
        }
        FieldKind::String => {
            let def = init.as_ref().and_then(Value::as_str).map(str::to_string);
            if let Some(allowed) = &spec.allowed {
                return prompt_enum(driver, spec, help, allowed, def.as_deref());
            }
            let def = def.unwrap_or_default();
            if let Some(rule) = &spec.path {
                return Ok(prompt_path_until_ok(driver, spec, help, &def, rule)?
                    .map(|p| Value::String(p.to_string_lossy().into_owned())));
            }
            Value::String(driver.ask_string(&spec.title, help, &def)?)
        }
    };
    Ok(Some(value))
}

fn prompt_optional_number<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    help: &str,
) -> Result<Option<Value>> {
    let help = if help.is_empty() {
        "(leave blank for none)".to_string()
    } else {
        format!("{help}\n(leave blank for none)")
    };
    let answer = driver.ask_string(&spec.title, &help, "")?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }

    let value = match spec.kind {
        FieldKind::Integer => Value::from(
            answer
                .parse::<u64>()
                .with_context(|| format!("invalid integer for {}", spec.title))?,
        ),
        _ => Value::from(
            answer
                .parse::<f64>()
                .with_context(|| format!("invalid number for {}", spec.title))?,
        ),
    };
    Ok(Some(value))
}

fn prompt_enum<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    help: &str,
    allowed: &[String],
    current: Option<&str>,
) -> Result<Option<Value>> {
    let mut menu = allowed.to_vec();
    let none_idx = (!spec.required && current.is_none()).then(|| {
        menu.push(NONE_ENTRY.to_string());
        menu.len() - 1
    });

    let start = current
        .and_then(|cur| menu.iter().position(|o| o == cur))
        .or(none_idx)
        .unwrap_or(0);

    let idx = driver.ask_select(&spec.title, help, menu.clone(), start)?;
    if Some(idx) == none_idx {
        return Ok(None);
    }
    menu.get(idx)
        .map(|s| Some(Value::String(s.clone())))
        .ok_or_else(|| anyhow!("selection {idx} out of range for {}", spec.title))
}

fn validate_path_str(input: &str, rule: &PathRule) -> Result<(), String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Path cannot be empty".into());
    }
    let p = Path::new(trimmed);

    if rule.must_exist && !p.exists() {
        return Err(format!("Path does not exist: {}", p.display()));
    }
    if p.exists() && !p.is_file() {
        return Err("Expected a file path, not a directory".into());
    }
    if !rule.extensions.is_empty() {
        match p.extension().and_then(|e| e.to_str()) {
            Some(ext) if rule.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => {}
            _ => return Err(format!("Expected a .{} file", rule.extensions.join(" / ."))),
        }
    }
    Ok(())
}

/// Re-asks until the answer satisfies `rule`. Optional fields accept a
/// blank answer as "no path".
fn prompt_path_until_ok<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    help: &str,
    default: &str,
    rule: &PathRule,
) -> Result<Option<PathBuf>> {
    loop {
        let answer = driver.ask_string(&spec.title, help, default)?;
        let answer = answer.trim();
        if answer.is_empty() && !spec.required && !rule.must_exist {
            return Ok(None);
        }
        match validate_path_str(answer, rule) {
            Ok(()) => return Ok(Some(PathBuf::from(answer))),
            Err(msg) => eprintln!("✗ {msg}"),
        }
    }
}
