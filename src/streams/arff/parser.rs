use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::utils::file_parsing::{split_csv_preserving_quotes, strip_surrounding_quotes};
use std::io::{BufRead, Error, ErrorKind, Seek};
use std::sync::Arc;

const RELATION: &str = "@relation";
const ATTRIBUTE: &str = "@attribute";
const DATA: &str = "@data";
const MISSING: &str = "?";

#[derive(Debug, PartialEq)]
pub(super) enum AttributeKind {
    Numeric,
    Nominal(Vec<String>),
}

pub(super) fn is_comment_or_empty(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.starts_with('%')
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidData, msg.into())
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

/// Reads the next meaningful header line, failing if the file ends first.
fn next_directive<R: BufRead>(reader: &mut R, line: &mut String) -> Result<(), Error> {
    loop {
        line.clear();
        if reader.read_line(line)? == 0 {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "ARFF file ended before @data",
            ));
        }
        if !is_comment_or_empty(line) {
            return Ok(());
        }
    }
}

/// Parses everything up to and including `@data` and returns the header
/// together with the byte offset of the first data row.
///
/// `class_index` defaults to the last declared attribute.
pub(super) fn parse_header<R: BufRead + Seek>(
    reader: &mut R,
    class_index: Option<usize>,
) -> Result<(InstanceHeader, u64), Error> {
    let mut relation: Option<String> = None;
    let mut attributes: Vec<AttributeRef> = Vec::new();
    let mut line = String::new();

    let data_start_pos = loop {
        next_directive(reader, &mut line)?;
        let trimmed = line.trim();

        if starts_with_keyword(trimmed, RELATION) && relation.is_none() && attributes.is_empty() {
            let raw = trimmed[RELATION.len()..].trim();
            relation = Some(strip_surrounding_quotes(raw).to_string());
        } else if starts_with_keyword(trimmed, ATTRIBUTE) {
            let (name, kind) = parse_attribute_line(trimmed)?;
            let attribute: AttributeRef = match kind {
                AttributeKind::Numeric => Arc::new(NumericAttribute::new(name)),
                AttributeKind::Nominal(values) => Arc::new(NominalAttribute::from_labels(name, values)),
            };
            attributes.push(attribute);
        } else if starts_with_keyword(trimmed, DATA) {
            break reader.stream_position()?;
        } else {
            return Err(invalid(format!("Unsupported header directive: {trimmed}")));
        }
    };

    if attributes.is_empty() {
        return Err(invalid("ARFF header declares no attributes"));
    }

    let class_index = class_index.unwrap_or(attributes.len() - 1);
    if class_index >= attributes.len() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "class index {class_index} out of range for {} attributes",
                attributes.len()
            ),
        ));
    }

    let header = InstanceHeader::new(
        relation.unwrap_or_else(|| "unnamed_relation".to_string()),
        attributes,
        class_index,
    );
    Ok((header, data_start_pos))
}

/// Splits the attribute name (optionally quoted) from its type declaration.
fn split_name(rest: &str) -> Result<(String, &str), Error> {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, quote @ ('\'' | '"'))) => {
            let end = chars
                .find(|&(_, c)| c == quote)
                .map(|(i, _)| i)
                .ok_or_else(|| invalid("Attribute name without closing quote marks"))?;
            Ok((rest[1..end].to_string(), rest[end + 1..].trim()))
        }
        Some(_) => {
            let (name, after) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid("Attribute type is missing"))?;
            Ok((name.to_string(), after.trim()))
        }
        None => Err(invalid("Attribute name is missing")),
    }
}

pub(super) fn parse_attribute_line(line: &str) -> Result<(String, AttributeKind), Error> {
    let line = line.trim();
    if !starts_with_keyword(line, ATTRIBUTE) {
        return Err(invalid("Line is not '@attribute'"));
    }
    let (name, declaration) = split_name(line[ATTRIBUTE.len()..].trim())?;

    let lowered = declaration.to_ascii_lowercase();
    if ["numeric", "real", "integer"]
        .iter()
        .any(|kw| lowered.starts_with(kw))
    {
        return Ok((name, AttributeKind::Numeric));
    }

    if let Some(domain) = declaration.strip_prefix('{') {
        let close = domain
            .rfind('}')
            .ok_or_else(|| invalid("Nominal set without closing '}'"))?;
        let values: Vec<String> = domain[..close]
            .split(',')
            .map(|s| strip_surrounding_quotes(s.trim()).to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if values.is_empty() {
            return Err(invalid("Empty nominal domain"));
        }
        return Ok((name, AttributeKind::Nominal(values)));
    }

    Err(invalid(format!("Attribute kind not supported: {declaration}")))
}

/// Converts one data row into attribute values; nominal labels become their
/// index and `?` becomes `NaN`.
pub(super) fn parse_instance_values(
    header: &InstanceHeader,
    line: &str,
) -> Result<Vec<f64>, Error> {
    let tokens = split_csv_preserving_quotes(line);
    if tokens.len() != header.number_of_attributes() {
        return Err(invalid(format!(
            "Number of columns ({}) differs from number of attributes ({})",
            tokens.len(),
            header.number_of_attributes()
        )));
    }

    tokens
        .iter()
        .zip(&header.attributes)
        .enumerate()
        .map(|(idx, (raw, attr))| {
            let raw = raw.trim();
            if raw == MISSING {
                return Ok(f64::NAN);
            }
            if attr.is_numeric() {
                return raw.parse::<f64>().map_err(|_| {
                    invalid(format!("Invalid numeric value '{raw}' for attribute #{idx}"))
                });
            }
            if let Some(nominal) = attr.as_any().downcast_ref::<NominalAttribute>() {
                let label = strip_surrounding_quotes(raw);
                return nominal
                    .index_of_value(label)
                    .map(|pos| pos as f64)
                    .ok_or_else(|| {
                        invalid(format!(
                            "Nominal value '{label}' not found in domain of attribute #{idx}"
                        ))
                    });
            }
            Err(invalid(format!("Unsupported attribute type at column #{idx}")))
        })
        .collect()
}
