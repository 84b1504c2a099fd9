//! ARFF parser

use super::value::{ArffDocument, ArffValue, Attribute, AttributeKind};
use crate::error::{FoldwiseError, FoldwiseResult};

enum Section {
    Header,
    Data,
}

/// Parse a dense ARFF document.
///
/// Comments (`%`) and blank lines are skipped. Values are typed according to
/// their attribute declaration; `?` is a missing value.
pub fn parse(input: &str) -> FoldwiseResult<ArffDocument> {
    let mut document = ArffDocument::default();
    let mut section = Section::Header;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        match section {
            Section::Header => {
                let lower = line.to_ascii_lowercase();
                if lower.starts_with("@relation") {
                    let rest = line["@relation".len()..].trim();
                    document.relation = split_fields(rest, ' ', line_no)?
                        .into_iter()
                        .next()
                        .unwrap_or_default();
                } else if lower.starts_with("@attribute") {
                    let rest = line["@attribute".len()..].trim();
                    document.attributes.push(parse_attribute(rest, line_no)?);
                } else if lower.starts_with("@data") {
                    if document.attributes.is_empty() {
                        return Err(FoldwiseError::arff(line_no, "@data before any @attribute"));
                    }
                    section = Section::Data;
                } else {
                    return Err(FoldwiseError::arff(
                        line_no,
                        format!("unexpected header line '{}'", line),
                    ));
                }
            }
            Section::Data => {
                if line.starts_with('{') {
                    return Err(FoldwiseError::arff(line_no, "sparse rows are not supported"));
                }
                let row = parse_row(line, &document.attributes, line_no)?;
                document.data.push(row);
            }
        }
    }

    if matches!(section, Section::Header) {
        return Err(FoldwiseError::arff(0, "missing @data section"));
    }

    Ok(document)
}

fn parse_attribute(rest: &str, line_no: usize) -> FoldwiseResult<Attribute> {
    let (name, remainder) = take_token(rest, line_no)?;
    let remainder = remainder.trim();
    if remainder.is_empty() {
        return Err(FoldwiseError::arff(line_no, format!("attribute '{}' has no type", name)));
    }

    let kind = if remainder.starts_with('{') {
        let inner = remainder
            .strip_prefix('{')
            .and_then(|s| s.trim_end().strip_suffix('}'))
            .ok_or_else(|| FoldwiseError::arff(line_no, "unterminated nominal specification"))?;
        AttributeKind::Nominal(split_fields(inner, ',', line_no)?)
    } else {
        let type_name = remainder
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match type_name.as_str() {
            "numeric" => AttributeKind::Numeric,
            "real" => AttributeKind::Real,
            "integer" => AttributeKind::Integer,
            "string" | "date" => AttributeKind::String,
            other => {
                return Err(FoldwiseError::arff(
                    line_no,
                    format!("unsupported attribute type '{}'", other),
                ));
            }
        }
    };

    Ok(Attribute { name, kind })
}

fn parse_row(line: &str, attributes: &[Attribute], line_no: usize) -> FoldwiseResult<Vec<ArffValue>> {
    let fields = split_fields(line, ',', line_no)?;
    if fields.len() != attributes.len() {
        return Err(FoldwiseError::arff(
            line_no,
            format!("expected {} values, found {}", attributes.len(), fields.len()),
        ));
    }

    fields
        .into_iter()
        .zip(attributes)
        .map(|(field, attribute)| parse_value(field, attribute, line_no))
        .collect()
}

fn parse_value(field: String, attribute: &Attribute, line_no: usize) -> FoldwiseResult<ArffValue> {
    if field == "?" {
        return Ok(ArffValue::Missing);
    }

    match &attribute.kind {
        AttributeKind::Integer => {
            if let Ok(value) = field.parse::<i64>() {
                return Ok(ArffValue::Integer(value));
            }
            // Some producers write integers as 3.0
            match field.parse::<f64>() {
                Ok(value) if value.fract() == 0.0 => Ok(ArffValue::Integer(value as i64)),
                _ => Err(invalid_value(&field, "integer", attribute, line_no)),
            }
        }
        AttributeKind::Numeric | AttributeKind::Real => field
            .parse::<f64>()
            .map(ArffValue::Real)
            .map_err(|_| invalid_value(&field, "numeric", attribute, line_no)),
        AttributeKind::Nominal(values) => {
            if values.contains(&field) {
                Ok(ArffValue::Text(field))
            } else {
                Err(invalid_value(&field, "nominal", attribute, line_no))
            }
        }
        AttributeKind::String => Ok(ArffValue::Text(field)),
    }
}

fn invalid_value(field: &str, kind: &str, attribute: &Attribute, line_no: usize) -> FoldwiseError {
    FoldwiseError::arff(
        line_no,
        format!("'{}' is not a valid {} value for '{}'", field, kind, attribute.name),
    )
}

/// Take one possibly quoted token off the front of `input`.
fn take_token(input: &str, line_no: usize) -> FoldwiseResult<(String, &str)> {
    let input = input.trim_start();
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, quote @ ('\'' | '"'))) => {
            let mut token = String::new();
            let mut escaped = false;
            for (pos, c) in chars {
                if escaped {
                    token.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    return Ok((token, &input[pos + c.len_utf8()..]));
                } else {
                    token.push(c);
                }
            }
            Err(FoldwiseError::arff(line_no, "unterminated quoted name"))
        }
        Some(_) => {
            let end = input.find(char::is_whitespace).unwrap_or(input.len());
            Ok((input[..end].to_string(), &input[end..]))
        }
        None => Err(FoldwiseError::arff(line_no, "missing name")),
    }
}

/// Split on `separator`, honouring single/double quotes and backslash escapes.
fn split_fields(input: &str, separator: char, line_no: usize) -> FoldwiseResult<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut was_quoted = false;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    was_quoted = true;
                } else if c == separator {
                    fields.push(finish_field(&mut current, &mut was_quoted));
                } else {
                    current.push(c);
                }
            }
        }
    }

    if quote.is_some() {
        return Err(FoldwiseError::arff(line_no, "unterminated quoted value"));
    }
    if !current.trim().is_empty() || was_quoted || !fields.is_empty() {
        fields.push(finish_field(&mut current, &mut was_quoted));
    }
    Ok(fields)
}

fn finish_field(current: &mut String, was_quoted: &mut bool) -> String {
    let field = if *was_quoted {
        std::mem::take(current)
    } else {
        let trimmed = current.trim().to_string();
        current.clear();
        trimmed
    };
    *was_quoted = false;
    field
}
