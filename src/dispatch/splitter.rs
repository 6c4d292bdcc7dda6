//! Splits a raw token stream into positional arguments and option values.

use crate::errors::DispatchError;
use crate::options::{OptionKind, OptionSpec, OptionTable, OptionValue, OptionValues};

/// Result of splitting one command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitArgs {
    pub positional: Vec<String>,
    pub options: OptionValues,
}

/// Whether `token` is a switch rather than a value.
///
/// Negative numbers such as `-3` or `-0.5` are values.
pub fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-') && token != "-" && token != "--" && token.parse::<f64>().is_err()
}

/// Scan `tokens` left to right against `table`.
///
/// A bare `--` ends flag scanning. Unknown switches are an error when
/// `reject_unknown` is set and are kept as positional arguments otherwise.
/// Defaults are applied afterwards; missing required options are reported
/// when `check_required` is set.
pub fn split(
    tokens: &[String],
    table: &OptionTable,
    reject_unknown: bool,
    check_required: bool,
) -> Result<SplitArgs, DispatchError> {
    let mut result = SplitArgs::default();
    let mut unknown = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if token == "--" {
            result.positional.extend(tokens[i..].iter().cloned());
            break;
        }
        if !looks_like_flag(token) {
            result.positional.push(token.clone());
            continue;
        }

        let (switch, inline) = match token.split_once('=') {
            Some((switch, value)) => (switch, Some(value.to_string())),
            None => (token.as_str(), None),
        };

        if let Some(spec) = table.find_switch(switch) {
            let value = take_value(spec, inline, tokens, &mut i)?;
            result.options.insert(&spec.name, value);
            continue;
        }

        if inline.is_none()
            && let Some(negated) = switch.strip_prefix("--no-")
            && let Some(spec) = table.find_switch(&format!("--{}", negated))
            && spec.kind == OptionKind::Boolean
        {
            result.options.insert(&spec.name, OptionValue::Boolean(false));
            continue;
        }

        if reject_unknown {
            unknown.push(switch.to_string());
        } else {
            result.positional.push(token.clone());
        }
    }

    if !unknown.is_empty() {
        return Err(DispatchError::UnknownOption { switches: unknown });
    }

    let mut missing = Vec::new();
    for spec in table.iter() {
        if result.options.contains(&spec.name) {
            continue;
        }
        match &spec.default {
            Some(default) => result.options.insert(&spec.name, default.clone()),
            None if spec.required && check_required => missing.push(spec.name.clone()),
            None => {}
        }
    }
    if !missing.is_empty() {
        return Err(DispatchError::RequiredOptionMissing { options: missing });
    }

    Ok(result)
}

/// Consume the value tokens for one recognised switch.
fn take_value(
    spec: &OptionSpec,
    inline: Option<String>,
    tokens: &[String],
    i: &mut usize,
) -> Result<OptionValue, DispatchError> {
    match spec.kind {
        OptionKind::Boolean => {
            if let Some(raw) = inline {
                return spec.coerce(&raw);
            }
            match tokens.get(*i).map(String::as_str) {
                Some(raw @ ("true" | "false")) => {
                    *i += 1;
                    spec.coerce(raw)
                }
                _ => Ok(OptionValue::Boolean(true)),
            }
        }
        OptionKind::Array | OptionKind::Map => {
            let mut values: Vec<String> = inline.into_iter().collect();
            while let Some(next) = tokens.get(*i) {
                if next == "--" || looks_like_flag(next) {
                    break;
                }
                values.push(next.clone());
                *i += 1;
            }
            spec.coerce_many(&values)
        }
        OptionKind::String | OptionKind::Numeric => {
            if let Some(raw) = inline {
                return spec.coerce(&raw);
            }
            match tokens.get(*i) {
                Some(next) if next != "--" && !looks_like_flag(next) => {
                    *i += 1;
                    spec.coerce(next)
                }
                _ => Err(DispatchError::OptionType {
                    option: spec.name.replace('_', "-"),
                    expected: spec.kind.to_string(),
                    value: String::new(),
                }),
            }
        }
    }
}
