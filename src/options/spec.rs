//! Typed option declarations.
//!
//! An `OptionSpec` is built fluently and validated when it is committed to a
//! task or a command set:
//!
//! ```
//! use cmdforge::options::OptionSpec;
//!
//! let spec = OptionSpec::string("name")
//!     .alias("-n")
//!     .desc("Name to greet")
//!     .default_value("world");
//! assert!(spec.validate().is_ok());
//! assert_eq!(spec.usage(), "[--name=NAME]");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use super::value::OptionValue;
use crate::errors::{DeclarationError, DispatchError};

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap());
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-[A-Za-z0-9?]|--[a-z0-9][a-z0-9_-]*)$").unwrap());
static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(\d*\.\d+|\d+)$").unwrap());

/// The value type an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    String,
    Array,
    Map,
    Boolean,
    Numeric,
}

impl OptionKind {
    /// Array and map options consume every token up to the next flag.
    pub fn is_greedy(self) -> bool {
        matches!(self, OptionKind::Array | OptionKind::Map)
    }

    fn default_banner(self, name: &str) -> String {
        match self {
            OptionKind::String => name.to_uppercase(),
            OptionKind::Numeric => "N".to_string(),
            OptionKind::Array => "one two three".to_string(),
            OptionKind::Map => "key:value".to_string(),
            OptionKind::Boolean => String::new(),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::String => write!(f, "string"),
            OptionKind::Array => write!(f, "array"),
            OptionKind::Map => write!(f, "map"),
            OptionKind::Boolean => write!(f, "boolean"),
            OptionKind::Numeric => write!(f, "numeric"),
        }
    }
}

impl std::str::FromStr for OptionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(OptionKind::String),
            "array" => Ok(OptionKind::Array),
            "map" | "hash" => Ok(OptionKind::Map),
            "boolean" | "bool" => Ok(OptionKind::Boolean),
            "numeric" | "number" => Ok(OptionKind::Numeric),
            _ => anyhow::bail!(
                "Invalid option type '{}'. Valid values: string, array, map, boolean, numeric",
                s
            ),
        }
    }
}

/// Declaration of a single named option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    pub required: bool,
    pub default: Option<OptionValue>,
    /// Normalized aliases such as `-f` or `--force-it`
    pub aliases: BTreeSet<String>,
    /// Placeholder shown after `=` in usage lines
    pub banner: String,
    pub description: Option<String>,
    /// Accepted values for string/numeric options (empty = any)
    pub choices: Vec<String>,
    pub hidden: bool,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        let name = name.into().replace('-', "_");
        let banner = kind.default_banner(&name);
        Self {
            name,
            kind,
            required: false,
            default: None,
            aliases: BTreeSet::new(),
            banner,
            description: None,
            choices: Vec::new(),
            hidden: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::String)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Array)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Map)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Boolean)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Numeric)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add an alias. Bare names are dasherized: `f` becomes `-f`,
    /// `force-it` becomes `--force-it`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let alias = if alias.starts_with('-') {
            alias
        } else if alias.chars().count() == 1 {
            format!("-{}", alias)
        } else {
            format!("--{}", alias)
        };
        self.aliases.insert(alias);
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    pub fn desc(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Check the declaration invariants.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        if !NAME_REGEX.is_match(&self.name) {
            return Err(DeclarationError::InvalidOptionName {
                name: self.name.clone(),
            });
        }
        if let Some(bad) = self.aliases.iter().find(|a| !ALIAS_REGEX.is_match(a)) {
            return Err(DeclarationError::InvalidOptionName { name: bad.clone() });
        }
        if self.required && self.default.is_some() {
            return Err(DeclarationError::RequiredWithDefault {
                option: self.name.clone(),
            });
        }
        if let Some(default) = &self.default
            && default.kind() != self.kind
        {
            return Err(DeclarationError::DefaultKindMismatch {
                option: self.name.clone(),
                expected: self.kind.to_string(),
            });
        }
        if !self.choices.is_empty()
            && !matches!(self.kind, OptionKind::String | OptionKind::Numeric)
        {
            return Err(DeclarationError::InvalidChoices {
                option: self.name.clone(),
                kind: self.kind.to_string(),
            });
        }
        Ok(())
    }

    /// The long switch, e.g. `--dry-run` for `dry_run`.
    pub fn switch_name(&self) -> String {
        format!("--{}", self.name.replace('_', "-"))
    }

    /// Whether `token` (without any `=value` part) names this option.
    pub fn matches_switch(&self, token: &str) -> bool {
        if let Some(long) = token.strip_prefix("--")
            && long.replace('-', "_") == self.name
        {
            return true;
        }
        self.aliases.iter().any(|alias| {
            alias == token || (alias.starts_with("--") && alias.replace('_', "-") == token.replace('_', "-"))
        })
    }

    /// Usage fragment: `--name=NAME` when required, `[--name=NAME]` otherwise.
    pub fn usage(&self) -> String {
        let sample = if self.banner.is_empty() {
            self.switch_name()
        } else {
            format!("{}={}", self.switch_name(), self.banner)
        };
        if self.required {
            sample
        } else {
            format!("[{}]", sample)
        }
    }

    /// Usage fragment for the options table, including aliases and the
    /// negated form of boolean switches.
    pub fn help_usage(&self) -> String {
        let mut usage = self.usage();
        if self.kind == OptionKind::Boolean && !self.name.starts_with("no_") {
            usage.push_str(&format!(", [--no-{}]", self.name.replace('_', "-")));
        }
        if self.aliases.is_empty() {
            usage
        } else {
            let aliases: Vec<&str> = self.aliases.iter().map(String::as_str).collect();
            format!("{}, {}", aliases.join(", "), usage)
        }
    }

    /// Coerce one raw token into this option's kind.
    ///
    /// Greedy kinds coerce token by token; use `coerce_many` for those.
    pub fn coerce(&self, raw: &str) -> Result<OptionValue, DispatchError> {
        let value = match self.kind {
            OptionKind::String => OptionValue::String(raw.to_string()),
            OptionKind::Numeric => {
                if !NUMERIC_REGEX.is_match(raw) {
                    return Err(self.type_error(raw));
                }
                OptionValue::Numeric(raw.parse::<f64>().map_err(|_| self.type_error(raw))?)
            }
            OptionKind::Boolean => match raw {
                "true" => OptionValue::Boolean(true),
                "false" => OptionValue::Boolean(false),
                _ => return Err(self.type_error(raw)),
            },
            OptionKind::Array | OptionKind::Map => {
                return self.coerce_many(&[raw.to_string()]);
            }
        };
        self.check_choice(raw)?;
        Ok(value)
    }

    /// Coerce the tokens collected for an array or map option.
    pub fn coerce_many(&self, raw: &[String]) -> Result<OptionValue, DispatchError> {
        match self.kind {
            OptionKind::Array => Ok(OptionValue::Array(raw.to_vec())),
            OptionKind::Map => {
                let mut map = BTreeMap::new();
                for token in raw {
                    let (key, value) = token.split_once(':').ok_or_else(|| self.type_error(token))?;
                    map.insert(key.to_string(), value.to_string());
                }
                Ok(OptionValue::Map(map))
            }
            _ => match raw {
                [single] => self.coerce(single),
                _ => Err(self.type_error(&raw.join(" "))),
            },
        }
    }

    fn check_choice(&self, raw: &str) -> Result<(), DispatchError> {
        if self.choices.is_empty() || self.choices.iter().any(|c| c == raw) {
            return Ok(());
        }
        Err(DispatchError::OptionType {
            option: self.name.replace('_', "-"),
            expected: format!("one of {}", self.choices.join(", ")),
            value: raw.to_string(),
        })
    }

    fn type_error(&self, raw: &str) -> DispatchError {
        let expected = match self.kind {
            OptionKind::Numeric => "numeric",
            OptionKind::Boolean => "boolean",
            OptionKind::Map => "key:value",
            OptionKind::Array => "array",
            OptionKind::String => "string",
        };
        DispatchError::OptionType {
            option: self.name.replace('_', "-"),
            expected: expected.to_string(),
            value: raw.to_string(),
        }
    }
}
