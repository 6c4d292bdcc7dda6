//! Typed error hierarchy for the command-dispatch engine.
//!
//! Two top-level enums cover the two phases of a command set's life:
//! - `DeclarationError`: raised while a command set is being built; fatal
//! - `DispatchError`: raised while resolving and running one invocation

use thiserror::Error;

/// Errors raised while declaring tasks, options and composition.
///
/// These abort construction of the command set.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("Option '{option}' cannot be both required and have a default value")]
    RequiredWithDefault { option: String },

    #[error("Option '{option}' is declared more than once for '{owner}'")]
    DuplicateOption { option: String, owner: String },

    #[error("Default value for option '{option}' must be of type {expected}")]
    DefaultKindMismatch { option: String, expected: String },

    #[error("Invalid option name or alias '{name}'")]
    InvalidOptionName { name: String },

    #[error("Option '{option}' of type {kind} cannot declare a list of choices")]
    InvalidChoices { option: String, kind: String },

    #[error("Cannot patch options of unknown task '{task}'")]
    UnknownTask { task: String },

    #[error("Subcommand '{name}' is already registered")]
    DuplicateSubcommand { name: String },

    #[error("Could not find executable '{name}' to wrap on the search path")]
    WrapperTargetNotFound { name: String },
}

/// Errors raised while dispatching one invocation.
///
/// Every variant except `Task` is produced by the dispatcher itself and is
/// recoverable: it is reported as usage text rather than crashing the process.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Could not find command \"{name}\".")]
    UndefinedTask { name: String },

    #[error("Ambiguous command {name} matches [{}]", .candidates.join(", "))]
    AmbiguousTask {
        name: String,
        candidates: Vec<String>,
    },

    #[error("\"{task}\" was called with {given} argument(s); expected {expected}")]
    ArityMismatch {
        task: String,
        given: usize,
        expected: String,
        /// Rendered usage banner of the task
        usage: String,
    },

    #[error("No value provided for required arguments {}", quoted(.arguments, ""))]
    RequiredArgumentMissing { arguments: Vec<String> },

    #[error("No value provided for required options {}", quoted(.options, "--"))]
    RequiredOptionMissing { options: Vec<String> },

    #[error("Expected {expected} value for '--{option}'; got {value:?}")]
    OptionType {
        option: String,
        expected: String,
        value: String,
    },

    #[error("Unknown switches \"{}\"", .switches.join(", "))]
    UnknownOption { switches: Vec<String> },

    #[error(transparent)]
    Task(#[from] anyhow::Error),
}

impl DispatchError {
    /// Whether the dispatcher may turn this error into a usage message.
    ///
    /// Failures raised from inside a task body are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DispatchError::Task(_))
    }

    /// Usage banner that should accompany the report, if any.
    pub fn usage(&self) -> Option<&str> {
        match self {
            DispatchError::ArityMismatch { usage, .. } => Some(usage),
            _ => None,
        }
    }
}

/// `'a', 'b'` with an optional switch prefix; option names are dasherized.
fn quoted(names: &[String], prefix: &str) -> String {
    names
        .iter()
        .map(|n| {
            let n = if prefix.is_empty() { n.clone() } else { n.replace('_', "-") };
            format!("'{}{}'", prefix, n)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_with_default_names_the_option() {
        let err = DeclarationError::RequiredWithDefault {
            option: "force".into(),
        };
        assert!(err.to_string().contains("'force'"));
    }

    #[test]
    fn wrapper_target_not_found_is_matchable() {
        let err = DeclarationError::WrapperTargetNotFound {
            name: "missing-tool".into(),
        };
        match &err {
            DeclarationError::WrapperTargetNotFound { name } => assert_eq!(name, "missing-tool"),
            _ => panic!("Expected WrapperTargetNotFound"),
        }
    }

    #[test]
    fn undefined_task_message_quotes_the_name() {
        let err = DispatchError::UndefinedTask {
            name: "frobnicate".into(),
        };
        assert_eq!(err.to_string(), "Could not find command \"frobnicate\".");
    }

    #[test]
    fn ambiguous_task_lists_candidates() {
        let err = DispatchError::AmbiguousTask {
            name: "st".into(),
            candidates: vec!["start".into(), "status".into()],
        };
        assert_eq!(err.to_string(), "Ambiguous command st matches [start, status]");
    }

    #[test]
    fn required_option_missing_dasherizes_names() {
        let err = DispatchError::RequiredOptionMissing {
            options: vec!["dry_run".into()],
        };
        assert!(err.to_string().contains("'--dry-run'"));
    }

    #[test]
    fn task_errors_are_not_recoverable() {
        let err: DispatchError = anyhow::anyhow!("boom").into();
        assert!(!err.is_recoverable());
        assert!(
            DispatchError::UnknownOption {
                switches: vec!["--nope".into()]
            }
            .is_recoverable()
        );
    }

    #[test]
    fn arity_mismatch_carries_usage() {
        let err = DispatchError::ArityMismatch {
            task: "greet".into(),
            given: 3,
            expected: "1".into(),
            usage: "app greet NAME".into(),
        };
        assert_eq!(err.usage(), Some("app greet NAME"));
        assert!(err.to_string().contains("3 argument(s)"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&DeclarationError::UnknownTask { task: "x".into() });
        assert_std_error(&DispatchError::UndefinedTask { name: "x".into() });
    }
}
