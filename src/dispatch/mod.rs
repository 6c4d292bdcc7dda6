//! Dispatcher: resolves a command line, splits and validates its arguments,
//! binds an `Invocation`, runs the implementation and classifies failures.
//!
//! # Stages
//!
//! | Stage        | Module / function          | Failure                                    |
//! |--------------|----------------------------|--------------------------------------------|
//! | ResolveName  | `resolver::resolve`        | `AmbiguousTask`                            |
//! | SplitArgs    | `splitter::split`          | `UnknownOption`, `OptionType`, `RequiredOptionMissing` |
//! | Bind         | `Dispatcher::bind`         | `RequiredArgumentMissing`, `ArityMismatch` |
//! | Execute      | `Dispatcher::execute`      | `Task` (never recovered)                   |
//! | Report       | `Dispatcher::start`        | -                                          |
//!
//! Arity is checked explicitly against the member's declared `Arity` before
//! the body runs, so an arity problem raised from *inside* a task body
//! (for example by a nested `Invocation::invoke`) reaches the caller as
//! `DispatchError::Task` and is never reported as a usage error.

pub mod invocation;
pub mod resolver;
pub mod splitter;

pub use invocation::{Arity, Body, Invocation, Member, TaskFn, Visibility};
pub use resolver::{Resolution, resolve};
pub use splitter::{SplitArgs, split};

use serde_json::Value;
use tracing::debug;

use crate::command_set::CommandSet;
use crate::config::RuntimeConfig;
use crate::errors::DispatchError;
use crate::help;
use crate::registry::{HELP_TASK, Task};
use crate::shell::Shell;

/// Exit status reported for a recovered dispatch failure.
pub const FAILURE_STATUS: i32 = 1;

/// Result of `Dispatcher::start`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The task ran; carries its result value.
    Completed(Value),
    /// Dispatch failed in a recoverable way and was reported to the shell.
    Failed { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed(_) => 0,
            Outcome::Failed { .. } => FAILURE_STATUS,
        }
    }
}

/// Turn `task ... --help` into `help task ...`. Only tokens before the first
/// `--` are considered; literals after it are passed through untouched.
fn help_rewrite(args: Vec<String>) -> Vec<String> {
    let flags_end = args.iter().position(|a| a == "--").unwrap_or(args.len());
    let is_help = |a: &String| a == "--help" || a == "-h";
    if !args[..flags_end].iter().any(is_help) {
        return args;
    }

    let mut rewritten = Vec::with_capacity(args.len());
    rewritten.push(HELP_TASK.to_string());
    for (i, arg) in args.into_iter().enumerate() {
        if i < flags_end && is_help(&arg) {
            continue;
        }
        rewritten.push(arg);
    }
    rewritten
}

/// Runs command lines against one command set.
pub struct Dispatcher<'a> {
    set: &'a CommandSet,
    config: &'a RuntimeConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(set: &'a CommandSet, config: &'a RuntimeConfig) -> Self {
        Self { set, config }
    }

    /// Entry point for a process: dispatch `args` and turn recoverable
    /// failures into a report on the shell's error stream.
    ///
    /// With `debug` enabled nothing is recovered.
    pub fn start<S: AsRef<str>>(
        &self,
        args: &[S],
        shell: &mut dyn Shell,
    ) -> Result<Outcome, DispatchError> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        match self.dispatch(args, shell) {
            Ok(value) => Ok(Outcome::Completed(value)),
            Err(err) if err.is_recoverable() && !self.config.debug => {
                debug!(error = %err, "reporting dispatch failure");
                shell.error(&err.to_string());
                if let Some(usage) = err.usage() {
                    shell.error(&format!("Usage: \"{}\"", usage));
                }
                Ok(Outcome::Failed {
                    message: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Dispatch `args` and return the task's result or the raw error.
    pub fn dispatch(&self, args: Vec<String>, shell: &mut dyn Shell) -> Result<Value, DispatchError> {
        debug!(namespace = %self.set.meta().namespace, ?args, "resolving task");
        match resolve(self.set, &args, self.config.prefix_matching)? {
            Resolution::Resolved { set, task, args } => self.run_task(set, task, args, shell),
            Resolution::Dynamic { set, name, args } => self.run_dynamic(set, name, args, shell),
            Resolution::Missing { set, args } => self.run_dynamic(set, String::new(), args, shell),
        }
    }

    fn run_task(
        &self,
        set: &'a CommandSet,
        task: &'a Task,
        args: Vec<String>,
        shell: &mut dyn Shell,
    ) -> Result<Value, DispatchError> {
        let member = set
            .member(&task.name)
            .ok_or_else(|| DispatchError::UndefinedTask {
                name: task.name.clone(),
            })?;
        debug!(task = %task.name, "resolved task");

        match &member.body {
            Body::Subcommand(child) => {
                let child = set
                    .subcommand(child)
                    .ok_or_else(|| DispatchError::UndefinedTask {
                        name: child.clone(),
                    })?;
                return Dispatcher::new(child, self.config).dispatch(help_rewrite(args), shell);
            }
            Body::Help => {
                let split = split(&args, &task.options, false, false)?;
                self.check_arity(set, task, member.arity, split.positional.len())?;
                match split.positional.first() {
                    Some(name) => help::task_help(set, name, self.config.prefix_matching, shell)?,
                    None => help::class_help(set, shell),
                }
                return Ok(Value::Null);
            }
            Body::Native(_) => {}
        }

        let table = set.class_options().merged_with(&task.options);
        let reject_unknown = set.meta().unknown_option_policy.rejects_unknown(&task.name);
        let split = split(&args, &table, reject_unknown, true)?;

        let mut invocation = Invocation::new(set, Some(task), task.name.clone(), self.config, shell);
        invocation.options = split.options;
        self.bind(set, &mut invocation, split.positional)?;
        self.check_arity(set, task, member.arity, invocation.args.len())?;
        self.execute(member, &mut invocation)
    }

    /// Handle a name with no registered task: the set's fallback member if
    /// one is registered, else a public member of that exact name.
    fn run_dynamic(
        &self,
        set: &'a CommandSet,
        name: String,
        args: Vec<String>,
        shell: &mut dyn Shell,
    ) -> Result<Value, DispatchError> {
        let normalized = name.replace('-', "_");
        if let Some(fallback) = set.fallback() {
            debug!(name = %normalized, "dispatching to fallback member");
            let mut invocation = Invocation::new(set, None, normalized, self.config, shell);
            invocation.args = args;
            return self.execute(fallback, &mut invocation);
        }

        match set.member(&normalized) {
            Some(member) if member.visibility == Visibility::Public && !normalized.is_empty() => {
                debug!(name = %normalized, "dispatching to public member");
                if !member.arity.accepts(args.len()) {
                    return Err(DispatchError::ArityMismatch {
                        task: normalized.clone(),
                        given: args.len(),
                        expected: member.arity.to_string(),
                        usage: help::prefixed(set, &normalized),
                    });
                }
                let mut invocation = Invocation::new(set, None, normalized, self.config, shell);
                invocation.args = args;
                self.execute(member, &mut invocation)
            }
            // Report the token as the user typed it.
            _ => Err(DispatchError::UndefinedTask { name }),
        }
    }

    /// Move class-level arguments off the front of the positional list.
    fn bind(
        &self,
        set: &CommandSet,
        invocation: &mut Invocation<'_>,
        positional: Vec<String>,
    ) -> Result<(), DispatchError> {
        let mut positional = positional.into_iter();
        let mut missing = Vec::new();
        for argument in set.arguments() {
            match positional.next() {
                Some(value) => {
                    invocation.arguments.insert(argument.name.clone(), value);
                }
                None if argument.required => missing.push(argument.name.clone()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(DispatchError::RequiredArgumentMissing { arguments: missing });
        }
        invocation.args = positional.collect();
        Ok(())
    }

    fn check_arity(
        &self,
        set: &CommandSet,
        task: &Task,
        arity: Arity,
        given: usize,
    ) -> Result<(), DispatchError> {
        if arity.accepts(given) {
            return Ok(());
        }
        Err(DispatchError::ArityMismatch {
            task: task.name.clone(),
            given,
            expected: arity.to_string(),
            usage: help::banner(set, task),
        })
    }

    fn execute(&self, member: &Member, invocation: &mut Invocation<'_>) -> Result<Value, DispatchError> {
        match &member.body {
            Body::Native(body) => body(invocation).map_err(DispatchError::Task),
            Body::Subcommand(_) | Body::Help => Err(DispatchError::UndefinedTask {
                name: invocation.name().to_string(),
            }),
        }
    }
}
