//! Registered implementations and the bound context they run with.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::command_set::CommandSet;
use crate::config::RuntimeConfig;
use crate::errors::DispatchError;
use crate::options::OptionValues;
use crate::registry::Task;
use crate::shell::Shell;

/// Signature of a task body.
pub type TaskFn = dyn Fn(&mut Invocation<'_>) -> anyhow::Result<Value> + Send + Sync;

/// Number of positional arguments an implementation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub required: usize,
    pub optional: usize,
    pub variadic: bool,
}

impl Arity {
    pub const NONE: Arity = Arity::exactly(0);

    pub const fn exactly(n: usize) -> Self {
        Self {
            required: n,
            optional: 0,
            variadic: false,
        }
    }

    pub const fn range(required: usize, optional: usize) -> Self {
        Self {
            required,
            optional,
            variadic: false,
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Self {
            required: n,
            optional: 0,
            variadic: true,
        }
    }

    pub const fn any() -> Self {
        Self::at_least(0)
    }

    pub fn accepts(&self, given: usize) -> bool {
        given >= self.required && (self.variadic || given <= self.required + self.optional)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.variadic, self.optional) {
            (true, _) => write!(f, "at least {}", self.required),
            (false, 0) => write!(f, "{}", self.required),
            (false, optional) => write!(f, "{}..{}", self.required, self.required + optional),
        }
    }
}

/// Whether a member can be reached through dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone)]
pub enum Body {
    Native(Arc<TaskFn>),
    /// Forward the remaining arguments to the named subcommand set
    Subcommand(String),
    /// Built-in help
    Help,
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Native(_) => write!(f, "Native(..)"),
            Body::Subcommand(name) => write!(f, "Subcommand({:?})", name),
            Body::Help => write!(f, "Help"),
        }
    }
}

/// An executable member of a command set.
#[derive(Debug, Clone)]
pub struct Member {
    pub visibility: Visibility,
    pub arity: Arity,
    pub body: Body,
}

impl Member {
    pub fn native<F>(arity: Arity, body: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            visibility: Visibility::Public,
            arity,
            body: Body::Native(Arc::new(body)),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Context a task body runs with: resolved options, class-level arguments,
/// trailing positional arguments and the output shell.
pub struct Invocation<'a> {
    set: &'a CommandSet,
    task: Option<&'a Task>,
    name: String,
    config: &'a RuntimeConfig,
    shell: &'a mut dyn Shell,
    pub options: OptionValues,
    pub arguments: BTreeMap<String, String>,
    pub args: Vec<String>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        set: &'a CommandSet,
        task: Option<&'a Task>,
        name: String,
        config: &'a RuntimeConfig,
        shell: &'a mut dyn Shell,
    ) -> Self {
        Self {
            set,
            task,
            name,
            config,
            shell,
            options: OptionValues::new(),
            arguments: BTreeMap::new(),
            args: Vec::new(),
        }
    }

    /// The task being run; `None` for dynamically dispatched members.
    pub fn task(&self) -> Option<&Task> {
        self.task
    }

    /// Name the invocation was dispatched under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command_set(&self) -> &CommandSet {
        self.set
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    pub fn shell(&mut self) -> &mut dyn Shell {
        &mut *self.shell
    }

    /// Shorthand for `shell().say(line)`.
    pub fn say(&mut self, line: impl AsRef<str>) {
        self.shell.say(line.as_ref());
    }

    /// Value of a class-level argument.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    /// Dispatch another command line on the same command set.
    ///
    /// Any error, including dispatch errors of the nested call, is returned
    /// as-is; when it escapes the calling task body it is no longer
    /// recoverable.
    pub fn invoke<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Value, DispatchError> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        crate::dispatch::Dispatcher::new(self.set, self.config).dispatch(args, &mut *self.shell)
    }

    /// Run the wrapped executable and capture its standard output.
    pub fn wrap(&self, args: &str) -> anyhow::Result<String> {
        self.set.wrapper_binding()?.wrap(args)
    }

    /// Run the wrapped executable on the current standard streams and
    /// return its exit status.
    pub fn forward(&self, args: &str) -> anyhow::Result<i32> {
        self.set.wrapper_binding()?.forward(args)
    }
}
