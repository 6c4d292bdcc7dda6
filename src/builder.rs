//! Declaration builder for command sets.
//!
//! Task metadata is declared first and committed by the next `register`
//! call, which binds it to an implementation:
//!
//! ```
//! use cmdforge::builder::CommandSetBuilder;
//! use cmdforge::dispatch::Arity;
//! use cmdforge::options::OptionSpec;
//! use serde_json::json;
//!
//! let set = CommandSetBuilder::new("app")
//!     .desc("greet NAME", "Say hello")
//!     .method_option(OptionSpec::boolean("shout").alias("-s"))
//!     .register("greet", Arity::exactly(1), |inv| {
//!         let name = inv.args[0].clone();
//!         inv.say(format!("Hello, {}", name));
//!         Ok(json!(name))
//!     })
//!     .build()
//!     .unwrap();
//! assert!(set.registry().contains("greet"));
//! ```
//!
//! # Commit rules
//!
//! | Pending usage + description | Existing task | Name           | Result                          |
//! |-----------------------------|---------------|----------------|---------------------------------|
//! | yes                         | any           | any            | new task, public member         |
//! | no                          | yes           | any            | implementation replaced         |
//! | no                          | no            | `method_missing` | dynamic fallback              |
//! | no                          | no            | other          | private helper, warning logged  |

use serde_json::Value;
use std::ffi::OsString;
use tracing::{debug, warn};

use crate::command_set::{ArgumentSpec, CommandSet};
use crate::dispatch::{Arity, Body, Invocation, Member, Visibility};
use crate::errors::DeclarationError;
use crate::options::{OptionSpec, OptionTable};
use crate::registry::{HELP_TASK, Task, UnknownOptionPolicy};
use crate::wrapper::{WrapperBinding, shell_quote};

/// Reserved member name that receives every unresolvable task name.
pub const FALLBACK_MEMBER: &str = "method_missing";

/// Metadata accumulated for the next registered implementation.
#[derive(Debug, Default)]
struct PendingDeclaration {
    usage: Option<String>,
    description: Option<String>,
    long_description: Option<String>,
    options: OptionTable,
    hidden: bool,
}

/// Builds a `CommandSet` one declaration at a time.
pub struct CommandSetBuilder {
    set: CommandSet,
    pending: PendingDeclaration,
    errors: Vec<DeclarationError>,
    search_path: Option<OsString>,
}

impl CommandSetBuilder {
    /// Start a new set with the built-in `help` task as its default.
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self::from_set(CommandSet::empty(&namespace))
            .desc(
                "help [COMMAND]",
                "Describe available commands or one specific command",
            )
            .commit(HELP_TASK, Member {
                visibility: Visibility::Public,
                arity: Arity::range(0, 1),
                body: Body::Help,
            })
            .map("-h", HELP_TASK)
            .map("--help", HELP_TASK)
            .default_task(HELP_TASK)
    }

    /// Start a set derived from `base`.
    ///
    /// The registry, members and options are deep copied; declarations on
    /// the new set override inherited ones and never affect `base`.
    pub fn inherit(namespace: impl Into<String>, base: &CommandSet) -> Self {
        let mut set = base.clone();
        set.meta.namespace = namespace.into();
        set.meta.parent_chain.clear();
        Self::from_set(set)
    }

    fn from_set(set: CommandSet) -> Self {
        Self {
            set,
            pending: PendingDeclaration::default(),
            errors: Vec::new(),
            search_path: None,
        }
    }

    /// Program token printed before every usage line.
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.set.meta.banner = Some(banner.into());
        self
    }

    /// Begin a task declaration.
    pub fn desc(mut self, usage: impl Into<String>, description: impl Into<String>) -> Self {
        self.pending.usage = Some(usage.into());
        self.pending.description = Some(description.into());
        self
    }

    /// Begin a task declaration that is left out of help listings.
    pub fn desc_hidden(self, usage: impl Into<String>, description: impl Into<String>) -> Self {
        let mut builder = self.desc(usage, description);
        builder.pending.hidden = true;
        builder
    }

    pub fn long_desc(mut self, text: impl Into<String>) -> Self {
        self.pending.long_description = Some(text.into());
        self
    }

    /// Declare an option for the pending task.
    pub fn method_option(mut self, spec: OptionSpec) -> Self {
        let owner = self.pending.usage.clone().unwrap_or_else(|| "pending task".into());
        if let Err(err) = self.pending.options.insert(spec, &owner) {
            self.errors.push(err);
        }
        self
    }

    /// Add or replace an option on an already committed task in place.
    pub fn option_for(mut self, task: &str, spec: OptionSpec) -> Self {
        let name = normalize(task);
        let result = match self.set.registry.get_mut(&name) {
            Some(task) => task.options.upsert(spec),
            None => Err(DeclarationError::UnknownTask { task: name }),
        };
        if let Err(err) = result {
            self.errors.push(err);
        }
        self
    }

    /// Declare an option shared by every task of the set.
    pub fn class_option(mut self, spec: OptionSpec) -> Self {
        if let Err(err) = self.set.class_options.insert(spec, &self.set.meta.namespace) {
            self.errors.push(err);
        }
        self
    }

    /// Declare a class-level positional argument.
    pub fn argument(mut self, name: impl Into<String>, required: bool, description: Option<&str>) -> Self {
        self.set.arguments.push(ArgumentSpec {
            name: name.into(),
            required,
            description: description.map(str::to_string),
        });
        self
    }

    /// Register an implementation, committing any pending declaration.
    pub fn register<F>(self, name: &str, arity: Arity, body: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.commit(name, Member::native(arity, body))
    }

    /// Register a private helper; it is never dispatchable.
    pub fn helper<F>(mut self, name: &str, arity: Arity, body: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.discard_pending(name);
        let member = Member::native(arity, body).with_visibility(Visibility::Private);
        self.set.members.insert(normalize(name), member);
        self
    }

    /// Register a public member without task metadata, reachable only
    /// through dynamic dispatch.
    pub fn expose<F>(mut self, name: &str, arity: Arity, body: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.discard_pending(name);
        self.set.members.insert(normalize(name), Member::native(arity, body));
        self
    }

    /// Map an extra token (`-T`, `ls`, ...) to a task.
    pub fn map(mut self, token: impl Into<String>, task: &str) -> Self {
        self.set.registry.add_alias(token, normalize(task));
        self
    }

    pub fn default_task(mut self, task: &str) -> Self {
        self.set.registry.set_default_task(normalize(task));
        self
    }

    /// Route input whose first token names no task to the default task,
    /// passing every token (including the first) as arguments.
    pub fn default_task_swallows_args(mut self, swallows: bool) -> Self {
        self.set.registry.set_default_task_allows_positional_args(swallows);
        self
    }

    pub fn check_unknown_options(mut self, policy: UnknownOptionPolicy) -> Self {
        self.set.meta.unknown_option_policy = policy;
        self
    }

    /// Nest `child` under the command token `name`.
    pub fn subcommand(
        mut self,
        name: &str,
        usage: impl Into<String>,
        description: impl Into<String>,
        mut child: CommandSet,
    ) -> Self {
        let name = normalize(name);
        if self.set.meta.subcommand_names.contains(&name) {
            self.errors.push(DeclarationError::DuplicateSubcommand { name });
            return self;
        }
        self.discard_pending(&name);
        child.prepend_parent(&name.replace('_', "-"));
        self.set.meta.subcommand_names.insert(name.clone());
        self.set.subcommands.insert(name.clone(), child);
        self.desc(usage, description).commit(&name, Member {
            visibility: Visibility::Public,
            arity: Arity::any(),
            body: Body::Subcommand(name.clone()),
        })
    }

    /// Compose `child` into this set; its tasks are listed in help and
    /// dispatched as `namespace:task`.
    pub fn mount(mut self, child: CommandSet) -> Self {
        self.set.mounted.retain(|m| m.meta.namespace != child.meta.namespace);
        self.set.mounted.push(child);
        self
    }

    /// Search path used to locate wrapped executables (default: `PATH`).
    pub fn search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Bind this set to an external executable.
    pub fn wraps(mut self, executable: &str) -> Self {
        match WrapperBinding::locate(executable, self.search_path.as_deref()) {
            Ok(binding) => self.set.wrapper = Some(binding),
            Err(err) => self.errors.push(err),
        }
        self
    }

    /// Declare a stand-in task that forwards `<name> <args...>` to the
    /// wrapped executable and returns its exit status.
    ///
    /// A task this set already declares under `name` is kept.
    pub fn forward_task(self, name: &str, usage: impl Into<String>, description: impl Into<String>) -> Self {
        if self.set.registry.contains(&normalize(name)) {
            debug!(task = %name, "own declaration shadows forwarded task");
            return self;
        }
        let command = name.to_string();
        self.desc(usage, description)
            .register(name, Arity::any(), move |inv| {
                let mut line = shell_quote(&command);
                for arg in &inv.args {
                    line.push(' ');
                    line.push_str(&shell_quote(arg));
                }
                let status = inv.forward(&line)?;
                Ok(Value::from(status))
            })
    }

    /// Finish the set, failing on the first declaration error.
    pub fn build(mut self) -> Result<CommandSet, DeclarationError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        if let Some(usage) = self.pending.usage.take() {
            warn!(%usage, "task declaration was never registered and is discarded");
        }
        self.set.propagate_banner();
        Ok(self.set)
    }

    fn commit(mut self, name: &str, member: Member) -> Self {
        let name = normalize(name);
        let pending = std::mem::take(&mut self.pending);

        match (pending.usage, pending.description) {
            (Some(usage), Some(description)) => {
                debug!(task = %name, "committing task");
                self.set.registry.insert(Task {
                    name: name.clone(),
                    description,
                    long_description: pending.long_description,
                    usage,
                    options: pending.options,
                    hidden: pending.hidden,
                });
                self.set.members.insert(name, member.with_visibility(Visibility::Public));
            }
            _ if self.set.registry.contains(&name) => {
                debug!(task = %name, "replacing implementation of existing task");
                self.set.members.insert(name, member.with_visibility(Visibility::Public));
            }
            _ if name == FALLBACK_MEMBER => {
                self.set.fallback = Some(member);
            }
            _ => {
                warn!(
                    member = %name,
                    "attempted to create task without usage or description; registered as a private helper"
                );
                self.set.members.insert(name, member.with_visibility(Visibility::Private));
            }
        }
        self
    }

    fn discard_pending(&mut self, name: &str) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(usage) = pending.usage {
            warn!(%usage, member = %name, "task declaration discarded by non-task member");
        } else if !pending.options.is_empty() {
            warn!(
                member = %name,
                options = pending.options.len(),
                "pending options discarded by non-task member"
            );
        }
    }
}

/// Command-line names map to identifier-friendly member names.
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}
