//! The immutable product of a `CommandSetBuilder`.

use anyhow::anyhow;
use std::collections::BTreeMap;

use crate::config::RuntimeConfig;
use crate::dispatch::{Dispatcher, Member, Outcome};
use crate::errors::DispatchError;
use crate::options::OptionTable;
use crate::registry::{CommandSetMeta, TaskRegistry};
use crate::shell::Shell;
use crate::wrapper::WrapperBinding;

/// Class-level positional argument, bound before a task's own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
}

/// A declared set of tasks with everything needed to dispatch them.
///
/// `Clone` is a deep copy of the registry and metadata; task bodies are
/// shared.
#[derive(Debug, Clone)]
pub struct CommandSet {
    pub(crate) meta: CommandSetMeta,
    pub(crate) registry: TaskRegistry,
    pub(crate) members: BTreeMap<String, Member>,
    pub(crate) class_options: OptionTable,
    pub(crate) arguments: Vec<ArgumentSpec>,
    pub(crate) subcommands: BTreeMap<String, CommandSet>,
    pub(crate) mounted: Vec<CommandSet>,
    pub(crate) fallback: Option<Member>,
    pub(crate) wrapper: Option<WrapperBinding>,
}

impl CommandSet {
    pub(crate) fn empty(namespace: &str) -> Self {
        Self {
            meta: CommandSetMeta::new(namespace),
            registry: TaskRegistry::new(),
            members: BTreeMap::new(),
            class_options: OptionTable::new(),
            arguments: Vec::new(),
            subcommands: BTreeMap::new(),
            mounted: Vec::new(),
            fallback: None,
            wrapper: None,
        }
    }

    pub fn meta(&self) -> &CommandSetMeta {
        &self.meta
    }

    pub fn namespace(&self) -> &str {
        &self.meta.namespace
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn class_options(&self) -> &OptionTable {
        &self.class_options
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandSet> {
        self.subcommands.get(name)
    }

    pub fn mounted(&self) -> &[CommandSet] {
        &self.mounted
    }

    pub fn mounted_set(&self, namespace: &str) -> Option<&CommandSet> {
        self.mounted.iter().find(|m| m.meta.namespace == namespace)
    }

    pub fn fallback(&self) -> Option<&Member> {
        self.fallback.as_ref()
    }

    pub fn wrapper(&self) -> Option<&WrapperBinding> {
        self.wrapper.as_ref()
    }

    pub(crate) fn wrapper_binding(&self) -> anyhow::Result<&WrapperBinding> {
        self.wrapper
            .as_ref()
            .ok_or_else(|| anyhow!("Command set '{}' does not wrap an executable", self.meta.namespace))
    }

    /// Dispatch `args`, reporting recoverable failures on `shell`.
    pub fn start<S: AsRef<str>>(
        &self,
        args: &[S],
        shell: &mut dyn Shell,
        config: &RuntimeConfig,
    ) -> Result<Outcome, DispatchError> {
        Dispatcher::new(self, config).start(args, shell)
    }

    /// Dispatch `args` and return the raw result.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        args: &[S],
        shell: &mut dyn Shell,
        config: &RuntimeConfig,
    ) -> Result<serde_json::Value, DispatchError> {
        let args = args.iter().map(|a| a.as_ref().to_string()).collect();
        Dispatcher::new(self, config).dispatch(args, shell)
    }

    /// Print the list of tasks.
    pub fn help(&self, shell: &mut dyn Shell) {
        crate::help::class_help(self, shell);
    }

    /// Record `token` as the outermost parent command of this set and of
    /// every set nested below it.
    pub(crate) fn prepend_parent(&mut self, token: &str) {
        self.meta.parent_chain.insert(0, token.to_string());
        for child in self.subcommands.values_mut() {
            child.prepend_parent(token);
        }
    }

    /// Give nested sets without their own banner this set's banner.
    pub(crate) fn propagate_banner(&mut self) {
        let banner = self.meta.banner.clone();
        for child in self.subcommands.values_mut().chain(self.mounted.iter_mut()) {
            if child.meta.banner.is_none() {
                child.meta.banner = banner.clone();
            }
            child.propagate_banner();
        }
    }
}
