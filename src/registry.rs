//! Task registry and per-set metadata.
//!
//! A `TaskRegistry` is built once by a `CommandSetBuilder` and is read-only
//! during dispatch. Derived sets receive a deep copy (`Clone`), so edits in a
//! derived registry never leak into its base.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::options::OptionTable;

/// Name of the built-in help task.
pub const HELP_TASK: &str = "help";

/// A named, dispatchable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub long_description: Option<String>,
    pub usage: String,
    pub options: OptionTable,
    pub hidden: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        usage: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            long_description: None,
            usage: usage.into(),
            options: OptionTable::new(),
            hidden: false,
        }
    }
}

/// Ordered mapping of task name to task plus name-resolution settings.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    alias_map: BTreeMap<String, String>,
    default_task: Option<String>,
    default_task_allows_positional_args: bool,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any task of the same name in place.
    pub fn insert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.name == task.name) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add_alias(&mut self, token: impl Into<String>, target: impl Into<String>) {
        self.alias_map.insert(token.into(), target.into());
    }

    pub fn alias_target(&self, token: &str) -> Option<&str> {
        self.alias_map.get(token).map(String::as_str)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.alias_map
    }

    pub fn set_default_task(&mut self, name: impl Into<String>) {
        self.default_task = Some(name.into());
    }

    pub fn default_task(&self) -> Option<&str> {
        self.default_task.as_deref()
    }

    pub fn set_default_task_allows_positional_args(&mut self, allows: bool) {
        self.default_task_allows_positional_args = allows;
    }

    /// Whether unresolvable input is re-routed to the default task as
    /// positional arguments.
    pub fn default_task_allows_positional_args(&self) -> bool {
        self.default_task_allows_positional_args
    }
}

/// Which tasks reject flags they do not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOptionMode {
    /// Every task rejects unknown flags
    #[default]
    All,
    /// Only the listed tasks reject unknown flags
    Only,
    /// Every task except the listed ones rejects unknown flags
    Except,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownOptionPolicy {
    pub mode: UnknownOptionMode,
    pub task_names: BTreeSet<String>,
}

impl UnknownOptionPolicy {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: UnknownOptionMode::Only,
            task_names: tasks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn except<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: UnknownOptionMode::Except,
            task_names: tasks.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether unknown flags are an error for `task`.
    pub fn rejects_unknown(&self, task: &str) -> bool {
        match self.mode {
            UnknownOptionMode::All => true,
            UnknownOptionMode::Only => self.task_names.contains(task),
            UnknownOptionMode::Except => !self.task_names.contains(task),
        }
    }
}

/// Set-level metadata used by help rendering and dispatch.
#[derive(Debug, Clone, Default)]
pub struct CommandSetMeta {
    /// Namespace token; `"default"` is never rendered
    pub namespace: String,
    pub banner: Option<String>,
    /// Command tokens leading to this set when nested as a subcommand
    pub parent_chain: Vec<String>,
    pub subcommand_names: BTreeSet<String>,
    pub unknown_option_policy: UnknownOptionPolicy,
}

impl CommandSetMeta {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_task() {
        let mut registry = TaskRegistry::new();
        registry.insert(Task::new("build", "build", "Build it"));
        registry.insert(Task::new("test", "test", "Test it"));
        registry.insert(Task::new("build", "build TARGET", "Build a target"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("build").unwrap().usage, "build TARGET");
        let order: Vec<&str> = registry.tasks().map(|t| t.name.as_str()).collect();
        assert_eq!(order, ["build", "test"]);
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut base = TaskRegistry::new();
        base.insert(Task::new("build", "build", "Build it"));
        let mut derived = base.clone();
        derived.get_mut("build").unwrap().description = "Changed".into();
        derived.add_alias("b", "build");

        assert_eq!(base.get("build").unwrap().description, "Build it");
        assert!(base.alias_target("b").is_none());
    }

    #[test]
    fn test_unknown_option_policy_modes() {
        assert!(UnknownOptionPolicy::all().rejects_unknown("any"));

        let only = UnknownOptionPolicy::only(["strict"]);
        assert!(only.rejects_unknown("strict"));
        assert!(!only.rejects_unknown("loose"));

        let except = UnknownOptionPolicy::except(["loose"]);
        assert!(except.rejects_unknown("strict"));
        assert!(!except.rejects_unknown("loose"));
    }
}
