//! Usage and help rendering.
//!
//! Usage lines are built from a task's usage string, prefixed with the
//! set's parent commands (subcommands) or namespace (mounted sets) and
//! followed by the task's required options:
//!
//! ```text
//! Commands:
//!   app help [COMMAND]         # Describe available commands or one specific command
//!   app remote add NAME URL    # Add a remote
//!   app tools:lint --fix=FIX   # Lint the tree
//! ```

use crate::command_set::CommandSet;
use crate::dispatch::resolver::canonical_name;
use crate::errors::DispatchError;
use crate::options::{OptionKind, OptionTable, OptionValue};
use crate::registry::Task;
use crate::shell::Shell;

/// Namespace token that is never rendered.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Render `task`'s usage line within `set`.
///
/// Parent commands win over the namespace; `subcommand` renders the last
/// namespace segment as a command token when there is no parent chain.
pub fn formatted_usage(
    task: &Task,
    set: &CommandSet,
    include_namespace: bool,
    subcommand: bool,
) -> String {
    let meta = set.meta();
    let mut formatted = if !meta.parent_chain.is_empty() {
        format!("{} ", meta.parent_chain.join(" "))
    } else if include_namespace && !meta.namespace.is_empty() && meta.namespace != DEFAULT_NAMESPACE
    {
        format!("{}:", meta.namespace)
    } else if subcommand {
        format!("{} ", meta.namespace.rsplit(':').next().unwrap_or_default())
    } else {
        String::new()
    };
    formatted.push_str(&task.usage);

    let mut required: Vec<String> = task.options.required().iter().map(|s| s.usage()).collect();
    required.sort();
    if !required.is_empty() {
        formatted.push(' ');
        formatted.push_str(&required.join(" "));
    }
    formatted
}

/// Full usage line of a task, including the program banner.
pub fn banner(set: &CommandSet, task: &Task) -> String {
    with_program(set, formatted_usage(task, set, false, false))
}

/// Usage line for a member that has no task metadata.
pub fn prefixed(set: &CommandSet, name: &str) -> String {
    let chain = &set.meta().parent_chain;
    if chain.is_empty() {
        with_program(set, name.to_string())
    } else {
        with_program(set, format!("{} {}", chain.join(" "), name))
    }
}

fn with_program(set: &CommandSet, usage: String) -> String {
    match &set.meta().banner {
        Some(program) => format!("{} {}", program, usage),
        None => usage,
    }
}

/// `[usage, "# description"]` rows for the visible tasks of `set`, sorted
/// by usage.
pub fn printable_tasks(set: &CommandSet, include_namespace: bool) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = set
        .registry()
        .tasks()
        .filter(|task| !task.hidden)
        .map(|task| {
            let usage = with_program(set, formatted_usage(task, set, include_namespace, false));
            let summary = task.description.lines().next().unwrap_or_default();
            vec![usage, format!("# {}", summary)]
        })
        .collect();
    rows.sort();
    rows
}

/// List every visible task of `set` and its mounted sets, then the shared
/// class options.
pub fn class_help(set: &CommandSet, shell: &mut dyn Shell) {
    let mut rows = printable_tasks(set, false);
    for mounted in set.mounted() {
        rows.extend(printable_tasks(mounted, true));
    }
    rows.sort();

    shell.say("Commands:");
    shell.print_table(&rows, 2, true);
    shell.blank();

    print_options(shell, "Options:", set.class_options());
}

/// Describe one task: usage, options and description.
///
/// A subcommand name lists the subcommand's own tasks instead.
pub fn task_help(
    set: &CommandSet,
    name: &str,
    prefix_matching: bool,
    shell: &mut dyn Shell,
) -> Result<(), DispatchError> {
    if let Some((namespace, task)) = name.split_once(':')
        && let Some(mounted) = set.mounted_set(namespace)
    {
        return task_help(mounted, task, prefix_matching, shell);
    }

    let canonical = canonical_name(set, name, prefix_matching)?.replace('-', "_");
    if let Some(child) = set.subcommand(&canonical) {
        class_help(child, shell);
        return Ok(());
    }
    let task = set
        .registry()
        .get(&canonical)
        .ok_or_else(|| DispatchError::UndefinedTask {
            name: name.to_string(),
        })?;

    shell.say("Usage:");
    shell.say(&format!("  {}", banner(set, task)));
    shell.blank();

    print_options(shell, "Options:", &set.class_options().merged_with(&task.options));

    match &task.long_description {
        Some(text) => {
            shell.say("Description:");
            shell.print_wrapped(text, 2);
        }
        None => shell.say(&task.description),
    }
    Ok(())
}

/// Print a titled options table; nothing when every option is hidden.
fn print_options(shell: &mut dyn Shell, title: &str, table: &OptionTable) {
    let mut rows = Vec::new();
    for spec in table.iter().filter(|s| !s.hidden) {
        let description = spec
            .description
            .as_ref()
            .map(|d| format!("# {}", d))
            .unwrap_or_default();
        rows.push(vec![spec.help_usage(), description]);

        if let Some(default) = &spec.default
            && !(spec.kind == OptionKind::Boolean && *default == OptionValue::Boolean(false))
        {
            rows.push(vec![String::new(), format!("# Default: {}", default)]);
        }
        if !spec.choices.is_empty() {
            rows.push(vec![
                String::new(),
                format!("# Possible values: {}", spec.choices.join(", ")),
            ]);
        }
    }
    if rows.is_empty() {
        return;
    }

    shell.say(title);
    shell.print_table(&rows, 2, false);
    shell.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CommandSetBuilder;
    use crate::dispatch::Arity;
    use crate::options::OptionSpec;
    use serde_json::json;

    fn deploy_set(namespace: &str) -> CommandSet {
        CommandSetBuilder::new(namespace)
            .desc("deploy ENV", "Deploy")
            .method_option(OptionSpec::string("to").required())
            .method_option(OptionSpec::string("as").required())
            .method_option(OptionSpec::boolean("force"))
            .register("deploy", Arity::exactly(1), |_| Ok(json!(null)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_namespace_is_never_rendered() {
        let set = deploy_set(DEFAULT_NAMESPACE);
        let task = set.registry().get("deploy").unwrap();
        assert_eq!(
            formatted_usage(task, &set, true, false),
            "deploy ENV --as=AS --to=TO"
        );
    }

    #[test]
    fn test_mounted_namespace_prefixes_usage() {
        let set = deploy_set("ops");
        let task = set.registry().get("deploy").unwrap();
        assert_eq!(formatted_usage(task, &set, true, false), "ops:deploy ENV --as=AS --to=TO");
        assert_eq!(formatted_usage(task, &set, false, false), "deploy ENV --as=AS --to=TO");
    }

    #[test]
    fn test_parent_chain_wins_over_namespace() {
        let root = CommandSetBuilder::new("root")
            .subcommand("ops", "ops SUBCOMMAND", "Operations", deploy_set("ops"))
            .build()
            .unwrap();
        let child = root.subcommand("ops").unwrap();
        let task = child.registry().get("deploy").unwrap();
        assert_eq!(
            formatted_usage(task, child, true, false),
            "ops deploy ENV --as=AS --to=TO"
        );
    }

    #[test]
    fn test_subcommand_flag_uses_last_namespace_segment() {
        let set = deploy_set("tools:ops");
        let task = set.registry().get("deploy").unwrap();
        assert_eq!(formatted_usage(task, &set, false, true), "ops deploy ENV --as=AS --to=TO");
    }

    #[test]
    fn test_optional_options_are_left_out_of_usage() {
        let set = deploy_set("app");
        let task = set.registry().get("deploy").unwrap();
        assert!(!formatted_usage(task, &set, false, false).contains("force"));
    }
}
