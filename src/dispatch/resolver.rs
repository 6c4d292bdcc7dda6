//! Resolves the leading command token to a task.

use crate::command_set::CommandSet;
use crate::errors::DispatchError;
use crate::registry::Task;

/// Outcome of name resolution.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// A registered task, possibly in a mounted set.
    Resolved {
        set: &'a CommandSet,
        task: &'a Task,
        args: Vec<String>,
    },
    /// A name with no registered task; the dispatcher decides what it means.
    /// `name` is the token as typed (or the alias target).
    Dynamic {
        set: &'a CommandSet,
        name: String,
        args: Vec<String>,
    },
    /// No name was given and the set has no default task.
    Missing { set: &'a CommandSet, args: Vec<String> },
}

/// Resolve `raw` against `set`.
///
/// The first token is consumed when it is an alias or does not start with
/// `-`; otherwise the default task applies and the token stays in the
/// arguments. Names are normalized by replacing `-` with `_` for lookup.
/// `namespace:task` addresses a mounted set.
pub fn resolve<'a>(
    set: &'a CommandSet,
    raw: &[String],
    prefix_matching: bool,
) -> Result<Resolution<'a>, DispatchError> {
    let registry = set.registry();
    let (token, args) = match raw.split_first() {
        Some((first, rest))
            if registry.alias_target(first).is_some() || !first.starts_with('-') =>
        {
            (Some(first.as_str()), rest.to_vec())
        }
        _ => (None, raw.to_vec()),
    };

    if let Some(token) = token
        && let Some((namespace, task)) = token.split_once(':')
        && let Some(mounted) = set.mounted_set(namespace)
    {
        let mut nested: Vec<String> = Vec::with_capacity(args.len() + 1);
        if !task.is_empty() {
            nested.push(task.to_string());
        }
        nested.extend(args);
        return resolve(mounted, &nested, prefix_matching);
    }

    let name = match token {
        Some(token) => Some(canonical_name(set, token, prefix_matching)?),
        None => registry.default_task().map(str::to_string),
    };

    if let Some(name) = &name
        && let Some(task) = registry.get(&name.replace('-', "_"))
    {
        return Ok(Resolution::Resolved { set, task, args });
    }

    if token.is_some()
        && registry.default_task_allows_positional_args()
        && let Some(task) = registry.default_task().and_then(|d| registry.get(d))
    {
        tracing::debug!(task = %task.name, "re-routing unresolved input to the default task");
        return Ok(Resolution::Resolved {
            set,
            task,
            args: raw.to_vec(),
        });
    }

    Ok(match name {
        Some(name) => Resolution::Dynamic { set, name, args },
        None => Resolution::Missing { set, args },
    })
}

/// Map a command token to a task name: aliases first, then exact names,
/// then (optionally) unambiguous prefixes of task names and aliases.
pub fn canonical_name(
    set: &CommandSet,
    token: &str,
    prefix_matching: bool,
) -> Result<String, DispatchError> {
    let registry = set.registry();
    if let Some(target) = registry.alias_target(token) {
        return Ok(target.to_string());
    }
    let normalized = token.replace('-', "_");
    if registry.contains(&normalized) || !prefix_matching {
        return Ok(token.to_string());
    }

    let mut possibilities: Vec<(String, String)> = registry
        .tasks()
        .filter(|t| t.name.starts_with(&normalized))
        .map(|t| (t.name.clone(), t.name.clone()))
        .chain(
            registry
                .aliases()
                .iter()
                .filter(|(alias, _)| alias.starts_with(token))
                .map(|(alias, target)| (alias.clone(), target.clone())),
        )
        .collect();
    possibilities.sort();

    let mut targets: Vec<&str> = possibilities.iter().map(|(_, t)| t.as_str()).collect();
    targets.sort_unstable();
    targets.dedup();

    match targets.as_slice() {
        [] => Ok(token.to_string()),
        [single] => Ok(single.to_string()),
        _ => Err(DispatchError::AmbiguousTask {
            name: token.to_string(),
            candidates: possibilities.into_iter().map(|(key, _)| key).collect(),
        }),
    }
}
