//! Command set served by the `cmdforge` binary.
//!
//! | Module   | Tasks                                        |
//! |----------|----------------------------------------------|
//! | `tasks`  | `greet` (`hi`), `sum`, `inspect`, `secret`   |
//! | `config` | `config show`, `config path`, `config validate` |
//! | `sys`    | `sys:kernel`, `sys:machine`, `sys:all`       |

pub mod config;
pub mod sys;
pub mod tasks;

use anyhow::Result;
use std::path::PathBuf;

use cmdforge::{CommandSet, CommandSetBuilder, RuntimeConfig};

pub const PROGRAM: &str = "cmdforge";

/// Build the top-level command set.
///
/// `sys` is mounted only when `uname` can be found on the configured
/// search path.
pub fn build_command_set(config: &RuntimeConfig, config_path: Option<PathBuf>) -> Result<CommandSet> {
    let builder = tasks::declare(CommandSetBuilder::new(PROGRAM).banner(PROGRAM)).subcommand(
        "config",
        "config SUBCOMMAND",
        "Show or check the runtime configuration",
        config::command_set(config_path)?,
    );

    let builder = match sys::command_set(config) {
        Some(sys) => builder.mount(sys),
        None => builder,
    };

    Ok(builder.build()?)
}
