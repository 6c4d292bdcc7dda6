use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cmdforge::{BasicShell, Outcome, RuntimeConfig};

mod cmd;

#[derive(Parser)]
#[command(name = "cmdforge")]
#[command(version, about = "Declarative command dispatch demo")]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Log dispatch stages to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Propagate usage errors instead of reporting them
    #[arg(long)]
    pub debug: bool,

    /// Path to cmdforge.toml (default: <config dir>/cmdforge/cmdforge.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable colored error output
    #[arg(long)]
    pub no_color: bool,

    /// Task name and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cmdforge=debug" } else { "cmdforge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RuntimeConfig::load_or_default(cli.config.as_deref())?.from_env()?;
    if cli.debug {
        config.debug = true;
    }
    if cli.no_color {
        config.color = false;
    }
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let set = cmd::build_command_set(&config, cli.config.clone())?;
    let mut shell = BasicShell::new(config.width, config.color);

    match set.start(&cli.args, &mut shell, &config)? {
        Outcome::Completed(_) => Ok(()),
        outcome @ Outcome::Failed { .. } => std::process::exit(outcome.exit_code()),
    }
}
