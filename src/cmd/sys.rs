//! Wrapper around the system `uname` tool, mounted as `sys:*`.

use serde_json::json;
use tracing::warn;

use cmdforge::{Arity, CommandSet, CommandSetBuilder, RuntimeConfig};

pub fn command_set(config: &RuntimeConfig) -> Option<CommandSet> {
    let mut builder = CommandSetBuilder::new("sys");
    if let Some(path) = config.search_path_os() {
        builder = builder.search_path(path);
    }

    let result = builder
        .wraps("uname")
        .desc("kernel", "Print the kernel name")
        .register("kernel", Arity::NONE, |inv| {
            let name = inv.wrap("-s")?.trim().to_string();
            inv.say(&name);
            Ok(json!(name))
        })
        .desc("machine", "Print the hardware name")
        .register("machine", Arity::NONE, |inv| {
            let machine = inv.wrap("-m")?.trim().to_string();
            inv.say(&machine);
            Ok(json!(machine))
        })
        .desc("all", "Run uname -a on the terminal")
        .register("all", Arity::NONE, |inv| Ok(json!(inv.forward("-a")?)))
        .build();

    match result {
        Ok(set) => Some(set),
        Err(err) => {
            warn!("sys commands unavailable: {}", err);
            None
        }
    }
}
