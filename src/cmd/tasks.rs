//! Everyday tasks of the demo set.

use anyhow::Context;
use serde_json::{Value, json};

use cmdforge::{Arity, CommandSetBuilder, OptionSpec};

pub fn declare(builder: CommandSetBuilder) -> CommandSetBuilder {
    builder
        .class_option(
            OptionSpec::boolean("quiet")
                .alias("q")
                .desc("Suppress task output"),
        )
        .desc("greet NAME", "Greet someone")
        .long_desc(
            "Prints a greeting for NAME. Use --times to repeat it and --shout \
             to print it in capitals.",
        )
        .method_option(
            OptionSpec::string("greeting")
                .default_value("Hello")
                .desc("Greeting word"),
        )
        .method_option(OptionSpec::boolean("shout").alias("s").desc("Print in capitals"))
        .method_option(OptionSpec::numeric("times").default_value(1_i64).desc("Repeat count"))
        .register("greet", Arity::exactly(1), |inv| {
            let greeting = inv.options.string("greeting").unwrap_or("Hello").to_string();
            let mut line = format!("{}, {}!", greeting, inv.args[0]);
            if inv.options.flag("shout") {
                line = line.to_uppercase();
            }
            let times = inv.options.numeric("times").unwrap_or(1.0).max(0.0) as usize;
            if !inv.options.flag("quiet") {
                for _ in 0..times {
                    inv.say(&line);
                }
            }
            Ok(json!(line))
        })
        .map("hi", "greet")
        .desc("sum NUMBERS...", "Add numbers together")
        .register("sum", Arity::at_least(1), |inv| {
            let mut total = 0.0;
            for raw in &inv.args {
                let n: f64 = raw
                    .parse()
                    .with_context(|| format!("'{}' is not a number", raw))?;
                total += n;
            }
            if !inv.options.flag("quiet") {
                inv.say(format_number(total));
            }
            Ok(json!(total))
        })
        .desc("inspect [ARGS...]", "Print the parsed arguments and options as JSON")
        .method_option(OptionSpec::array("tags").desc("Labels to attach"))
        .method_option(OptionSpec::map("env").desc("Variables as key:value"))
        .method_option(OptionSpec::numeric("count").alias("n"))
        .method_option(
            OptionSpec::string("level")
                .choices(["low", "medium", "high"])
                .desc("Priority"),
        )
        .method_option(OptionSpec::boolean("verbose").alias("v"))
        .register("inspect", Arity::any(), |inv| {
            let report = json!({
                "task": inv.name(),
                "args": inv.args,
                "options": inv.options.to_json(),
            });
            let text = serde_json::to_string_pretty(&report)?;
            inv.say(text);
            Ok(report)
        })
        .desc_hidden("secret", "Not listed in help")
        .register("secret", Arity::NONE, |inv| {
            inv.say("You found the secret task.");
            Ok(Value::Null)
        })
}

/// Integral values print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
