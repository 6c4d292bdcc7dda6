//! Integration tests for the cmdforge binary
//!
//! These tests run the demo command set end to end: dispatch, help output,
//! failure reporting, configuration layering and the wrapped `uname` tool.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a cmdforge Command isolated from the user's config
fn cmdforge(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("cmdforge");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("CMDFORGE_DEBUG")
        .env_remove("CMDFORGE_PREFIX_MATCHING")
        .env_remove("CMDFORGE_PATH")
        .env_remove("CMDFORGE_WIDTH");
    cmd
}

/// Helper to create a temporary home directory
fn create_temp_home() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper to write a config file and return its path
fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("cmdforge.toml");
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_no_arguments_lists_commands() {
        let home = create_temp_home();
        cmdforge(&home)
            .assert()
            .success()
            .stdout(predicate::str::starts_with("Commands:\n"))
            .stdout(predicate::str::contains("cmdforge greet NAME"))
            .stdout(predicate::str::contains("cmdforge config SUBCOMMAND"))
            .stdout(predicate::str::contains("[--quiet], [--no-quiet]"));
    }

    #[test]
    fn test_help_flag_is_handled_by_the_engine() {
        let home = create_temp_home();
        cmdforge(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cmdforge help [COMMAND]"));
    }

    #[test]
    fn test_version() {
        let home = create_temp_home();
        cmdforge(&home).arg("--version").assert().success();
    }

    #[test]
    fn test_task_help() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["help", "greet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:\n  cmdforge greet NAME\n"))
            .stdout(predicate::str::contains("[--greeting=GREETING]"))
            .stdout(predicate::str::contains("# Default: Hello"))
            .stdout(predicate::str::contains("-s, [--shout], [--no-shout]"))
            .stdout(predicate::str::contains("Description:"));
    }

    #[test]
    fn test_hidden_task_is_unlisted_but_runs() {
        let home = create_temp_home();
        cmdforge(&home)
            .assert()
            .success()
            .stdout(predicate::str::contains("secret").not());
        cmdforge(&home)
            .arg("secret")
            .assert()
            .success()
            .stdout("You found the secret task.\n");
    }

    #[test]
    fn test_verbose_logs_dispatch_stages() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["--verbose", "greet", "World"])
            .assert()
            .success()
            .stderr(predicate::str::contains("resolving task"));
    }
}

// =============================================================================
// Task Tests
// =============================================================================

mod tasks {
    use super::*;

    #[test]
    fn test_greet() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["greet", "World"])
            .assert()
            .success()
            .stdout("Hello, World!\n");
    }

    #[test]
    fn test_alias_with_options() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["hi", "World", "-s", "--times", "2", "--greeting=Hey"])
            .assert()
            .success()
            .stdout("HEY, WORLD!\nHEY, WORLD!\n");
    }

    #[test]
    fn test_class_option_applies_to_every_task() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["greet", "-q", "World"])
            .assert()
            .success()
            .stdout("");
        cmdforge(&home)
            .args(["sum", "1", "2", "--quiet"])
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn test_sum() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["sum", "1", "2", "3.5"])
            .assert()
            .success()
            .stdout("6.5\n");
        cmdforge(&home)
            .args(["sum", "--", "-1", "-2"])
            .assert()
            .success()
            .stdout("-3\n");
    }

    #[test]
    fn test_task_failure_is_not_a_usage_error() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["sum", "1", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("'x' is not a number"))
            .stderr(predicate::str::contains("Usage:").not());
    }

    #[test]
    fn test_inspect_reports_parsed_options() {
        let home = create_temp_home();
        let output = cmdforge(&home)
            .args([
                "inspect", "a", "--tags", "x", "y", "--env", "k:v", "-n", "2", "--level", "high",
                "-v", "--", "--literal",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["task"], "inspect");
        assert_eq!(report["args"], serde_json::json!(["a", "--literal"]));
        assert_eq!(report["options"]["tags"], serde_json::json!(["x", "y"]));
        assert_eq!(report["options"]["env"]["k"], "v");
        assert_eq!(report["options"]["count"].as_f64(), Some(2.0));
        assert_eq!(report["options"]["level"], "high");
        assert_eq!(report["options"]["verbose"], true);
        assert!(report["options"].get("quiet").is_none());
    }

    #[test]
    fn test_prefix_resolution() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["gre", "World"])
            .assert()
            .success()
            .stdout("Hello, World!\n");
        cmdforge(&home)
            .args(["s"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Ambiguous command s matches [secret, sum]"));
    }
}

// =============================================================================
// Failure Reporting Tests
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_undefined_task() {
        let home = create_temp_home();
        cmdforge(&home)
            .arg("nope")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not find command \"nope\"."));
    }

    #[test]
    fn test_arity_mismatch_prints_usage() {
        let home = create_temp_home();
        cmdforge(&home)
            .arg("greet")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Usage: \"cmdforge greet NAME\""));
    }

    #[test]
    fn test_unknown_switch() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["greet", "World", "--bogus"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Unknown switches \"--bogus\""));
    }

    #[test]
    fn test_invalid_choice() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["inspect", "--level", "extreme"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("'--level'"));
    }

    #[test]
    fn test_debug_flag_propagates_usage_errors() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["--debug", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error: Could not find command"));
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("prefix_matching = true"))
            .stdout(predicate::str::contains("debug = false"));
    }

    #[test]
    fn test_config_file_and_env_layering() {
        let home = create_temp_home();
        let path = write_config(&home, "width = 100\ncolor = false\n");
        cmdforge(&home)
            .arg("--config")
            .arg(&path)
            .args(["config", "show"])
            .env("CMDFORGE_WIDTH", "120")
            .assert()
            .success()
            .stdout(predicate::str::contains("width = 120"))
            .stdout(predicate::str::contains("color = false"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_default_config_location_is_read() {
        let home = create_temp_home();
        fs::create_dir_all(home.path().join("cmdforge")).unwrap();
        fs::write(
            home.path().join("cmdforge").join("cmdforge.toml"),
            "prefix_matching = false\n",
        )
        .unwrap();
        cmdforge(&home)
            .args(["gre", "World"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not find command \"gre\"."));
    }

    #[test]
    fn test_env_disables_prefix_matching() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["gre", "World"])
            .env("CMDFORGE_PREFIX_MATCHING", "false")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not find command \"gre\"."));
    }

    #[test]
    fn test_config_path_and_validate() {
        let home = create_temp_home();
        let path = write_config(&home, "width = 10\n");
        cmdforge(&home)
            .arg("--config")
            .arg(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cmdforge.toml"));
        cmdforge(&home)
            .arg("--config")
            .arg(&path)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("too narrow"));
    }

    #[test]
    fn test_invalid_config_file_fails() {
        let home = create_temp_home();
        let path = write_config(&home, "debug = [");
        cmdforge(&home)
            .arg("--config")
            .arg(&path)
            .arg("greet")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse cmdforge.toml"));
    }

    #[test]
    fn test_config_subcommand_help_is_prefixed() {
        let home = create_temp_home();
        cmdforge(&home)
            .args(["config", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cmdforge config show"))
            .stdout(predicate::str::contains("cmdforge config validate"));
    }
}

// =============================================================================
// Wrapped Tool Tests
// =============================================================================

#[cfg(unix)]
mod wrapped_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Helper to place a fake `uname` on a private search path
    fn fake_uname(dir: &TempDir) {
        let path = dir.path().join("uname");
        fs::write(
            &path,
            "#!/bin/sh\ncase \"$1\" in\n  -s) echo FakeOS ;;\n  -m) echo fake64 ;;\n  -a) echo \"FakeOS everything\" ;;\nesac\n",
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_mounted_wrapper_tasks() {
        let home = create_temp_home();
        let bin = TempDir::new().unwrap();
        fake_uname(&bin);

        cmdforge(&home)
            .env("CMDFORGE_PATH", bin.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("cmdforge sys:kernel"));
        cmdforge(&home)
            .env("CMDFORGE_PATH", bin.path())
            .arg("sys:kernel")
            .assert()
            .success()
            .stdout("FakeOS\n");
        cmdforge(&home)
            .env("CMDFORGE_PATH", bin.path())
            .arg("sys:all")
            .assert()
            .success()
            .stdout("FakeOS everything\n");
    }

    #[test]
    fn test_missing_wrapped_tool_skips_mount() {
        let home = create_temp_home();
        let empty = TempDir::new().unwrap();
        cmdforge(&home)
            .env("CMDFORGE_PATH", empty.path())
            .arg("sys:kernel")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("sys commands unavailable"));
    }
}
