//! Binding to an external executable that a command set wraps.
//!
//! The executable is located once, when the wrapping set is declared. Calls
//! go through `sh -c` so the argument string is split the way a user would
//! type it:
//!
//! - `wrap` captures standard output; the exit status is not inspected
//! - `forward` inherits the standard streams and returns the exit status
//!
//! Both block until the child exits; there is no timeout.

use anyhow::{Context, Result};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::errors::DeclarationError;

/// A located executable and the name it was requested by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperBinding {
    pub parent_name: String,
    pub parent_executable_path: PathBuf,
}

impl WrapperBinding {
    /// Locate `name` on `search_path` (default: `PATH`).
    pub fn locate(name: &str, search_path: Option<&OsStr>) -> Result<Self, DeclarationError> {
        let path = find_executable(name, search_path).ok_or_else(|| {
            DeclarationError::WrapperTargetNotFound {
                name: name.to_string(),
            }
        })?;
        info!(executable = %path.display(), "bound wrapper target");
        Ok(Self {
            parent_name: name.to_string(),
            parent_executable_path: path,
        })
    }

    /// Run `<executable> <args>` and return its standard output as text.
    pub fn wrap(&self, args: &str) -> Result<String> {
        let command_line = self.command_line(args);
        debug!(%command_line, "capturing wrapped command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to run wrapped command: {}", command_line))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run `<executable> <args>` on the current standard streams and return
    /// its exit status (`-1` when it was terminated by a signal).
    pub fn forward(&self, args: &str) -> Result<i32> {
        let command_line = self.command_line(args);
        debug!(%command_line, "forwarding to wrapped command");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .status()
            .with_context(|| format!("Failed to run wrapped command: {}", command_line))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn command_line(&self, args: &str) -> String {
        let program = shell_quote(&self.parent_executable_path.to_string_lossy());
        if args.trim().is_empty() {
            program
        } else {
            format!("{} {}", program, args)
        }
    }
}

/// Find an executable file called `name`.
///
/// Names containing a path separator are checked as given.
pub fn find_executable(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }

    let search_path: OsString = match search_path {
        Some(path) => path.to_os_string(),
        None => env::var_os("PATH")?,
    };
    env::split_paths(&search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Quote `raw` for `sh`, e.g. `it's` becomes `'it'\''s'`.
pub fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}
