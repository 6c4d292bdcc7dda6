pub mod builder;
pub mod command_set;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod help;
pub mod options;
pub mod registry;
pub mod shell;
pub mod wrapper;

pub use builder::CommandSetBuilder;
pub use command_set::CommandSet;
pub use config::RuntimeConfig;
pub use dispatch::{Arity, Invocation, Outcome};
pub use errors::{DeclarationError, DispatchError};
pub use options::{OptionKind, OptionSpec, OptionValue, OptionValues};
pub use registry::UnknownOptionPolicy;
pub use shell::{BasicShell, CaptureShell, Shell};
