//! Typed options: declarations, tables and parsed values.
//!
//! - `spec`: `OptionSpec` and `OptionKind`, validation, usage banners, coercion
//! - `table`: ordered `OptionTable` owned by a task or a command set
//! - `value`: `OptionValue` and the `OptionValues` map handed to task bodies

pub mod spec;
pub mod table;
pub mod value;

pub use spec::{OptionKind, OptionSpec};
pub use table::OptionTable;
pub use value::{OptionValue, OptionValues};
