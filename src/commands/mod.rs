//! Command trait, registration spec, and the closure-backed helper.

mod command;
mod func;
mod spec;

pub use command::Command;
pub use func::FnCommand;
pub use spec::CommandSpec;
