//! Line-oriented shell over the billing engine.

pub mod commands;
pub mod output;
pub mod registry;
pub mod shell;

pub use shell::{
    parse_command_line, run_cli, CliError, CliMode, CommandError, LoopControl, ShellContext,
};
