mod commands;
mod logging;
mod output;

pub use commands::{Cli, Commands, KeyAction, run};
