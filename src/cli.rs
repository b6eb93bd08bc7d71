//! CLI domain: parse, route and presentation for the `cascade` harness binary.

mod parse;
mod presentation;
mod route;
pub mod scenarios;

pub use parse::{Cli, Commands, OutputFormat};
pub use route::{CommandOutput, RunContext};
