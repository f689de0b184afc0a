mod args;
mod cli;
mod error;
mod forward;
mod install;
mod system;
mod unit;

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    cli::run(std::env::args_os())
}
