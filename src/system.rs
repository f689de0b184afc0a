//! Boundary to the external tools the tunnel depends on (systemctl,
//! ssh-keygen, apt-get). Everything above this module talks to a
//! [`CommandRunner`] so it can run without a real system underneath.

use std::process::Command;

/// Result of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub(crate) trait CommandRunner {
    /// Runs `program` with `args` to completion. An `Err` means the program
    /// could not be started at all.
    fn run(&mut self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput>;
}

/// Runs commands on the current host.
pub(crate) struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        log::debug!("Running {}", display_command(program, args));

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

pub(crate) fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
