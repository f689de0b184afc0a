use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Forward ports from another server to this host with a reverse SSH tunnel",
    long_about = None,
    arg_required_else_help = true,
    after_help = "INTERNAL-PORT:EXTERNAL-PORT can be given once or several times, one per forwarding"
)]
pub(crate) struct Config {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub(crate) struct GlobalArgs {
    #[arg(long, global = true, default_value = "autossh-tunnel.service")]
    pub service_name: String,
    #[arg(long, global = true, default_value = "/etc/systemd/system")]
    pub unit_dir: PathBuf,
    /// Private key of the tunnel, the public half is expected next to it with a `.pub` suffix
    #[arg(long, global = true, default_value = "/root/.ssh/id_rsa")]
    pub ssh_key: PathBuf,
    /// Abort on the first external command that fails
    #[arg(long, global = true)]
    pub strict: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Install and enable the tunnel service
    On(OnCommandArgs),
    /// Stop, disable and remove the tunnel service
    Off(OffCommandArgs),
}

// Both fields are optional and take values starting with `-` so that bad
// input is reported by the tunnel validation instead of clap.
#[derive(Args, Debug)]
pub(crate) struct OnCommandArgs {
    #[arg(value_name = "USER@SERVER", allow_hyphen_values = true)]
    pub target: Option<String>,
    #[arg(
        value_name = "INTERNAL-PORT:EXTERNAL-PORT",
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub forwards: Vec<String>,
}

/// Anything after `off` is ignored.
#[derive(Args, Debug)]
pub(crate) struct OffCommandArgs {
    #[arg(hide = true, allow_hyphen_values = true, trailing_var_arg = true)]
    pub ignored: Vec<OsString>,
}
