use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::args::{Commands, Config};
use crate::install::{Switch, TunnelSettings};
use crate::system::SystemRunner;

fn init_logger(verbose: u8) {
    let mut builder = env_logger::builder();
    if verbose > 0 {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
    log::debug!("Debug logging enabled");
}

pub(crate) fn run<I, T>(argv: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = argv.into_iter().map(Into::into).collect::<Vec<OsString>>();

    let config = match Config::try_parse_from(&argv) {
        Ok(config) => config,
        Err(err) => {
            let first = argv.get(1).map(|arg| arg.to_string_lossy());
            return usage(err, first.as_deref());
        }
    };

    init_logger(config.global.verbose);

    let settings = TunnelSettings::from_args(&config.global)?;
    let mut runner = SystemRunner;
    let mut stdout = std::io::stdout().lock();
    let mut switch = Switch::new(&settings, &mut runner, &mut stdout);

    match config.command {
        Commands::On(args) => switch.on(args.target.as_deref(), &args.forwards)?,
        Commands::Off(args) => {
            if !args.ignored.is_empty() {
                log::debug!("Ignoring arguments after off: {:?}", args.ignored);
            }
            switch.off()?
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    Usage,
    UnknownParameter(String),
    Clap,
}

// Decided on the first raw argument: nothing, `-h` or `help` is a request for
// usage, anything that is not `on`/`off` is an unknown parameter.
fn classify(err: &clap::Error, first: Option<&str>) -> Rejection {
    match first {
        None | Some("-h" | "--help" | "help") => return Rejection::Usage,
        _ => {}
    }

    match err.kind() {
        ErrorKind::DisplayHelp => Rejection::Usage,
        ErrorKind::DisplayVersion => Rejection::Clap,
        _ => match first {
            Some("on" | "off") => Rejection::Clap,
            Some(parameter) => Rejection::UnknownParameter(parameter.to_string()),
            None => Rejection::Usage,
        },
    }
}

// Help exits with 1, an unknown first parameter is only reported and exits
// with 0.
fn usage(err: clap::Error, first: Option<&str>) -> anyhow::Result<ExitCode> {
    match classify(&err, first) {
        Rejection::Usage => {
            print!("{}", Config::command().render_help());
            Ok(ExitCode::FAILURE)
        }
        Rejection::UnknownParameter(parameter) => {
            println!("unknown parameter '{parameter}' - use 'sshtunnel -h' for help");
            Ok(ExitCode::SUCCESS)
        }
        Rejection::Clap => err.exit(),
    }
}
