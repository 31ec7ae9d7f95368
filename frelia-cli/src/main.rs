mod cmd;
mod config;

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("frelia")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Static site generation as a pipeline of page transforms")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log progress (otherwise RUST_LOG decides, default warn)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(cmd::build::make_subcommand())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some((name, _)) => anyhow::bail!("unknown command: {name}"),
        None => anyhow::bail!("no command given"),
    }
}
