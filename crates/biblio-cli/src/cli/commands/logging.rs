use clap::{Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log verbosity (-v info, -vv debug, -vvv trace); default honors RUST_LOG")
            .global(true)
            .action(ArgAction::Count),
    )
}
