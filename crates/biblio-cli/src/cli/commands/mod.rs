pub mod account;
pub mod library;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_SESSION_BACKEND: &str = "session-backend";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("biblio")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_BASE_URL)
                .long("base-url")
                .help("Library API base URL")
                .env("BIBLIO_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_BACKEND)
                .long("session-backend")
                .help("Where the session is kept between runs")
                .env("BIBLIO_SESSION_BACKEND")
                .value_parser(["file", "keyring", "memory"])
                .global(true),
        );

    let command = account::with_subcommands(command);
    let command = library::with_subcommands(command);
    logging::with_args(command)
}
