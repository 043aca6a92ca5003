use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_PASSWD: &str = "passwd";

pub const ARG_EMAIL: &str = "email";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Log in; the password is read from the terminal")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Account email (defaults to the last one used)")
                        .env("BIBLIO_EMAIL"),
                ),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account")
                .arg(Arg::new(ARG_FIRST_NAME).long("first-name").help("First name"))
                .arg(Arg::new(ARG_LAST_NAME).long("last-name").help("Last name"))
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Account email"),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("End the session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the logged-in account and its active loans"))
        .subcommand(Command::new(CMD_PASSWD).about("Change the account password"))
}
