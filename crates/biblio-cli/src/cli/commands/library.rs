use clap::{Arg, ArgAction, Command};

pub const CMD_BOOKS: &str = "books";
pub const CMD_BOOK: &str = "book";
pub const CMD_LOANS: &str = "loans";
pub const CMD_BORROW: &str = "borrow";
pub const CMD_RETURN: &str = "return";
pub const CMD_USERS: &str = "users";
pub const CMD_CATEGORIES: &str = "categories";
pub const CMD_ROUTE: &str = "route";

pub const ARG_SEARCH: &str = "search";
pub const ARG_PAGE: &str = "page";
pub const ARG_ID: &str = "id";
pub const ARG_HISTORY: &str = "history";
pub const ARG_ALL: &str = "all";
pub const ARG_DAYS: &str = "days";
pub const ARG_PATH: &str = "path";

fn page_arg() -> Arg {
    Arg::new(ARG_PAGE)
        .short('p')
        .long("page")
        .help("Page number")
        .default_value("1")
        .value_parser(clap::value_parser!(u32).range(1..))
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new(ARG_ID)
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_BOOKS)
                .about("List the catalog")
                .arg(
                    Arg::new(ARG_SEARCH)
                        .short('s')
                        .long("search")
                        .help("Search titles, authors and ISBNs"),
                )
                .arg(page_arg()),
        )
        .subcommand(
            Command::new(CMD_BOOK)
                .about("Show one book")
                .arg(id_arg("Book id")),
        )
        .subcommand(
            Command::new(CMD_LOANS)
                .about("List your active loans")
                .arg(
                    Arg::new(ARG_HISTORY)
                        .long("history")
                        .help("List past loans instead")
                        .action(ArgAction::SetTrue)
                        .conflicts_with(ARG_ALL),
                )
                .arg(
                    Arg::new(ARG_ALL)
                        .long("all")
                        .help("List every active loan in the library (admin)")
                        .action(ArgAction::SetTrue),
                )
                .arg(page_arg()),
        )
        .subcommand(
            Command::new(CMD_BORROW)
                .about("Borrow a book")
                .arg(id_arg("Book id"))
                .arg(
                    Arg::new(ARG_DAYS)
                        .short('d')
                        .long("days")
                        .help("Loan duration in days (server default when omitted)")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                ),
        )
        .subcommand(
            Command::new(CMD_RETURN)
                .about("Return a borrowed book")
                .arg(id_arg("Loan id")),
        )
        .subcommand(
            Command::new(CMD_USERS)
                .about("List accounts (admin)")
                .arg(page_arg()),
        )
        .subcommand(
            Command::new(CMD_CATEGORIES)
                .about("List catalog categories")
                .arg(page_arg()),
        )
        .subcommand(
            Command::new(CMD_ROUTE)
                .about("Show how the route guard treats a page for the current session")
                .arg(Arg::new(ARG_PATH).help("Page path, e.g. /loans/active").required(true)),
        )
}
