use anyhow::Result;
use biblio_core::{Client, NavigationEvent};
use tokio::sync::broadcast;

use crate::cli::actions::{account, catalog, loans, route, users, Action, Task};

/// Execute the provided action.
// Single dispatch point for all subcommands; add a `Task` variant and a
// matching arm here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let Action { globals, task } = action;
    let mut config = globals.config()?;
    let client = Client::from_config(&config)?;
    let mut events = client.api.subscribe();

    let result = match task {
        Task::Login { email } => account::login(&client, &mut config, email).await,
        Task::Register {
            first_name,
            last_name,
            email,
        } => account::register(&client, first_name, last_name, email).await,
        Task::Logout => account::logout(&client).await,
        Task::Whoami => account::whoami(&client).await,
        Task::Passwd => account::passwd(&client).await,
        Task::Books { search, page } => catalog::books(&client, search.as_deref(), page).await,
        Task::Book { id } => catalog::book(&client, id).await,
        Task::Categories { page } => catalog::categories(&client, page).await,
        Task::Loans { history, all, page } => loans::list(&client, history, all, page).await,
        Task::Borrow { book_id, days } => loans::borrow(&client, book_id, days).await,
        Task::Return { loan_id } => loans::give_back(&client, loan_id).await,
        Task::Users { page } => users::list(&client, page).await,
        Task::Route { path } => route::show(&client, &path).await,
    };

    report_navigation(&mut events);
    result
}

/// Tell the user where the web client would have sent them.
fn report_navigation(events: &mut broadcast::Receiver<NavigationEvent>) {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if seen.contains(&event) {
            continue;
        }
        seen.push(event);
        match event {
            NavigationEvent::Login => {
                eprintln!("Your session has expired. Run `biblio login` to sign in again.")
            }
            NavigationEvent::Home => eprintln!("Your account is not allowed to do that."),
        }
    }
}
