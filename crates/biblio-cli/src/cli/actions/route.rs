use anyhow::Result;
use biblio_core::guard::Navigation;
use biblio_core::Client;

fn describe(navigation: &Navigation) -> String {
    match navigation.decision.location() {
        None => format!("{}\nallowed", navigation.title),
        Some(location) => format!("{}\nredirect to {}", navigation.title, location),
    }
}

/// Print the guard's decision for `path` under the current session.
pub async fn show(client: &Client, path: &str) -> Result<()> {
    let navigation = client.navigate(path).await;
    println!("{}", describe(&navigation));
    Ok(())
}
