use anyhow::{bail, Result};
use biblio_core::stores::DEFAULT_PER_PAGE;
use biblio_core::Client;

use super::clip;

/// List accounts. The server refuses this for non-admins.
pub async fn list(client: &Client, page: u32) -> Result<()> {
    let mut store = client.users();
    store.fetch_users(page, DEFAULT_PER_PAGE).await;
    if let Some(e) = store.status.last_error {
        bail!(e);
    }

    for user in &store.users {
        println!(
            "{:>5}  {:<30}  {:<35}  {:<6}  {}",
            user.id,
            clip(&user.display_name(), 30),
            clip(&user.email, 35),
            if user.is_admin { "admin" } else { "member" },
            if user.is_active { "active" } else { "disabled" }
        );
    }
    println!("{}", store.pagination.display());
    Ok(())
}
