use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};
use biblio_core::models::{Credentials, PasswordChange, Registration};
use biblio_core::stores::DEFAULT_PER_PAGE;
use biblio_core::{ApiError, Client, Config};
use tracing::warn;

/// The message the session recorded for a failed auth operation.
async fn failure(client: &Client, error: ApiError) -> anyhow::Error {
    let message = client
        .auth
        .session()
        .last_error()
        .await
        .unwrap_or_else(|| error.to_string());
    anyhow!(message)
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim();
    if value.is_empty() {
        bail!("{} is required", label.trim_end_matches(": "));
    }
    Ok(value.to_string())
}

fn read_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

fn new_password() -> Result<String> {
    let password = read_password("New password: ")?;
    let confirmation = rpassword::prompt_password("Confirm new password: ")?;
    if password != confirmation {
        bail!("Passwords do not match");
    }
    Ok(password)
}

async fn require_login(client: &Client) -> Result<()> {
    if !client.auth.session().is_authenticated().await {
        bail!("Not logged in. Run `biblio login` first.");
    }
    Ok(())
}

pub async fn login(client: &Client, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = read_password(&format!("Password for {}: ", email))?;

    let credentials = Credentials {
        email: email.clone(),
        password,
    };
    if let Err(e) = client.auth.login(&credentials, None).await {
        return Err(failure(client, e).await);
    }

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    if let Some(user) = client.auth.session().user().await {
        println!("Logged in as {} <{}>", user.display_name(), user.email);
    }
    Ok(())
}

pub async fn register(
    client: &Client,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let first_name = match first_name {
        Some(name) => name,
        None => prompt("First name: ")?,
    };
    let last_name = match last_name {
        Some(name) => name,
        None => prompt("Last name: ")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = new_password()?;

    let registration = Registration {
        first_name,
        last_name,
        email,
        password,
    };
    if let Err(e) = client.auth.register(&registration).await {
        return Err(failure(client, e).await);
    }

    println!(
        "Account created. Run `biblio login --email {}` to sign in.",
        registration.email
    );
    Ok(())
}

pub async fn logout(client: &Client) -> Result<()> {
    client.auth.logout().await;
    println!("Logged out");
    Ok(())
}

/// Show the account, fetching the profile and active loans together.
pub async fn whoami(client: &Client) -> Result<()> {
    if !client.auth.session().is_authenticated().await {
        println!("Not logged in");
        return Ok(());
    }

    let mut users = client.users();
    let mut loans = client.loans();
    futures::join!(
        users.fetch_profile(),
        loans.fetch_active_loans(1, DEFAULT_PER_PAGE)
    );

    // The session copy is good enough when the profile endpoint failed
    let user = match users.profile.take() {
        Some(user) => user,
        None => match client.auth.session().user().await {
            Some(user) => user,
            None => bail!(users
                .status
                .last_error
                .unwrap_or_else(|| "Not logged in".to_string())),
        },
    };

    println!("{} <{}>", user.display_name(), user.email);
    println!("Role: {}", if user.is_admin { "administrator" } else { "member" });
    if let Some(last_login) = user.last_login {
        println!("Last login: {}", last_login.format("%Y-%m-%d %H:%M"));
    }
    match loans.status.last_error {
        Some(e) => println!("Active loans: unavailable ({})", e),
        None => println!("Active loans: {}", loans.pagination.total),
    }
    Ok(())
}

pub async fn passwd(client: &Client) -> Result<()> {
    require_login(client).await?;

    let current_password = read_password("Current password: ")?;
    let new_password = new_password()?;
    let change = PasswordChange {
        current_password,
        new_password,
    };
    if let Err(e) = client.auth.change_password(&change).await {
        return Err(failure(client, e).await);
    }

    println!("Password changed");
    Ok(())
}
