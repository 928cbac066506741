//! Login and logout.

use super::{CliError, connect};

/// Authenticate and persist tokens for later commands.
pub async fn login(username: &str, password: &str) -> Result<(), CliError> {
    let hub = connect().await?;

    hub.session().login(username, password).await?;
    println!("Logged in as {username}");
    Ok(())
}

/// Drop stored tokens.
pub async fn logout() -> Result<(), CliError> {
    let hub = connect().await?;

    hub.logout();
    println!("Logged out");
    Ok(())
}
