//! `account create` command.

use super::{CliError, bootstrap};

/// Create an operator account and its profile document.
pub async fn create(email: &str, password: &str, name: &str) -> Result<(), CliError> {
    let (_backend, auth) = bootstrap()?;

    let profile = auth.sign_up(email, password, name).await?;

    tracing::info!(
        profile_id = %profile.id,
        account_id = %profile.account_id,
        "operator account created"
    );

    Ok(())
}
