//! Login / logout handlers.

use secrecy::SecretString;
use wanyumba_core::Console;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;

pub async fn login(console: &Console, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = match args.email {
        Some(email) => email,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| CliError::Terminal {
                reason: e.to_string(),
            })?,
    };

    let password = rpassword::prompt_password("Password: ").map_err(|e| CliError::Terminal {
        reason: e.to_string(),
    })?;
    let password = SecretString::from(password);

    console.login(&email, &password).await?;

    if !global.quiet {
        eprintln!("Logged in as {email}");
    }
    Ok(())
}

pub async fn logout(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    console.logout().await?;

    if !global.quiet {
        eprintln!("Logged out");
    }
    Ok(())
}
