//! `/`: sign in.

use crate::console::Toast;
use crate::shell::{Navigation, Shell};
use api_client::PharmApi;
use pharm_core::Route;

pub async fn show(shell: &mut Shell) -> anyhow::Result<Navigation> {
    shell.console.line("Pharm Assist | Sign in")?;
    loop {
        let Some(email) = shell.console.prompt("Email: ")? else {
            return Ok(Navigation::Quit);
        };
        let Some(password) = shell.console.prompt("Password: ")? else {
            return Ok(Navigation::Quit);
        };

        match sign_in(&shell.api, email.trim(), &password).await {
            Ok(who) => {
                shell
                    .console
                    .notify(Toast::Success, format!("Signed in as {who}"))?;
                return Ok(Navigation::To(Route::Dashboard));
            }
            Err(err) => shell.report("Login failed", format!("{err:#}"))?,
        }
    }
}

/// Logs in and stores the token in the session. Returns the signed-in email.
pub async fn sign_in(api: &PharmApi, email: &str, password: &str) -> anyhow::Result<String> {
    let response = api.login(email, password).await?;
    let who = response
        .user
        .map(|u| u.email)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| email.to_string());
    api.session().sign_in(response.token, Some(who.clone()))?;
    tracing::info!(email = %who, "signed in");
    Ok(who)
}
