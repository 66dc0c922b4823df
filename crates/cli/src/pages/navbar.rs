//! Top bar available on every signed-in screen: CSV export, new patient and logout.

use crate::console::{Console, Toast};
use crate::shell::{Navigation, Shell};
use pharm_core::constants::PATIENTS_CSV_FILENAME;
use pharm_core::Route;
use std::io;

/// Outcome of offering a command to the top bar.
#[derive(Debug, PartialEq, Eq)]
pub enum Handled {
    /// Not a top-bar command; the screen decides.
    NotMine,
    /// Handled in place; the screen keeps running.
    Stay,
    Go(Navigation),
}

pub fn render(console: &mut Console) -> io::Result<()> {
    console.line("[new] new patient | [export] CSV | [home] dashboard | [logout] | [go <path>] | [quit]")
}

pub async fn handle(shell: &mut Shell, cmd: &str, arg: &str) -> anyhow::Result<Handled> {
    let handled = match cmd {
        "new" => Handled::Go(Navigation::To(Route::NewPatient)),
        "home" | "dashboard" => Handled::Go(Navigation::To(Route::Dashboard)),
        "export" => {
            export_csv(shell).await?;
            Handled::Stay
        }
        "logout" => {
            logout(shell)?;
            Handled::Go(Navigation::To(Route::Login))
        }
        "go" => match Route::parse(arg) {
            Ok(route) => Handled::Go(Navigation::To(route)),
            Err(err) => {
                shell.console.notify(Toast::Error, err)?;
                Handled::Stay
            }
        },
        "quit" | "q" | "exit" => Handled::Go(Navigation::Quit),
        "help" | "?" => {
            render(&mut shell.console)?;
            Handled::Stay
        }
        _ => Handled::NotMine,
    };
    Ok(handled)
}

/// Downloads the bulk export and saves it as `pacientes.csv`.
pub async fn export_csv(shell: &mut Shell) -> anyhow::Result<()> {
    let download = match shell.api.export_patients_csv().await {
        Ok(download) => download,
        Err(err) => {
            shell.report("CSV export failed", err)?;
            return Ok(());
        }
    };
    match shell.downloads.save(PATIENTS_CSV_FILENAME, &download) {
        Ok(path) => shell
            .console
            .notify(Toast::Success, format!("Saved {}", path.display()))?,
        Err(err) => shell.report("CSV export failed", format!("{err:#}"))?,
    }
    Ok(())
}

/// Clears the session; the shell sends whatever comes next to the login screen.
pub fn logout(shell: &mut Shell) -> anyhow::Result<()> {
    if let Err(err) = shell.api.session().logout() {
        shell.report("Could not remove the stored session", err)?;
    }
    shell.console.notify(Toast::Info, "Signed out")?;
    Ok(())
}

/// Tells the user a command was not understood.
pub fn unknown(console: &mut Console, cmd: &str) -> io::Result<()> {
    console.notify(Toast::Error, format!("Unknown command: {cmd} (try help)"))
}
