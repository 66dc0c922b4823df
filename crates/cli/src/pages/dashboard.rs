//! `/dashboard`: patient list with a name filter.

use crate::console::{Console, Toast};
use crate::pages::navbar::{self, Handled};
use crate::shell::{split_command, Navigation, Shell};
use pharm_core::patient::{display_optional, filter_by_name};
use pharm_core::{PatientSummary, Route};
use std::io;

pub async fn show(shell: &mut Shell) -> anyhow::Result<Navigation> {
    navbar::render(&mut shell.console)?;
    let patients = match shell.api.list_patients().await {
        Ok(patients) => patients,
        Err(err) => {
            shell.report("Could not load patients", err)?;
            Vec::new()
        }
    };

    let mut query = String::new();
    render_rows(&mut shell.console, &filter_by_name(&patients, &query))?;
    shell
        .console
        .line("Commands: filter <text> | open <row or id> | refresh")?;

    loop {
        let Some(input) = shell.console.prompt("dashboard> ")? else {
            return Ok(Navigation::Quit);
        };
        let (cmd, arg) = split_command(&input);
        match cmd {
            "" => {}
            "filter" | "f" => {
                query = arg.to_string();
                render_rows(&mut shell.console, &filter_by_name(&patients, &query))?;
            }
            "open" | "o" => {
                let rows = filter_by_name(&patients, &query);
                match pick(&rows, arg) {
                    Some(patient) => return Ok(Navigation::To(Route::Patient(patient.id.clone()))),
                    None => shell
                        .console
                        .notify(Toast::Error, format!("No patient matches '{arg}'"))?,
                }
            }
            "refresh" | "r" => return Ok(Navigation::To(Route::Dashboard)),
            _ => match navbar::handle(shell, cmd, arg).await? {
                Handled::Go(next) => return Ok(next),
                Handled::Stay => {}
                Handled::NotMine => navbar::unknown(&mut shell.console, cmd)?,
            },
        }
    }
}

/// Prints one numbered row per patient.
pub fn render_rows(console: &mut Console, rows: &[&PatientSummary]) -> io::Result<()> {
    if rows.is_empty() {
        return console.line("No patients found.");
    }
    for (n, p) in rows.iter().enumerate() {
        console.line(format!(
            "{:>3}. {}  height {}  weight {}  IMC {}",
            n + 1,
            p.name,
            display_optional(p.height_m),
            display_optional(p.weight_kg),
            display_optional(p.imc),
        ))?;
    }
    Ok(())
}

/// Resolves a 1-based row number, falling back to an exact id.
fn pick<'a>(rows: &[&'a PatientSummary], arg: &str) -> Option<&'a PatientSummary> {
    if let Ok(n) = arg.parse::<usize>() {
        if let Some(row) = n.checked_sub(1).and_then(|i| rows.get(i)) {
            return Some(row);
        }
    }
    rows.iter().find(|p| p.id == arg).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, name: &str) -> PatientSummary {
        PatientSummary {
            id: id.into(),
            name: name.into(),
            imc: None,
            height_m: None,
            weight_kg: None,
        }
    }

    #[test]
    fn pick_by_row_or_id() {
        let all = [summary("p1", "Ana"), summary("p2", "Bruno")];
        let rows: Vec<&PatientSummary> = all.iter().collect();
        assert_eq!(pick(&rows, "2").map(|p| p.id.as_str()), Some("p2"));
        assert_eq!(pick(&rows, "p1").map(|p| p.id.as_str()), Some("p1"));
        assert!(pick(&rows, "3").is_none());
        assert!(pick(&rows, "0").is_none());
    }
}
