//! `/paciente/novo`: register a patient.

use crate::console::Toast;
use crate::pages::patient_form::{choose_action, fill, FormAction, FormMode};
use crate::shell::{Navigation, Shell};
use pharm_core::{PatientForm, Route};

pub async fn show(shell: &mut Shell) -> anyhow::Result<Navigation> {
    shell.console.line("New patient")?;
    let mut form = PatientForm::default();
    if !fill(&mut shell.console, &mut form, FormMode::Create)? {
        return Ok(Navigation::Quit);
    }

    loop {
        match choose_action(&mut shell.console)? {
            None => return Ok(Navigation::Quit),
            Some(FormAction::Cancel) => return Ok(Navigation::To(Route::Dashboard)),
            Some(FormAction::Edit) => {
                if !fill(&mut shell.console, &mut form, FormMode::Create)? {
                    return Ok(Navigation::Quit);
                }
            }
            Some(FormAction::Save) => {
                // Invalid input never reaches the network; the form keeps what was typed.
                let patient = match form.validate_new() {
                    Ok(patient) => patient,
                    Err(err) => {
                        shell.console.notify(Toast::Error, err)?;
                        continue;
                    }
                };
                match shell.api.create_patient(&patient).await {
                    Ok(created) => {
                        tracing::info!(patient_id = %created.id, "patient created");
                        shell.console.notify(Toast::Success, "Patient saved")?;
                        return Ok(Navigation::To(Route::Patient(created.id)));
                    }
                    Err(err) => shell.report("Could not save patient", err)?,
                }
            }
        }
    }
}
