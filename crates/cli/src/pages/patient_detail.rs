//! `/paciente/:id`: patient record, edit form, encounter history and actions.

use crate::console::{Console, Toast};
use crate::pages::navbar::{self, Handled};
use crate::pages::patient_form::{choose_action, fill, FormAction, FormMode};
use crate::shell::{split_command, Navigation, Shell};
use pharm_core::constants::{patient_pdf_filename, MISSING_VALUE};
use pharm_core::patient::{display_list, display_optional};
use pharm_core::{EncounterSummary, Patient, PatientForm, Route};
use std::io;

pub async fn show(shell: &mut Shell, patient_id: &str) -> anyhow::Result<Navigation> {
    navbar::render(&mut shell.console)?;
    let mut patient = match shell.api.get_patient(patient_id).await {
        Ok(patient) => patient,
        Err(err) => {
            shell.report("Could not load patient", err)?;
            return Ok(Navigation::To(Route::Dashboard));
        }
    };
    let history = match shell.api.list_encounters(patient_id).await {
        Ok(history) => history,
        Err(err) => {
            shell.report("Could not load encounter history", err)?;
            Vec::new()
        }
    };

    render_patient(&mut shell.console, &patient)?;
    render_history(&mut shell.console, &history)?;
    shell.console.line(
        "Commands: edit | delete | start | pdf | open <n> (summary) | resume <n> (questionnaire)",
    )?;

    loop {
        let Some(input) = shell.console.prompt("patient> ")? else {
            return Ok(Navigation::Quit);
        };
        let (cmd, arg) = split_command(&input);
        match cmd {
            "" => {}
            "edit" | "e" => {
                match edit(shell, &patient).await? {
                    EditOutcome::Saved(fresh) => {
                        patient = fresh;
                        render_patient(&mut shell.console, &patient)?;
                    }
                    EditOutcome::Unchanged => {}
                    EditOutcome::InputEnded => return Ok(Navigation::Quit),
                }
            }
            "delete" => {
                let question = format!("Delete {}? This cannot be undone.", patient.name);
                match shell.console.confirm(&question)? {
                    None => return Ok(Navigation::Quit),
                    Some(false) => shell.console.notify(Toast::Info, "Kept")?,
                    Some(true) => match shell.api.delete_patient(&patient.id).await {
                        Ok(()) => {
                            tracing::info!(patient_id = %patient.id, "patient deleted");
                            shell.console.notify(Toast::Success, "Patient deleted")?;
                            return Ok(Navigation::To(Route::Dashboard));
                        }
                        Err(err) => shell.report("Could not delete patient", err)?,
                    },
                }
            }
            "start" => match shell.api.start_encounter(&patient.id).await {
                Ok(created) => {
                    tracing::info!(encounter_id = %created.id, "encounter started");
                    return Ok(Navigation::To(Route::Questionnaire(created.id)));
                }
                Err(err) => shell.report("Could not start encounter", err)?,
            },
            "pdf" => match shell.api.patient_pdf(&patient.id).await {
                Ok(pdf) => {
                    match shell.downloads.save(&patient_pdf_filename(&patient.id), &pdf) {
                        Ok(path) => shell
                            .console
                            .notify(Toast::Success, format!("Saved {}", path.display()))?,
                        Err(err) => shell.report("Could not save PDF", format!("{err:#}"))?,
                    }
                }
                Err(err) => shell.report("Could not generate PDF", err)?,
            },
            "open" | "resume" => match pick(&history, arg) {
                Some(encounter) if cmd == "open" => {
                    return Ok(Navigation::To(Route::Summary(encounter.id.clone())))
                }
                Some(encounter) => {
                    return Ok(Navigation::To(Route::Questionnaire(encounter.id.clone())))
                }
                None => shell
                    .console
                    .notify(Toast::Error, format!("No encounter matches '{arg}'"))?,
            },
            _ => match navbar::handle(shell, cmd, arg).await? {
                Handled::Go(next) => return Ok(next),
                Handled::Stay => {}
                Handled::NotMine => navbar::unknown(&mut shell.console, cmd)?,
            },
        }
    }
}

enum EditOutcome {
    /// Saved and refetched.
    Saved(Patient),
    Unchanged,
    InputEnded,
}

async fn edit(shell: &mut Shell, patient: &Patient) -> anyhow::Result<EditOutcome> {
    let mut form = PatientForm::from_patient(patient);
    if !fill(&mut shell.console, &mut form, FormMode::Edit)? {
        return Ok(EditOutcome::InputEnded);
    }

    loop {
        match choose_action(&mut shell.console)? {
            None => return Ok(EditOutcome::InputEnded),
            Some(FormAction::Cancel) => return Ok(EditOutcome::Unchanged),
            Some(FormAction::Edit) => {
                if !fill(&mut shell.console, &mut form, FormMode::Edit)? {
                    return Ok(EditOutcome::InputEnded);
                }
            }
            Some(FormAction::Save) => {
                let update = match form.validate_update() {
                    Ok(update) => update,
                    Err(err) => {
                        shell.console.notify(Toast::Error, err)?;
                        continue;
                    }
                };
                if let Err(err) = shell.api.update_patient(&patient.id, &update).await {
                    shell.report("Could not update patient", err)?;
                    continue;
                }
                shell.console.notify(Toast::Success, "Patient updated")?;

                // Refetch so server-derived fields such as IMC are current.
                return match shell.api.get_patient(&patient.id).await {
                    Ok(fresh) => Ok(EditOutcome::Saved(fresh)),
                    Err(err) => {
                        shell.report("Could not reload patient", err)?;
                        Ok(EditOutcome::Unchanged)
                    }
                };
            }
        }
    }
}

pub fn render_patient(console: &mut Console, patient: &Patient) -> io::Result<()> {
    let medications: Vec<String> = patient
        .medications
        .iter()
        .map(|m| match &m.dose {
            Some(dose) => format!("{} ({dose})", m.name),
            None => m.name.clone(),
        })
        .collect();

    console.line(format!("Patient: {}", patient.name))?;
    console.line(format!(
        "  CPF: {}",
        patient.cpf.as_deref().unwrap_or(MISSING_VALUE)
    ))?;
    console.line(format!(
        "  Birth date: {}",
        patient
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    ))?;
    console.line(format!(
        "  Height: {} m  Weight: {} kg  IMC: {}",
        display_optional(patient.height_m),
        display_optional(patient.weight_kg),
        display_optional(patient.imc)
    ))?;
    console.line(format!("  Allergies: {}", display_list(&patient.allergies, ", ")))?;
    console.line(format!("  Medications: {}", display_list(&medications, ", ")))
}

pub fn render_history(console: &mut Console, history: &[EncounterSummary]) -> io::Result<()> {
    console.line("Encounters:")?;
    if history.is_empty() {
        return console.line("  No encounters yet.");
    }
    for (n, encounter) in history.iter().enumerate() {
        let status = if encounter.has_suggestions {
            "suggestions ready"
        } else {
            "in progress"
        };
        console.line(format!(
            "{:>3}. {}  {}",
            n + 1,
            encounter.created_at.as_deref().unwrap_or(MISSING_VALUE),
            status
        ))?;
    }
    Ok(())
}

fn pick<'a>(history: &'a [EncounterSummary], arg: &str) -> Option<&'a EncounterSummary> {
    if let Ok(n) = arg.parse::<usize>() {
        if let Some(row) = n.checked_sub(1).and_then(|i| history.get(i)) {
            return Some(row);
        }
    }
    history.iter().find(|e| e.id == arg)
}
