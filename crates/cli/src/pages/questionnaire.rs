//! `/atendimento/iniciar/:id`: the eight-step questionnaire.
//!
//! Each step prompts for its own fields, then asks where to go. Moving to another step saves
//! the whole answer record first. If that save fails the step change is rolled back and the
//! clinician stays where they were. Finalize saves once more, asks the server for
//! suggestions and opens the summary.
//!
//! The screen only opens once the stored answers have been read. Starting from blank answers
//! after a failed read would overwrite them on the first save.

use crate::console::{Console, Toast};
use crate::pages::navbar::{self, Handled};
use crate::shell::{split_command, Navigation, Shell};
use pharm_core::validation::{parse_pain_intensity, parse_temperature};
use pharm_core::wizard::StepChange;
use pharm_core::{
    Adherence, AlarmSign, Comorbidity, FlagSet, Route, Step, Symptom, SymptomGroup, Wizard,
};
use std::io;

pub async fn show(shell: &mut Shell, encounter_id: &str) -> anyhow::Result<Navigation> {
    let encounter = match shell.api.get_encounter(encounter_id).await {
        Ok(encounter) => encounter,
        Err(err) => {
            shell.report("Could not open the questionnaire", err)?;
            return Ok(Navigation::To(Route::Dashboard));
        }
    };
    let answers = match encounter.answers() {
        Ok(answers) => answers,
        Err(err) => {
            shell.report("Stored answers are unreadable, questionnaire not opened", err)?;
            return Ok(Navigation::To(Route::Patient(encounter.patient_id)));
        }
    };
    let mut wizard = Wizard::with_answers(answers);

    loop {
        let step = wizard.step();
        shell.console.line(format!(
            "Step {}/{}: {}",
            step.index() + 1,
            Step::COUNT,
            step.title()
        ))?;
        if !edit_step(&mut shell.console, &mut wizard)? {
            return Ok(Navigation::Quit);
        }

        let hint = if wizard.can_finalize() {
            "back | finalize | leave"
        } else if wizard.can_retreat() {
            "next | back | leave"
        } else {
            "next | leave"
        };
        let Some(input) = shell.console.prompt(&format!("[{hint}]> "))? else {
            return Ok(Navigation::Quit);
        };
        let (cmd, arg) = split_command(&input);
        match cmd {
            "next" | "n" | "" => match wizard.advance() {
                Some(change) => persist(shell, encounter_id, &mut wizard, change).await?,
                None => shell
                    .console
                    .notify(Toast::Info, "This is the last step; use finalize")?,
            },
            "back" | "b" => {
                if let Some(change) = wizard.retreat() {
                    persist(shell, encounter_id, &mut wizard, change).await?;
                }
            }
            "finalize" | "f" => {
                if finalize(shell, encounter_id, &mut wizard).await? {
                    return Ok(Navigation::To(Route::Summary(encounter_id.to_string())));
                }
            }
            "leave" => {
                if !wizard.has_unsaved_changes() {
                    return Ok(Navigation::To(Route::Dashboard));
                }
                match shell
                    .console
                    .confirm("Leave without saving the answers on this step?")?
                {
                    Some(true) => return Ok(Navigation::To(Route::Dashboard)),
                    Some(false) => {}
                    None => return Ok(Navigation::Quit),
                }
            }
            _ => match navbar::handle(shell, cmd, arg).await? {
                Handled::Go(next) => return Ok(next),
                Handled::Stay => {}
                Handled::NotMine => navbar::unknown(&mut shell.console, cmd)?,
            },
        }
    }
}

/// Saves the snapshot carried by `change`, rolling the step back if the save fails.
async fn persist(
    shell: &mut Shell,
    encounter_id: &str,
    wizard: &mut Wizard,
    change: StepChange,
) -> io::Result<()> {
    match shell.api.save_answers(encounter_id, &change.save.answers).await {
        Ok(()) => {
            if wizard.acknowledge(change.save.revision) {
                tracing::debug!(encounter_id, revision = change.save.revision, "answers saved");
            }
            Ok(())
        }
        Err(err) => {
            wizard.rollback(&change);
            shell.report("Could not save answers, staying on this step", err)
        }
    }
}

/// Final save, then finalize. Returns `true` once suggestions were requested successfully.
async fn finalize(shell: &mut Shell, encounter_id: &str, wizard: &mut Wizard) -> io::Result<bool> {
    let snapshot = match wizard.finalize_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            shell.console.notify(Toast::Error, err)?;
            return Ok(false);
        }
    };
    if let Err(err) = shell.api.save_answers(encounter_id, &snapshot.answers).await {
        shell.report("Could not save answers", err)?;
        return Ok(false);
    }
    if !wizard.acknowledge(snapshot.revision) {
        tracing::debug!(encounter_id, "final save acknowledged after a newer one");
    }

    match shell.api.finalize_encounter(encounter_id).await {
        Ok(_) => {
            tracing::info!(encounter_id, "encounter finalized");
            Ok(true)
        }
        Err(err) => {
            shell.report("Could not compute suggestions", err)?;
            Ok(false)
        }
    }
}

/// Prompts for the fields of the current step. Returns `false` on end of input.
fn edit_step(console: &mut Console, wizard: &mut Wizard) -> io::Result<bool> {
    let answers = wizard.answers().clone();
    match wizard.step() {
        Step::Reason => {
            let Some(reason) = console.prompt_field("Reason for visit", &answers.reason)? else {
                return Ok(false);
            };
            wizard.edit(|a| a.reason = reason);
        }
        Step::Duration => {
            let Some(duration) = console.prompt_field("Duration", &answers.duration)? else {
                return Ok(false);
            };
            wizard.edit(|a| a.duration = duration);
        }
        Step::Pain => {
            let Some(pain) = prompt_flag(console, "Pain?", answers.pain)? else {
                return Ok(false);
            };
            wizard.edit(|a| a.pain = pain);
            if pain {
                let Some(intensity) = prompt_intensity(console, answers.pain_intensity)? else {
                    return Ok(false);
                };
                wizard.edit(|a| a.pain_intensity = intensity);
            }
        }
        Step::Fever => {
            let Some(fever) = prompt_flag(console, "Fever?", answers.fever)? else {
                return Ok(false);
            };
            wizard.edit(|a| a.fever = fever);
            if fever {
                let Some(peak) = prompt_temperature(console, answers.fever_peak_celsius)? else {
                    return Ok(false);
                };
                wizard.edit(|a| a.fever_peak_celsius = peak);
            }
        }
        Step::Symptoms => {
            let labels: Vec<String> = Symptom::ALL
                .iter()
                .map(|s| {
                    let group = match s.group() {
                        SymptomGroup::Respiratory => "respiratory",
                        SymptomGroup::Other => "other",
                    };
                    format!("{} ({group})", s.label())
                })
                .collect();
            let checked: Vec<bool> = Symptom::ALL
                .iter()
                .map(|s| answers.symptoms.get(*s))
                .collect();
            let Some(toggled) = prompt_toggles(console, &labels, &checked)? else {
                return Ok(false);
            };
            wizard.edit(|a| {
                for i in toggled {
                    let symptom = Symptom::ALL[i];
                    let present = a.symptoms.get(symptom);
                    a.symptoms.set(symptom, !present);
                }
            });
        }
        Step::Comorbidities => {
            let Some(toggled) = prompt_flag_set(
                console,
                &Comorbidity::ALL,
                &answers.comorbidities,
                Comorbidity::label,
            )?
            else {
                return Ok(false);
            };
            wizard.edit(|a| {
                for comorbidity in toggled {
                    a.comorbidities.toggle(comorbidity);
                }
            });
        }
        Step::Habits => {
            let Some(smoking) = prompt_flag(console, "Smoking?", answers.habits.smoking)? else {
                return Ok(false);
            };
            let Some(poor_sleep) = prompt_flag(console, "Poor sleep?", answers.habits.poor_sleep)?
            else {
                return Ok(false);
            };
            let Some(adherence) = prompt_adherence(console, answers.adherence)? else {
                return Ok(false);
            };
            wizard.edit(|a| {
                a.habits.smoking = smoking;
                a.habits.poor_sleep = poor_sleep;
                a.adherence = adherence;
            });
        }
        Step::AlarmSigns => {
            let Some(toggled) = prompt_flag_set(
                console,
                &AlarmSign::ALL,
                &answers.alarm_signs,
                AlarmSign::label,
            )?
            else {
                return Ok(false);
            };
            wizard.edit(|a| {
                for sign in toggled {
                    a.alarm_signs.toggle(sign);
                }
            });
        }
    }
    Ok(true)
}

/// y/n question where Enter keeps `current`.
fn prompt_flag(console: &mut Console, label: &str, current: bool) -> io::Result<Option<bool>> {
    let shown = if current { "y" } else { "n" };
    loop {
        let Some(answer) = console.prompt(&format!("{label} (y/n) [{shown}]: "))? else {
            return Ok(None);
        };
        match parse_flag(&answer, current) {
            Some(value) => return Ok(Some(value)),
            None => console.notify(Toast::Error, "Please answer y or n")?,
        }
    }
}

fn parse_flag(answer: &str, current: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(current),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn prompt_intensity(console: &mut Console, current: u8) -> io::Result<Option<u8>> {
    loop {
        let Some(typed) = console.prompt(&format!("Intensity 0-10 [{current}]: "))? else {
            return Ok(None);
        };
        if typed.trim().is_empty() {
            return Ok(Some(current));
        }
        match parse_pain_intensity(&typed) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => console.notify(Toast::Error, err)?,
        }
    }
}

fn prompt_temperature(
    console: &mut Console,
    current: Option<f64>,
) -> io::Result<Option<Option<f64>>> {
    let shown = current.map(|t| t.to_string()).unwrap_or_default();
    loop {
        let Some(typed) = console.prompt_field("Peak temperature (°C)", &shown)? else {
            return Ok(None);
        };
        match parse_temperature(&typed) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => console.notify(Toast::Error, err)?,
        }
    }
}

fn prompt_adherence(console: &mut Console, current: Adherence) -> io::Result<Option<Adherence>> {
    let options: Vec<String> = Adherence::ALL
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{} {}", i + 1, a.label()))
        .collect();
    loop {
        let Some(typed) = console.prompt(&format!(
            "Adherence ({}) [{}]: ",
            options.join(", "),
            current.label()
        ))?
        else {
            return Ok(None);
        };
        let typed = typed.trim();
        if typed.is_empty() {
            return Ok(Some(current));
        }
        match typed
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Adherence::ALL.get(i))
        {
            Some(choice) => return Ok(Some(*choice)),
            None => console.notify(Toast::Error, format!("Choose 1 to {}", Adherence::ALL.len()))?,
        }
    }
}

fn prompt_flag_set<T: Ord + Copy>(
    console: &mut Console,
    all: &[T],
    current: &FlagSet<T>,
    label: fn(T) -> &'static str,
) -> io::Result<Option<Vec<T>>> {
    let labels: Vec<String> = all.iter().map(|f| label(*f).to_string()).collect();
    let checked: Vec<bool> = all.iter().map(|f| current.contains(*f)).collect();
    Ok(prompt_toggles(console, &labels, &checked)?
        .map(|indices| indices.into_iter().map(|i| all[i]).collect()))
}

/// Shows a numbered checklist and reads the numbers to toggle. Returns zero-based indices.
fn prompt_toggles(
    console: &mut Console,
    labels: &[String],
    checked: &[bool],
) -> io::Result<Option<Vec<usize>>> {
    for (i, (label, on)) in labels.iter().zip(checked).enumerate() {
        let mark = if *on { "x" } else { " " };
        console.line(format!("  [{mark}] {}. {label}", i + 1))?;
    }
    loop {
        let Some(typed) = console.prompt("Toggle (numbers separated by spaces, Enter to keep): ")?
        else {
            return Ok(None);
        };
        match parse_toggles(&typed, labels.len()) {
            Ok(indices) => return Ok(Some(indices)),
            Err(bad) => console.notify(Toast::Error, format!("Not an option: {bad}"))?,
        }
    }
}

/// Parses `"1 3,4"` into zero-based indices. Repeating a number toggles it once.
fn parse_toggles(typed: &str, count: usize) -> Result<Vec<usize>, String> {
    let mut picked = Vec::new();
    for token in typed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let index = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|i| *i < count)
            .ok_or_else(|| token.to_string())?;
        if !picked.contains(&index) {
            picked.push(index);
        }
    }
    Ok(picked)
}
