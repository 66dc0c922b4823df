//! Field-by-field patient form shared by the create and edit screens.

use crate::console::Console;
use pharm_core::PatientForm;
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// CPF is shown but cannot be changed.
    Edit,
}

/// What to do with a filled-in form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    Save,
    Edit,
    Cancel,
}

/// Prompts for every field, keeping the current value on Enter. Returns `false` on end of input.
pub fn fill(console: &mut Console, form: &mut PatientForm, mode: FormMode) -> io::Result<bool> {
    console.line("(Enter keeps the value in brackets, '-' clears it)")?;
    let Some(name) = console.prompt_field("Name", &form.name)? else {
        return Ok(false);
    };
    form.name = name;

    match mode {
        FormMode::Create => {
            let Some(cpf) = console.prompt_field("CPF", &form.cpf)? else {
                return Ok(false);
            };
            form.cpf = cpf;
        }
        FormMode::Edit => console.line(format!("CPF: {} (cannot be changed)", form.cpf))?,
    }

    let fields: [(&str, &mut String); 5] = [
        ("Birth date (YYYY-MM-DD)", &mut form.birth_date),
        ("Height (m)", &mut form.height_m),
        ("Weight (kg)", &mut form.weight_kg),
        ("Allergies (comma separated)", &mut form.allergies),
        ("Medications (comma separated)", &mut form.medications),
    ];
    for (label, slot) in fields {
        let Some(value) = console.prompt_field(label, slot.as_str())? else {
            return Ok(false);
        };
        *slot = value;
    }
    Ok(true)
}

/// Asks whether to save, edit again or cancel. `None` on end of input.
pub fn choose_action(console: &mut Console) -> io::Result<Option<FormAction>> {
    loop {
        let Some(answer) = console.prompt("save, edit or cancel> ")? else {
            return Ok(None);
        };
        match answer.trim() {
            "save" | "s" => return Ok(Some(FormAction::Save)),
            "edit" | "e" => return Ok(Some(FormAction::Edit)),
            "cancel" | "c" => return Ok(Some(FormAction::Cancel)),
            _ => console.line("Please answer save, edit or cancel.")?,
        }
    }
}
