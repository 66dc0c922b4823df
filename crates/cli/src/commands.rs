//! One-shot subcommands of the `pharm` binary.
//!
//! Every command runs a single action against the API and prints the result with the same
//! renderers the screens use. `open` starts the interactive shell at a route instead.

use crate::console::{Console, Toast};
use crate::downloads::Downloads;
use crate::pages::{dashboard, login, patient_detail, summary};
use crate::shell::Shell;
use anyhow::{bail, Context};
use api_client::PharmApi;
use clap::{Args, Parser, Subcommand};
use pharm_core::constants::{encounter_pdf_filename, patient_pdf_filename, PATIENTS_CSV_FILENAME};
use pharm_core::patient::filter_by_name;
use pharm_core::{FeedbackLabel, FeedbackRequest, PatientForm, Route};

#[derive(Parser)]
#[command(name = "pharm")]
#[command(about = "Pharm Assist clinical assistant client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Patient records
    #[command(subcommand)]
    Patients(PatientCommands),
    /// Encounters and suggestions
    #[command(subcommand)]
    Encounters(EncounterCommands),
    /// Open the interactive client at a route, e.g. /dashboard
    Open {
        /// Route path (defaults to the dashboard when signed in)
        route: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PatientCommands {
    /// List patients
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one patient and their encounters
    Show { id: String },
    /// Register a patient
    Create {
        #[command(flatten)]
        fields: PatientFields,
        /// CPF (punctuation allowed)
        #[arg(long)]
        cpf: String,
    },
    /// Update a patient; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Delete a patient
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Save the CSV export of all patients
    Export,
    /// Save a patient's record PDF
    Pdf { id: String },
}

#[derive(Args)]
pub struct PatientFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: Option<String>,
    /// Height in meters
    #[arg(long)]
    pub height: Option<String>,
    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<String>,
    /// Allergies (comma-separated)
    #[arg(long)]
    pub allergies: Option<String>,
    /// Medication names (comma-separated)
    #[arg(long)]
    pub meds: Option<String>,
}

impl PatientFields {
    /// Overwrites the form fields that were given on the command line.
    fn apply(self, form: &mut PatientForm) {
        let pairs = [
            (self.name, &mut form.name),
            (self.birth_date, &mut form.birth_date),
            (self.height, &mut form.height_m),
            (self.weight, &mut form.weight_kg),
            (self.allergies, &mut form.allergies),
            (self.meds, &mut form.medications),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Subcommand)]
pub enum EncounterCommands {
    /// List a patient's encounters
    List { patient_id: String },
    /// Start an encounter and run the questionnaire
    Start { patient_id: String },
    /// Resume the questionnaire of an encounter
    Questionnaire { id: String },
    /// Show suggestions, finalizing first if needed
    Summary { id: String },
    /// Record feedback on the suggestions
    Feedback {
        id: String,
        /// agree or disagree
        label: FeedbackLabel,
        #[arg(long)]
        note: Option<String>,
    },
    /// Save the encounter PDF
    Pdf { id: String },
}

/// Runs one command.
pub async fn run(command: Commands, api: PharmApi, downloads: Downloads) -> anyhow::Result<()> {
    let mut console = Console::stdio();
    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => console
                    .prompt("Password: ")?
                    .context("No password given")?,
            };
            let who = login::sign_in(&api, &email, &password).await?;
            console.notify(Toast::Success, format!("Signed in as {who}"))?;
        }
        Commands::Logout => {
            api.session().logout()?;
            console.notify(Toast::Success, "Signed out")?;
        }
        Commands::Patients(cmd) => run_patients(cmd, &api, &downloads, &mut console).await?,
        Commands::Encounters(cmd) => run_encounters(cmd, api, downloads, console).await?,
        Commands::Open { route } => {
            let mut shell = Shell::new(api, console, downloads);
            let start = match route {
                Some(path) => Route::parse(&path)?,
                None => shell.default_route(),
            };
            shell.run(start).await?;
        }
    }
    Ok(())
}

async fn run_patients(
    command: PatientCommands,
    api: &PharmApi,
    downloads: &Downloads,
    console: &mut Console,
) -> anyhow::Result<()> {
    match command {
        PatientCommands::List { filter } => {
            let patients = api.list_patients().await?;
            let rows = filter_by_name(&patients, filter.as_deref().unwrap_or(""));
            dashboard::render_rows(console, &rows)?;
        }
        PatientCommands::Show { id } => {
            let patient = api.get_patient(&id).await?;
            let history = api.list_encounters(&id).await?;
            patient_detail::render_patient(console, &patient)?;
            patient_detail::render_history(console, &history)?;
        }
        PatientCommands::Create { fields, cpf } => {
            let mut form = PatientForm {
                cpf,
                ..PatientForm::default()
            };
            fields.apply(&mut form);
            let created = api.create_patient(&form.validate_new()?).await?;
            console.notify(Toast::Success, format!("Created patient {}", created.id))?;
        }
        PatientCommands::Edit { id, fields } => {
            let current = api.get_patient(&id).await?;
            let mut form = PatientForm::from_patient(&current);
            fields.apply(&mut form);
            api.update_patient(&id, &form.validate_update()?).await?;
            let fresh = api.get_patient(&id).await?;
            patient_detail::render_patient(console, &fresh)?;
        }
        PatientCommands::Delete { id, yes } => {
            if !yes && console.confirm(&format!("Delete patient {id}?"))? != Some(true) {
                bail!("Deletion not confirmed");
            }
            api.delete_patient(&id).await?;
            console.notify(Toast::Success, format!("Deleted patient {id}"))?;
        }
        PatientCommands::Export => {
            let csv = api.export_patients_csv().await?;
            let path = downloads.save(PATIENTS_CSV_FILENAME, &csv)?;
            console.notify(Toast::Success, format!("Saved {}", path.display()))?;
        }
        PatientCommands::Pdf { id } => {
            let pdf = api.patient_pdf(&id).await?;
            let path = downloads.save(&patient_pdf_filename(&id), &pdf)?;
            console.notify(Toast::Success, format!("Saved {}", path.display()))?;
        }
    }
    Ok(())
}

async fn run_encounters(
    command: EncounterCommands,
    api: PharmApi,
    downloads: Downloads,
    mut console: Console,
) -> anyhow::Result<()> {
    match command {
        EncounterCommands::List { patient_id } => {
            let history = api.list_encounters(&patient_id).await?;
            patient_detail::render_history(&mut console, &history)?;
        }
        EncounterCommands::Start { patient_id } => {
            let created = api.start_encounter(&patient_id).await?;
            console.notify(Toast::Success, format!("Started encounter {}", created.id))?;
            Shell::new(api, console, downloads)
                .run(Route::Questionnaire(created.id))
                .await?;
        }
        EncounterCommands::Questionnaire { id } => {
            Shell::new(api, console, downloads)
                .run(Route::Questionnaire(id))
                .await?;
        }
        EncounterCommands::Summary { id } => {
            let encounter = summary::load(&api, &id).await?;
            summary::render_suggestions(&mut console, encounter.suggestions())?;
        }
        EncounterCommands::Feedback { id, label, note } => {
            let updated = api
                .submit_feedback(&id, &FeedbackRequest { label, note })
                .await?;
            summary::render_suggestions(&mut console, Some(&updated))?;
        }
        EncounterCommands::Pdf { id } => {
            let pdf = api.encounter_pdf(&id).await?;
            let path = downloads.save(&encounter_pdf_filename(&id), &pdf)?;
            console.notify(Toast::Success, format!("Saved {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "pharm", "patients", "create", "--name", "Ana Silva", "--cpf", "12345678901",
            "--height", "1.65",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Patients(PatientCommands::Create { fields, cpf })) => {
                assert_eq!(cpf, "12345678901");
                assert_eq!(fields.name.as_deref(), Some("Ana Silva"));
                assert_eq!(fields.height.as_deref(), Some("1.65"));
                assert!(fields.weight.is_none());
            }
            _ => panic!("expected patients create"),
        }
    }

    #[test]
    fn feedback_label_is_validated() {
        assert!(Cli::try_parse_from(["pharm", "encounters", "feedback", "e1", "disagree"]).is_ok());
        assert!(Cli::try_parse_from(["pharm", "encounters", "feedback", "e1", "maybe"]).is_err());
    }

    #[test]
    fn edit_overrides_only_given_fields() {
        let mut form = PatientForm {
            name: "Ana".into(),
            height_m: "1.65".into(),
            weight_kg: "60".into(),
            ..PatientForm::default()
        };
        PatientFields {
            name: None,
            birth_date: None,
            height: None,
            weight: Some("62".into()),
            allergies: None,
            meds: None,
        }
        .apply(&mut form);
        assert_eq!(form.name, "Ana");
        assert_eq!(form.weight_kg, "62");
    }
}
