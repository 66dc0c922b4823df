//! `/atendimento/resumo/:id`: suggestions, clinician feedback and the encounter PDF.

use crate::console::{Console, Toast};
use crate::pages::navbar::{self, Handled};
use crate::shell::{split_command, Navigation, Shell};
use api_client::{ApiResult, PharmApi};
use pharm_core::constants::{encounter_pdf_filename, MISSING_VALUE};
use pharm_core::{Encounter, FeedbackLabel, FeedbackRequest, Route, Suggestions};
use std::io;

/// Fetches the encounter, finalizing it when it has no suggestions yet.
///
/// A failed fetch also falls back to finalize. This relies on the server treating repeated
/// finalize calls as idempotent.
pub async fn load(api: &PharmApi, encounter_id: &str) -> ApiResult<Encounter> {
    match api.get_encounter(encounter_id).await {
        Ok(encounter) if encounter.has_suggestions() => return Ok(encounter),
        Ok(_) => tracing::debug!(encounter_id, "no suggestions yet, finalizing"),
        Err(err) => tracing::warn!(encounter_id, "fetch failed, finalizing instead: {}", err),
    }
    api.finalize_encounter(encounter_id).await
}

/// Result of trying to send feedback.
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    Sent,
    /// Another submission is still running.
    Busy,
    /// Feedback was already recorded for these suggestions.
    AlreadyRecorded,
}

/// What the summary screen is showing, plus the in-flight guard for feedback.
#[derive(Debug, Default)]
pub struct SummaryState {
    pub suggestions: Option<Suggestions>,
    submitting: bool,
}

impl SummaryState {
    pub fn new(suggestions: Option<Suggestions>) -> Self {
        Self {
            suggestions,
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Claims the in-flight slot. Refused while another submission runs or once feedback is
    /// recorded; every successful claim must be followed by [`SummaryState::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<(), Submission> {
        if self.submitting {
            return Err(Submission::Busy);
        }
        if self
            .suggestions
            .as_ref()
            .is_some_and(|s| s.feedback.is_some())
        {
            return Err(Submission::AlreadyRecorded);
        }
        self.submitting = true;
        Ok(())
    }

    /// Releases the slot. On success the server's suggestions replace the shown ones; on
    /// failure nothing changes.
    pub fn finish_submit(&mut self, result: ApiResult<Suggestions>) -> ApiResult<Submission> {
        self.submitting = false;
        self.suggestions = Some(result?);
        Ok(Submission::Sent)
    }

    /// Sends feedback through the in-flight guard.
    pub async fn submit(
        &mut self,
        api: &PharmApi,
        encounter_id: &str,
        request: &FeedbackRequest,
    ) -> ApiResult<Submission> {
        if let Err(refused) = self.begin_submit() {
            return Ok(refused);
        }
        let result = api.submit_feedback(encounter_id, request).await;
        let outcome = self.finish_submit(result)?;
        tracing::info!(encounter_id, label = request.label.as_str(), "feedback recorded");
        Ok(outcome)
    }
}

pub async fn show(shell: &mut Shell, encounter_id: &str) -> anyhow::Result<Navigation> {
    navbar::render(&mut shell.console)?;
    let encounter = match load(&shell.api, encounter_id).await {
        Ok(encounter) => Some(encounter),
        Err(err) => {
            shell.report("Could not load suggestions", err)?;
            None
        }
    };
    let patient_id = encounter.as_ref().map(|e| e.patient_id.clone());
    let mut state = SummaryState::new(encounter.and_then(|e| e.suggestions().cloned()));

    shell.console.line(format!("Encounter {encounter_id}"))?;
    render_suggestions(&mut shell.console, state.suggestions.as_ref())?;
    shell
        .console
        .line("Commands: agree [note] | disagree [note] | pdf | patient | finish")?;

    loop {
        let Some(input) = shell.console.prompt("summary> ")? else {
            return Ok(Navigation::Quit);
        };
        let (cmd, arg) = split_command(&input);
        match cmd {
            "" => {}
            "agree" | "disagree" => {
                let Ok(label) = cmd.parse::<FeedbackLabel>() else {
                    continue;
                };
                let request = FeedbackRequest {
                    label,
                    note: (!arg.is_empty()).then(|| arg.to_string()),
                };
                match state.submit(&shell.api, encounter_id, &request).await {
                    Ok(Submission::Sent) => {
                        shell.console.notify(Toast::Success, "Feedback sent")?;
                        render_suggestions(&mut shell.console, state.suggestions.as_ref())?;
                    }
                    Ok(Submission::Busy) => shell
                        .console
                        .notify(Toast::Info, "Feedback is already being sent")?,
                    Ok(Submission::AlreadyRecorded) => shell
                        .console
                        .notify(Toast::Info, "Feedback was already recorded")?,
                    Err(err) => shell.report("Could not send feedback", err)?,
                }
            }
            "pdf" => match shell.api.encounter_pdf(encounter_id).await {
                Ok(pdf) => match shell.downloads.save(&encounter_pdf_filename(encounter_id), &pdf) {
                    Ok(path) => shell
                        .console
                        .notify(Toast::Success, format!("Saved {}", path.display()))?,
                    Err(err) => shell.report("Could not save PDF", format!("{err:#}"))?,
                },
                Err(err) => shell.report("Could not generate PDF", err)?,
            },
            "patient" => match &patient_id {
                Some(id) => return Ok(Navigation::To(Route::Patient(id.clone()))),
                None => shell.console.notify(Toast::Error, "Patient unknown")?,
            },
            "finish" | "done" => return Ok(Navigation::To(Route::Dashboard)),
            _ => match navbar::handle(shell, cmd, arg).await? {
                Handled::Go(next) => return Ok(next),
                Handled::Stay => {}
                Handled::NotMine => navbar::unknown(&mut shell.console, cmd)?,
            },
        }
    }
}

pub fn render_suggestions(console: &mut Console, suggestions: Option<&Suggestions>) -> io::Result<()> {
    let Some(s) = suggestions.filter(|s| !s.is_empty()) else {
        return console.line("No suggestions available.");
    };

    let sections = [
        ("Non-pharmacological", &s.non_pharmacological),
        ("Pharmacological", &s.pharmacological),
        ("Alerts", &s.alerts),
    ];
    for (title, items) in sections {
        console.line(format!("{title}:"))?;
        if items.is_empty() {
            console.line(format!("  {MISSING_VALUE}"))?;
        }
        for item in items {
            console.line(format!("  - {item}"))?;
        }
    }

    console.line("Rationale:")?;
    if s.rationale.is_empty() {
        console.line(format!("  {MISSING_VALUE}"))?;
    }
    for (n, reason) in s.rationale.iter().enumerate() {
        console.line(format!("  {}. {reason}", n + 1))?;
    }

    match &s.feedback {
        Some(feedback) => {
            let note = feedback
                .note
                .as_deref()
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default();
            console.line(format!(
                "Feedback: {}{note} ({})",
                feedback.label.label(),
                feedback.ts.as_deref().unwrap_or(MISSING_VALUE)
            ))
        }
        None => console.line("Do you agree with these suggestions? agree | disagree"),
    }
}
