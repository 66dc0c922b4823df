//! Questionnaire wizard state machine.
//!
//! Eight ordered steps over one [`Answers`] record. Editing never saves; moving between steps
//! produces a [`StepChange`] carrying a snapshot that the caller must persist before it shows
//! the next step. If that save fails the caller hands the change back to
//! [`Wizard::rollback`] and the wizard returns to the step it came from.
//!
//! Every edit bumps a revision number. Saves report the revision they persisted through
//! [`Wizard::acknowledge`]; an acknowledgement older than one already seen is ignored, so a
//! slow response can never mark newer edits as saved.

use crate::answers::Answers;
use crate::error::WizardError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Reason,
    Duration,
    Pain,
    Fever,
    Symptoms,
    Comorbidities,
    Habits,
    AlarmSigns,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::Reason,
        Step::Duration,
        Step::Pain,
        Step::Fever,
        Step::Symptoms,
        Step::Comorbidities,
        Step::Habits,
        Step::AlarmSigns,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        match self {
            Step::Reason => 0,
            Step::Duration => 1,
            Step::Pain => 2,
            Step::Fever => 3,
            Step::Symptoms => 4,
            Step::Comorbidities => 5,
            Step::Habits => 6,
            Step::AlarmSigns => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Reason => "Reason for visit",
            Step::Duration => "Symptom duration",
            Step::Pain => "Pain",
            Step::Fever => "Fever",
            Step::Symptoms => "Symptoms",
            Step::Comorbidities => "Comorbidities",
            Step::Habits => "Habits and adherence",
            Step::AlarmSigns => "Alarm signs",
        }
    }

    pub fn is_first(self) -> bool {
        self.index() == 0
    }

    pub fn is_last(self) -> bool {
        self.index() == Self::COUNT - 1
    }
}

/// Answers as of a given revision, ready to be sent as a partial save.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveSnapshot {
    pub revision: u64,
    pub answers: Answers,
}

/// A step transition that still has to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct StepChange {
    pub from: Step,
    pub to: Step,
    pub save: SaveSnapshot,
}

#[derive(Clone, Debug)]
pub struct Wizard {
    step: Step,
    answers: Answers,
    revision: u64,
    acknowledged: Option<u64>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_answers(Answers::default())
    }

    /// Starts at the first step with previously stored answers, e.g. when resuming.
    ///
    /// The starting answers count as saved: revision 0 is already acknowledged.
    pub fn with_answers(answers: Answers) -> Self {
        Self {
            step: Step::Reason,
            answers,
            revision: 0,
            acknowledged: Some(0),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_advance(&self) -> bool {
        !self.step.is_last()
    }

    pub fn can_retreat(&self) -> bool {
        !self.step.is_first()
    }

    pub fn can_finalize(&self) -> bool {
        self.step.is_last()
    }

    /// Replace-on-write edit: `f` works on a copy which then replaces the current answers.
    ///
    /// Returns `true` if anything changed.
    pub fn edit(&mut self, f: impl FnOnce(&mut Answers)) -> bool {
        let mut next = self.answers.clone();
        f(&mut next);
        if next == self.answers {
            return false;
        }
        self.answers = next;
        self.revision += 1;
        true
    }

    /// Moves one step forward. A no-op on the last step.
    pub fn advance(&mut self) -> Option<StepChange> {
        let to = Step::from_index(self.step.index() + 1)?;
        Some(self.move_to(to))
    }

    /// Moves one step back. A no-op on the first step.
    pub fn retreat(&mut self) -> Option<StepChange> {
        let to = Step::from_index(self.step.index().checked_sub(1)?)?;
        Some(self.move_to(to))
    }

    /// Undoes a transition whose save failed. Ignored if the wizard has moved on since.
    pub fn rollback(&mut self, change: &StepChange) -> bool {
        if self.step != change.to {
            return false;
        }
        tracing::debug!(from = ?change.to, to = ?change.from, "rolling back step change");
        self.step = change.from;
        true
    }

    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot {
            revision: self.revision,
            answers: self.answers.clone(),
        }
    }

    /// The final save before finalize; only available on the last step.
    pub fn finalize_snapshot(&self) -> Result<SaveSnapshot, WizardError> {
        if !self.can_finalize() {
            return Err(WizardError::NotOnLastStep(self.step.index()));
        }
        Ok(self.snapshot())
    }

    /// Records that the server stored `revision`. Returns `false` for stale acknowledgements.
    pub fn acknowledge(&mut self, revision: u64) -> bool {
        match self.acknowledged {
            Some(seen) if revision < seen => {
                tracing::debug!(revision, seen, "ignoring stale save acknowledgement");
                false
            }
            _ => {
                self.acknowledged = Some(revision);
                true
            }
        }
    }

    /// `true` while the latest edits have not been acknowledged by the server.
    pub fn has_unsaved_changes(&self) -> bool {
        self.acknowledged != Some(self.revision)
    }

    fn move_to(&mut self, to: Step) -> StepChange {
        let from = self.step;
        self.step = to;
        StepChange {
            from,
            to,
            save: self.snapshot(),
        }
    }
}
