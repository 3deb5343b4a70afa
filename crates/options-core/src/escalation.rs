//! Deletion Escalation Machine
//!
//! Gated confirmation for actions that need one or more explicit "yes"
//! answers. Ordinary actions use one step; deleting a hierarchy entry
//! uses three, each with a sharper warning. The guarded action is handed
//! out exactly once, after the last confirmation.

use log::debug;
use thiserror::Error;

/// Confirmations required for deleting an entry of a hierarchy
pub const DESTRUCTIVE_STEPS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscalationError {
    #[error("nothing is awaiting confirmation")]
    NotConfirming,

    #[error("the confirmed action is still running")]
    InFlight,

    #[error("no confirmed action is running")]
    NotExecuting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationState<T> {
    Idle,
    /// Waiting for confirmation `step` of the required count
    Confirming { target: T, step: u8 },
    /// Every confirmation given; the guarded action is running
    Executing { target: T },
    Done { target: T },
    Cancelled,
}

/// Result of one confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    /// More confirmations needed; now waiting for `step`
    Escalated { step: u8 },
    /// Run the guarded action against this target
    Execute(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Notice,
    Caution,
    Final,
}

/// Text shown while waiting for a confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub step: u8,
    pub of: u8,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Warning for confirmation `step` of `of` about `subject`
pub fn warning_for(step: u8, of: u8, subject: &str) -> Warning {
    let (severity, title, message) = if step <= 1 {
        (
            Severity::Notice,
            format!("Delete {}?", subject),
            format!("Are you sure you want to delete {}?", subject),
        )
    } else if step < of {
        (
            Severity::Caution,
            format!("{} has dependent entries", subject),
            format!(
                "Everything filed under {} loses its parent. Child entries are not removed \
                 with it and will no longer be reachable from this hierarchy.",
                subject
            ),
        )
    } else {
        (
            Severity::Final,
            "Final warning".to_string(),
            format!("Deleting {} is permanent and cannot be undone.", subject),
        )
    };
    Warning {
        step,
        of,
        severity,
        title,
        message,
    }
}

/// Confirmation state machine over a target of type `T`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationMachine<T> {
    required: u8,
    state: EscalationState<T>,
    last_error: Option<String>,
}

impl<T: Clone> EscalationMachine<T> {
    /// Machine requiring `required` confirmations (at least one)
    pub fn new(required: u8) -> Self {
        Self {
            required: required.max(1),
            state: EscalationState::Idle,
            last_error: None,
        }
    }

    /// One confirmation, for ordinary approve/reject style actions
    pub fn single() -> Self {
        Self::new(1)
    }

    pub fn destructive() -> Self {
        Self::new(DESTRUCTIVE_STEPS)
    }

    pub fn required(&self) -> u8 {
        self.required
    }

    pub fn state(&self) -> &EscalationState<T> {
        &self.state
    }

    /// Confirmation currently awaited
    pub fn step(&self) -> Option<u8> {
        match self.state {
            EscalationState::Confirming { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&T> {
        match &self.state {
            EscalationState::Confirming { target, .. }
            | EscalationState::Executing { target }
            | EscalationState::Done { target } => Some(target),
            EscalationState::Idle | EscalationState::Cancelled => None,
        }
    }

    /// Error of the last failed execution, kept until the next request
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.state, EscalationState::Executing { .. })
    }

    /// Confirming or executing
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            EscalationState::Confirming { .. } | EscalationState::Executing { .. }
        )
    }

    /// Start over at step 1 for `target`. Progress on any earlier target
    /// is dropped.
    pub fn request(&mut self, target: T) -> Result<u8, EscalationError> {
        if self.is_executing() {
            return Err(EscalationError::InFlight);
        }
        self.last_error = None;
        self.state = EscalationState::Confirming { target, step: 1 };
        Ok(1)
    }

    /// Give the awaited confirmation
    pub fn confirm(&mut self) -> Result<Confirmation<T>, EscalationError> {
        let (target, step) = match &self.state {
            EscalationState::Confirming { target, step } => (target.clone(), *step),
            EscalationState::Executing { .. } => return Err(EscalationError::InFlight),
            _ => return Err(EscalationError::NotConfirming),
        };

        if step < self.required {
            let next = step + 1;
            debug!("[ESCALATION] confirmation {}/{} given", step, self.required);
            self.state = EscalationState::Confirming { target, step: next };
            return Ok(Confirmation::Escalated { step: next });
        }

        debug!("[ESCALATION] all {} confirmations given", self.required);
        self.last_error = None;
        self.state = EscalationState::Executing {
            target: target.clone(),
        };
        Ok(Confirmation::Execute(target))
    }

    /// The guarded action finished
    pub fn succeed(&mut self) -> Result<(), EscalationError> {
        match std::mem::replace(&mut self.state, EscalationState::Idle) {
            EscalationState::Executing { target } => {
                self.state = EscalationState::Done { target };
                Ok(())
            }
            other => {
                self.state = other;
                Err(EscalationError::NotExecuting)
            }
        }
    }

    /// The guarded action failed; back to the last confirmation so it can
    /// be retried
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), EscalationError> {
        match std::mem::replace(&mut self.state, EscalationState::Idle) {
            EscalationState::Executing { target } => {
                self.state = EscalationState::Confirming {
                    target,
                    step: self.required,
                };
                self.last_error = Some(message.into());
                Ok(())
            }
            other => {
                self.state = other;
                Err(EscalationError::NotExecuting)
            }
        }
    }

    /// Abandon the pending confirmation. Returns false when nothing was
    /// pending; a running action cannot be cancelled.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.state, EscalationState::Confirming { .. }) {
            return false;
        }
        debug!("[ESCALATION] cancelled");
        self.state = EscalationState::Cancelled;
        self.last_error = None;
        true
    }

    /// Return to idle after a cancel or a completed action
    pub fn settle(&mut self) {
        if matches!(
            self.state,
            EscalationState::Cancelled | EscalationState::Done { .. }
        ) {
            self.state = EscalationState::Idle;
        }
    }

    /// Warning for the awaited confirmation
    pub fn warning(&self, subject: &str) -> Option<Warning> {
        self.step()
            .map(|step| warning_for(step, self.required, subject))
    }
}
