use crate::error::{PilotError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Failure aborts the sequence
    Mandatory,
    /// Failure is logged, the fallback runs and the sequence continues
    BestEffort,
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPolicy::Mandatory => f.write_str("mandatory"),
            StepPolicy::BestEffort => f.write_str("best-effort"),
        }
    }
}

type StepFn<'a, C> = Box<dyn FnOnce(&mut C) -> Result<()> + 'a>;
type FallbackFn<'a, C> = Box<dyn FnOnce(&mut C) + 'a>;

/// A named action over a shared context `C`, tagged with its failure policy
pub struct Step<'a, C> {
    name: &'static str,
    policy: StepPolicy,
    action: StepFn<'a, C>,
    fallback: Option<FallbackFn<'a, C>>,
}

impl<'a, C> Step<'a, C> {
    pub fn mandatory(name: &'static str, action: impl FnOnce(&mut C) -> Result<()> + 'a) -> Self {
        Self { name, policy: StepPolicy::Mandatory, action: Box::new(action), fallback: None }
    }

    pub fn best_effort(name: &'static str, action: impl FnOnce(&mut C) -> Result<()> + 'a) -> Self {
        Self { name, policy: StepPolicy::BestEffort, action: Box::new(action), fallback: None }
    }

    /// Default to apply when a best-effort step fails. Ignored for mandatory steps.
    pub fn or_else(mut self, fallback: impl FnOnce(&mut C) + 'a) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: &'static str,
    pub policy: StepPolicy,
    /// Reason a best-effort step was neutralized
    pub failure: Option<String>,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Run `steps` in order. The first mandatory failure stops the run and is returned
/// as [`PilotError::MandatoryReservationStepFailed`]; no earlier step is undone.
pub fn run_steps<C>(steps: Vec<Step<'_, C>>, context: &mut C) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(steps.len());

    for step in steps {
        log::debug!("Running {} step '{}'", step.policy, step.name);

        match ((step.action)(context), step.policy) {
            (Ok(()), policy) => reports.push(StepReport { name: step.name, policy, failure: None }),
            (Err(e), StepPolicy::Mandatory) => {
                log::error!("Mandatory step '{}' failed: {}", step.name, e);
                return Err(PilotError::MandatoryReservationStepFailed {
                    step: step.name.to_string(),
                    source: Box::new(e),
                });
            }
            (Err(e), StepPolicy::BestEffort) => {
                let neutralized = PilotError::OptionalStepFailed { step: step.name.to_string(), reason: e.to_string() };
                log::warn!("{}", neutralized);

                if let Some(fallback) = step.fallback {
                    fallback(context);
                }
                reports.push(StepReport { name: step.name, policy: StepPolicy::BestEffort, failure: Some(e.to_string()) });
            }
        }
    }

    Ok(reports)
}
