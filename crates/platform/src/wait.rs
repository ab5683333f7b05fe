//! Cooperative wait-for-flag primitive.
//!
//! Completion flags set from interrupt context (decode complete, transfer
//! done) are observed by poll loops. A bare `while !done {}` spin is
//! untestable — a harness that never raises the flag would hang the test
//! runner — so poll loops spend a [`PollBudget`] step per idle iteration
//! instead. Production callers use [`PollBudget::unbounded`], which never
//! expires and only yields to the executor; tests inject a bound and get
//! deterministic termination.

use embassy_futures::yield_now;

/// The bound of a [`PollBudget::bounded`] wait was reached before the
/// awaited flag was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BudgetExhausted;

impl core::fmt::Display for BudgetExhausted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "poll budget exhausted before completion")
    }
}

/// Iteration budget for a wait-for-flag loop.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    remaining: Option<u32>,
}

impl PollBudget {
    /// A budget that never expires. Production default: the wait is bounded
    /// only by the hardware actually completing.
    pub const fn unbounded() -> Self {
        Self { remaining: None }
    }

    /// A budget of at most `steps` idle iterations. Test harnesses use this
    /// to turn a stuck wait into an error instead of a hang.
    pub const fn bounded(steps: u32) -> Self {
        Self {
            remaining: Some(steps),
        }
    }

    /// Spend one idle iteration: yields to the executor so interrupt-fed
    /// tasks can run, then returns.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetExhausted`] once a bounded budget has spent all of
    /// its steps.
    pub async fn step(&mut self) -> Result<(), BudgetExhausted> {
        if let Some(steps) = self.remaining.as_mut() {
            if *steps == 0 {
                return Err(BudgetExhausted);
            }
            *steps = steps.saturating_sub(1);
        }
        yield_now().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_budget_never_expires() {
        let mut budget = PollBudget::unbounded();
        for _ in 0..10_000 {
            budget.step().await.unwrap();
        }
    }

    #[tokio::test]
    async fn bounded_budget_expires_after_steps() {
        let mut budget = PollBudget::bounded(3);
        for _ in 0..3 {
            budget.step().await.unwrap();
        }
        assert_eq!(budget.step().await, Err(BudgetExhausted));
    }

    #[tokio::test]
    async fn bounded_zero_expires_immediately() {
        let mut budget = PollBudget::bounded(0);
        assert_eq!(budget.step().await, Err(BudgetExhausted));
    }
}
