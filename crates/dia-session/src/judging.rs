//! Collecting one decision per configured judge.

use std::time::Duration;

use dia_config::DialectusConfig;
use dia_core::entities::{EnsembleSummary, JudgeDecision, Judgment, Transcript};
use tokio_util::sync::CancellationToken;

use crate::engine::JudgePanel;
use crate::error::{JudgingError, SessionError};
use crate::state::SessionState;

/// Which judges must rule on a session, and how long each may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgingPlan {
    pub judges: Vec<String>,
    pub judge_timeout: Duration,
}

impl JudgingPlan {
    #[must_use]
    pub fn new(judges: Vec<String>, judge_timeout: Duration) -> Self {
        Self {
            judges,
            judge_timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &DialectusConfig) -> Self {
        Self::new(
            config.judging.judge_models.clone(),
            config.engine.judge_timeout(),
        )
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.judges.is_empty()
    }

    #[must_use]
    pub fn is_ensemble(&self) -> bool {
        self.judges.len() >= 2
    }
}

/// Decisions gathered so far, one slot per configured judge.
pub(crate) struct DecisionCollector {
    plan: JudgingPlan,
    slots: Vec<Option<JudgeDecision>>,
    summary: Option<EnsembleSummary>,
}

impl DecisionCollector {
    pub(crate) fn new(plan: &JudgingPlan) -> Self {
        Self {
            plan: plan.clone(),
            slots: vec![None; plan.judges.len()],
            summary: None,
        }
    }

    /// Judge whose decision is still outstanding, in configured order.
    pub(crate) fn next_missing(&self) -> Option<&str> {
        self.plan
            .judges
            .iter()
            .zip(&self.slots)
            .find(|(_, slot)| slot.is_none())
            .map(|(judge, _)| judge.as_str())
    }

    /// Record a decision delivered by the stream.
    ///
    /// Decisions from judges that are not configured, or that already ruled,
    /// are ignored. An ensemble summary attached to them is still kept.
    pub(crate) fn record(
        &mut self,
        decision: JudgeDecision,
        summary: Option<EnsembleSummary>,
    ) -> Result<(), JudgingError> {
        decision.validate().map_err(|e| JudgingError::Invalid {
            judge: decision.judge_model.clone(),
            reason: e.to_string(),
        })?;

        let slot = self
            .plan
            .judges
            .iter()
            .zip(self.slots.iter_mut())
            .find(|(judge, slot)| **judge == decision.judge_model && slot.is_none())
            .map(|(_, slot)| slot);

        if let Some(summary) = summary {
            self.summary = Some(summary);
        }

        match slot {
            Some(slot) => {
                tracing::info!(
                    judge = %decision.judge_model,
                    winner = %decision.winner_id,
                    "judge decision recorded"
                );
                *slot = Some(decision);
            }
            None => {
                tracing::warn!(
                    judge = %decision.judge_model,
                    "ignoring decision from unexpected judge"
                );
            }
        }
        Ok(())
    }

    /// Fill missing decisions from the panel and assemble the judgment.
    ///
    /// Any failure fails the whole judgment.
    pub(crate) async fn complete(
        mut self,
        panel: &dyn JudgePanel,
        transcript: &Transcript,
        cancel: &CancellationToken,
    ) -> Result<Judgment, SessionError> {
        let timeout = self.plan.judge_timeout;

        for (judge, slot) in self.plan.judges.iter().zip(self.slots.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            tracing::info!(%judge, "requesting evaluation");
            let evaluation = tokio::time::timeout(timeout, panel.evaluate(judge, transcript));
            let decision = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(SessionError::Cancelled(SessionState::Judging));
                }
                outcome = evaluation => match outcome {
                    Err(_) => {
                        let judge = judge.clone();
                        return Err(JudgingError::Timeout { judge, timeout }.into());
                    }
                    Ok(result) => result?,
                },
            };
            decision.validate().map_err(|e| JudgingError::Invalid {
                judge: judge.clone(),
                reason: e.to_string(),
            })?;
            *slot = Some(decision);
        }

        let mut decisions: Vec<JudgeDecision> = self.slots.into_iter().flatten().collect();
        match decisions.len() {
            0 => Ok(Judgment::None),
            1 => Ok(Judgment::Single {
                decision: decisions.remove(0),
            }),
            expected => {
                let summary = match self.summary {
                    Some(summary) => summary,
                    None => {
                        let summarize = tokio::time::timeout(timeout, panel.summarize(&decisions));
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => {
                                return Err(SessionError::Cancelled(SessionState::Judging));
                            }
                            outcome = summarize => match outcome {
                                Err(_) => {
                                    let missing = JudgingError::SummaryMissing { judges: expected };
                                    return Err(missing.into());
                                }
                                Ok(result) => result?,
                            },
                        }
                    }
                };
                if usize::try_from(summary.num_judges).ok() != Some(expected) {
                    return Err(JudgingError::SummaryMismatch {
                        reported: summary.num_judges,
                        expected,
                    }
                    .into());
                }
                Ok(Judgment::Ensemble { decisions, summary })
            }
        }
    }
}
