//! Read-time reconciliation of stored judge rows.

use dia_core::entities::{
    CriterionScore, StoredEnsembleSummary, StoredJudgeDecision, StoredSession,
};
use dia_core::ids::SessionId;
use dia_db::TranscriptStore;
use dia_db::error::DatabaseError;
use tracing::instrument;

use crate::decision::{DecisionMetadata, DisplayDecision, DisplayScore, IndividualDecision};
use crate::error::ReportError;
use crate::participants::ParticipantDirectory;
use crate::reasoning::is_structured_reasoning;
use crate::scoring::incomplete_participants;
use crate::strength::VictoryStrength;

pub struct ResultReconciler<'a> {
    store: &'a TranscriptStore,
    expected_criteria: usize,
}

impl<'a> ResultReconciler<'a> {
    /// `expected_criteria` is the configured criteria count used to flag
    /// incomplete scoring.
    #[must_use]
    pub const fn new(store: &'a TranscriptStore, expected_criteria: usize) -> Self {
        Self {
            store,
            expected_criteria,
        }
    }

    /// Display decision for a session, or `None` if it was never judged.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Database` with `SessionNotFound` for an unknown
    /// session, and the other `ReportError` variants when stored judge data
    /// is inconsistent.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        session_id: SessionId,
    ) -> Result<Option<DisplayDecision>, ReportError> {
        let (session, decisions) = self.load(session_id).await?;
        self.assemble(&session, decisions).await
    }

    /// Like [`Self::reconcile`], for a session known to have been judged by
    /// `expected_judges` judges. A missing decision is an error, not `None`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MissingDecisions` when the stored decision count
    /// differs from `expected_judges`, plus everything [`Self::reconcile`] returns.
    #[instrument(skip(self))]
    pub async fn reconcile_expected(
        &self,
        session_id: SessionId,
        expected_judges: usize,
    ) -> Result<Option<DisplayDecision>, ReportError> {
        let (session, decisions) = self.load(session_id).await?;
        if decisions.len() != expected_judges {
            return Err(ReportError::MissingDecisions {
                session_id,
                expected: expected_judges,
                found: decisions.len(),
            });
        }
        self.assemble(&session, decisions).await
    }

    async fn load(
        &self,
        session_id: SessionId,
    ) -> Result<(StoredSession, Vec<StoredJudgeDecision>), ReportError> {
        let loaded = self.store.load_session(session_id).await?;
        let decisions = self.store.load_judge_decisions(session_id).await?;
        tracing::debug!(decisions = decisions.len(), "judge rows loaded");
        Ok((loaded.session, decisions))
    }

    async fn assemble(
        &self,
        session: &StoredSession,
        mut decisions: Vec<StoredJudgeDecision>,
    ) -> Result<Option<DisplayDecision>, ReportError> {
        let directory = ParticipantDirectory::from_session(session);
        let participants: Vec<&str> = session.participants.keys().map(String::as_str).collect();

        match decisions.len() {
            0 => Ok(None),
            1 => {
                let decision = decisions.remove(0);
                let individual = self.individual(&directory, &participants, decision);
                Ok(Some(single(session.id, individual)))
            }
            count => {
                let summary = match self.store.load_ensemble_summary(session.id).await {
                    Ok(summary) => summary,
                    Err(DatabaseError::EnsembleSummaryNotFound(_)) => {
                        return Err(ReportError::MissingSummary {
                            session_id: session.id,
                            decisions: count,
                        });
                    }
                    Err(error) => return Err(error.into()),
                };
                let ordered = order_by_summary(session.id, &summary, decisions)?;
                let individuals = ordered
                    .into_iter()
                    .map(|decision| self.individual(&directory, &participants, decision))
                    .collect();
                Ok(Some(ensemble(&directory, summary, individuals)))
            }
        }
    }

    fn individual(
        &self,
        directory: &ParticipantDirectory,
        participants: &[&str],
        decision: StoredJudgeDecision,
    ) -> IndividualDecision {
        let canonical: Vec<CriterionScore> = decision
            .criterion_scores
            .iter()
            .map(|stored| CriterionScore {
                participant_id: directory.canonical_id(&stored.score.participant_id).to_string(),
                ..stored.score.clone()
            })
            .collect();
        let incomplete =
            !incomplete_participants(&canonical, participants, self.expected_criteria).is_empty();

        // Names come from the identifier the judge used, so side labels stay visible
        let criterion_scores = decision
            .criterion_scores
            .iter()
            .zip(canonical)
            .map(|(stored, score)| DisplayScore {
                participant_name: directory.resolve(&stored.score.participant_id),
                participant_id: score.participant_id,
                criterion: score.criterion,
                score: score.score,
                feedback: score.feedback,
                judge_model: decision.judge_model.clone(),
            })
            .collect();

        IndividualDecision {
            decision_id: decision.id,
            winner_name: directory.resolve(&decision.winner_id),
            winner_id: directory.canonical_id(&decision.winner_id).to_string(),
            victory_strength: VictoryStrength::from_margin(decision.winner_margin),
            winner_margin: decision.winner_margin,
            overall_feedback: decision.overall_feedback,
            reasoning: prose(decision.reasoning),
            criterion_scores,
            incomplete,
            generation_time_ms: decision.generation_time_ms,
            cost: decision.cost,
            judge_model: decision.judge_model,
            judge_provider: decision.judge_provider,
        }
    }
}

fn prose(reasoning: Option<String>) -> Option<String> {
    reasoning.filter(|text| !text.trim().is_empty() && !is_structured_reasoning(text))
}

fn single(session_id: SessionId, decision: IndividualDecision) -> DisplayDecision {
    DisplayDecision {
        session_id,
        winner_id: decision.winner_id,
        winner_name: decision.winner_name,
        winner_margin: decision.winner_margin,
        victory_strength: decision.victory_strength,
        overall_feedback: decision.overall_feedback,
        reasoning: decision.reasoning,
        criterion_scores: decision.criterion_scores,
        ensemble_size: 1,
        incomplete: decision.incomplete,
        metadata: DecisionMetadata {
            individual_decisions: Vec::new(),
            judge_model: Some(decision.judge_model),
            ensemble_method: None,
            consensus_level: None,
        },
    }
}

fn ensemble(
    directory: &ParticipantDirectory,
    summary: StoredEnsembleSummary,
    individuals: Vec<IndividualDecision>,
) -> DisplayDecision {
    let criterion_scores = individuals
        .iter()
        .flat_map(|decision| decision.criterion_scores.iter().cloned())
        .collect();
    DisplayDecision {
        session_id: summary.session_id,
        winner_name: directory.resolve(&summary.final_winner_id),
        winner_id: directory.canonical_id(&summary.final_winner_id).to_string(),
        victory_strength: VictoryStrength::from_margin(summary.final_margin),
        winner_margin: summary.final_margin,
        overall_feedback: summary.summary_feedback,
        reasoning: prose(summary.summary_reasoning),
        criterion_scores,
        ensemble_size: summary.num_judges,
        incomplete: individuals.iter().any(|d| d.incomplete),
        metadata: DecisionMetadata {
            individual_decisions: individuals,
            judge_model: None,
            ensemble_method: Some(summary.ensemble_method),
            consensus_level: summary.consensus_level,
        },
    }
}

/// Decisions in the order the summary lists them.
fn order_by_summary(
    session_id: SessionId,
    summary: &StoredEnsembleSummary,
    mut decisions: Vec<StoredJudgeDecision>,
) -> Result<Vec<StoredJudgeDecision>, ReportError> {
    let mut ordered = Vec::with_capacity(summary.participating_decision_ids.len());
    for decision_id in &summary.participating_decision_ids {
        let position = decisions
            .iter()
            .position(|d| d.id == *decision_id)
            .ok_or(ReportError::MissingDecision {
                session_id,
                decision_id: *decision_id,
            })?;
        ordered.push(decisions.remove(position));
    }
    if !decisions.is_empty() {
        tracing::warn!(
            %session_id,
            extra = decisions.len(),
            "judge decisions not referenced by the ensemble summary are left out"
        );
    }
    Ok(ordered)
}
