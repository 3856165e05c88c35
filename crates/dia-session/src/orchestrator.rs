//! Drives one session from engine setup to a single commit.
//!
//! ```text
//! Orchestrator::run(request)
//!   → engine.start(request)              Initializing
//!   → read events until debate_completed Streaming (→ Judging on first judge activity)
//!   → close the event stream
//!   → fill missing judges from the panel Judging
//!   → store.persist_session(...)         Persisting
//!   → SessionOutcome                     Done
//! ```
//!
//! Every failure lands in `Failed` and skips persistence entirely.

use std::time::Instant;

use chrono::Utc;
use dia_core::entities::{CompletedSession, Judgment, SessionContext, Transcript};
use dia_core::enums::DebatePhase;
use dia_core::ids::{DecisionId, SessionId, SummaryId};
use dia_db::TranscriptStore;
use dia_stream::{DebateEvent, EventSource, StreamError};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::display::{DisplayEvent, DisplaySink};
use crate::engine::{DebateEngine, EngineSession, SessionRequest};
use crate::error::{JudgingError, SessionError};
use crate::judging::{DecisionCollector, JudgingPlan};
use crate::state::SessionState;

/// Ids of a committed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub debate_id: String,
    pub session_id: SessionId,
    pub decision_ids: Vec<DecisionId>,
    pub summary_id: Option<SummaryId>,
    pub message_count: u32,
}

pub struct Orchestrator<'a> {
    store: &'a TranscriptStore,
    engine: &'a dyn DebateEngine,
    plan: JudgingPlan,
    display: Option<DisplaySink>,
    cancel: CancellationToken,
    state: SessionState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a TranscriptStore,
        engine: &'a dyn DebateEngine,
        plan: JudgingPlan,
    ) -> Self {
        Self {
            store,
            engine,
            plan,
            display: None,
            cancel: CancellationToken::new(),
            state: SessionState::Initializing,
        }
    }

    #[must_use]
    pub fn with_display(mut self, sink: DisplaySink) -> Self {
        self.display = Some(sink);
        self
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts this session when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// # Errors
    ///
    /// Returns the originating `SessionError`. Nothing is persisted for a
    /// failed session.
    #[instrument(skip_all, fields(topic = %request.topic, judges = self.plan.judges.len()))]
    pub async fn run(&mut self, request: &SessionRequest) -> Result<SessionOutcome, SessionError> {
        let result = self.drive(request).await;
        if let Err(error) = &result {
            tracing::error!(%error, during = %self.state, "session failed");
            self.transition(SessionState::Failed);
        }
        result
    }

    async fn drive(&mut self, request: &SessionRequest) -> Result<SessionOutcome, SessionError> {
        let started = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(SessionError::Cancelled(self.state)),
            started = self.engine.start(request) => started.map_err(SessionError::Init)?,
        };
        let EngineSession {
            debate_id,
            context,
            mut events,
        } = started;
        tracing::info!(%debate_id, "debate started");
        self.transition(SessionState::Streaming);

        let streamed = self.stream(events.as_mut(), context).await;
        // Closed on every path before judging or persisting
        if let Err(error) = events.close().await {
            tracing::warn!(%error, "event stream did not close cleanly");
        }
        let (mut transcript, collector) = streamed?;

        let judgment = if self.plan.is_configured() {
            if self.state == SessionState::Streaming {
                self.transition(SessionState::Judging);
            }
            collector
                .complete(self.engine.judge_panel(), &transcript, &self.cancel)
                .await?
        } else {
            Judgment::None
        };

        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled(self.state));
        }

        merge_display_labels(&mut transcript.context, &judgment);
        let message_count = transcript.message_count();
        self.transition(SessionState::Persisting);
        let persisted = self
            .store
            .persist_session(&CompletedSession {
                transcript,
                judgment,
            })
            .await?;
        self.transition(SessionState::Done);

        Ok(SessionOutcome {
            debate_id,
            session_id: persisted.session_id,
            decision_ids: persisted.decision_ids,
            summary_id: persisted.summary_id,
            message_count,
        })
    }

    /// Consume events until `debate_completed`.
    async fn stream(
        &mut self,
        events: &mut dyn EventSource,
        context: SessionContext,
    ) -> Result<(Transcript, DecisionCollector), SessionError> {
        let started = Instant::now();
        let mut messages = Vec::new();
        let mut collector = DecisionCollector::new(&self.plan);
        let mut last_round = 0_u32;

        loop {
            let Some(event) = self.next_event(events, &collector).await? else {
                return Err(StreamError::ClosedBeforeCompletion { reason: None }.into());
            };

            match event {
                DebateEvent::NewMessage(message) => {
                    if message.round_number < last_round {
                        return Err(SessionError::OutOfOrder {
                            speaker_id: message.speaker_id,
                            round: message.round_number,
                            previous: last_round,
                        });
                    }
                    last_round = message.round_number;
                    tracing::debug!(
                        speaker = %message.speaker_id,
                        round = message.round_number,
                        phase = %message.phase,
                        "message received"
                    );
                    self.show(DisplayEvent::Message(message.clone()));
                    messages.push(message);
                }
                DebateEvent::JudgingStarted => {
                    tracing::info!("judging started");
                    self.enter_judging();
                    self.show(DisplayEvent::JudgingStarted);
                }
                DebateEvent::JudgeDecision {
                    decision,
                    ensemble_summary,
                } => {
                    if !self.plan.is_configured() {
                        tracing::warn!(
                            judge = %decision.judge_model,
                            "ignoring decision, no judges configured"
                        );
                        continue;
                    }
                    self.enter_judging();
                    let shown = decision.clone();
                    collector.record(decision, ensemble_summary)?;
                    self.show(DisplayEvent::Decision(shown));
                }
                DebateEvent::ModelError(detail) => {
                    tracing::error!(%detail, "model error event");
                    return Err(SessionError::ModelError(detail));
                }
                DebateEvent::JudgeError { error } => {
                    tracing::error!(%error, "judge error event");
                    return Err(SessionError::JudgeError(error));
                }
                DebateEvent::DebateCompleted => {
                    self.show(DisplayEvent::Completed);
                    break;
                }
            }
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let transcript = Transcript {
            context,
            messages,
            final_phase: DebatePhase::Completed,
            saved_at: Utc::now(),
            total_debate_time_ms: elapsed_ms,
        };
        tracing::info!(
            messages = transcript.message_count(),
            rounds = transcript.total_rounds(),
            elapsed_ms,
            "debate completed"
        );
        Ok((transcript, collector))
    }

    /// Next event, bounded by the judge timeout while a judge is outstanding.
    async fn next_event(
        &self,
        events: &mut dyn EventSource,
        collector: &DecisionCollector,
    ) -> Result<Option<DebateEvent>, SessionError> {
        let awaiting = if self.state == SessionState::Judging {
            collector.next_missing()
        } else {
            None
        };
        let timeout = self.plan.judge_timeout;

        let read = async {
            match awaiting {
                Some(judge) => match tokio::time::timeout(timeout, events.next_event()).await {
                    Ok(result) => result.map_err(SessionError::from),
                    Err(_) => Err(JudgingError::Timeout {
                        judge: judge.to_string(),
                        timeout,
                    }
                    .into()),
                },
                None => events.next_event().await.map_err(SessionError::from),
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(SessionError::Cancelled(self.state)),
            result = read => result,
        }
    }

    fn enter_judging(&mut self) {
        if self.plan.is_configured() && self.state == SessionState::Streaming {
            self.transition(SessionState::Judging);
        }
    }

    fn show(&self, event: DisplayEvent) {
        if let Some(display) = &self.display {
            display.offer(event);
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        tracing::debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

/// Side labels judges were shown, first label per participant wins.
fn merge_display_labels(context: &mut SessionContext, judgment: &Judgment) {
    for decision in judgment.decisions() {
        for (participant, label) in &decision.display_labels {
            context
                .display_labels
                .entry(participant.clone())
                .or_insert_with(|| label.clone());
        }
    }
}
