//! Serde roundtrip and JsonSchema validation tests for the persisted and
//! in-flight entity shapes.

use chrono::Utc;
use dia_core::entities::*;
use dia_core::enums::*;
use dia_core::ids::{DecisionId, SessionId, SummaryId};
use dia_core::metadata::{Metadata, MetadataValue};
use pretty_assertions::assert_eq;
use schemars::schema_for;
use std::collections::BTreeMap;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn message(speaker: &str, position: Position, round: u32) -> Message {
    let mut metadata = Metadata::new();
    metadata.insert("temperature".into(), MetadataValue::Float(0.7));
    metadata.insert("tokens".into(), MetadataValue::Integer(212));
    Message {
        speaker_id: speaker.into(),
        position,
        phase: DebatePhase::Opening,
        round_number: round,
        content: "Universal basic income erodes the incentive to work.".into(),
        timestamp: Utc::now(),
        word_count: 8,
        metadata,
        cost: Some(0.000_42),
        generation_id: Some("gen-91ac".into()),
        cost_queried_at: None,
    }
}

fn context() -> SessionContext {
    let mut participants = BTreeMap::new();
    participants.insert(
        "model_a".to_string(),
        ParticipantInfo {
            name: "qwen2.5:7b".into(),
            provider: "ollama".into(),
            personality: "analytical".into(),
        },
    );
    participants.insert(
        "model_b".to_string(),
        ParticipantInfo {
            name: "llama3.2:3b".into(),
            provider: "ollama".into(),
            personality: "passionate".into(),
        },
    );
    let mut display_labels = BTreeMap::new();
    display_labels.insert("model_a".to_string(), "qwen2.5:7b - Proposition".to_string());
    SessionContext {
        topic: "Should AI be regulated?".into(),
        format: DebateFormat::Oxford,
        participants,
        display_labels,
    }
}

fn decision(judge: &str) -> JudgeDecision {
    JudgeDecision {
        judge_model: judge.into(),
        judge_provider: "ollama".into(),
        winner_id: "model_a".into(),
        winner_margin: 1.25,
        overall_feedback: Some("Stronger evidence on the proposition side.".into()),
        reasoning: None,
        generation_time_ms: Some(8_400),
        cost: None,
        generation_id: None,
        cost_queried_at: None,
        criterion_scores: vec![CriterionScore {
            criterion: "logic".into(),
            participant_id: "model_a".into(),
            score: 8.0,
            feedback: Some("Tight".into()),
        }],
        metadata: Metadata::new(),
        display_labels: BTreeMap::new(),
    }
}

fn summary() -> EnsembleSummary {
    EnsembleSummary {
        final_winner_id: "model_a".into(),
        final_margin: 1.1,
        ensemble_method: DEFAULT_ENSEMBLE_METHOD.into(),
        num_judges: 2,
        consensus_level: Some(1.0),
        summary_reasoning: Some("Both judges agree.".into()),
        summary_feedback: None,
    }
}

roundtrip_and_validate!(
    message_roundtrip,
    Message,
    message("model_a", Position::Pro, 1)
);

roundtrip_and_validate!(
    transcript_roundtrip,
    Transcript,
    Transcript {
        context: context(),
        messages: vec![
            message("model_a", Position::Pro, 1),
            message("model_b", Position::Con, 1),
        ],
        final_phase: DebatePhase::Other("lightning_round".into()),
        saved_at: Utc::now(),
        total_debate_time_ms: 93_000,
    }
);

roundtrip_and_validate!(
    judge_decision_roundtrip,
    JudgeDecision,
    decision("openthinker:7b")
);

roundtrip_and_validate!(
    completed_ensemble_session_roundtrip,
    CompletedSession,
    CompletedSession {
        transcript: Transcript {
            context: context(),
            messages: vec![message("model_a", Position::Pro, 1)],
            final_phase: DebatePhase::Completed,
            saved_at: Utc::now(),
            total_debate_time_ms: 1_000,
        },
        judgment: Judgment::Ensemble {
            decisions: vec![decision("judge-1"), decision("judge-2")],
            summary: summary(),
        },
    }
);

roundtrip_and_validate!(
    stored_summary_roundtrip,
    StoredEnsembleSummary,
    StoredEnsembleSummary {
        id: SummaryId(1),
        session_id: SessionId(4),
        final_winner_id: "model_b".into(),
        final_margin: 0.4,
        ensemble_method: "majority".into(),
        num_judges: 3,
        consensus_level: None,
        summary_reasoning: None,
        summary_feedback: None,
        participating_decision_ids: vec![DecisionId(9), DecisionId(10), DecisionId(11)],
        created_at: Utc::now(),
    }
);

#[test]
fn transcript_aggregates() {
    let mut short = message("model_b", Position::Con, 3);
    short.word_count = 0;
    short.content = "I disagree entirely".into();
    let transcript = Transcript {
        context: context(),
        messages: vec![message("model_a", Position::Pro, 1), short],
        final_phase: DebatePhase::Closing,
        saved_at: Utc::now(),
        total_debate_time_ms: 0,
    };
    assert_eq!(transcript.message_count(), 2);
    assert_eq!(transcript.word_count(), 8 + 3);
    assert_eq!(transcript.total_rounds(), 3);
}

#[test]
fn judgment_exposes_decisions_in_order() {
    let judgment = Judgment::Ensemble {
        decisions: vec![decision("judge-1"), decision("judge-2")],
        summary: summary(),
    };
    let judges: Vec<_> = judgment
        .decisions()
        .iter()
        .map(|d| d.judge_model.as_str())
        .collect();
    assert_eq!(judges, vec!["judge-1", "judge-2"]);
    assert_eq!(judgment.summary().map(|s| s.num_judges), Some(2));
    assert!(Judgment::None.decisions().is_empty());
}
