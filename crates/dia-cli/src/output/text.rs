//! Plain-text renderings. Every function returns the string so tests can
//! inspect it; callers decide where it goes.

use std::collections::BTreeMap;

use dia_core::entities::{JudgeDecision, Message, SessionListing, StoredSession};
use dia_report::{DisplayDecision, VictoryStrength};
use dia_session::SessionRequest;

const TOPIC_WIDTH: usize = 40;

pub fn setup(request: &SessionRequest) -> String {
    let mut lines = vec![
        format!("Topic: {}", request.topic),
        format!("Format: {}", request.format),
        format!("Word limit: {}", request.word_limit),
        "Participants:".to_string(),
    ];
    lines.extend(request.models.iter().map(|(id, model)| {
        format!(
            "  {id}: {} via {} ({})",
            model.name, model.provider, model.personality
        )
    }));
    lines.push(judging(&request.judge_models, &request.judge_provider));
    lines.join("\n")
}

fn judging(judges: &[String], provider: &str) -> String {
    match judges {
        [] => "Judging: none".to_string(),
        [judge] => format!("Judging: {judge} via {provider}"),
        many => format!(
            "Judging: ensemble of {} ({}) via {provider}",
            many.len(),
            many.join(", ")
        ),
    }
}

/// One debate turn. `names` maps participant ids to model names.
pub fn message(message: &Message, names: &BTreeMap<String, String>) -> String {
    let speaker = names
        .get(&message.speaker_id)
        .map_or(message.speaker_id.as_str(), String::as_str);
    format!(
        "[Round {} | {}] {speaker} ({})\n{}\n",
        message.round_number,
        message.phase,
        message.position.to_string().to_uppercase(),
        message.content.trim()
    )
}

/// A judge decision as it arrives, before reconciliation.
pub fn live_decision(decision: &JudgeDecision) -> String {
    format!(
        "{} picks {} (margin {:.1})",
        decision.judge_model, decision.winner_id, decision.winner_margin
    )
}

pub fn listing(sessions: &[SessionListing]) -> String {
    if sessions.is_empty() {
        return "No transcripts found".to_string();
    }
    let mut lines = vec![format!(
        "{:<6} {:<43} {:<14} {:>8}  {}",
        "ID", "TOPIC", "FORMAT", "MESSAGES", "DATE"
    )];
    lines.extend(sessions.iter().map(|session| {
        format!(
            "{:<6} {:<43} {:<14} {:>8}  {}",
            session.id.to_string(),
            truncate(&session.topic, TOPIC_WIDTH),
            session.format.as_str(),
            session.message_count,
            session.created_at.format("%Y-%m-%d %H:%M")
        )
    }));
    lines.join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width).collect();
    format!("{head}...")
}

/// Session header followed by every message in stored order.
pub fn transcript(session: &StoredSession, messages: &[Message]) -> String {
    let names: BTreeMap<String, String> = session
        .participants
        .iter()
        .map(|(id, info)| (id.clone(), info.name.clone()))
        .collect();

    let mut lines = vec![
        format!("Session {}: {}", session.id, session.topic),
        format!(
            "Format: {} | Rounds: {} | Messages: {} | Words: {}",
            session.format, session.total_rounds, session.message_count, session.word_count
        ),
        format!(
            "Saved: {} | Final phase: {}",
            session.saved_at.format("%Y-%m-%d %H:%M"),
            session.final_phase
        ),
        String::new(),
    ];
    lines.extend(messages.iter().map(|m| message(m, &names)));
    lines.join("\n")
}

fn strength_and_margin(strength: Option<VictoryStrength>, margin: f64) -> String {
    match strength {
        Some(strength) => format!("{strength}, margin {margin:.1}"),
        None => format!("margin {margin:.1}"),
    }
}

pub fn decision(decision: &DisplayDecision) -> String {
    let mut lines = vec![
        format!("== {} ==", decision.judge_summary()),
        format!(
            "Winner: {} ({})",
            decision.winner_name,
            strength_and_margin(decision.victory_strength, decision.winner_margin)
        ),
    ];
    if decision.incomplete {
        lines.push(
            "Warning: incomplete scoring, some participants were not scored on every criterion"
                .to_string(),
        );
    }
    if let Some(feedback) = &decision.overall_feedback {
        lines.push(format!("Feedback: {feedback}"));
    }
    if let Some(reasoning) = &decision.reasoning {
        lines.push(format!("Reasoning: {reasoning}"));
    }

    if !decision.criterion_scores.is_empty() {
        lines.push("Scores:".to_string());
        let ensemble = decision.is_ensemble();
        lines.extend(decision.criterion_scores.iter().map(|score| {
            let line = format!(
                "  {:<32} {:<18} {:>5.1}",
                score.participant_name, score.criterion, score.score
            );
            if ensemble {
                format!("{line}  [{}]", score.judge_model)
            } else {
                line
            }
        }));
    }

    if !decision.metadata.individual_decisions.is_empty() {
        lines.push("Individual decisions:".to_string());
        lines.extend(decision.metadata.individual_decisions.iter().map(|judge| {
            let flag = if judge.incomplete { " (incomplete)" } else { "" };
            format!(
                "  {}: {} ({}){flag}",
                judge.judge_model,
                judge.winner_name,
                strength_and_margin(judge.victory_strength, judge.winner_margin)
            )
        }));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use dia_core::ids::SessionId;
    use dia_report::{DecisionMetadata, DisplayScore};
    use pretty_assertions::assert_eq;

    use super::*;

    fn display(strength: Option<VictoryStrength>, margin: f64) -> DisplayDecision {
        DisplayDecision {
            session_id: SessionId(1),
            winner_id: "model_a".into(),
            winner_name: "qwen2.5:7b".into(),
            winner_margin: margin,
            victory_strength: strength,
            overall_feedback: None,
            reasoning: None,
            criterion_scores: vec![DisplayScore {
                participant_id: "model_a".into(),
                participant_name: "qwen2.5:7b".into(),
                criterion: "logic".into(),
                score: 8.0,
                feedback: None,
                judge_model: "openthinker:7b".into(),
            }],
            ensemble_size: 1,
            incomplete: false,
            metadata: DecisionMetadata {
                judge_model: Some("openthinker:7b".into()),
                ..DecisionMetadata::default()
            },
        }
    }

    #[test]
    fn long_topics_are_truncated() {
        assert_eq!(truncate("short", 40), "short");
        let long = "x".repeat(45);
        assert_eq!(truncate(&long, 40), format!("{}...", "x".repeat(40)));
    }

    #[test]
    fn judging_line_names_the_mode() {
        assert_eq!(judging(&[], ""), "Judging: none");
        assert_eq!(
            judging(&["j1".into()], "ollama"),
            "Judging: j1 via ollama"
        );
        assert_eq!(
            judging(&["j1".into(), "j2".into()], "ollama"),
            "Judging: ensemble of 2 (j1, j2) via ollama"
        );
    }

    #[test]
    fn decision_shows_strength_and_scores() {
        let rendered = decision(&display(Some(VictoryStrength::Clear), 1.5));
        assert!(rendered.starts_with("== Judge: openthinker:7b =="), "{rendered}");
        assert!(rendered.contains("Winner: qwen2.5:7b (Clear Victory, margin 1.5)"));
        assert!(rendered.contains("logic"));
        assert!(!rendered.contains("Warning"));
    }

    #[test]
    fn zero_margin_has_no_strength() {
        let rendered = decision(&display(None, 0.0));
        assert!(rendered.contains("Winner: qwen2.5:7b (margin 0.0)"), "{rendered}");
    }

    #[test]
    fn incomplete_scoring_is_flagged() {
        let mut incomplete = display(Some(VictoryStrength::Close), 0.7);
        incomplete.incomplete = true;
        assert!(decision(&incomplete).contains("Warning: incomplete scoring"));
    }

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(listing(&[]), "No transcripts found");
    }
}
