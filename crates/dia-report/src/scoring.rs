use std::collections::{BTreeMap, BTreeSet};

use dia_core::entities::CriterionScore;

/// Participants with fewer than `expected` distinct scored criteria.
///
/// `participants` lists everyone who should have been scored; participants
/// that only appear in `scores` are checked too.
#[must_use]
pub fn incomplete_participants(
    scores: &[CriterionScore],
    participants: &[&str],
    expected: usize,
) -> Vec<String> {
    let mut scored: BTreeMap<&str, BTreeSet<&str>> =
        participants.iter().map(|p| (*p, BTreeSet::new())).collect();
    for score in scores {
        scored
            .entry(score.participant_id.as_str())
            .or_default()
            .insert(score.criterion.as_str());
    }
    scored
        .into_iter()
        .filter(|(_, criteria)| criteria.len() < expected)
        .map(|(participant, _)| participant.to_string())
        .collect()
}

/// Whether any scored participant is missing criteria, or nothing was scored.
#[must_use]
pub fn check_incomplete_scoring(scores: &[CriterionScore], expected: usize) -> bool {
    if scores.is_empty() {
        return expected > 0;
    }
    !incomplete_participants(scores, &[], expected).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(participant: &str, criterion: &str) -> CriterionScore {
        CriterionScore {
            criterion: criterion.into(),
            participant_id: participant.into(),
            score: 7.0,
            feedback: None,
        }
    }

    fn full(participant: &str) -> Vec<CriterionScore> {
        ["logic", "evidence", "persuasiveness"]
            .iter()
            .map(|c| score(participant, c))
            .collect()
    }

    #[test]
    fn complete_scoring_is_not_flagged() {
        let mut scores = full("model_a");
        scores.extend(full("model_b"));
        assert!(!check_incomplete_scoring(&scores, 3));
    }

    #[test]
    fn two_of_three_criteria_is_flagged() {
        let mut scores = full("model_a");
        scores.push(score("model_b", "logic"));
        scores.push(score("model_b", "evidence"));
        assert!(check_incomplete_scoring(&scores, 3));
        assert_eq!(
            incomplete_participants(&scores, &["model_a", "model_b"], 3),
            ["model_b"]
        );
    }

    #[test]
    fn duplicate_criteria_do_not_count_twice() {
        let mut scores = full("model_a");
        scores.push(score("model_b", "logic"));
        scores.push(score("model_b", "logic"));
        scores.push(score("model_b", "logic"));
        assert!(check_incomplete_scoring(&scores, 3));
    }

    #[test]
    fn unscored_participant_is_incomplete() {
        let scores = full("model_a");
        assert_eq!(
            incomplete_participants(&scores, &["model_a", "model_b"], 3),
            ["model_b"]
        );
    }

    #[test]
    fn empty_scores() {
        assert!(check_incomplete_scoring(&[], 3));
        assert!(!check_incomplete_scoring(&[], 0));
    }
}
