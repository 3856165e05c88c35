//! Resolving the identifiers judges use to one display name.
//!
//! Judges name participants either by id (`model_a`) or by the side label
//! they were shown (`Proposition`). Display labels have the form
//! `"<name> - <side label>"`, so the side label maps back to an id.

use std::collections::BTreeMap;

use dia_core::entities::StoredSession;

const LABEL_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantDirectory {
    /// participant id → model name
    names: BTreeMap<String, String>,
    /// side label → participant id
    sides: BTreeMap<String, String>,
}

impl ParticipantDirectory {
    #[must_use]
    pub fn new(
        names: BTreeMap<String, String>,
        display_labels: &BTreeMap<String, String>,
    ) -> Self {
        let sides = display_labels
            .iter()
            .filter_map(|(participant, label)| {
                let mut parts = label.split(LABEL_SEPARATOR);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(_), Some(side), None) if !side.trim().is_empty() => {
                        Some((side.trim().to_string(), participant.clone()))
                    }
                    _ => None,
                }
            })
            .collect();
        Self { names, sides }
    }

    #[must_use]
    pub fn from_session(session: &StoredSession) -> Self {
        let names = session
            .participants
            .iter()
            .map(|(id, info)| (id.clone(), info.name.clone()))
            .collect();
        Self::new(names, &session.display_labels)
    }

    /// Participant id for a side label.
    #[must_use]
    pub fn participant_for_side(&self, side: &str) -> Option<&str> {
        self.sides.get(side).map(String::as_str)
    }

    /// Side label for a participant id.
    #[must_use]
    pub fn side_of(&self, participant: &str) -> Option<&str> {
        self.sides
            .iter()
            .find(|(_, id)| *id == participant)
            .map(|(side, _)| side.as_str())
    }

    /// Canonical participant id for an id or side label.
    #[must_use]
    pub fn canonical_id<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.participant_for_side(identifier).unwrap_or(identifier)
    }

    /// Display name for an id or side label, or the identifier unchanged.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> String {
        if let Some(participant) = self.participant_for_side(identifier) {
            let name = self.names.get(participant).map_or(participant, String::as_str);
            return format!("{name} ({identifier})");
        }
        self.names
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| identifier.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ParticipantDirectory {
        ParticipantDirectory::new(
            BTreeMap::from([
                ("model_a".into(), "qwen2.5:7b".into()),
                ("model_b".into(), "llama3.2:3b".into()),
            ]),
            &BTreeMap::from([
                ("model_a".into(), "qwen2.5:7b - Proposition".into()),
                ("model_b".into(), "llama3.2:3b - Opposition".into()),
                ("model_c".into(), "no separator".into()),
            ]),
        )
    }

    #[test]
    fn ids_resolve_to_model_names() {
        assert_eq!(directory().resolve("model_a"), "qwen2.5:7b");
    }

    #[test]
    fn side_labels_resolve_through_the_mapping() {
        let directory = directory();
        assert_eq!(directory.resolve("Opposition"), "llama3.2:3b (Opposition)");
        assert_eq!(directory.canonical_id("Proposition"), "model_a");
        assert_eq!(directory.side_of("model_b"), Some("Opposition"));
    }

    #[test]
    fn unknown_identifiers_pass_through() {
        let directory = directory();
        assert_eq!(directory.resolve("Moderator"), "Moderator");
        assert_eq!(directory.canonical_id("model_z"), "model_z");
        assert_eq!(directory.side_of("model_c"), None);
    }

    #[test]
    fn side_of_unnamed_participant_falls_back_to_id() {
        let directory = ParticipantDirectory::new(
            BTreeMap::new(),
            &BTreeMap::from([("model_a".into(), "Qwen - Pro".into())]),
        );
        assert_eq!(directory.resolve("Pro"), "model_a (Pro)");
    }
}
