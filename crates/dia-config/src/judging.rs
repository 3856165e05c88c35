//! Judge panel configuration.

use serde::{Deserialize, Serialize};

fn default_criteria() -> Vec<String> {
    vec![
        "logic".to_string(),
        "evidence".to_string(),
        "persuasiveness".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JudgingConfig {
    /// Judge model names. Empty means the session is not judged; two or more
    /// means ensemble judging.
    #[serde(default)]
    pub judge_models: Vec<String>,

    /// Provider serving every judge model.
    #[serde(default)]
    pub judge_provider: Option<String>,

    /// Criteria each judge scores every participant on.
    #[serde(default = "default_criteria")]
    pub criteria: Vec<String>,
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            judge_models: Vec::new(),
            judge_provider: None,
            criteria: default_criteria(),
        }
    }
}

impl JudgingConfig {
    pub fn is_configured(&self) -> bool {
        !self.judge_models.is_empty()
    }

    pub fn is_ensemble(&self) -> bool {
        self.judge_models.len() >= 2
    }

    /// Number of criteria every participant should be scored on.
    pub fn expected_criteria(&self) -> usize {
        self.criteria.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unjudged_with_three_criteria() {
        let config = JudgingConfig::default();
        assert!(!config.is_configured());
        assert!(!config.is_ensemble());
        assert_eq!(config.expected_criteria(), 3);
    }

    #[test]
    fn two_judges_is_an_ensemble() {
        let config = JudgingConfig {
            judge_models: vec!["a".into(), "b".into()],
            judge_provider: Some("ollama".into()),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert!(config.is_ensemble());
    }
}
