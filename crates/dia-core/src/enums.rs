//! Tag enums for positions, phases, and formats.
//!
//! All enums serialize as `snake_case` strings, which is also the form stored
//! in SQL. Each provides `as_str()` for the storage boundary and `FromStr` for
//! parsing CLI and row values.

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Side a speaker argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pro,
    Con,
    Neutral,
}

impl Position {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Con => "con",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pro" => Ok(Self::Pro),
            "con" => Ok(Self::Con),
            "neutral" => Ok(Self::Neutral),
            other => Err(CoreError::Validation(format!("unknown position '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// DebateFormat
// ---------------------------------------------------------------------------

/// Debate format selected at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DebateFormat {
    Oxford,
    Parliamentary,
    Socratic,
    PublicForum,
}

impl DebateFormat {
    pub const ALL: [Self; 4] = [
        Self::Oxford,
        Self::Parliamentary,
        Self::Socratic,
        Self::PublicForum,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oxford => "oxford",
            Self::Parliamentary => "parliamentary",
            Self::Socratic => "socratic",
            Self::PublicForum => "public_forum",
        }
    }
}

impl fmt::Display for DebateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebateFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| {
                let available = Self::ALL.map(Self::as_str).join(", ");
                CoreError::Validation(format!(
                    "invalid debate format '{s}' (available: {available})"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// DebatePhase
// ---------------------------------------------------------------------------

/// Phase a message was produced in.
///
/// The engine owns phase sequencing, so unknown phase names are carried
/// through as [`DebatePhase::Other`] instead of failing the decode.
///
/// ```text
/// setup → opening → rebuttal → cross_examination → closing → evaluation → completed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DebatePhase {
    Setup,
    Opening,
    Rebuttal,
    CrossExamination,
    Closing,
    Evaluation,
    Completed,
    Other(String),
}

impl DebatePhase {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Setup => "setup",
            Self::Opening => "opening",
            Self::Rebuttal => "rebuttal",
            Self::CrossExamination => "cross_examination",
            Self::Closing => "closing",
            Self::Evaluation => "evaluation",
            Self::Completed => "completed",
            Self::Other(name) => name,
        }
    }
}

impl JsonSchema for DebatePhase {
    fn schema_name() -> Cow<'static, str> {
        "DebatePhase".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

impl From<String> for DebatePhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "setup" => Self::Setup,
            "opening" => Self::Opening,
            "rebuttal" => Self::Rebuttal,
            "cross_examination" => Self::CrossExamination,
            "closing" => Self::Closing,
            "evaluation" => Self::Evaluation,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<DebatePhase> for String {
    fn from(value: DebatePhase) -> Self {
        match value {
            DebatePhase::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_roundtrips_through_str() {
        for position in [Position::Pro, Position::Con, Position::Neutral] {
            assert_eq!(position.as_str().parse::<Position>().unwrap(), position);
        }
        assert!("sideways".parse::<Position>().is_err());
    }

    #[test]
    fn format_error_lists_available_formats() {
        let err = "lincoln_douglas".parse::<DebateFormat>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("oxford"));
        assert!(msg.contains("public_forum"));
    }

    #[test]
    fn unknown_phase_is_preserved() {
        let phase: DebatePhase = serde_json::from_str("\"lightning_round\"").unwrap();
        assert_eq!(phase, DebatePhase::Other("lightning_round".into()));
        assert_eq!(
            serde_json::to_string(&phase).unwrap(),
            "\"lightning_round\""
        );
    }

    #[test]
    fn known_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DebatePhase::CrossExamination).unwrap(),
            "\"cross_examination\""
        );
    }
}
