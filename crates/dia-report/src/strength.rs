use serde::Serialize;
use std::fmt;

/// How decisively the winner won, bucketed by margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryStrength {
    VeryClose,
    Close,
    Clear,
    Strong,
    Decisive,
}

impl VictoryStrength {
    /// `None` for a zero (or unusable) margin.
    #[must_use]
    pub fn from_margin(margin: f64) -> Option<Self> {
        if !margin.is_finite() || margin <= 0.0 {
            return None;
        }
        Some(if margin < 0.5 {
            Self::VeryClose
        } else if margin < 1.0 {
            Self::Close
        } else if margin < 2.0 {
            Self::Clear
        } else if margin < 3.0 {
            Self::Strong
        } else {
            Self::Decisive
        })
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryClose => "Very Close",
            Self::Close => "Close Victory",
            Self::Clear => "Clear Victory",
            Self::Strong => "Strong Victory",
            Self::Decisive => "Decisive Victory",
        }
    }
}

impl fmt::Display for VictoryStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
