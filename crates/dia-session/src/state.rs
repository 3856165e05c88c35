use std::fmt;

/// Lifecycle of one orchestrated session.
///
/// ```text
/// Initializing → Streaming → Judging → Persisting → Done
///       └────────────┴──────────┴──────────┴──→ Failed
/// ```
///
/// `Streaming` may skip `Judging` when no judges are configured. `Done` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Initializing,
    Streaming,
    Judging,
    Persisting,
    Done,
    Failed,
}

impl SessionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self → next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Done | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Initializing, Self::Streaming)
            | (Self::Streaming, Self::Judging | Self::Persisting)
            | (Self::Judging, Self::Persisting)
            | (Self::Persisting, Self::Done) => true,
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Streaming => "streaming",
            Self::Judging => "judging",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionState; 6] = [
        SessionState::Initializing,
        SessionState::Streaming,
        SessionState::Judging,
        SessionState::Persisting,
        SessionState::Done,
        SessionState::Failed,
    ];

    #[test]
    fn happy_path_is_legal() {
        use SessionState::*;
        assert!(Initializing.can_transition_to(Streaming));
        assert!(Streaming.can_transition_to(Judging));
        assert!(Streaming.can_transition_to(Persisting));
        assert!(Judging.can_transition_to(Persisting));
        assert!(Persisting.can_transition_to(Done));
    }

    #[test]
    fn failed_is_reachable_from_every_non_terminal_state() {
        for state in ALL {
            assert_eq!(
                state.can_transition_to(SessionState::Failed),
                !state.is_terminal(),
                "{state} -> failed"
            );
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        for next in ALL {
            assert!(!SessionState::Done.can_transition_to(next));
            assert!(!SessionState::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn no_skipping_backwards() {
        use SessionState::*;
        assert!(!Judging.can_transition_to(Streaming));
        assert!(!Persisting.can_transition_to(Judging));
        assert!(!Initializing.can_transition_to(Persisting));
    }
}
