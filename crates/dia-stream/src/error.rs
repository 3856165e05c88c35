use std::time::Duration;

/// Errors raised while reading the event channel.
///
/// `HandshakeTimeout` and `Connect` mean the session produced nothing.
/// Every other variant arrives after events may already have been consumed.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("handshake with {url} timed out after {timeout:?}")]
    HandshakeTimeout { url: String, timeout: Duration },

    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("no event received for {0:?}")]
    IdleTimeout(Duration),

    #[error("event stream disconnected: {0}")]
    Disconnected(String),

    #[error("event stream closed before the debate completed{}", reason_suffix(.reason.as_deref()))]
    ClosedBeforeCompletion { reason: Option<String> },

    #[error("close handshake did not finish within {0:?}")]
    CloseTimeout(Duration),
}

impl StreamError {
    /// Whether the failure happened before any event could be received.
    #[must_use]
    pub const fn is_handshake_failure(&self) -> bool {
        matches!(self, Self::HandshakeTimeout { .. } | Self::Connect { .. })
    }
}

fn reason_suffix(reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!(": {reason}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_reason_is_appended() {
        let err = StreamError::ClosedBeforeCompletion {
            reason: Some("server shutdown".into()),
        };
        assert_eq!(
            err.to_string(),
            "event stream closed before the debate completed: server shutdown"
        );
        let err = StreamError::ClosedBeforeCompletion { reason: None };
        assert_eq!(
            err.to_string(),
            "event stream closed before the debate completed"
        );
    }

    #[test]
    fn only_connect_failures_are_handshake_failures() {
        assert!(
            StreamError::Connect {
                url: "ws://x".into(),
                reason: "refused".into()
            }
            .is_handshake_failure()
        );
        assert!(!StreamError::IdleTimeout(Duration::from_secs(1)).is_handshake_failure());
    }
}
