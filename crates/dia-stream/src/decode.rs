//! JSON text frame → [`DebateEvent`].
//!
//! Frames are objects with a `type` discriminator and a type-specific
//! payload. Timestamps may arrive with or without an offset, and metadata
//! may contain nested JSON, so payloads are normalized before they are
//! deserialized into the core entities.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use dia_core::entities::{EnsembleSummary, JudgeDecision, Message};
use dia_core::errors::CoreError;
use dia_core::metadata::metadata_from_json;
use dia_core::time::parse_timestamp;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::event::{DebateEvent, ModelErrorDetail};

const DISPLAY_LABELS_KEY: &str = "display_labels";
const DEFAULT_JUDGE_ERROR: &str = "judge evaluation failed";

/// Result of decoding one text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(DebateEvent),
    /// Well-formed frame with a `type` this client does not know.
    Unrecognized(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string 'type' field")]
    MissingType,

    #[error("{kind} frame has no '{field}' object")]
    MissingPayload { kind: String, field: &'static str },

    #[error("invalid {kind} payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid timestamp in {kind} payload: {source}")]
    Timestamp {
        kind: String,
        #[source]
        source: CoreError,
    },
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns `DecodeError` when the frame is not a JSON object with a string
/// `type`, or when a known event type carries a malformed payload.
pub fn decode_frame(text: &str) -> Result<Frame, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Json)?;
    let Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject);
    };
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();

    let event = match kind.as_str() {
        "new_message" => {
            let payload = take_payload(&mut object, &kind, "message")?;
            DebateEvent::NewMessage(decode_message(payload, &kind)?)
        }
        "judging_started" => DebateEvent::JudgingStarted,
        "judge_decision" => {
            let payload = take_payload(&mut object, &kind, "decision")?;
            let decision = decode_decision(payload, &kind)?;
            let ensemble_summary = match object.remove("ensemble_summary") {
                None | Some(Value::Null) => None,
                Some(summary) => Some(from_payload::<EnsembleSummary>(summary, &kind)?),
            };
            DebateEvent::JudgeDecision {
                decision,
                ensemble_summary,
            }
        }
        // Fatal events abort whatever their fields look like
        "model_error" => DebateEvent::ModelError(model_error_detail(&object)),
        "judge_error" => DebateEvent::JudgeError {
            error: text_field(&object, "error")
                .unwrap_or_else(|| DEFAULT_JUDGE_ERROR.to_string()),
        },
        "debate_completed" => DebateEvent::DebateCompleted,
        _ => return Ok(Frame::Unrecognized(kind)),
    };
    Ok(Frame::Event(event))
}

/// Decode a frame and fold decode failures into logs.
///
/// Returns `None` for frames that should be skipped.
pub(crate) fn accept_text(text: &str) -> Option<DebateEvent> {
    match decode_frame(text) {
        Ok(Frame::Event(event)) => {
            tracing::trace!(kind = event.kind(), "event received");
            Some(event)
        }
        Ok(Frame::Unrecognized(kind)) => {
            tracing::debug!(kind, "ignoring unrecognized event type");
            None
        }
        Err(error) => {
            tracing::warn!(%error, "skipping malformed frame");
            None
        }
    }
}

fn take_payload(
    object: &mut Map<String, Value>,
    kind: &str,
    field: &'static str,
) -> Result<Map<String, Value>, DecodeError> {
    match object.remove(field) {
        Some(Value::Object(payload)) => Ok(payload),
        _ => Err(DecodeError::MissingPayload {
            kind: kind.to_string(),
            field,
        }),
    }
}

/// A non-empty string field. Any other shape reads as absent.
fn text_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn model_error_detail(object: &Map<String, Value>) -> ModelErrorDetail {
    ModelErrorDetail {
        error: text_field(object, "error").unwrap_or_default(),
        speaker_id: text_field(object, "speaker_id"),
        model_name: text_field(object, "model_name"),
        provider: text_field(object, "provider"),
        phase: text_field(object, "phase"),
        exception_type: text_field(object, "exception_type"),
        exception_message: text_field(object, "exception_message"),
    }
}

fn from_payload<T: DeserializeOwned>(value: Value, kind: &str) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Payload {
        kind: kind.to_string(),
        source,
    })
}

fn decode_message(mut payload: Map<String, Value>, kind: &str) -> Result<Message, DecodeError> {
    // A missing timestamp is stamped with the receipt time
    if !matches!(payload.get("timestamp"), Some(Value::String(_))) {
        payload.insert("timestamp".into(), Value::String(rfc3339_now()));
    }
    normalize_timestamp(&mut payload, "timestamp", kind)?;
    normalize_timestamp(&mut payload, "cost_queried_at", kind)?;
    normalize_metadata(&mut payload);
    from_payload(Value::Object(payload), kind)
}

fn decode_decision(
    mut payload: Map<String, Value>,
    kind: &str,
) -> Result<JudgeDecision, DecodeError> {
    normalize_timestamp(&mut payload, "cost_queried_at", kind)?;
    let labels = normalize_metadata(&mut payload);
    let mut decision: JudgeDecision = from_payload(Value::Object(payload), kind)?;
    if decision.display_labels.is_empty() {
        decision.display_labels = labels;
    }
    Ok(decision)
}

/// Rewrite an optional timestamp field as RFC 3339 so chrono's serde accepts it.
fn normalize_timestamp(
    payload: &mut Map<String, Value>,
    field: &str,
    kind: &str,
) -> Result<(), DecodeError> {
    let Some(Value::String(raw)) = payload.get(field) else {
        if matches!(payload.get(field), Some(Value::Null)) {
            payload.remove(field);
        }
        return Ok(());
    };
    if raw.is_empty() {
        payload.remove(field);
        return Ok(());
    }
    let parsed = parse_timestamp(raw).map_err(|source| DecodeError::Timestamp {
        kind: kind.to_string(),
        source,
    })?;
    payload.insert(
        field.to_string(),
        Value::String(parsed.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    Ok(())
}

/// Flatten nested metadata values to text and pull out `display_labels`.
fn normalize_metadata(payload: &mut Map<String, Value>) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let mut object = match payload.remove("metadata") {
        Some(Value::Object(object)) => object,
        _ => return labels,
    };
    if let Some(Value::Object(raw_labels)) = object.remove(DISPLAY_LABELS_KEY) {
        labels = raw_labels
            .into_iter()
            .filter_map(|(id, label)| match label {
                Value::String(label) => Some((id, label)),
                _ => None,
            })
            .collect();
    }
    let metadata = metadata_from_json(object);
    if let Ok(value) = serde_json::to_value(metadata) {
        payload.insert("metadata".into(), value);
    }
    labels
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
