//! Inbound envelope decoding.
//!
//! Every inbound line is a JSON envelope with a `header` naming what it
//! carries and a `payload`. Hazard payloads are flat objects whose fields may
//! arrive as strings or numbers; both spellings are accepted.

use crate::error::{ArbiterError, ArbiterResult};
use crate::event::{HazardEvent, HazardType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
struct Header {
    #[serde(default, rename = "type")]
    message_type: String,
    #[serde(default)]
    subtype: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    header: Header,
    #[serde(default)]
    payload: Value,
}

/// One configuration entry pushed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Entry name.
    pub name: String,
    /// Entry value, rendered as text.
    pub value: String,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A hazard notification.
    Hazard(HazardEvent),
    /// Host configuration entries.
    Config(Vec<ConfigEntry>),
    /// Module health report; carried through untouched.
    ModuleStatus(Value),
    /// Anything else, tagged with its header for logging.
    Ignored(String),
}

/// Decode one raw envelope.
///
/// # Errors
///
/// Returns [`ArbiterError::MalformedMessage`] when the text is not an
/// envelope, [`ArbiterError::InvalidField`] when a hazard field cannot be
/// read and [`ArbiterError::UnknownHazardType`] for an unknown `AppId`.
pub fn decode(raw: &str) -> ArbiterResult<InboundMessage> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    let Header {
        message_type,
        subtype,
    } = envelope.header;

    match (message_type.as_str(), subtype.as_str()) {
        (_, "Application" | "Basic") => decode_hazard(&envelope.payload).map(InboundMessage::Hazard),
        ("__config", _) => decode_config(&envelope.payload).map(InboundMessage::Config),
        (_, "ModuleStatus") => Ok(InboundMessage::ModuleStatus(envelope.payload)),
        _ => Ok(InboundMessage::Ignored(format!("{message_type}/{subtype}"))),
    }
}

/// Build a hazard event from a flat payload object.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_hazard(payload: &Value) -> ArbiterResult<HazardEvent> {
    let fields = payload
        .as_object()
        .ok_or_else(|| ArbiterError::malformed("hazard payload is not an object"))?;

    let app_id = required_u64(fields, "AppId")?;
    let hazard_type =
        HazardType::from_app_id(app_id).ok_or(ArbiterError::UnknownHazardType(app_id))?;
    let event_code = text(fields, "EventCode")
        .ok_or_else(|| ArbiterError::invalid_field("EventCode", "missing"))?;

    let severity = match optional_u64(fields, "Severity")? {
        None => 0,
        Some(raw) => u8::try_from(raw)
            .map_err(|_| ArbiterError::invalid_field("Severity", format!("{raw} out of range")))?,
    };

    let bearing = optional_f64(fields, "AngleToRefPoint")?.unwrap_or(0.0);
    let distance = optional_f64(fields, "DistanceToRefPoint")?.unwrap_or(0.0);
    if distance < 0.0 {
        return Err(ArbiterError::invalid_field(
            "DistanceToRefPoint",
            format!("{distance} is negative"),
        ));
    }

    let correlation = text(fields, "InteractionId")
        .filter(|id| !id.is_empty())
        .or_else(|| text(fields, "Id"))
        .unwrap_or_default();

    Ok(HazardEvent::new(hazard_type, event_code)
        .with_instance(text(fields, "EventID").unwrap_or_default())
        .with_severity(severity)
        .with_geometry(bearing.rem_euclid(360.0), distance)
        .with_text(text(fields, "CustomText").unwrap_or_default())
        .with_dwell_ms(optional_u64(fields, "DisplayDuration")?.unwrap_or(0))
        .with_correlation(correlation))
}

fn decode_config(payload: &Value) -> ArbiterResult<Vec<ConfigEntry>> {
    let entries = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => return Err(ArbiterError::malformed("config payload is not a list")),
    };
    Ok(entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let name = text(entry, "name").or_else(|| text(entry, "key"))?;
            let value = text(entry, "value").unwrap_or_default();
            Some(ConfigEntry { name, value })
        })
        .collect())
}

fn text(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_u64(fields: &Map<String, Value>, name: &'static str) -> ArbiterResult<Option<u64>> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| ArbiterError::invalid_field(name, format!("{value} is not an unsigned integer")))
}

fn required_u64(fields: &Map<String, Value>, name: &'static str) -> ArbiterResult<u64> {
    optional_u64(fields, name)?.ok_or_else(|| ArbiterError::invalid_field(name, "missing"))
}

fn optional_f64(fields: &Map<String, Value>, name: &'static str) -> ArbiterResult<Option<f64>> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| ArbiterError::invalid_field(name, format!("{value} is not a number")))
}
