//! JSON wire codec
//!
//! Every frame is a JSON object whose first key is `"type"` holding the
//! numeric [`MessageKind`] code, followed by the variant's camelCase fields:
//!
//! ```text
//! {"type":1,"workerId":3,"activate":false}
//! {"type":4,"workerStatusList":[{"id":0,"active":true}]}
//! ```
//!
//! Decoding reads the discriminant first and only then deserializes the
//! remaining fields into that variant's shape.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::messages::{Message, MessageKind};
use crate::domain::{WorkerId, WorkerStatus};

/// Key carrying the discriminant
pub const DISCRIMINANT_KEY: &str = "type";

/// Errors from encoding or decoding frames
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Cannot encode {kind} message: {reason}")]
    Encode { kind: MessageKind, reason: String },
}

impl ProtocolError {
    fn malformed(reason: impl Into<String>) -> Self {
        ProtocolError::MalformedMessage(reason.into())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataRequestFields {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlFields {
    worker_id: WorkerId,
    activate: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataResponseFields {
    worker_id: WorkerId,
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateResponseFields {
    worker_id: WorkerId,
    active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateFields {
    worker_status_list: Vec<WorkerStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverheatTakeoverFields {
    worker_to_deactivate: WorkerId,
    worker_to_activate: WorkerId,
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(DISCRIMINANT_KEY, &self.kind().code())?;
        match self {
            Message::DataRequest { data } => {
                map.serialize_entry("data", data)?;
            }
            Message::Control { worker_id, activate } => {
                map.serialize_entry("workerId", worker_id)?;
                map.serialize_entry("activate", activate)?;
            }
            Message::DataResponse { worker_id, temperature } => {
                map.serialize_entry("workerId", worker_id)?;
                map.serialize_entry("temperature", temperature)?;
            }
            Message::StatusUpdateResponse { worker_id, active } => {
                map.serialize_entry("workerId", worker_id)?;
                map.serialize_entry("active", active)?;
            }
            Message::StatusUpdate { worker_status_list } => {
                map.serialize_entry("workerStatusList", worker_status_list)?;
            }
            Message::OverheatTakeover {
                worker_to_deactivate,
                worker_to_activate,
            } => {
                map.serialize_entry("workerToDeactivate", worker_to_deactivate)?;
                map.serialize_entry("workerToActivate", worker_to_activate)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_value(value).map_err(de::Error::custom)
    }
}

fn fields<T: DeserializeOwned>(kind: MessageKind, value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|e| ProtocolError::malformed(format!("invalid {} fields: {}", kind, e)))
}

/// Build a message from an already parsed JSON value
pub fn from_value(value: Value) -> Result<Message, ProtocolError> {
    let object = value
        .as_object()
        .ok_or_else(|| ProtocolError::malformed("frame is not a JSON object"))?;
    let discriminant = object
        .get(DISCRIMINANT_KEY)
        .ok_or_else(|| ProtocolError::malformed("missing discriminant"))?;
    let code = discriminant.as_u64().ok_or_else(|| {
        ProtocolError::malformed(format!("discriminant {} is not a non-negative integer", discriminant))
    })?;
    let kind =
        MessageKind::from_code(code).ok_or_else(|| ProtocolError::malformed(format!("unknown discriminant {}", code)))?;

    let message = match kind {
        MessageKind::DataRequest => {
            let f: DataRequestFields = fields(kind, value)?;
            Message::DataRequest { data: f.data }
        }
        MessageKind::Control => {
            let f: ControlFields = fields(kind, value)?;
            Message::Control {
                worker_id: f.worker_id,
                activate: f.activate,
            }
        }
        MessageKind::DataResponse => {
            let f: DataResponseFields = fields(kind, value)?;
            Message::DataResponse {
                worker_id: f.worker_id,
                temperature: f.temperature,
            }
        }
        MessageKind::StatusUpdateResponse => {
            let f: StatusUpdateResponseFields = fields(kind, value)?;
            Message::StatusUpdateResponse {
                worker_id: f.worker_id,
                active: f.active,
            }
        }
        MessageKind::StatusUpdate => {
            let f: StatusUpdateFields = fields(kind, value)?;
            Message::StatusUpdate {
                worker_status_list: f.worker_status_list,
            }
        }
        MessageKind::OverheatTakeover => {
            let f: OverheatTakeoverFields = fields(kind, value)?;
            Message::OverheatTakeover {
                worker_to_deactivate: f.worker_to_deactivate,
                worker_to_activate: f.worker_to_activate,
            }
        }
    };

    Ok(message)
}

/// Encode a message into a wire frame
pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    if let Message::DataResponse { temperature, .. } = message
        && !temperature.is_finite()
    {
        return Err(ProtocolError::Encode {
            kind: message.kind(),
            reason: format!("temperature {} is not finite", temperature),
        });
    }

    serde_json::to_vec(message).map_err(|e| ProtocolError::Encode {
        kind: message.kind(),
        reason: e.to_string(),
    })
}

/// Decode a wire frame
pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::malformed(format!("invalid JSON: {}", e)))?;
    from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::DataRequest {
                data: "tick 42".to_string(),
            },
            Message::Control {
                worker_id: 3,
                activate: false,
            },
            Message::DataResponse {
                worker_id: 7,
                temperature: 23.456789012345,
            },
            Message::StatusUpdateResponse {
                worker_id: 0,
                active: true,
            },
            Message::StatusUpdate {
                worker_status_list: vec![WorkerStatus::new(0, true), WorkerStatus::new(1, false)],
            },
            Message::OverheatTakeover {
                worker_to_deactivate: 2,
                worker_to_activate: 5,
            },
        ]
    }

    #[test]
    fn test_roundtrip_all_messages() {
        for msg in sample_messages() {
            let bytes = encode(&msg).unwrap();
            let decoded = decode(&bytes).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn test_discriminant_comes_first() {
        for msg in sample_messages() {
            let json = String::from_utf8(encode(&msg).unwrap()).unwrap();
            let expected = format!("{{\"type\":{},", msg.kind().code());
            assert!(json.starts_with(&expected), "{} should start with {}", json, expected);
        }
    }

    #[test]
    fn test_control_wire_format() {
        let json = String::from_utf8(encode(&Message::control(3, false)).unwrap()).unwrap();
        assert_eq!(json, r#"{"type":1,"workerId":3,"activate":false}"#);
    }

    #[test]
    fn test_status_update_wire_format() {
        let msg = Message::StatusUpdate {
            worker_status_list: vec![WorkerStatus::new(0, true)],
        };
        let json = String::from_utf8(encode(&msg).unwrap()).unwrap();
        assert_eq!(json, r#"{"type":4,"workerStatusList":[{"id":0,"active":true}]}"#);
    }

    #[test]
    fn test_overheat_wire_format() {
        let msg = Message::OverheatTakeover {
            worker_to_deactivate: 1,
            worker_to_activate: 2,
        };
        let json = String::from_utf8(encode(&msg).unwrap()).unwrap();
        assert_eq!(json, r#"{"type":5,"workerToDeactivate":1,"workerToActivate":2}"#);
    }

    #[test]
    fn test_decode_accepts_reordered_fields() {
        let msg = decode(br#"{"temperature":19.5,"workerId":4,"type":2}"#).unwrap();
        assert_eq!(
            msg,
            Message::DataResponse {
                worker_id: 4,
                temperature: 19.5
            }
        );
    }

    #[test]
    fn test_unknown_discriminant() {
        let err = decode(br#"{"type":42,"data":"x"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
        assert!(err.to_string().contains("unknown discriminant 42"));
    }

    #[test]
    fn test_string_discriminant() {
        let err = decode(br#"{"type":"Unknown","data":"Test Data"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_missing_discriminant() {
        let err = decode(br#"{"workerId":1,"activate":true}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MalformedMessage("missing discriminant".to_string()));
    }

    #[test]
    fn test_field_mismatch() {
        let err = decode(br#"{"type":1,"workerId":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));

        let err = decode(br#"{"type":3,"workerId":-1,"active":true}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(decode(b"[1,2,3]"), Err(ProtocolError::MalformedMessage(_))));
        assert!(matches!(decode(b"not json"), Err(ProtocolError::MalformedMessage(_))));
        assert!(matches!(decode(&[0xff, 0xfe]), Err(ProtocolError::MalformedMessage(_))));
    }

    #[test]
    fn test_non_finite_temperature_rejected() {
        let msg = Message::DataResponse {
            worker_id: 0,
            temperature: f64::NAN,
        };
        assert!(matches!(
            encode(&msg),
            Err(ProtocolError::Encode {
                kind: MessageKind::DataResponse,
                ..
            })
        ));
    }

    #[test]
    fn test_serde_json_interop() {
        let msg = Message::control(2, true);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);

        let bad: Result<Message, _> = serde_json::from_str(r#"{"type":99}"#);
        assert!(bad.is_err());
    }
}
