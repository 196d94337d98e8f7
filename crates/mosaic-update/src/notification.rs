//! Scene notifications.
//!
//! A new-scene notification is an envelope whose `Message` is either a JSON
//! object or a JSON-encoded string of one:
//!
//! ```json
//! {"Message": "{\"Records\":[{\"s3\":{\"object\":{\"key\":\"c1/L8/013/001/LC08_L1TP_013001_20170101_20170110_01_RT/index.html\"}}}]}"}
//! ```
//!
//! The scene id is the second-to-last `/` segment of each record's object key.
//! A key with no parent directory is passed through whole, so the updater
//! skips it as an invalid id and the other records still apply.
//! Function invocations wrap one envelope per record under
//! `{"Records": [{"Sns": <envelope>}]}`; [`Notification::from_event`] accepts
//! both shapes.

use crate::{Result, UpdateError};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Scene identifiers announced by one notification, in message order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    scene_ids: Vec<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Message")]
    message: Value,
}

#[derive(Deserialize)]
struct S3Message {
    #[serde(rename = "Records")]
    records: Vec<S3Record>,
}

#[derive(Deserialize)]
struct S3Record {
    s3: S3Entity,
}

#[derive(Deserialize)]
struct S3Entity {
    object: S3Object,
}

#[derive(Deserialize)]
struct S3Object {
    key: String,
}

#[derive(Deserialize)]
struct FunctionEvent {
    #[serde(rename = "Records")]
    records: Vec<FunctionRecord>,
}

#[derive(Deserialize)]
struct FunctionRecord {
    #[serde(rename = "Sns")]
    sns: Envelope,
}

impl Notification {
    /// A notification announcing the given scene ids.
    pub fn new(scene_ids: Vec<String>) -> Self {
        Self { scene_ids }
    }

    /// Parse a single `{"Message": ...}` envelope.
    pub fn from_envelope(envelope: &Value) -> Result<Self> {
        let envelope = Envelope::deserialize(envelope).map_err(malformed)?;
        Ok(Self {
            scene_ids: envelope_scene_ids(envelope)?,
        })
    }

    /// Parse either an envelope or a function event carrying envelopes under
    /// `Records[].Sns`.
    pub fn from_event(event: &Value) -> Result<Self> {
        if event.get("Message").is_some() {
            return Self::from_envelope(event);
        }

        let event = FunctionEvent::deserialize(event).map_err(malformed)?;
        let mut scene_ids = Vec::new();
        for record in event.records {
            scene_ids.extend(envelope_scene_ids(record.sns)?);
        }
        Ok(Self { scene_ids })
    }

    /// Parse JSON text holding an envelope or a function event.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(malformed)?;
        Self::from_event(&value)
    }

    /// Announced scene ids.
    pub fn scene_ids(&self) -> &[String] {
        &self.scene_ids
    }

    /// Number of announced scenes.
    pub fn len(&self) -> usize {
        self.scene_ids.len()
    }

    /// Whether nothing was announced.
    pub fn is_empty(&self) -> bool {
        self.scene_ids.is_empty()
    }
}

fn malformed(err: serde_json::Error) -> UpdateError {
    UpdateError::Notification(err.to_string())
}

fn envelope_scene_ids(envelope: Envelope) -> Result<Vec<String>> {
    // The message may arrive already decoded or as a JSON string
    let message: S3Message = match envelope.message {
        Value::String(text) => serde_json::from_str(&text).map_err(malformed)?,
        other => serde_json::from_value(other).map_err(malformed)?,
    };

    let scene_ids = message
        .records
        .into_iter()
        .map(|record| {
            let key = record.s3.object.key;
            match scene_id_from_key(&key) {
                Some(scene_id) => scene_id.to_string(),
                None => {
                    warn!(%key, "object key has no scene directory");
                    key
                }
            }
        })
        .collect();
    Ok(scene_ids)
}

/// The second-to-last `/` segment of an object key.
///
/// `c1/L8/013/001/LC08_L1TP_013001_20170101_20170110_01_RT/index.html` gives
/// `LC08_L1TP_013001_20170101_20170110_01_RT`.
pub fn scene_id_from_key(key: &str) -> Option<&str> {
    let mut segments = key.rsplit('/');
    segments.next()?;
    segments.next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "c1/L8/013/001/LC08_L1TP_013001_20170101_20170110_01_RT/index.html";
    const SCENE: &str = "LC08_L1TP_013001_20170101_20170110_01_RT";

    fn s3_message(keys: &[&str]) -> Value {
        let records: Vec<Value> = keys
            .iter()
            .map(|k| json!({"s3": {"object": {"key": k}}}))
            .collect();
        json!({ "Records": records })
    }

    #[test]
    fn test_string_message() {
        let envelope = json!({ "Message": s3_message(&[KEY]).to_string() });
        let n = Notification::from_envelope(&envelope).unwrap();
        assert_eq!(n.scene_ids(), &[SCENE.to_string()]);
    }

    #[test]
    fn test_object_message() {
        let other = "L8/014/032/LC80140322017001LGN00/LC80140322017001LGN00_B1.TIF";
        let envelope = json!({ "Message": s3_message(&[KEY, other]) });
        let n = Notification::from_envelope(&envelope).unwrap();
        assert_eq!(n.scene_ids(), &[SCENE.to_string(), "LC80140322017001LGN00".to_string()]);
    }

    #[test]
    fn test_function_event() {
        let event = json!({
            "Records": [
                {"Sns": {
                    "Message": s3_message(&[KEY]).to_string(),
                    "Subject": "Amazon S3 Notification",
                }},
                {"Sns": {"Message": s3_message(&[]).to_string()}},
            ]
        });
        let n = Notification::from_event(&event).unwrap();
        assert_eq!(n.len(), 1);
    }

    #[test]
    fn test_from_json_envelope() {
        let text = json!({ "Message": s3_message(&[KEY]) }).to_string();
        assert_eq!(Notification::from_json(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_records_is_malformed() {
        let err = Notification::from_envelope(&json!({"Message": "{}"})).unwrap_err();
        assert!(matches!(err, UpdateError::Notification(_)));
        let err = Notification::from_event(&json!({"foo": 1})).unwrap_err();
        assert!(matches!(err, UpdateError::Notification(_)));
        assert!(Notification::from_json("not json").is_err());
    }

    #[test]
    fn test_key_without_directory_keeps_other_records() {
        let envelope = json!({ "Message": s3_message(&[KEY, "index.html"]) });
        let n = Notification::from_envelope(&envelope).unwrap();
        assert_eq!(n.scene_ids(), &[SCENE.to_string(), "index.html".to_string()]);
    }

    #[test]
    fn test_scene_id_from_key() {
        assert_eq!(scene_id_from_key(KEY), Some(SCENE));
        assert_eq!(scene_id_from_key("a/b"), Some("a"));
        assert_eq!(scene_id_from_key("b"), None);
    }
}
