use std::fmt;

use serde_json::value::RawValue;

use crate::error::FrameError;

/// The only event name the relay handles.
pub const MODE_EVENT: &str = "mode";

/// Payload of a `mode` event.
///
/// Kept as the raw JSON text the client sent. It is never parsed into a
/// value, so peers receive exactly the bytes the sender wrote.
#[derive(Debug, Clone)]
pub struct Payload {
    raw: Box<RawValue>,
}

impl Payload {
    /// Decode a `["mode", <payload>]` text frame.
    pub fn decode(text: &str) -> Result<Payload, FrameError> {
        let (event, raw): (String, Box<RawValue>) = serde_json::from_str(text)?;

        if event != MODE_EVENT {
            return Err(FrameError::UnknownEvent(event));
        }

        Ok(Payload { raw })
    }

    /// Build a payload from a JSON literal.
    pub fn from_json(json: &str) -> Result<Payload, FrameError> {
        let raw = RawValue::from_string(json.to_string())?;
        Ok(Payload { raw })
    }

    /// Encode as the `["mode",<payload>]` frame sent to every peer.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(MODE_EVENT, &self.raw))
    }

    pub fn as_json(&self) -> &str {
        self.raw.get()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_string_payload() {
        let payload = Payload::decode(r#"["mode","night"]"#).unwrap();
        assert_eq!(payload.as_json(), r#""night""#);
        assert_eq!(payload.encode().unwrap(), r#"["mode","night"]"#);
    }

    #[test]
    fn payload_text_is_untouched() {
        let cases = [
            r#""""#,
            "0",
            "-0.0",
            "12345678901234567890123456789.000000000000000001",
            "null",
            "true",
            r#"{"b":2,"a":[1,{"nested":"é"}]}"#,
            r#"["mode","x"]"#,
        ];

        for json in cases {
            let frame = format!(r#"["mode",{json}]"#);
            let payload = Payload::decode(&frame).unwrap();
            assert_eq!(payload.as_json(), json);
            assert_eq!(payload.encode().unwrap(), frame);
        }
    }

    #[test]
    fn rejects_other_events() {
        match Payload::decode(r#"["data",1]"#) {
            Err(FrameError::UnknownEvent(name)) => assert_eq!(name, "data"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_frames() {
        for text in ["", "mode", r#"{"mode":1}"#, r#"["mode"]"#, r#"["mode",1,2]"#, "[1,2]"] {
            assert!(
                matches!(Payload::decode(text), Err(FrameError::Malformed(_))),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn displays_raw_json() {
        let payload = Payload::from_json(r#"{"level":3}"#).unwrap();
        assert_eq!(payload.to_string(), r#"{"level":3}"#);
    }
}
