//! Envelope codec: deterministic JSON encoding with presence tracking.
//!
//! Encoding is stable: struct fields are written in declaration order,
//! absent optional fields are omitted and every map is key-sorted, so the
//! same logical envelope always yields the same bytes. Decoding ignores
//! unknown fields and rejects unknown error taxonomy codes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::ErrorType;
use crate::envelope::{UworkerInput, UworkerOutput};

/// Errors from decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed {kind} envelope: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} envelope must be a JSON object")]
    NotAnObject { kind: &'static str },

    #[error("unknown error type code: {code}")]
    UnknownErrorType { code: String },

    #[error("invalid {kind} envelope structure: {source}")]
    Schema {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A wire envelope understood by the codec.
pub trait Envelope: Serialize + DeserializeOwned {
    /// Short name used in errors and log events.
    const KIND: &'static str;

    /// Extra wire-level checks run on the parsed JSON before typed decoding.
    fn check_wire(_value: &serde_json::Map<String, Value>) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Whether every float in the envelope has a JSON encoding.
    fn is_finite(&self) -> bool;
}

impl Envelope for UworkerInput {
    const KIND: &'static str = "input";

    fn is_finite(&self) -> bool {
        UworkerInput::is_finite(self)
    }
}

impl Envelope for UworkerOutput {
    const KIND: &'static str = "output";

    fn is_finite(&self) -> bool {
        UworkerOutput::is_finite(self)
    }

    fn check_wire(value: &serde_json::Map<String, Value>) -> Result<(), DecodeError> {
        match value.get("error") {
            None => Ok(()),
            Some(Value::Number(n)) => match n.as_u64().and_then(ErrorType::from_code) {
                Some(_) => Ok(()),
                None => Err(DecodeError::UnknownErrorType {
                    code: n.to_string(),
                }),
            },
            // Non-numeric values are reported by typed decoding.
            Some(_) => Ok(()),
        }
    }
}

/// Encode an envelope to bytes.
///
/// The envelope must be finite: serde_json writes NaN and infinities as
/// `null`, which would not decode back to the same value. The I/O layer
/// checks this before encoding.
pub fn encode<E: Envelope>(envelope: &E) -> Vec<u8> {
    debug_assert!(envelope.is_finite(), "{} envelope holds a non-finite float", E::KIND);
    serde_json::to_vec(envelope).expect("envelope types always serialize to JSON")
}

/// Decode an envelope from bytes.
///
/// # Errors
///
/// - `DecodeError::Malformed`: bytes are not well-formed JSON.
/// - `DecodeError::NotAnObject`: the top-level value is not an object.
/// - `DecodeError::UnknownErrorType`: the output carries an error code
///   this build does not know.
/// - `DecodeError::Schema`: a known field has the wrong type.
pub fn decode<E: Envelope>(bytes: &[u8]) -> Result<E, DecodeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| DecodeError::Malformed {
        kind: E::KIND,
        source,
    })?;

    let Value::Object(fields) = &value else {
        return Err(DecodeError::NotAnObject { kind: E::KIND });
    };
    E::check_wire(fields)?;

    serde_json::from_value(value).map_err(|source| DecodeError::Schema {
        kind: E::KIND,
        source,
    })
}

pub fn encode_input(input: &UworkerInput) -> Vec<u8> {
    encode(input)
}

pub fn decode_input(bytes: &[u8]) -> Result<UworkerInput, DecodeError> {
    decode(bytes)
}

pub fn encode_output(output: &UworkerOutput) -> Vec<u8> {
    encode(output)
}

pub fn decode_output(bytes: &[u8]) -> Result<UworkerOutput, DecodeError> {
    decode(bytes)
}

/// SHA-256 hex digest of encoded envelope bytes.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
