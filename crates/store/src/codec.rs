//! Composite-value codec at the store boundary.
//!
//! Lists and maps are serialized to opaque bytes before they hit a backend
//! and decoded transparently on the way out; scalars pass through unchanged.
//! Higher components never see the encoded form.

use warden_core::error::{WardenError, WardenResult};
use warden_core::{Record, Value};

/// Encode one value for storage.
pub fn encode(value: Value) -> WardenResult<Value> {
    if value.is_composite() {
        let bytes = serde_json::to_vec(&value)
            .map_err(|e| WardenError::Encoding(format!("failed to encode composite value: {e}")))?;
        Ok(Value::Bytes(bytes))
    } else {
        Ok(value)
    }
}

/// Decode one stored value. Bytes that parse as an encoded composite are
/// expanded; anything else passes through.
pub fn decode(value: Value) -> Value {
    if let Value::Bytes(bytes) = &value {
        if let Ok(decoded) = serde_json::from_slice::<Value>(bytes) {
            if decoded.is_composite() {
                return decoded;
            }
        }
    }
    value
}

/// Encode every field of a record for storage.
pub fn encode_record(record: Record) -> WardenResult<Record> {
    let mut out = Record::new();
    for (field, value) in record.fields() {
        out.set(field.clone(), encode(value.clone())?);
    }
    Ok(out)
}

/// Decode every field of a stored record.
pub fn decode_record(record: Record) -> Record {
    let mut out = Record::new();
    for (field, value) in record.fields() {
        out.set(field.clone(), decode(value.clone()));
    }
    out
}
