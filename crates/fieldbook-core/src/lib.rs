#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

pub const CRATE_NAME: &str = "fieldbook-core";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Canonical JSON serialization. Row content signatures must not depend on
/// column order, so object keys are sorted recursively before hashing.
pub mod canonical {
    use serde::Serialize;
    use serde_json::{Map, Value};

    pub fn stable_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
        let raw = serde_json::to_value(value)?;
        let normalized = normalize_json_value(raw);
        serde_json::to_vec(&normalized)
    }

    pub fn stable_json_hash_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
        let bytes = stable_json_bytes(value)?;
        Ok(super::sha256_hex(&bytes))
    }

    fn normalize_json_value(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut sorted = Map::new();
                let mut entries: Vec<(String, Value)> = map
                    .into_iter()
                    .map(|(k, v)| (k, normalize_json_value(v)))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                for (k, v) in entries {
                    sorted.insert(k, v);
                }
                Value::Object(sorted)
            }
            Value::Array(items) => {
                Value::Array(items.into_iter().map(normalize_json_value).collect())
            }
            other => other,
        }
    }
}
