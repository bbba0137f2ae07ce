//! The key-value store contract consumed by [`HeatCounter`](crate::HeatCounter).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreResult;

/// An expiring key-value store.
///
/// Values are arbitrary JSON; the store does not validate their shape.
/// Implementations must be internally synchronized so a single instance
/// can back many counters across tasks.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Fetch the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key was never written or has expired.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store `value` under `key`, evicting it no later than `ttl` from now.
    ///
    /// A zero `ttl` means the entry never expires.
    fn put(&self, key: &str, value: Value, ttl: Duration) -> StoreResult<()>;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) -> StoreResult<()> {
        (**self).put(key, value, ttl)
    }
}

/// The persisted shape of a counter: `{"temperature": <integer>}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeatRecord {
    pub temperature: i64,
}

impl HeatRecord {
    /// Decode a stored value, returning `None` for anything that is not an
    /// object with an integer `temperature` field.
    pub fn decode(value: Value) -> Option<Self> {
        // Derived struct decoding also accepts sequences like `[63]`.
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn to_value(self) -> Value {
        serde_json::json!({ "temperature": self.temperature })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_well_formed_record() {
        let record = HeatRecord::decode(json!({ "temperature": 63 }));
        assert_eq!(record, Some(HeatRecord { temperature: 63 }));
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let record = HeatRecord::decode(json!({ "temperature": 5, "seen": 2 }));
        assert_eq!(record, Some(HeatRecord { temperature: 5 }));
    }

    #[test]
    fn decode_rejects_bare_scalar() {
        assert_eq!(HeatRecord::decode(json!(63)), None);
        assert_eq!(HeatRecord::decode(json!("63")), None);
        assert_eq!(HeatRecord::decode(Value::Null), None);
    }

    #[test]
    fn decode_rejects_missing_or_non_integer_field() {
        assert_eq!(HeatRecord::decode(json!({})), None);
        assert_eq!(HeatRecord::decode(json!({ "heat": 10 })), None);
        assert_eq!(HeatRecord::decode(json!({ "temperature": "hot" })), None);
        assert_eq!(HeatRecord::decode(json!({ "temperature": 1.5 })), None);
        assert_eq!(HeatRecord::decode(json!([63])), None);
    }

    #[test]
    fn to_value_is_single_field_object() {
        let value = HeatRecord { temperature: 20 }.to_value();
        assert_eq!(value, json!({ "temperature": 20 }));
    }
}
