//! Closed selector type for storage reads.

use serde_json::{Map, Value};

use crate::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which keys a [`crate::StorageArea::get`] call retrieves and how absence is handled.
pub enum Selector {
    /// Every stored pair.
    All,
    /// One key; absent when never set.
    Key(String),
    /// Several keys fetched concurrently; absent for keys never set.
    Keys(Vec<String>),
    /// Keys fetched concurrently, with the mapped value used whenever a key holds nothing.
    Defaults(Map<String, Value>),
}

impl Selector {
    /// Builds a selector from the shape of a loosely typed caller argument.
    ///
    /// `None` and `null` select everything, a string selects one key, an array of strings
    /// selects a key list and an object selects keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidSelector`] for any other shape, including arrays holding
    /// non-string entries. Numbers and booleans are rejected here, whereas the legacy callback
    /// API quietly read them as an empty key set and answered `{}`.
    pub fn from_json(raw: Option<&Value>) -> Result<Self, StorageError> {
        match raw {
            None | Some(Value::Null) => Ok(Self::All),
            Some(Value::String(key)) => Ok(Self::Key(key.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        StorageError::InvalidSelector(format!("non-string key {item}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Keys),
            Some(Value::Object(defaults)) => Ok(Self::Defaults(defaults.clone())),
            Some(other) => Err(StorageError::InvalidSelector(other.to_string())),
        }
    }
}

impl From<&str> for Selector {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<Vec<String>> for Selector {
    fn from(keys: Vec<String>) -> Self {
        Self::Keys(keys)
    }
}

impl From<Map<String, Value>> for Selector {
    fn from(defaults: Map<String, Value>) -> Self {
        Self::Defaults(defaults)
    }
}
