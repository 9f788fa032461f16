//! Callback-style adapter for legacy storage callers.
//!
//! Failures are reported through the last-error slot and a callback invoked with no result.

use serde_json::{Map, Value};

use super::{Selector, StorageArea, StorageItems};
use crate::last_error::set_last_error;

/// Prefix of every read failure written to the last-error slot.
pub const GET_ERROR_PREFIX: &str = "Error retrieving values: ";

/// Renders read results as a JSON object, with absent values as `null`.
pub fn items_to_json(items: StorageItems) -> Map<String, Value> {
    items
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or(Value::Null)))
        .collect()
}

/// Reads `selector` from `area` and hands the result to `callback`.
///
/// On any failure (including a selector of unsupported shape) the last-error slot receives
/// [`GET_ERROR_PREFIX`] followed by the failure and `callback` gets `None`.
pub async fn get_compat<F>(area: &StorageArea, selector: Option<&Value>, callback: F)
where
    F: FnOnce(Option<Map<String, Value>>),
{
    let items = match Selector::from_json(selector) {
        Ok(selector) => area.get(&selector).await,
        Err(err) => Err(err),
    };
    match items {
        Ok(items) => callback(Some(items_to_json(items))),
        Err(err) => {
            let message = format!("{GET_ERROR_PREFIX}{err}");
            leptos::logging::warn!("{message}");
            set_last_error(message);
            callback(None);
        }
    }
}
