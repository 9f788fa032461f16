//! `localStorage`-backed key/value storage engine.
//!
//! Values are stored as JSON text under [`STORAGE_KEY_PREFIX`] so iteration only sees entries
//! written through this adapter. The browser API is synchronous; the [`KeyValueStore`] impl wraps
//! it in ready futures.

use serde_json::Value;
use shim_host::{KeyValueFuture, KeyValueStore};

/// Prefix applied to every `localStorage` key owned by the shim.
pub const STORAGE_KEY_PREFIX: &str = "shim.storage.";

#[derive(Debug, Clone, Copy, Default)]
/// Browser storage engine backed by `window.localStorage`.
pub struct WebKeyValueStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
fn owned_keys(storage: &web_sys::Storage) -> Result<Vec<String>, String> {
    let length = storage
        .length()
        .map_err(|e| format!("localStorage length failed: {e:?}"))?;
    let mut keys = Vec::new();
    for index in 0..length {
        let key = storage
            .key(index)
            .map_err(|e| format!("localStorage key failed: {e:?}"))?;
        if let Some(key) = key.filter(|key| key.starts_with(STORAGE_KEY_PREFIX)) {
            keys.push(key);
        }
    }
    Ok(keys)
}

impl WebKeyValueStore {
    /// Reads and parses the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable, the read fails or the stored text is not
    /// valid JSON.
    pub fn load_value(self, key: &str) -> Result<Option<Value>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let raw = local_storage()?
                .get_item(&format!("{STORAGE_KEY_PREFIX}{key}"))
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))?;
            raw.map(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
                .transpose()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    /// Reads every entry owned by this adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or any entry cannot be read or parsed.
    pub fn load_all(self) -> Result<Vec<(String, Value)>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            let mut entries = Vec::new();
            for full_key in owned_keys(&storage)? {
                let Some(raw) = storage
                    .get_item(&full_key)
                    .map_err(|e| format!("localStorage get_item failed: {e:?}"))?
                else {
                    continue;
                };
                let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
                entries.push((full_key[STORAGE_KEY_PREFIX.len()..].to_string(), value));
            }
            Ok(entries)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(Vec::new())
        }
    }

    /// Serializes and stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the localStorage write fails.
    pub fn save_value(self, key: &str, value: &Value) -> Result<(), String> {
        let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;

        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(&format!("{STORAGE_KEY_PREFIX}{key}"), &raw)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw);
            Ok(())
        }
    }

    /// Removes `key` from localStorage.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the delete fails.
    pub fn delete_value(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .remove_item(&format!("{STORAGE_KEY_PREFIX}{key}"))
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }

    /// Removes every entry owned by this adapter, leaving foreign keys untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or any delete fails.
    pub fn delete_all(self) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            for full_key in owned_keys(&storage)? {
                storage
                    .remove_item(&full_key)
                    .map_err(|e| format!("localStorage remove_item failed: {e:?}"))?;
            }
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(())
        }
    }
}

impl KeyValueStore for WebKeyValueStore {
    fn get_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<Option<Value>, String>> {
        let store = *self;
        Box::pin(async move { store.load_value(key) })
    }

    fn entries<'a>(&'a self) -> KeyValueFuture<'a, Result<Vec<(String, Value)>, String>> {
        let store = *self;
        Box::pin(async move { store.load_all() })
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KeyValueFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_value(key, value) })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.delete_value(key) })
    }

    fn clear<'a>(&'a self) -> KeyValueFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.delete_all() })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_local_store_is_empty_and_successful() {
        let store = WebKeyValueStore;
        let store_obj: &dyn KeyValueStore = &store;

        block_on(store_obj.set_item("k", &json!({"a": 1}))).expect("set");
        assert_eq!(block_on(store_obj.get_item("k")).expect("get"), None);
        assert!(block_on(store_obj.entries()).expect("entries").is_empty());
        block_on(store_obj.remove_item("k")).expect("remove");
        block_on(store_obj.clear()).expect("clear");
    }
}
