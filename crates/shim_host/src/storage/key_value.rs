//! Async key/value storage engine contracts and adapters.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use serde_json::Value;

/// Object-safe boxed future used by [`KeyValueStore`] async methods.
pub type KeyValueFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host storage engine holding JSON values by string key.
///
/// Every operation may fail; a missing key is `Ok(None)`, never an error.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<Option<Value>, String>>;

    /// Iterates every stored entry.
    fn entries<'a>(&'a self) -> KeyValueFuture<'a, Result<Vec<(String, Value)>, String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KeyValueFuture<'a, Result<(), String>>;

    /// Removes `key`; removing an absent key succeeds.
    fn remove_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<(), String>>;

    /// Removes every entry.
    fn clear<'a>(&'a self) -> KeyValueFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory storage engine with a switchable failure mode.
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<BTreeMap<String, Value>>>,
    failure: Rc<RefCell<Option<String>>>,
    key_failures: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Makes every subsequent operation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.borrow_mut() = Some(message.into());
    }

    /// Makes every subsequent operation on `key` fail with `message`.
    ///
    /// Other keys and whole-store operations are unaffected.
    pub fn fail_key(&self, key: impl Into<String>, message: impl Into<String>) {
        self.key_failures
            .borrow_mut()
            .insert(key.into(), message.into());
    }

    /// Clears failures installed by [`Self::fail_with`] and [`Self::fail_key`].
    pub fn recover(&self) {
        *self.failure.borrow_mut() = None;
        self.key_failures.borrow_mut().clear();
    }

    /// Returns the number of stored entries, ignoring the failure switch.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether nothing is stored, ignoring the failure switch.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn check(&self) -> Result<(), String> {
        match self.failure.borrow().as_ref() {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn check_key(&self, key: &str) -> Result<(), String> {
        self.check()?;
        match self.key_failures.borrow().get(key) {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<Option<Value>, String>> {
        Box::pin(async move {
            self.check_key(key)?;
            Ok(self.inner.borrow().get(key).cloned())
        })
    }

    fn entries<'a>(&'a self) -> KeyValueFuture<'a, Result<Vec<(String, Value)>, String>> {
        Box::pin(async move {
            self.check()?;
            Ok(self
                .inner
                .borrow()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect())
        })
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.check_key(key)?;
            self.inner
                .borrow_mut()
                .insert(key.to_string(), value.clone());
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.check_key(key)?;
            self.inner.borrow_mut().remove(key);
            Ok(())
        })
    }

    fn clear<'a>(&'a self) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.check()?;
            self.inner.borrow_mut().clear();
            Ok(())
        })
    }
}
