//! Storage area facade over an async key/value engine.

use std::{collections::BTreeMap, rc::Rc};

use futures::future::try_join_all;
use serde_json::{Map, Value};
use shim_host::KeyValueStore;

use super::{ChangeBus, ChangeEvent, Selector, StorageChange, SubscriptionId};
use crate::StorageError;

/// Result of a read: every selected key mapped to its value, `None` when the key holds nothing.
pub type StorageItems = BTreeMap<String, Option<Value>>;

#[derive(Clone)]
/// One storage area: reads over four selector shapes, batched writes and change relay.
///
/// Clones share the engine and the subscriber registry.
pub struct StorageArea {
    store: Rc<dyn KeyValueStore>,
    changes: Rc<ChangeBus>,
}

impl StorageArea {
    /// Creates an area over `store` with an empty subscriber registry.
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            changes: Rc::new(ChangeBus::default()),
        }
    }

    /// Reads the keys named by `selector`.
    ///
    /// Key lists and default maps fetch every key concurrently and assemble the result only once
    /// all fetches settle. A key that was never set is absent, not an error. For
    /// [`Selector::Defaults`], a key holding nothing (or JSON `null`) takes the caller default.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] when any engine read fails; no partial result is
    /// returned.
    pub async fn get(&self, selector: &Selector) -> Result<StorageItems, StorageError> {
        match selector {
            Selector::All => {
                let entries = self.store.entries().await.map_err(StorageError::Backend)?;
                Ok(entries
                    .into_iter()
                    .map(|(key, value)| (key, Some(value)))
                    .collect())
            }
            Selector::Key(key) => {
                let value = self
                    .store
                    .get_item(key)
                    .await
                    .map_err(StorageError::Backend)?;
                Ok(BTreeMap::from([(key.clone(), value)]))
            }
            Selector::Keys(keys) => {
                let values = self.fetch_all(keys.iter().map(String::as_str)).await?;
                Ok(keys.iter().cloned().zip(values).collect())
            }
            Selector::Defaults(defaults) => {
                let values = self.fetch_all(defaults.keys().map(String::as_str)).await?;
                Ok(defaults
                    .iter()
                    .zip(values)
                    .map(|((key, fallback), stored)| {
                        let value = match stored {
                            None | Some(Value::Null) => fallback.clone(),
                            Some(value) => value,
                        };
                        (key.clone(), Some(value))
                    })
                    .collect())
            }
        }
    }

    async fn fetch_all<'k>(
        &self,
        keys: impl Iterator<Item = &'k str>,
    ) -> Result<Vec<Option<Value>>, StorageError> {
        try_join_all(keys.map(|key| self.store.get_item(key)))
            .await
            .map_err(StorageError::Backend)
    }

    /// Writes every pair in `items` and publishes one event for the keys whose value changed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] on the first failing engine call. Keys written before
    /// the failure are still published.
    pub async fn set(&self, items: &Map<String, Value>) -> Result<(), StorageError> {
        let mut event = ChangeEvent::new();
        let outcome = async {
            for (key, value) in items {
                let old_value = self.store.get_item(key).await?;
                if old_value.as_ref() == Some(value) {
                    continue;
                }
                self.store.set_item(key, value).await?;
                event.insert(
                    key.clone(),
                    StorageChange {
                        old_value,
                        new_value: Some(value.clone()),
                    },
                );
            }
            Ok::<(), String>(())
        }
        .await;
        self.publish(&event);
        outcome.map_err(StorageError::Backend)
    }

    /// Removes `keys` and publishes one event for the keys that held a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] on the first failing engine call. Keys removed before
    /// the failure are still published.
    pub async fn remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut event = ChangeEvent::new();
        let outcome = async {
            for key in keys {
                let Some(old_value) = self.store.get_item(key).await? else {
                    continue;
                };
                self.store.remove_item(key).await?;
                event.insert(
                    key.clone(),
                    StorageChange {
                        old_value: Some(old_value),
                        new_value: None,
                    },
                );
            }
            Ok::<(), String>(())
        }
        .await;
        self.publish(&event);
        outcome.map_err(StorageError::Backend)
    }

    /// Removes every stored pair and publishes one event listing them.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] when the engine fails; nothing is published then.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let entries = self.store.entries().await.map_err(StorageError::Backend)?;
        self.store.clear().await.map_err(StorageError::Backend)?;
        let event: ChangeEvent = entries
            .into_iter()
            .map(|(key, old_value)| {
                let change = StorageChange {
                    old_value: Some(old_value),
                    new_value: None,
                };
                (key, change)
            })
            .collect();
        self.publish(&event);
        Ok(())
    }

    fn publish(&self, event: &ChangeEvent) {
        if !event.is_empty() {
            self.changes.notify(event);
        }
    }

    /// Registers `listener` for every change event published after this call.
    pub fn subscribe(&self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        self.changes.subscribe(listener)
    }

    /// Removes a listener. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }
}

#[derive(Clone)]
/// The `sync`, `local` and `managed` views. All three alias one [`StorageArea`].
pub struct StorageNamespace {
    area: StorageArea,
}

impl StorageNamespace {
    /// Creates a namespace whose views share one area over `store`.
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            area: StorageArea::new(store),
        }
    }

    /// Synced view. Not actually synced; aliases [`Self::local`].
    pub fn sync(&self) -> &StorageArea {
        &self.area
    }

    /// Local view.
    pub fn local(&self) -> &StorageArea {
        &self.area
    }

    /// Managed view. Writable here; aliases [`Self::local`].
    pub fn managed(&self) -> &StorageArea {
        &self.area
    }

    /// Registers `listener` for changes made through any view.
    pub fn on_changed(&self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        self.area.subscribe(listener)
    }

    /// Removes a listener registered with [`Self::on_changed`].
    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.area.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shim_host::MemoryKeyValueStore;

    use super::*;

    fn area() -> (StorageArea, MemoryKeyValueStore) {
        let store = MemoryKeyValueStore::default();
        (StorageArea::new(Rc::new(store.clone())), store)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn recorder(area: &StorageArea) -> Rc<RefCell<Vec<ChangeEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        area.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn get_all_returns_every_stored_pair() {
        let (area, _) = area();
        block_on(area.set(&object(json!({"a": 1, "b": "two"})))).expect("set");

        let items = block_on(area.get(&Selector::All)).expect("get");
        assert_eq!(
            items,
            BTreeMap::from([
                ("a".to_string(), Some(json!(1))),
                ("b".to_string(), Some(json!("two"))),
            ])
        );
    }

    #[test]
    fn get_single_missing_key_is_absent_not_error() {
        let (area, _) = area();
        let items = block_on(area.get(&Selector::from("k"))).expect("get");
        assert_eq!(items, BTreeMap::from([("k".to_string(), None)]));
    }

    #[test]
    fn get_key_list_marks_unset_keys_absent() {
        let (area, _) = area();
        block_on(area.set(&object(json!({"a": 1})))).expect("set");

        let selector = Selector::Keys(vec!["a".to_string(), "b".to_string()]);
        let items = block_on(area.get(&selector)).expect("get");
        assert_eq!(
            items,
            BTreeMap::from([("a".to_string(), Some(json!(1))), ("b".to_string(), None)])
        );
    }

    #[test]
    fn get_defaults_substitutes_only_missing_values() {
        let (area, _) = area();
        let selector = Selector::Defaults(object(json!({"a": "default"})));
        assert_eq!(
            block_on(area.get(&selector)).expect("get"),
            BTreeMap::from([("a".to_string(), Some(json!("default")))])
        );

        block_on(area.set(&object(json!({"a": 5})))).expect("set");
        assert_eq!(
            block_on(area.get(&selector)).expect("get"),
            BTreeMap::from([("a".to_string(), Some(json!(5)))])
        );
    }

    #[test]
    fn empty_selectors_yield_empty_results() {
        let (area, _) = area();
        block_on(area.set(&object(json!({"a": 1})))).expect("set");
        assert!(block_on(area.get(&Selector::Keys(Vec::new())))
            .expect("get")
            .is_empty());
        assert!(block_on(area.get(&Selector::Defaults(Map::new())))
            .expect("get")
            .is_empty());
    }

    #[test]
    fn backend_failure_fails_every_selector_shape() {
        let (area, store) = area();
        store.fail_with("get error");
        let selectors = [
            Selector::All,
            Selector::from("a"),
            Selector::Keys(vec!["a".to_string(), "b".to_string()]),
            Selector::Defaults(object(json!({"a": 1}))),
        ];
        for selector in &selectors {
            assert_eq!(
                block_on(area.get(selector)),
                Err(StorageError::Backend("get error".to_string()))
            );
        }
    }

    #[test]
    fn one_failing_key_fails_the_whole_batch_read() {
        let (area, store) = area();
        block_on(area.set(&object(json!({"ok": 1, "bad": 2})))).expect("set");
        store.fail_key("bad", "sector unreadable");

        let keys = Selector::Keys(vec!["ok".to_string(), "bad".to_string()]);
        assert_eq!(
            block_on(area.get(&keys)),
            Err(StorageError::Backend("sector unreadable".to_string()))
        );
        let defaults = Selector::Defaults(object(json!({"ok": 0, "bad": 0})));
        assert_eq!(
            block_on(area.get(&defaults)),
            Err(StorageError::Backend("sector unreadable".to_string()))
        );

        assert_eq!(
            block_on(area.get(&Selector::from("ok"))).expect("unaffected key"),
            BTreeMap::from([("ok".to_string(), Some(json!(1)))])
        );
    }

    #[test]
    fn set_publishes_one_batched_event_for_changed_keys() {
        let (area, _) = area();
        block_on(area.set(&object(json!({"same": true})))).expect("seed");
        let events = recorder(&area);

        block_on(area.set(&object(json!({"a": 1, "b": 2, "same": true})))).expect("set");

        let expected = BTreeMap::from([
            (
                "a".to_string(),
                StorageChange {
                    old_value: None,
                    new_value: Some(json!(1)),
                },
            ),
            (
                "b".to_string(),
                StorageChange {
                    old_value: None,
                    new_value: Some(json!(2)),
                },
            ),
        ]);
        assert_eq!(*events.borrow(), vec![expected]);
    }

    #[test]
    fn remove_reports_only_keys_that_existed() {
        let (area, _) = area();
        block_on(area.set(&object(json!({"a": 1})))).expect("seed");
        let events = recorder(&area);

        block_on(area.remove(&["a".to_string(), "ghost".to_string()])).expect("remove");
        block_on(area.remove(&["ghost".to_string()])).expect("remove again");

        assert_eq!(
            *events.borrow(),
            vec![BTreeMap::from([(
                "a".to_string(),
                StorageChange {
                    old_value: Some(json!(1)),
                    new_value: None,
                },
            )])]
        );
    }

    #[test]
    fn clear_publishes_every_removed_key() {
        let (area, store) = area();
        block_on(area.set(&object(json!({"a": 1, "b": 2})))).expect("seed");
        let events = recorder(&area);

        block_on(area.clear()).expect("clear");
        assert!(store.is_empty());
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].keys().cloned().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn failed_write_publishes_nothing_and_returns_error() {
        let (area, store) = area();
        let events = recorder(&area);
        store.fail_with("quota exceeded");

        assert_eq!(
            block_on(area.set(&object(json!({"a": 1})))),
            Err(StorageError::Backend("quota exceeded".to_string()))
        );
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn namespace_views_alias_one_area() {
        let namespace = StorageNamespace::new(Rc::new(MemoryKeyValueStore::default()));
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let id = namespace.on_changed(move |_| *sink.borrow_mut() += 1);

        block_on(namespace.sync().set(&object(json!({"k": "v"})))).expect("set");
        assert_eq!(
            block_on(namespace.managed().get(&Selector::from("k"))).expect("get"),
            BTreeMap::from([("k".to_string(), Some(json!("v")))])
        );
        block_on(namespace.local().remove(&["k".to_string()])).expect("remove");

        assert_eq!(*seen.borrow(), 2);
        assert!(namespace.remove_listener(id));
    }
}
