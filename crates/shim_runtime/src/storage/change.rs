//! Change events and the observer registry that relays them.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Transition of one key. `None` means the key did not exist before or after.
pub struct StorageChange {
    /// Value before the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value after the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Every key changed by one mutating operation.
pub type ChangeEvent = BTreeMap<String, StorageChange>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle returned by [`ChangeBus::subscribe`].
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&ChangeEvent)>;

#[derive(Default)]
/// Observer registry owned by a storage area.
///
/// Listeners run synchronously inside [`ChangeBus::notify`]. Events are not replayed to late
/// subscribers.
pub struct ChangeBus {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
}

impl ChangeBus {
    /// Registers `listener` for every event published after this call.
    pub fn subscribe(&self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Delivers `event` to every listener registered when the call starts.
    ///
    /// Listeners may subscribe or unsubscribe while being notified.
    pub fn notify(&self, event: &ChangeEvent) {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
