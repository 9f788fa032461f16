//! Key/value storage facade: selector reads, batched writes and change relay.

mod area;
mod change;
pub mod compat;
mod selector;

pub use area::{StorageArea, StorageItems, StorageNamespace};
pub use change::{ChangeBus, ChangeEvent, StorageChange, SubscriptionId};
pub use selector::Selector;
