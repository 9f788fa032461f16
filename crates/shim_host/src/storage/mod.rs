//! Key/value storage engine contracts and adapters.

mod key_value;

pub use key_value::{KeyValueFuture, KeyValueStore, MemoryKeyValueStore};
