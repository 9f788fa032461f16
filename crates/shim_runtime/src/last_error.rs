//! Process-wide last-error slot for callback-style callers.
//!
//! Core operations return `Result`s and never touch this slot; only the compatibility adapters
//! write to it.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Most recent failure reported to a callback-style caller.
pub struct LastError {
    /// Human-readable failure description.
    pub message: String,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Overwrites the slot with `message`.
pub fn set_last_error(message: impl Into<String>) {
    let message = message.into();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(LastError { message }));
}

/// Returns the most recent failure, if any.
pub fn last_error() -> Option<LastError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Empties the slot.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
