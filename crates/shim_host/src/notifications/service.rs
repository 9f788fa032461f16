//! Notification service contracts and adapters.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`NotificationService`].
pub type NotificationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Whether the host lets the app show notifications.
pub enum NotificationPermission {
    /// Notifications may be shown.
    Granted,
    /// Notifications are blocked or permission was never granted.
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Rendered notification handed to the host.
pub struct NotificationRequest {
    /// Identifier used by the host to replace or close the notification.
    pub tag: String,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Optional icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Host service for user-visible notifications.
pub trait NotificationService {
    /// Displays a notification.
    fn show<'a>(
        &'a self,
        request: &'a NotificationRequest,
    ) -> NotificationFuture<'a, Result<(), String>>;

    /// Closes the notification identified by `tag`.
    fn close<'a>(&'a self, tag: &'a str) -> NotificationFuture<'a, Result<(), String>>;

    /// Reports the current permission level.
    fn permission<'a>(&'a self) -> NotificationFuture<'a, NotificationPermission>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op notification service for unsupported targets.
pub struct NoopNotificationService;

impl NotificationService for NoopNotificationService {
    fn show<'a>(
        &'a self,
        _request: &'a NotificationRequest,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn close<'a>(&'a self, _tag: &'a str) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn permission<'a>(&'a self) -> NotificationFuture<'a, NotificationPermission> {
        Box::pin(async { NotificationPermission::Denied })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory notification service recording everything shown and closed.
pub struct MemoryNotificationService {
    shown: Rc<RefCell<Vec<NotificationRequest>>>,
    closed: Rc<RefCell<Vec<String>>>,
}

impl MemoryNotificationService {
    /// Returns every notification shown so far.
    pub fn shown(&self) -> Vec<NotificationRequest> {
        self.shown.borrow().clone()
    }

    /// Returns every tag closed so far.
    pub fn closed(&self) -> Vec<String> {
        self.closed.borrow().clone()
    }
}

impl NotificationService for MemoryNotificationService {
    fn show<'a>(
        &'a self,
        request: &'a NotificationRequest,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.shown.borrow_mut().push(request.clone());
            Ok(())
        })
    }

    fn close<'a>(&'a self, tag: &'a str) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.closed.borrow_mut().push(tag.to_string());
            Ok(())
        })
    }

    fn permission<'a>(&'a self) -> NotificationFuture<'a, NotificationPermission> {
        Box::pin(async { NotificationPermission::Granted })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn memory_notification_service_records_show_and_close() {
        let service = MemoryNotificationService::default();
        let service_obj: &dyn NotificationService = &service;
        let request = NotificationRequest {
            tag: "n1".to_string(),
            title: "Title".to_string(),
            body: "Body".to_string(),
            icon_url: None,
        };

        block_on(service_obj.show(&request)).expect("show");
        block_on(service_obj.close("n1")).expect("close");
        assert_eq!(service.shown(), vec![request]);
        assert_eq!(service.closed(), vec!["n1".to_string()]);
        assert_eq!(
            block_on(service_obj.permission()),
            NotificationPermission::Granted
        );
    }

    #[test]
    fn noop_notification_service_denies_permission() {
        assert_eq!(
            block_on(NoopNotificationService.permission()),
            NotificationPermission::Denied
        );
    }
}
