//! Notification host-service adapter backed by the Web Notifications API.

use shim_host::{
    NotificationFuture, NotificationPermission, NotificationRequest, NotificationService,
};

#[derive(Debug, Clone, Copy, Default)]
/// Browser notification adapter backed by the Web Notifications API.
pub struct WebNotificationService;

impl NotificationService for WebNotificationService {
    fn show<'a>(
        &'a self,
        request: &'a NotificationRequest,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::notification_show(request).await })
    }

    fn close<'a>(&'a self, tag: &'a str) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::notification_close(tag).await })
    }

    fn permission<'a>(&'a self) -> NotificationFuture<'a, NotificationPermission> {
        Box::pin(async move { crate::bridge::notification_permission().await })
    }
}
