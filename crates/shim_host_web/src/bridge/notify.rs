use shim_host::{NotificationPermission, NotificationRequest};

pub(crate) async fn notification_show(request: &NotificationRequest) -> Result<(), String> {
    super::interop::notification_show(request).await
}

pub(crate) async fn notification_close(tag: &str) -> Result<(), String> {
    super::interop::notification_close(tag).await
}

pub(crate) async fn notification_permission() -> NotificationPermission {
    super::interop::notification_permission().await
}
