//! Notification id registry over the host notification service.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use shim_host::{NotificationPermission, NotificationRequest, NotificationService};

use crate::NotificationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Notification layouts callers may request.
pub enum TemplateType {
    /// Title and message.
    #[default]
    Basic,
    /// Item list. Rendered as basic.
    List,
    /// Inline image. Rendered as basic.
    Image,
    /// Progress indicator, rendered as a percentage line in the body.
    Progress,
}

impl TemplateType {
    /// Returns the lowercase template token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::List => "list",
            Self::Image => "image",
            Self::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Contents of a notification.
pub struct NotificationOptions {
    /// Requested layout.
    #[serde(rename = "type", default)]
    pub template: TemplateType,
    /// Icon shown beside the notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Heading.
    #[serde(default)]
    pub title: String,
    /// Main text.
    #[serde(default)]
    pub message: String,
    /// Secondary text appended after a blank line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_message: Option<String>,
    /// Completion percentage for [`TemplateType::Progress`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl NotificationOptions {
    /// Composes the displayed body from the message, context message and progress.
    pub fn body(&self) -> String {
        let mut body = self.message.clone();
        if let Some(context) = self.context_message.as_deref().filter(|c| !c.is_empty()) {
            body.push_str("\n\n");
            body.push_str(context);
        }
        if self.template == TemplateType::Progress {
            body.push_str(&format!("\n\nProgress: {}%", self.progress.unwrap_or(0)));
        }
        body
    }
}

/// Tracks displayed notifications by id.
///
/// Ids are caller supplied or generated from a counter. Clones share the registry.
#[derive(Clone)]
pub struct NotificationCenter {
    service: Rc<dyn NotificationService>,
    active: Rc<RefCell<BTreeMap<String, NotificationOptions>>>,
    next_id: Rc<Cell<u64>>,
}

impl NotificationCenter {
    /// Creates an empty registry over `service`.
    pub fn new(service: Rc<dyn NotificationService>) -> Self {
        Self {
            service,
            active: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    fn generate_id(&self) -> String {
        loop {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let candidate = id.to_string();
            if !self.active.borrow().contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Displays a notification and returns its id.
    ///
    /// An existing notification with the same id is cleared first. Templates other than basic
    /// and progress are shown as basic.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Dispatch`] when the host refuses to display it.
    pub async fn create(
        &self,
        id: Option<&str>,
        options: NotificationOptions,
    ) -> Result<String, NotificationError> {
        let id = match id {
            Some(id) => {
                if self.active.borrow().contains_key(id) {
                    self.clear(id).await;
                }
                id.to_string()
            }
            None => self.generate_id(),
        };

        if !matches!(options.template, TemplateType::Basic | TemplateType::Progress) {
            leptos::logging::warn!(
                "notification type `{}` not supported; falling back to basic",
                options.template.as_str()
            );
        }

        let request = NotificationRequest {
            tag: id.clone(),
            title: options.title.clone(),
            body: options.body(),
            icon_url: options.icon_url.clone(),
        };
        self.service
            .show(&request)
            .await
            .map_err(NotificationError::Dispatch)?;
        self.active.borrow_mut().insert(id.clone(), options);
        Ok(id)
    }

    /// Closes the notification with `id`.
    ///
    /// Returns `false` when `id` is unknown, so a repeated call is harmless.
    pub async fn clear(&self, id: &str) -> bool {
        if self.active.borrow_mut().remove(id).is_none() {
            return false;
        }
        match self.service.close(id).await {
            Ok(()) => true,
            Err(err) => {
                leptos::logging::warn!("closing notification `{id}` failed: {err}");
                false
            }
        }
    }

    /// Returns every active id mapped to `true`.
    pub fn get_all(&self) -> BTreeMap<String, bool> {
        self.active
            .borrow()
            .keys()
            .map(|id| (id.clone(), true))
            .collect()
    }

    /// Returns whether the host lets this app show notifications.
    pub async fn permission_level(&self) -> NotificationPermission {
        self.service.permission().await
    }
}
