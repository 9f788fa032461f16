use super::*;

fn unsupported() -> String {
    "Browser network and storage APIs are only available when compiled for wasm32".to_string()
}

pub async fn cache_open(_cache_name: &str) -> Result<(), String> {
    Ok(())
}

pub async fn cache_match(
    _cache_name: &str,
    _request: &Request,
    _options: MatchOptions,
) -> Result<Option<Response>, String> {
    Ok(None)
}

pub async fn cache_add_all(_cache_name: &str, _locators: &[String]) -> Result<(), String> {
    Ok(())
}

pub async fn cache_keys() -> Result<Vec<String>, String> {
    Ok(Vec::new())
}

pub async fn cache_delete(_cache_name: &str) -> Result<bool, String> {
    Ok(false)
}

pub async fn network_fetch(_request: &Request) -> Result<Response, String> {
    Err(unsupported())
}

pub async fn notification_show(_request: &NotificationRequest) -> Result<(), String> {
    Ok(())
}

pub async fn notification_close(_tag: &str) -> Result<(), String> {
    Ok(())
}

pub async fn notification_permission() -> NotificationPermission {
    NotificationPermission::Denied
}

pub fn register_lifecycle(_handler: Rc<dyn LifecycleHandler>) -> Result<(), String> {
    Ok(())
}
