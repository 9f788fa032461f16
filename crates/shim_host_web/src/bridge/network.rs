use shim_host::{Request, Response};

pub(crate) async fn network_fetch(request: &Request) -> Result<Response, String> {
    super::interop::network_fetch(request).await
}
