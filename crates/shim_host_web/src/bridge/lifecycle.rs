use std::rc::Rc;

use shim_host::LifecycleHandler;

pub(crate) fn register_lifecycle(handler: Rc<dyn LifecycleHandler>) -> Result<(), String> {
    super::interop::register_lifecycle(handler)
}
