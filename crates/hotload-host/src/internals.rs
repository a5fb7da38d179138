//! Raw access to host-owned state.
//!
//! Nothing here is a stable contract. Callers take on a dependency on the
//! executor list remaining a homogeneous, appendable `Vec` guarded by a
//! single mutex, and on the list only existing after startup.

use parking_lot::Mutex;

use crate::executor::PluginExecutor;
use crate::manager::PluginManager;

/// The manager's internal executor list, or `None` before startup.
#[doc(hidden)]
pub fn plugin_list(manager: &PluginManager) -> Option<&Mutex<Vec<PluginExecutor>>> {
    manager.plugins.get()
}
