//! Runtime options: how often a plugin's lifecycle hooks may run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-defined lifecycle invocation modes for a plugin entry type.
///
/// The numeric discriminants are the values carried by the plugin entry
/// marker inside a module's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum RuntimeOptions {
    /// Initialized and enabled once; never disabled while the process lives.
    SingleStartInit = 0,
    /// May be enabled and disabled any number of times.
    DynamicInit = 1,
}

impl RuntimeOptions {
    /// Fully qualified type name used by the entry marker argument.
    pub const TYPE_NAME: &'static str = "Hotload.RuntimeOptions";

    /// Returns the raw discriminant.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Whether `disable` may be invoked on plugins with these options.
    pub fn allows_disable(self) -> bool {
        matches!(self, Self::DynamicInit)
    }
}

impl TryFrom<i32> for RuntimeOptions {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SingleStartInit),
            1 => Ok(Self::DynamicInit),
            other => Err(other),
        }
    }
}

impl fmt::Display for RuntimeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleStartInit => write!(f, "SingleStartInit"),
            Self::DynamicInit => write!(f, "DynamicInit"),
        }
    }
}
