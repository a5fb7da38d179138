//! Plugin executor: drives one plugin's lifecycle inside a wasmtime store.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use wasmtime::{Instance, Linker, Store};

use crate::error::HostError;
use crate::metadata::PluginMetadata;

/// Lifecycle hook export suffixes.
pub mod hooks {
    /// Runs once after instantiation.
    pub const INIT: &str = "init";
    /// Runs on every enable.
    pub const ON_ENABLE: &str = "on_enable";
    /// Runs on disable (dynamic plugins only).
    pub const ON_DISABLE: &str = "on_disable";
    /// Runs whenever the scene lifecycle (re)starts.
    pub const ON_SCENE_START: &str = "on_scene_start";
}

/// Special execution behavior requested when constructing an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// Regular plugin; all lifecycle hooks run.
    None,
    /// Instantiate only; lifecycle hooks are skipped.
    Bare,
}

/// Lifecycle state of an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Constructed, not yet instantiated.
    Constructed,
    /// Instantiated and initialized.
    Created,
    /// Enabled.
    Enabled,
    /// Disabled after having been enabled.
    Disabled,
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructed => write!(f, "constructed"),
            Self::Created => write!(f, "created"),
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Host-native wrapper around a plugin record.
pub struct PluginExecutor {
    metadata: Arc<PluginMetadata>,
    special: Special,
    fuel_per_hook: u64,
    runtime: Option<(Store<()>, Instance)>,
    state: ExecutorState,
    enable_count: u32,
}

impl PluginExecutor {
    /// Binds an executor to a metadata record. Nothing is instantiated yet.
    pub fn new(metadata: Arc<PluginMetadata>, special: Special, fuel_per_hook: u64) -> Self {
        Self {
            metadata,
            special,
            fuel_per_hook,
            runtime: None,
            state: ExecutorState::Constructed,
            enable_count: 0,
        }
    }

    /// The record this executor runs.
    pub fn metadata(&self) -> &Arc<PluginMetadata> {
        &self.metadata
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Instantiates the module and runs the entry type's `init` hook.
    pub fn create(&mut self) -> Result<(), HostError> {
        self.expect_state("create", &[ExecutorState::Constructed])?;

        let plugin = self.metadata.id().to_string();
        let (store, instance) = self
            .instantiate()
            .map_err(|source| HostError::Instantiate {
                plugin: plugin.clone(),
                source,
            })?;

        self.runtime = Some((store, instance));
        self.state = ExecutorState::Created;

        self.call_hook(hooks::INIT)?;

        info!(
            plugin_id = %plugin,
            entry_type = %self.metadata.plugin_type,
            "Plugin created"
        );
        Ok(())
    }

    /// Runs the `on_enable` hook.
    ///
    /// `SingleStartInit` plugins may be enabled exactly once.
    pub fn enable(&mut self) -> Result<(), HostError> {
        self.expect_state("enable", &[ExecutorState::Created, ExecutorState::Disabled])?;
        if self.enable_count > 0 && !self.metadata.runtime_options.allows_disable() {
            return Err(self.invalid("enable"));
        }

        self.call_hook(hooks::ON_ENABLE)?;
        self.enable_count += 1;
        self.state = ExecutorState::Enabled;

        info!(plugin_id = %self.metadata.id(), "Plugin enabled");
        Ok(())
    }

    /// Runs the `on_disable` hook. Only `DynamicInit` plugins can be disabled.
    pub fn disable(&mut self) -> Result<(), HostError> {
        self.expect_state("disable", &[ExecutorState::Enabled])?;
        if !self.metadata.runtime_options.allows_disable() {
            return Err(self.invalid("disable"));
        }

        self.call_hook(hooks::ON_DISABLE)?;
        self.state = ExecutorState::Disabled;

        info!(plugin_id = %self.metadata.id(), "Plugin disabled");
        Ok(())
    }

    /// Runs the `on_scene_start` hook if the plugin is enabled.
    ///
    /// Returns whether the hook was exported and ran.
    pub fn scene_start(&mut self) -> Result<bool, HostError> {
        if self.state != ExecutorState::Enabled {
            return Ok(false);
        }
        self.call_hook(hooks::ON_SCENE_START)
    }

    /// Fresh store and instance; imports the host does not provide trap when called.
    fn instantiate(&self) -> wasmtime::Result<(Store<()>, Instance)> {
        let module = &self.metadata.module;
        let mut store = Store::new(module.engine(), ());
        store.set_fuel(self.fuel_per_hook)?;

        let mut linker: Linker<()> = Linker::new(module.engine());
        linker.define_unknown_imports_as_traps(module)?;
        let instance = linker.instantiate(&mut store, module)?;
        Ok((store, instance))
    }

    /// Calls `<entry type>.<hook>` with fresh fuel. Absent exports are skipped.
    fn call_hook(&mut self, hook: &'static str) -> Result<bool, HostError> {
        if self.special == Special::Bare {
            return Ok(false);
        }

        let export = self.metadata.hook_export(hook);
        let plugin = self.metadata.id().to_string();
        let state = self.state;
        let Some((store, instance)) = self.runtime.as_mut() else {
            return Err(HostError::InvalidState {
                plugin,
                operation: "run hooks",
                state,
            });
        };

        let Some(func) = instance.get_func(&mut *store, &export) else {
            debug!(plugin_id = %plugin, export = %export, "Hook not exported, skipping");
            return Ok(false);
        };

        store
            .set_fuel(self.fuel_per_hook)
            .and_then(|_| func.typed::<(), ()>(&*store))
            .and_then(|typed| typed.call(&mut *store, ()))
            .map_err(|source| HostError::Hook {
                plugin,
                hook,
                source,
            })?;

        debug!(plugin_id = %self.metadata.id(), export = %export, "Hook completed");
        Ok(true)
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[ExecutorState],
    ) -> Result<(), HostError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> HostError {
        HostError::InvalidState {
            plugin: self.metadata.id().to_string(),
            operation,
            state: self.state,
        }
    }
}

impl fmt::Debug for PluginExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginExecutor")
            .field("plugin_id", &self.metadata.id())
            .field("plugin_type", &self.metadata.plugin_type)
            .field("special", &self.special)
            .field("state", &self.state)
            .finish()
    }
}
