//! Machine selection

use r2m2_core::{ArchitectureContext, CoreError, ARCH_ENV_VAR};

/// Where the machine name comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    /// Registered machine name, e.g. `x86_32`
    pub arch: Option<String>,
}

impl PluginConfig {
    /// Read the machine name from `R2M2_ARCH`.
    ///
    /// An unset or non-UTF-8 variable means nothing was selected.
    pub fn from_env() -> Self {
        Self {
            arch: std::env::var(ARCH_ENV_VAR).ok(),
        }
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Validate the selection against the registered machines
    pub fn context(&self) -> Result<ArchitectureContext, CoreError> {
        ArchitectureContext::resolve(self.arch.as_deref())
    }
}
