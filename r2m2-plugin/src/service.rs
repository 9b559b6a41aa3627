//! Process-wide bridge service
//!
//! [`R2m2`] owns the cached [`ArchitectureContext`]. The machine is resolved
//! lazily on the first decode or encode call and kept for the life of the
//! service; failed resolutions are not cached, so a later call may still
//! succeed once a machine is selected.

use std::sync::OnceLock;

use r2m2_assembler::{assemble_op, AsmOp, AssemblerError};
use r2m2_core::{available_machines, ArchitectureContext, CoreError};
use r2m2_disassembler::{disassemble_op, DisasmOp};
use crate::config::PluginConfig;

pub struct R2m2 {
    /// Fixed selection; `None` reads the environment on each attempt
    config: Option<PluginConfig>,
    machine: OnceLock<ArchitectureContext>,
}

impl R2m2 {
    /// A service that selects its machine from `R2M2_ARCH`
    pub const fn new() -> Self {
        Self {
            config: None,
            machine: OnceLock::new(),
        }
    }

    /// A service with a fixed selection
    pub fn with_config(config: PluginConfig) -> Self {
        Self {
            config: Some(config),
            machine: OnceLock::new(),
        }
    }

    /// The cached context, resolving it on first use.
    ///
    /// Once a context is cached the selection is no longer consulted.
    pub fn context(&self) -> Result<&ArchitectureContext, CoreError> {
        if let Some(ctx) = self.machine.get() {
            return Ok(ctx);
        }
        let resolved = match &self.config {
            Some(config) => config.context()?,
            None => PluginConfig::from_env().context()?,
        };
        // A concurrent first call may have won; its context is kept
        Ok(self.machine.get_or_init(|| resolved))
    }

    /// The cached context, if one was resolved
    pub fn cached(&self) -> Option<&ArchitectureContext> {
        self.machine.get()
    }

    fn current(&self) -> Option<&ArchitectureContext> {
        match self.context() {
            Ok(ctx) => Some(ctx),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    available = ?available_machines(),
                    "no usable machine; call left as a no-op"
                );
                None
            }
        }
    }

    /// Decode one instruction; `None` when no machine can be selected
    pub fn disassemble(&self, address: u64, bytes: &[u8]) -> Option<DisasmOp> {
        disassemble_op(self.current(), address, bytes)
    }

    /// Encode one instruction; `Ok(None)` when no machine can be selected
    pub fn assemble(&self, address: u64, text: &str) -> Result<Option<AsmOp>, AssemblerError> {
        assemble_op(self.current(), address, text)
    }
}

impl Default for R2m2 {
    fn default() -> Self {
        Self::new()
    }
}
