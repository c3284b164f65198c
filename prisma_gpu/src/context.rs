/// Context - the connection to one graphics backend
///
/// Owns the backend behind a mutex plus the single "current program"
/// slot the driver enforces. The slot lives here, not in ambient global
/// state, so tests can run several independent contexts side by side;
/// a program's bound-ness is always derived from this slot, which is
/// what keeps "bind B while A is bound" consistent without any
/// cross-program bookkeeping.
///
/// Lock order: the program slot before the backend, everywhere.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{Backend, BackendCaps, BackendInfo, BackendLimits, ProgramHandle};
use crate::error::Result;
use crate::{gpu_bail, gpu_info};

pub struct Context {
    backend: Mutex<Box<dyn Backend>>,
    current_program: Mutex<Option<ProgramHandle>>,
}

impl Context {
    /// Wrap a backend connection
    ///
    /// Logs the driver identification the way the original config layer
    /// reported hardware info.
    pub fn new(backend: Box<dyn Backend>) -> Arc<Self> {
        let info = backend.info();
        gpu_info!("prisma::Context", "Graphics backend: {} | {} | {}",
            info.vendor, info.renderer, info.version);

        Arc::new(Self {
            backend: Mutex::new(backend),
            current_program: Mutex::new(None),
        })
    }

    // ===== HARDWARE QUERIES =====

    /// Vendor / renderer / version strings from the driver
    pub fn hardware_info(&self) -> BackendInfo {
        self.backend().info()
    }

    /// Capability flags probed at backend creation
    pub fn capabilities(&self) -> BackendCaps {
        self.backend().capabilities()
    }

    /// Driver-reported resource limits
    pub fn limits(&self) -> BackendLimits {
        self.backend().limits()
    }

    /// Whether the driver advertises the named extension
    pub fn has_extension(&self, name: &str) -> bool {
        self.backend().has_extension(name)
    }

    /// Ensure the named extension is supported
    ///
    /// # Errors
    ///
    /// `Error::HardwareSupport` if the extension is missing.
    pub fn require_extension(&self, name: &str) -> Result<()> {
        if !self.has_extension(name) {
            gpu_bail!("prisma::Context", HardwareSupport, "the {} extension", name);
        }
        Ok(())
    }

    // ===== PROGRAM SLOT =====

    /// Handle of the program currently occupying the active slot
    pub fn current_program(&self) -> Option<ProgramHandle> {
        *self.current_program.lock().unwrap()
    }

    /// Exclusive access to the active-program slot
    pub(crate) fn program_slot(&self) -> MutexGuard<'_, Option<ProgramHandle>> {
        self.current_program.lock().unwrap()
    }

    /// Exclusive access to the backend
    pub(crate) fn backend(&self) -> MutexGuard<'_, Box<dyn Backend>> {
        self.backend.lock().unwrap()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
