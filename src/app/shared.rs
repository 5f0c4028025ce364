//! Cross-context access to the service.
//!
//! The cycle task and a field-bus task both need the service.  Wrapping it
//! in a critical-section mutex guarantees that a register access and a
//! pipeline cycle never interleave.
//!
//! On ESP-IDF the critical section is backed by a `std` mutex (see
//! `esp_link_shims`), so `lock` must only be called from task context,
//! never from an ISR.
//!
//! ```text
//!   cycle task ──┐                         ┌── bus task
//!                └──▶ SharedModule::lock ◀─┘
//!                        (critical section)
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::service::ModuleService;

pub struct SharedModule {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ModuleService>>,
}

impl SharedModule {
    pub const fn new(service: ModuleService) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(service)),
        }
    }

    /// Run `f` with exclusive access to the service.
    ///
    /// Re-entrant calls from inside `f` are a programming error and panic.
    pub fn lock<R>(&self, f: impl FnOnce(&mut ModuleService) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
