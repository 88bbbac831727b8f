//! In-memory slot for embedding and tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::conversation::storage::durable_slot::DurableSlot;

#[derive(Debug, Default)]
struct SlotState {
    contents: Option<String>,
    writes: usize,
}

/// A slot held in process memory.
///
/// Clones share the same document, so a caller can keep a handle to inspect
/// what a store persisted. Failures can be injected to exercise rollback paths.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    state: Arc<Mutex<SlotState>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds a document.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let slot = Self::default();
        if let Ok(mut state) = slot.state.lock() {
            state.contents = Some(contents.into());
        }
        slot
    }

    /// Make subsequent writes and removals fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current document, if any.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.lock().ok().and_then(|state| state.contents.clone())
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().map_or(0, |state| state.writes)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, SlotState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))
    }

    fn check_writable(&self) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "writes disabled on memory slot",
            ));
        }
        Ok(())
    }
}

impl DurableSlot for MemorySlot {
    fn describe(&self) -> String {
        "memory slot".to_string()
    }

    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.lock()?.contents.clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        self.check_writable()?;
        let mut state = self.lock()?;
        state.contents = Some(contents.to_string());
        state.writes += 1;
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        self.check_writable()?;
        self.lock()?.contents = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let slot = MemorySlot::new();
        let handle = slot.clone();
        slot.write("shared").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("shared"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_injected_failure_keeps_previous_contents() {
        let slot = MemorySlot::with_contents("before");
        slot.set_fail_writes(true);

        assert!(slot.write("after").is_err());
        assert!(slot.remove().is_err());
        assert_eq!(slot.contents().as_deref(), Some("before"));

        slot.set_fail_writes(false);
        slot.remove().unwrap();
        assert!(slot.read().unwrap().is_none());
    }
}
