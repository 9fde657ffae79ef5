use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{DevtoolsConnection, DevtoolsError, JumpHandler};

/// One mirrored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DevtoolsEntry {
    pub label: String,
    pub snapshot: serde_json::Value,
}

#[derive(Default)]
struct DevtoolsInner {
    entries: Mutex<Vec<DevtoolsEntry>>,
    jump: Mutex<Option<Arc<dyn Fn(usize) + Send + Sync>>>,
    offline: AtomicBool,
}

/// In-process devtools: records what it is sent and lets the caller jump.
///
/// Cloning shares the same recording.
#[derive(Clone, Default)]
pub struct MemoryDevtools {
    inner: Arc<DevtoolsInner>,
}

impl MemoryDevtools {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection whose every call fails.
    pub fn offline() -> Self {
        let devtools = Self::new();
        devtools.set_offline(true);
        devtools
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<DevtoolsEntry> {
        self.inner.entries.lock().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.inner
            .entries
            .lock()
            .iter()
            .map(|entry| entry.label.clone())
            .collect()
    }

    /// Ask the app to restore snapshot `index`. Returns false when no
    /// handler is registered.
    pub fn jump_to(&self, index: usize) -> bool {
        let handler = self.inner.jump.lock().clone();
        match handler {
            Some(handler) => {
                handler(index);
                true
            }
            None => false,
        }
    }

    fn check_online(&self) -> Result<(), DevtoolsError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(DevtoolsError::Unavailable("memory devtools offline".to_string()));
        }
        Ok(())
    }
}

impl DevtoolsConnection for MemoryDevtools {
    fn send(&self, label: &str, snapshot: &serde_json::Value) -> Result<(), DevtoolsError> {
        self.check_online().map_err(|e| DevtoolsError::Send {
            label: label.to_string(),
            message: e.to_string(),
        })?;
        self.inner.entries.lock().push(DevtoolsEntry {
            label: label.to_string(),
            snapshot: snapshot.clone(),
        });
        Ok(())
    }

    fn on_jump(&self, handler: JumpHandler) -> Result<(), DevtoolsError> {
        self.check_online()?;
        *self.inner.jump.lock() = Some(Arc::from(handler));
        Ok(())
    }
}

impl std::fmt::Debug for MemoryDevtools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDevtools")
            .field("entries", &self.inner.entries.lock().len())
            .field("offline", &self.inner.offline.load(Ordering::SeqCst))
            .finish()
    }
}
