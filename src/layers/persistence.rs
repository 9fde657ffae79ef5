use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::{App, AppTransformer};
use crate::error::{ErrorRegistry, RuntimeError};
use crate::model::Model;
use crate::storage::KeyValueStore;

/// Loads the initial model from a key-value store and saves the model
/// after every resolution.
///
/// A missing or unreadable stored value falls back to the wrapped init.
/// Saves are encoded on the dispatching thread and written by a background
/// thread. Save failures are reported to the error registry; dispatch
/// carries on.
pub struct LocalStorage {
    key: String,
    store: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>, store: impl KeyValueStore + 'static) -> Self {
        Self {
            key: key.into(),
            store: Arc::new(store),
        }
    }
}

impl<M, Msg, R> AppTransformer<M, Msg, R> for LocalStorage
where
    M: Model + Serialize + DeserializeOwned,
    Msg: Send + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "local_storage"
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let LocalStorage { key, store } = *self;
        let load_key = key.clone();
        let load_store = Arc::clone(&store);

        app.map_init(move |model| load(load_store.as_ref(), &load_key).unwrap_or(model))
            .on_start(move |runtime| {
                let errors = runtime.errors().clone();
                let writer = Arc::new(Writer::start(key, store, errors.clone()));

                let save_writer = Arc::clone(&writer);
                runtime.on_resolved(move |resolution| {
                    if let Some(encoded) = encode(save_writer.key(), resolution.model, &errors) {
                        save_writer.submit(encoded);
                    }
                });
                runtime.on_teardown(move || writer.close());
                Ok(())
            })
    }
}

#[derive(Default)]
struct Slot {
    pending: Option<String>,
    closed: bool,
}

struct Shared {
    key: String,
    store: Arc<dyn KeyValueStore>,
    errors: ErrorRegistry,
    slot: Mutex<Slot>,
    wake: Condvar,
}

/// Writes snapshots for one key on a dedicated thread.
///
/// At most one snapshot waits; a newer one replaces it. Closing writes the
/// waiting snapshot, then joins the thread.
struct Writer {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
    inline: bool,
}

impl Writer {
    fn start(key: String, store: Arc<dyn KeyValueStore>, errors: ErrorRegistry) -> Self {
        let shared = Arc::new(Shared {
            key,
            store,
            errors,
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
        });

        let loop_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("persist-writer".to_string())
            .spawn(move || writer_loop(&loop_shared));
        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(key = %shared.key, error = %e, "Failed to start persistence writer, saving inline");
                None
            }
        };

        Self {
            shared,
            inline: thread.is_none(),
            thread: Mutex::new(thread),
        }
    }

    fn key(&self) -> &str {
        &self.shared.key
    }

    fn submit(&self, encoded: String) {
        if self.inline {
            self.shared.write(&encoded);
            return;
        }

        let mut slot = self.shared.slot.lock();
        if slot.closed {
            return;
        }
        if slot.pending.replace(encoded).is_some() {
            tracing::trace!(key = %self.shared.key, "Superseded unwritten snapshot");
        }
        self.shared.wake.notify_one();
    }

    fn close(&self) {
        {
            let mut slot = self.shared.slot.lock();
            slot.closed = true;
            self.shared.wake.notify_one();
        }

        let Some(handle) = self.thread.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            tracing::warn!(key = %self.shared.key, "Persistence writer panicked");
        }
    }
}

impl Shared {
    fn write(&self, encoded: &str) {
        if let Err(source) = self.store.set(&self.key, encoded) {
            self.errors.report(&RuntimeError::PersistSave {
                key: self.key.clone(),
                source,
            });
        }
    }
}

fn writer_loop(shared: &Shared) {
    loop {
        let encoded = {
            let mut slot = shared.slot.lock();
            loop {
                if let Some(encoded) = slot.pending.take() {
                    break encoded;
                }
                if slot.closed {
                    tracing::debug!(key = %shared.key, "Persistence writer stopped");
                    return;
                }
                shared.wake.wait(&mut slot);
            }
        };
        shared.write(&encoded);
    }
}

fn load<M: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<M> {
    let Some(raw) = store.get(key) else {
        tracing::debug!(key, "No stored model, using initial model");
        return None;
    };

    match serde_json::from_str(&raw) {
        Ok(model) => {
            tracing::debug!(key, "Restored stored model");
            Some(model)
        }
        Err(e) => {
            tracing::debug!(key, error = %e, "Stored model unreadable, using initial model");
            None
        }
    }
}

fn encode<M: Serialize>(key: &str, model: &M, errors: &ErrorRegistry) -> Option<String> {
    match serde_json::to_string(model) {
        Ok(encoded) => Some(encoded),
        Err(source) => {
            errors.report(&RuntimeError::PersistEncode {
                key: key.to_string(),
                source,
            });
            None
        }
    }
}

impl<M, Msg, R> App<M, Msg, R>
where
    M: Model + Serialize + DeserializeOwned,
    Msg: Send + 'static,
    R: 'static,
{
    /// Persist the model under `key` in `store`.
    pub fn with_local_storage(
        self,
        key: impl Into<String>,
        store: impl KeyValueStore + 'static,
    ) -> Self {
        self.with(LocalStorage::new(key, store))
    }
}
