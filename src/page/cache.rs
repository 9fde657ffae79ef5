use std::collections::HashMap;
use std::hash::Hash;

use super::{Page, PageHost, PageStatus};
use crate::dispatch::Dispatch;
use crate::model::ModelView;

struct Entry<N> {
    node: N,
    status: PageStatus,
}

/// Rendered instances of one [`Page`], keyed by identity.
pub struct PageCache<M, Msg, A, K, N, H> {
    page: Page<M, Msg, A, K, N>,
    dispatch: Dispatch<Msg>,
    view: ModelView<M>,
    host: H,
    entries: HashMap<K, Entry<N>>,
    active: Option<K>,
    renders: usize,
}

impl<M, Msg, A, K, N, H> PageCache<M, Msg, A, K, N, H> {
    pub(super) fn new(
        page: Page<M, Msg, A, K, N>,
        dispatch: Dispatch<Msg>,
        view: ModelView<M>,
        host: H,
    ) -> Self {
        Self {
            page,
            dispatch,
            view,
            host,
            entries: HashMap::new(),
            active: None,
            renders: 0,
        }
    }
}

impl<M, Msg, A, K, N, H> PageCache<M, Msg, A, K, N, H>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    H: PageHost<K, N>,
{
    /// Make the instance for `args` the active one and return its node.
    ///
    /// Reuses a retained instance when one exists for the key; otherwise
    /// renders and attaches a new one. The previously active instance is
    /// then retired according to the page options.
    pub fn navigate(&mut self, args: &A) -> &N {
        let key = (self.page.key_of)(args);

        if self.active.as_ref() != Some(&key) {
            self.activate(&key);
            if let Some(previous) = self.active.replace(key.clone()) {
                self.retire(previous);
            }
        }

        // `activate` leaves an entry for the active key.
        &self.entries[&key].node
    }

    /// The exit transition of `key` has finished.
    ///
    /// Returns false when `key` was not leaving (it may have been
    /// reactivated in the meantime).
    pub fn transition_ended(&mut self, key: &K) -> bool {
        let leaving = matches!(
            self.entries.get(key).map(|entry| entry.status),
            Some(PageStatus::Detaching)
        );
        if !leaving {
            return false;
        }

        if self.page.options.keep_in_dom {
            if let Some(entry) = self.entries.get_mut(key) {
                self.host.hide(key, &entry.node);
                entry.status = PageStatus::HiddenKept;
            }
        } else if let Some(entry) = self.entries.remove(key) {
            tracing::debug!(key = ?key, "Detaching page after transition");
            self.host.detach(key, entry.node);
        }
        true
    }

    pub fn status(&self, key: &K) -> Option<PageStatus> {
        self.entries.get(key).map(|entry| entry.status)
    }

    pub fn active_key(&self) -> Option<&K> {
        self.active.as_ref()
    }

    pub fn active_node(&self) -> Option<&N> {
        self.active
            .as_ref()
            .and_then(|key| self.entries.get(key))
            .map(|entry| &entry.node)
    }

    /// Number of times the page has been rendered.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Number of instances currently attached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Detach every instance.
    pub fn clear(&mut self) {
        self.active = None;
        for (key, entry) in self.entries.drain() {
            self.host.detach(&key, entry.node);
        }
    }

    fn activate(&mut self, key: &K) {
        if let Some(entry) = self.entries.get_mut(key) {
            tracing::debug!(key = ?key, from = ?entry.status, "Reactivating page");
            entry.status = PageStatus::Active;
            self.host.show(key, &entry.node);
            return;
        }

        let node = (self.page.render)(key, self.dispatch.clone(), self.view.clone());
        self.renders += 1;
        tracing::debug!(key = ?key, renders = self.renders, "Rendered page");
        self.host.attach(key, &node, &self.page.options.attrs);
        self.entries.insert(
            key.clone(),
            Entry {
                node,
                status: PageStatus::Active,
            },
        );
    }

    fn retire(&mut self, key: K) {
        let options = &self.page.options;
        if options.uses_transition {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.status = PageStatus::Detaching;
            }
        } else if options.keep_in_dom {
            if let Some(entry) = self.entries.get_mut(&key) {
                self.host.hide(&key, &entry.node);
                entry.status = PageStatus::HiddenKept;
            }
        } else if let Some(entry) = self.entries.remove(&key) {
            self.host.detach(&key, entry.node);
        }
    }
}

impl<M, Msg, A, K, N, H> std::fmt::Debug for PageCache<M, Msg, A, K, N, H>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("active", &self.active)
            .field("entries", &self.entries.len())
            .field("renders", &self.renders)
            .finish()
    }
}
