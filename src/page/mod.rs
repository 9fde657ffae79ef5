//! Keyed page instances.
//!
//! A [`Page`] maps endpoint arguments to a key and renders a node for a
//! key; a [`PageCache`] keeps the
//! rendered nodes keyed by identity so that navigating back to a page can
//! reuse its node (and whatever state lives in it) instead of rendering it
//! again.
//!
//! # Invariants
//!
//! 1. Navigating to the active key does nothing: no render, no host call.
//! 2. At most one entry is [`PageStatus::Active`].
//! 3. A key is rendered again only after its entry has been detached.

mod cache;

pub use cache::PageCache;

use crate::dispatch::Dispatch;
use crate::model::ModelView;

type KeyFn<A, K> = Box<dyn Fn(&A) -> K>;
type PageRenderFn<M, Msg, K, N> = Box<dyn Fn(&K, Dispatch<Msg>, ModelView<M>) -> N>;

/// How a page behaves when it stops being the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    /// Attributes applied to the page container when it is attached.
    pub attrs: Vec<(String, String)>,
    /// Hide instead of detaching; the instance is kept indefinitely.
    pub keep_in_dom: bool,
    /// Stay attached after leaving until [`PageCache::transition_ended`].
    pub uses_transition: bool,
}

impl PageOptions {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn keep_in_dom(mut self) -> Self {
        self.keep_in_dom = true;
        self
    }

    pub fn with_transition(mut self) -> Self {
        self.uses_transition = true;
        self
    }
}

/// Lifecycle state of a cached page instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Active,
    /// Hidden but attached, waiting to be shown again.
    HiddenKept,
    /// Leaving; attached until its exit transition ends.
    Detaching,
}

/// Where page nodes live (a DOM container, a terminal layout, ...).
pub trait PageHost<K, N> {
    fn attach(&mut self, key: &K, node: &N, attrs: &[(String, String)]);

    fn show(&mut self, key: &K, node: &N);

    fn hide(&mut self, key: &K, node: &N);

    fn detach(&mut self, key: &K, node: N);
}

/// A page definition: how to key its instances and how to render one.
pub struct Page<M, Msg, A, K, N> {
    key_of: KeyFn<A, K>,
    render: PageRenderFn<M, Msg, K, N>,
    options: PageOptions,
}

impl<M, Msg, A, K, N> Page<M, Msg, A, K, N> {
    /// Instances are keyed by `key_of(args)` and rendered from the key.
    pub fn reactive(
        key_of: impl Fn(&A) -> K + 'static,
        render: impl Fn(&K, Dispatch<Msg>, ModelView<M>) -> N + 'static,
        options: PageOptions,
    ) -> Self {
        Self {
            key_of: Box::new(key_of),
            render: Box::new(render),
            options,
        }
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    /// Bind the page to a running app and a host.
    pub fn mount<H: PageHost<K, N>>(
        self,
        dispatch: Dispatch<Msg>,
        view: ModelView<M>,
        host: H,
    ) -> PageCache<M, Msg, A, K, N, H> {
        PageCache::new(self, dispatch, view, host)
    }
}

impl<M, Msg, A: Clone + 'static, N> Page<M, Msg, A, A, N> {
    /// Instances are keyed by the arguments themselves.
    pub fn create(
        render: impl Fn(&A, Dispatch<Msg>, ModelView<M>) -> N + 'static,
        options: PageOptions,
    ) -> Self {
        Self::reactive(A::clone, render, options)
    }
}

impl<M, Msg, A, N> Page<M, Msg, A, (), N> {
    /// One instance, whatever the arguments.
    pub fn single(
        render: impl Fn(Dispatch<Msg>, ModelView<M>) -> N + 'static,
        options: PageOptions,
    ) -> Self {
        Self::reactive(|_| (), move |_, dispatch, view| render(dispatch, view), options)
    }
}

impl<M, Msg, A, K, N> std::fmt::Debug for Page<M, Msg, A, K, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
