//! Model-View-Update application runtime.
//!
//! ```text
//! Message ──→ update ──→ Action ──→ resolver ──→ ModelCell ──→ ModelView
//!    ↑                      │                                     │
//!    └──── Dispatch ←── commands                       render / PageCache
//! ```
//!
//! - [`app::App`] bundles init, update and render; layers (routing,
//!   persistence, startup actions, devtools) wrap it without touching the
//!   application's update logic.
//! - [`dispatch::Dispatch`] is the only way messages enter a running app.
//!   All model writes are serialized through the dispatch engine.
//! - [`page::PageCache`] keeps rendered page instances keyed by identity.

pub mod action;
pub mod app;
pub mod config;
pub mod devtools;
pub mod dispatch;
pub mod error;
pub mod layers;
pub mod logging;
pub mod model;
pub mod page;
pub mod router;
pub mod storage;

pub use action::Action;
pub use app::{layer, App, AppTransformer, Pipeline, Running};
pub use dispatch::{Dispatch, DispatchState, Origin, Resolution, Runtime, WeakRuntime};
pub use error::{DispatchError, ErrorRegistry, RuntimeError};
pub use model::{Message, Model, ModelView, Subscription};
pub use page::{Page, PageCache, PageHost, PageOptions, PageStatus};
