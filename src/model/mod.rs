//! Model cell and its read-only reactive projection.
//!
//! # Invariants
//!
//! 1. The model is replaced wholesale; collaborators never see a partially
//!    written value.
//! 2. Version increments exactly once per write.
//! 3. Subscribers are notified in registration order, after the write lock
//!    has been released.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification.

mod cell;
mod subscription;

pub(crate) use cell::ModelCell;
pub use cell::ModelView;
pub use subscription::Subscription;

/// Marker trait for application state.
///
/// Models should be:
/// - Cheap enough to clone (they are snapshotted for hooks and renderers)
/// - Self-contained (all data needed to render the view)
pub trait Model: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Model for T {}

/// Marker trait for messages.
///
/// Messages represent:
/// - User actions (key presses, clicks)
/// - System events (timers, network results)
/// - Navigation events
pub trait Message: Send + 'static {}

impl<T: Send + 'static> Message for T {}
