//! Built-in app layers.
//!
//! Each layer is an [`AppTransformer`](crate::app::AppTransformer) and also
//! has a `with_*` shorthand on [`App`](crate::app::App):
//!
//! | Layer | Shorthand |
//! |---|---|
//! | [`Routing`] | `with_routing`, `with_custom_routing` |
//! | [`LocalStorage`] | `with_local_storage` |
//! | [`InitAction`], [`InitMessage`] | `with_init_action`, `with_init_message` |
//! | [`RemoteDev`] | `with_remote_dev` |

mod devtools;
mod persistence;
mod routing;
mod startup;

pub use devtools::{RemoteDev, INIT_LABEL};
pub use persistence::LocalStorage;
pub use routing::{Routing, ROUTE_CHANGED_LABEL};
pub use startup::{InitAction, InitMessage, INIT_ACTION_LABEL};
