//! URL routing collaborators.
//!
//! The routing layer needs three things: a [`Router`] that converts between
//! URLs and a route type, a [`Location`] that holds the current URL and
//! reports external navigation, and a [`Lens`] that reads and writes the
//! route inside the model.

mod lens;
mod location;

pub use lens::Lens;
pub use location::{Location, MemoryLocation};

/// Converts between URLs and routes.
pub trait Router<Route>: Send + Sync {
    /// `None` when `url` matches no route.
    fn parse(&self, url: &str) -> Option<Route>;

    fn render(&self, route: &Route) -> String;
}

/// Router built from a parse and a render closure.
pub struct FnRouter<P, Rn> {
    parse: P,
    render: Rn,
}

impl<P, Rn> FnRouter<P, Rn> {
    pub fn new(parse: P, render: Rn) -> Self {
        Self { parse, render }
    }
}

impl<Route, P, Rn> Router<Route> for FnRouter<P, Rn>
where
    P: Fn(&str) -> Option<Route> + Send + Sync,
    Rn: Fn(&Route) -> String + Send + Sync,
{
    fn parse(&self, url: &str) -> Option<Route> {
        (self.parse)(url)
    }

    fn render(&self, route: &Route) -> String {
        (self.render)(route)
    }
}
