use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::Action;
use crate::app::{App, AppTransformer};
use crate::model::Model;
use crate::router::{Lens, Location, Router};

/// Label of resolutions caused by external navigation.
pub const ROUTE_CHANGED_LABEL: &str = "RouteChanged";

/// Keeps a route stored in the model in sync with a [`Location`].
///
/// - At init, the current URL is parsed and written into the model. Once
///   started, the URL is replaced if it does not match the model's route.
/// - After every resolution that changes the route, the rendered URL is
///   pushed to the location.
/// - External navigation resolves an update writing the new route, without
///   pushing it back.
pub struct Routing<M, Route> {
    router: Arc<dyn Router<Route>>,
    location: Arc<dyn Location>,
    lens: Lens<M, Route>,
}

impl<M, Route> Routing<M, Route> {
    pub fn new(
        router: impl Router<Route> + 'static,
        location: impl Location + 'static,
        lens: Lens<M, Route>,
    ) -> Self {
        Self {
            router: Arc::new(router),
            location: Arc::new(location),
            lens,
        }
    }
}

impl<M, Msg, R, Route> AppTransformer<M, Msg, R> for Routing<M, Route>
where
    M: Model,
    Msg: Send + 'static,
    R: 'static,
    Route: Clone + PartialEq + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "routing"
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let Routing {
            router,
            location,
            lens,
        } = *self;

        let init_router = Arc::clone(&router);
        let init_location = Arc::clone(&location);
        let init_lens = lens.clone();

        app.map_init(move |model| {
            let url = init_location.current();
            match init_router.parse(&url) {
                Some(route) => init_lens.set(route, model),
                None => {
                    tracing::debug!(url = %url, "Initial URL matches no route");
                    model
                }
            }
        })
        .on_start(move |runtime| {
            let initial = lens.get(&runtime.model());
            let initial_url = router.render(&initial);
            if initial_url != location.current() {
                tracing::debug!(url = %initial_url, "Initial route differs from URL, pushing");
                location.push(&initial_url);
            }
            let known = Arc::new(Mutex::new(initial));

            let push_known = Arc::clone(&known);
            let push_lens = lens.clone();
            let push_router = Arc::clone(&router);
            let push_location = Arc::clone(&location);
            runtime.on_resolved(move |resolution| {
                let route = push_lens.get(resolution.model);
                {
                    let mut known = push_known.lock();
                    if *known == route {
                        return;
                    }
                    *known = route.clone();
                }
                let url = push_router.render(&route);
                tracing::debug!(url = %url, depth = resolution.depth, "Route changed, pushing URL");
                push_location.push(&url);
            });

            let weak = runtime.downgrade();
            let subscription = location.subscribe(Box::new(move |url: &str| {
                let Some(runtime) = weak.upgrade() else {
                    return;
                };
                let Some(route) = router.parse(url) else {
                    tracing::debug!(url, "External URL matches no route");
                    return;
                };

                let lens = lens.clone();
                let known = Arc::clone(&known);
                let action = Action::update_model(move |model: M| {
                    *known.lock() = route.clone();
                    lens.set(route, model)
                });
                if let Err(e) = runtime.resolve_labeled(action, ROUTE_CHANGED_LABEL) {
                    tracing::warn!(url, error = %e, "Route change failed");
                }
            }));
            runtime.on_teardown(move || drop(subscription));
            Ok(())
        })
    }
}

impl<M: Model, Msg: Send + 'static, R: 'static> App<M, Msg, R> {
    /// Sync the route at `lens` with `location`.
    pub fn with_routing<Route>(
        self,
        router: impl Router<Route> + 'static,
        location: impl Location + 'static,
        lens: Lens<M, Route>,
    ) -> Self
    where
        Route: Clone + PartialEq + Send + Sync + 'static,
    {
        self.with(Routing::new(router, location, lens))
    }

    /// [`App::with_routing`] with the lens given as a getter and a setter.
    ///
    /// `get(&set(route, model))` must equal `route`.
    pub fn with_custom_routing<Route>(
        self,
        router: impl Router<Route> + 'static,
        location: impl Location + 'static,
        get: impl Fn(&M) -> Route + Send + Sync + 'static,
        set: impl Fn(Route, M) -> M + Send + Sync + 'static,
    ) -> Self
    where
        Route: Clone + PartialEq + Send + Sync + 'static,
    {
        self.with_routing(router, location, Lens::new(get, set))
    }
}
