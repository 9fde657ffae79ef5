use std::time::Duration;

use mvu_runtime::router::{FnRouter, Lens, Router};
use mvu_runtime::Action;
use serde::{Deserialize, Serialize};

const DELAY: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Route {
    #[default]
    Counter,
    About,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Counter => "/counter",
            Route::About => "/about",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Counter => "Counter",
            Route::About => "About",
        }
    }

    pub fn next(self) -> Route {
        match self {
            Route::Counter => Route::About,
            Route::About => Route::Counter,
        }
    }

    fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" | "/counter" => Some(Route::Counter),
            "/about" => Some(Route::About),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub count: i64,
    pub route: Route,
    /// Delayed increments still in flight.
    #[serde(skip)]
    pub pending: u32,
}

#[derive(Debug, Clone)]
pub enum Msg {
    Increment,
    Decrement,
    IncrementLater,
    DelayedIncrement,
    Reset,
    Navigate(Route),
}

pub fn update(msg: Msg, model: &Counter) -> Action<Counter, Msg> {
    match msg {
        Msg::Increment => Action::set_model(Counter {
            count: model.count + 1,
            ..model.clone()
        }),
        Msg::Decrement => Action::set_model(Counter {
            count: model.count - 1,
            ..model.clone()
        }),
        Msg::IncrementLater => {
            Action::update_model(|m: Counter| Counter {
                pending: m.pending + 1,
                ..m
            }) + Action::command_async(|dispatch| async move {
                tokio::time::sleep(DELAY).await;
                dispatch.send(Msg::DelayedIncrement)?;
                Ok::<(), anyhow::Error>(())
            })
        }
        Msg::DelayedIncrement => Action::update_model(|m: Counter| Counter {
            count: m.count + 1,
            pending: m.pending.saturating_sub(1),
            ..m
        }),
        Msg::Reset => Action::set_model(Counter {
            route: model.route,
            ..Counter::default()
        }),
        Msg::Navigate(route) if route == model.route => Action::none(),
        Msg::Navigate(route) => Action::set_model(Counter {
            route,
            ..model.clone()
        }),
    }
}

pub fn router() -> impl Router<Route> {
    FnRouter::new(Route::from_path, |route: &Route| route.path().to_string())
}

pub fn route_lens() -> Lens<Counter, Route> {
    Lens::new(|m: &Counter| m.route, |route: Route, m: Counter| Counter { route, ..m })
}
