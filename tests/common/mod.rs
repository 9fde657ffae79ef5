//! Shared test utilities: a counter app, a recording page host and a temp
//! config writer.

#![allow(dead_code, unused_imports)]

use mvu_runtime::page::PageHost;
use mvu_runtime::router::{FnRouter, Lens, Router};
use mvu_runtime::{Action, App, Dispatch, ModelView};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

// -- Counter app --------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub count: i64,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[default]
    Home,
    About,
    Item(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Inc,
    Add(i64),
    Goto(Route),
    /// Increments, then dispatches `Inc` from a command.
    IncTwice,
    Fail,
}

pub fn update(msg: Msg, model: &Counter) -> Action<Counter, Msg> {
    match msg {
        Msg::Inc => Action::update_model(|m: Counter| Counter {
            count: m.count + 1,
            ..m
        }),
        Msg::Add(n) => Action::set_model(Counter {
            count: model.count + n,
            ..model.clone()
        }),
        Msg::Goto(route) => Action::set_model(Counter {
            route,
            ..model.clone()
        }),
        Msg::IncTwice => Action::update_model(|m: Counter| Counter {
            count: m.count + 1,
            ..m
        }) + Action::dispatch(Msg::Inc),
        Msg::Fail => Action::command(|_| Err(anyhow::anyhow!("command refused"))),
    }
}

/// Counter app rendering nothing.
pub fn counter_app() -> App<Counter, Msg, ()> {
    App::create(Counter::default, update, |_, _| ())
}

/// Counter app whose update records every message it sees.
pub fn spying_counter_app(seen: Arc<Mutex<Vec<Msg>>>) -> App<Counter, Msg, ()> {
    App::create(
        Counter::default,
        move |msg: Msg, model: &Counter| {
            seen.lock().push(msg.clone());
            update(msg, model)
        },
        |_, _| (),
    )
}

// -- Routing ------------------------------------------------------------------

pub fn parse_route(url: &str) -> Option<Route> {
    match url {
        "/" => Some(Route::Home),
        "/about" => Some(Route::About),
        _ => url
            .strip_prefix("/item/")
            .and_then(|id| id.parse().ok())
            .map(Route::Item),
    }
}

pub fn render_route(route: &Route) -> String {
    match route {
        Route::Home => "/".to_string(),
        Route::About => "/about".to_string(),
        Route::Item(id) => format!("/item/{}", id),
    }
}

pub fn router() -> impl Router<Route> {
    FnRouter::new(parse_route, render_route)
}

pub fn route_lens() -> Lens<Counter, Route> {
    Lens::new(
        |m: &Counter| m.route,
        |route: Route, m: Counter| Counter { route, ..m },
    )
}

// -- Pages --------------------------------------------------------------------

/// Records every lifecycle call as `"<call> <key>"`.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl<K: std::fmt::Debug> PageHost<K, String> for RecordingHost {
    fn attach(&mut self, key: &K, _node: &String, _attrs: &[(String, String)]) {
        self.calls.lock().push(format!("attach {:?}", key));
    }

    fn show(&mut self, key: &K, _node: &String) {
        self.calls.lock().push(format!("show {:?}", key));
    }

    fn hide(&mut self, key: &K, _node: &String) {
        self.calls.lock().push(format!("hide {:?}", key));
    }

    fn detach(&mut self, key: &K, _node: String) {
        self.calls.lock().push(format!("detach {:?}", key));
    }
}

// -- Config -------------------------------------------------------------------

/// Write `content` to a `config.toml` in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

// -- Background work ----------------------------------------------------------

/// Poll `condition` for up to five seconds.
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    condition()
}
