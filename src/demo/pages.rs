use std::collections::VecDeque;
use std::time::Instant;

use mvu_runtime::{Dispatch, ModelView, Page, PageCache, PageHost, PageOptions};

use super::counter::{Counter, Msg, Route};

const HOST_LOG: usize = 4;

pub type Pages = PageCache<Counter, Msg, Route, Route, PageNode, TerminalHost>;

/// A rendered page. It lives as long as its cache entry, so `opened` shows
/// whether the instance was reused.
pub struct PageNode {
    pub route: Route,
    pub opened: Instant,
    view: ModelView<Counter>,
}

impl PageNode {
    pub fn lines(&self) -> Vec<String> {
        let age = self.opened.elapsed().as_secs();
        match self.route {
            Route::Counter => {
                let model = self.view.get();
                vec![
                    format!("Count: {}", model.count),
                    format!("Delayed increments in flight: {}", model.pending),
                    String::new(),
                    format!("Page instance opened {}s ago", age),
                ]
            }
            Route::About => vec![
                "A counter running on the MVU runtime.".to_string(),
                format!("Model version: {}", self.view.version()),
                String::new(),
                format!("Page instance opened {}s ago (kept while hidden)", age),
            ],
        }
    }
}

/// Terminal stand-in for a DOM container: tracks the visible page and the
/// last few lifecycle calls.
#[derive(Default)]
pub struct TerminalHost {
    visible: Option<Route>,
    log: VecDeque<String>,
}

impl TerminalHost {
    pub fn visible(&self) -> Option<Route> {
        self.visible
    }

    pub fn log(&self) -> impl Iterator<Item = &String> {
        self.log.iter()
    }

    fn note(&mut self, entry: String) {
        if self.log.len() == HOST_LOG {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }
}

impl PageHost<Route, PageNode> for TerminalHost {
    fn attach(&mut self, key: &Route, _node: &PageNode, attrs: &[(String, String)]) {
        let attrs: Vec<String> = attrs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.visible = Some(*key);
        self.note(format!("attach {} [{}]", key.path(), attrs.join(" ")));
    }

    fn show(&mut self, key: &Route, _node: &PageNode) {
        self.visible = Some(*key);
        self.note(format!("show {}", key.path()));
    }

    fn hide(&mut self, key: &Route, _node: &PageNode) {
        if self.visible == Some(*key) {
            self.visible = None;
        }
        self.note(format!("hide {}", key.path()));
    }

    fn detach(&mut self, key: &Route, _node: PageNode) {
        if self.visible == Some(*key) {
            self.visible = None;
        }
        self.note(format!("detach {}", key.path()));
    }
}

/// Render function of the app: one cached instance per route.
pub fn mount(dispatch: Dispatch<Msg>, view: ModelView<Counter>) -> Pages {
    let page = Page::create(
        |route: &Route, _dispatch: Dispatch<Msg>, view: ModelView<Counter>| PageNode {
            route: *route,
            opened: Instant::now(),
            view,
        },
        PageOptions::default().attr("role", "main").keep_in_dom(),
    );
    page.mount(dispatch, view, TerminalHost::default())
}
