//! Terminal counter built on the runtime.

pub mod counter;
pub mod pages;
mod render;
mod terminal;

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use mvu_runtime::devtools::MemoryDevtools;
use mvu_runtime::router::{Location, MemoryLocation};
use mvu_runtime::Running;

use counter::{Counter, Msg};
use pages::Pages;
use render::Status;

const TICK: Duration = Duration::from_millis(100);

pub type DemoApp = Running<Counter, Msg, Pages>;

/// Draw and handle keys until the user quits.
pub fn run(
    running: &mut DemoApp,
    location: &MemoryLocation,
    devtools: &MemoryDevtools,
) -> anyhow::Result<()> {
    let (mut terminal, guard) = terminal::setup_terminal()?;
    let dispatch = running.dispatch();
    let mut travel: Option<usize> = None;

    loop {
        let model = running.model();
        running.view_mut().navigate(&model.route);

        let history = devtools.entries().len();
        let status = Status {
            url: location.current(),
            history,
            travel,
            errors: running.runtime().errors().len(),
        };
        terminal.draw(|frame| render::draw(frame, &model, running.view(), &status))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let msg = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('+') | KeyCode::Up => Msg::Increment,
            KeyCode::Char('-') | KeyCode::Down => Msg::Decrement,
            KeyCode::Char('l') => Msg::IncrementLater,
            KeyCode::Char('r') => Msg::Reset,
            KeyCode::Tab => Msg::Navigate(model.route.next()),
            KeyCode::Char('a') => {
                travel = None;
                location.navigate_external(model.route.next().path());
                continue;
            }
            KeyCode::Char('u') => {
                let target = travel
                    .unwrap_or_else(|| history.saturating_sub(1))
                    .saturating_sub(1);
                if devtools.jump_to(target) {
                    travel = Some(target);
                }
                continue;
            }
            _ => continue,
        };

        travel = None;
        if let Err(e) = dispatch.send(msg) {
            tracing::warn!(error = %e, "Dispatch failed");
        }
    }

    drop(guard);
    Ok(())
}
