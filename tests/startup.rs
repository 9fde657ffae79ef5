//! Init action and init message layers.

mod common;

use common::{counter_app, spying_counter_app, update, Counter, Msg};
use mvu_runtime::layers::INIT_ACTION_LABEL;
use mvu_runtime::{Action, App, DispatchError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Test that the init action is resolved before the first render
#[test]
fn test_init_action_before_render() {
    let rendered_with = Arc::new(Mutex::new(None));
    let out = Arc::clone(&rendered_with);

    let app = App::create(Counter::default, update, move |_, view| {
        *out.lock() = Some(view.get().count);
    })
    .with_init_action(Action::set_model(Counter {
        count: 7,
        ..Counter::default()
    }))
    .run()
    .unwrap();

    assert_eq!(*rendered_with.lock(), Some(7));
    assert_eq!(app.model().count, 7);
}

/// Test that the init message is dispatched exactly once through update
#[test]
fn test_init_message_dispatched_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = spying_counter_app(Arc::clone(&seen))
        .with_init_message(Msg::Add(3))
        .run()
        .unwrap();

    assert_eq!(*seen.lock(), vec![Msg::Add(3)]);
    assert_eq!(app.model().count, 3);

    app.dispatch().send(Msg::Inc).unwrap();
    assert_eq!(*seen.lock(), vec![Msg::Add(3), Msg::Inc]);
}

/// Test that the init action is labelled for post-resolution hooks
#[test]
fn test_init_action_label() {
    let labels = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&labels);

    let _app = counter_app()
        .on_start(move |runtime| {
            runtime.on_resolved(move |resolution| {
                log.lock().push(resolution.origin.label().map(str::to_string));
            });
            Ok(())
        })
        .with_init_action(Action::none())
        .run()
        .unwrap();

    assert_eq!(*labels.lock(), vec![Some(INIT_ACTION_LABEL.to_string())]);
}

/// Test that a failing init action aborts the start
#[test]
fn test_failing_init_action_aborts_run() {
    let result = counter_app()
        .with_init_action(Action::command(|_| Err(anyhow::anyhow!("no backend"))))
        .run();

    match result {
        Err(DispatchError::Command(e)) => assert!(format!("{:#}", e).contains("no backend")),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("run should fail"),
    }
}

/// Test that a failing init message aborts the start
#[test]
fn test_failing_init_message_aborts_run() {
    let result = counter_app().with_init_message(Msg::Fail).run();
    assert!(matches!(result, Err(DispatchError::Command(_))));
}

/// Test that startup layers run in application order
#[test]
fn test_startup_layers_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = spying_counter_app(Arc::clone(&seen))
        .with_init_message(Msg::Add(1))
        .with_init_action(Action::update_model(|m: Counter| Counter {
            count: m.count * 10,
            ..m
        }))
        .with_init_message(Msg::Add(2));
    assert_eq!(app.layers(), &["init_message", "init_action", "init_message"]);

    let running = app.run().unwrap();
    assert_eq!(running.model().count, 12);
    assert_eq!(*seen.lock(), vec![Msg::Add(1), Msg::Add(2)]);
}
