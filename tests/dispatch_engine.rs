//! Dispatch engine behaviour: nesting, failures, teardown, serialization and
//! async commands.

mod common;

use common::{counter_app, spying_counter_app, Counter, Msg};
use mvu_runtime::{Action, Dispatch, DispatchError, DispatchState, Origin};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Poll `cond` until it holds or a second has passed.
async fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

/// Test that a dispatch from a command completes before the outer resolution continues
#[test]
fn test_nested_dispatch_is_depth_first() {
    let app = counter_app().run().unwrap();
    let depths = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&depths);
    app.runtime()
        .on_resolved(move |resolution| log.lock().push((resolution.depth, resolution.model.count)));

    app.dispatch().send(Msg::IncTwice).unwrap();

    assert_eq!(app.model().count, 2);
    assert_eq!(*depths.lock(), vec![(2, 2), (1, 2)]);
}

/// Test that work after a nested dispatch sees the nested result
#[test]
fn test_outer_resolution_resumes_after_nested() {
    let app = counter_app().run().unwrap();

    let action = Action::dispatch(Msg::Add(10))
        + Action::update_model(|m: Counter| Counter {
            count: m.count * 2,
            ..m
        });
    app.runtime().resolve(action).unwrap();

    assert_eq!(app.model().count, 20);
}

/// Test that the engine reports Dispatching while a command runs
#[test]
fn test_state_is_dispatching_inside_command() {
    let app = counter_app().run().unwrap();
    assert_eq!(app.runtime().state(), DispatchState::Idle);

    let runtime = app.runtime().clone();
    let observed = Arc::new(Mutex::new(None));
    let out = Arc::clone(&observed);
    app.runtime()
        .resolve(Action::command(move |_| {
            *out.lock() = Some(runtime.state());
            Ok(())
        }))
        .unwrap();

    assert_eq!(*observed.lock(), Some(DispatchState::Dispatching { depth: 1 }));
    assert!(app.runtime().state().is_idle());
}

/// Test that a failing command propagates and keeps earlier mutations
#[test]
fn test_failing_command_keeps_prior_mutations() {
    let app = counter_app().run().unwrap();
    let resolutions = Arc::new(Mutex::new(0));
    let count = Arc::clone(&resolutions);
    app.runtime().on_resolved(move |_| *count.lock() += 1);

    let action = Action::set_model(Counter {
        count: 5,
        ..Counter::default()
    }) + Action::command(|_| Err(anyhow::anyhow!("refused")))
        + Action::set_model(Counter {
            count: 9,
            ..Counter::default()
        });
    let result = app.runtime().resolve(action);

    match result {
        Err(DispatchError::Command(e)) => assert!(e.to_string().contains("refused")),
        other => panic!("expected a command error, got {:?}", other),
    }
    assert_eq!(app.model().count, 5);
    assert_eq!(*resolutions.lock(), 1);
}

/// Test that a failing command inside update surfaces from send
#[test]
fn test_send_returns_command_error() {
    let app = counter_app().run().unwrap();
    let result = app.dispatch().send(Msg::Fail);
    assert!(matches!(result, Err(DispatchError::Command(_))));

    // The engine is still usable afterwards.
    app.dispatch().send(Msg::Inc).unwrap();
    assert_eq!(app.model().count, 1);
}

/// Test that sends after teardown are ignored
#[test]
fn test_send_after_teardown_is_noop() {
    let app = counter_app().run().unwrap();
    let dispatch = app.dispatch();
    dispatch.send(Msg::Inc).unwrap();

    app.runtime().teardown();
    assert!(app.runtime().is_torn_down());
    assert!(dispatch.send(Msg::Inc).is_ok());
    assert!(app.runtime().resolve(Action::dispatch(Msg::Inc)).is_ok());

    assert_eq!(app.model().count, 1);
}

/// Test that dropping the running app disconnects its dispatch handles
#[test]
fn test_drop_disconnects_dispatch() {
    let app = counter_app().run().unwrap();
    let dispatch = app.dispatch();
    let weak = app.runtime().downgrade();
    assert!(dispatch.is_connected());

    drop(app);

    assert!(!dispatch.is_connected());
    assert!(dispatch.send(Msg::Inc).is_ok());
    assert!(weak.upgrade().is_none());
}

/// Test that teardown hooks run once, in registration order
#[test]
fn test_teardown_hooks_run_once_in_order() {
    let app = counter_app().run().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second"] {
        let calls = Arc::clone(&calls);
        app.runtime().on_teardown(move || calls.lock().push(name));
    }

    app.runtime().teardown();
    app.runtime().teardown();
    assert_eq!(*calls.lock(), vec!["first", "second"]);

    // Registered after teardown: runs immediately.
    let late = Arc::clone(&calls);
    app.runtime().on_teardown(move || late.lock().push("late"));
    assert_eq!(*calls.lock(), vec!["first", "second", "late"]);
}

/// Test that concurrent senders never interleave resolutions
#[test]
fn test_concurrent_dispatch_is_serialized() {
    let app = counter_app().run().unwrap();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&observed);
    app.runtime()
        .on_resolved(move |resolution| log.lock().push(resolution.model.count));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dispatch = app.dispatch();
            std::thread::spawn(move || {
                for _ in 0..250 {
                    dispatch.send(Msg::Inc).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(app.model().count, 1000);
    assert_eq!(*observed.lock(), (1..=1000).collect::<Vec<i64>>());
}

/// Test that restore replaces the model without running update
#[test]
fn test_restore_bypasses_update() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = spying_counter_app(Arc::clone(&seen)).run().unwrap();
    let origins = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&origins);
    app.runtime()
        .on_resolved(move |resolution| log.lock().push(resolution.origin.clone()));

    app.runtime().restore(Counter {
        count: 42,
        ..Counter::default()
    });

    assert_eq!(app.model().count, 42);
    assert!(seen.lock().is_empty());
    assert_eq!(*origins.lock(), vec![Origin::TimeTravel]);
}

/// Test that the installed labeler names message resolutions
#[test]
fn test_labeler_names_messages() {
    let app = counter_app()
        .label_messages_with(|msg: &Msg| format!("{:?}", msg))
        .run()
        .unwrap();
    let labels = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&labels);
    app.runtime().on_resolved(move |resolution| {
        log.lock().push(resolution.origin.label().map(str::to_string));
    });

    app.dispatch().send(Msg::Add(3)).unwrap();
    app.runtime().resolve_labeled(Action::none(), "manual").unwrap();
    app.runtime().resolve(Action::none()).unwrap();

    assert_eq!(
        *labels.lock(),
        vec![Some("Add(3)".to_string()), Some("manual".to_string()), None]
    );
}

/// Test that the model view tracks writes and notifies subscribers
#[test]
fn test_view_follows_model() {
    let app = counter_app().run().unwrap();
    let view = app.runtime().view();
    let notified = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&notified);
    let subscription = view.subscribe(move |model: &Counter| log.lock().push(model.count));

    let before = view.version();
    app.dispatch().send(Msg::Add(2)).unwrap();
    assert_eq!(view.get().count, 2);
    assert!(view.version() > before);

    drop(subscription);
    app.dispatch().send(Msg::Inc).unwrap();
    assert_eq!(*notified.lock(), vec![2]);
}

/// Test that an async command dispatches later without blocking resolution
#[tokio::test(flavor = "multi_thread")]
async fn test_async_command_dispatches_later() {
    let app = counter_app().run().unwrap();

    let action = Action::command_async(|dispatch: Dispatch<Msg>| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        dispatch.send(Msg::Add(7))?;
        Ok::<(), anyhow::Error>(())
    }) + Action::update_model(|m: Counter| Counter {
        count: m.count + 1,
        ..m
    });
    app.runtime().resolve(action).unwrap();
    assert_eq!(app.model().count, 1);

    let view = app.runtime().view();
    assert!(eventually(|| view.get().count == 8).await);
}

/// Test that an async command error is reported, not propagated
#[tokio::test(flavor = "multi_thread")]
async fn test_async_command_error_is_reported() {
    let app = counter_app().run().unwrap();

    app.runtime()
        .resolve(Action::command_async(|_: Dispatch<Msg>| async {
            Err::<(), anyhow::Error>(anyhow::anyhow!("backend down"))
        }))
        .unwrap();

    let errors = app.runtime().errors().clone();
    assert!(eventually(|| !errors.is_empty()).await);
    let record = &errors.recent()[0];
    assert_eq!(record.kind, "async_command");
    assert!(record.message.contains("backend down"));

    app.dispatch().send(Msg::Inc).unwrap();
    assert_eq!(app.model().count, 1);
}

/// Test that a panicking async command is isolated and reported
#[tokio::test(flavor = "multi_thread")]
async fn test_async_command_panic_is_isolated() {
    let app = counter_app().run().unwrap();

    app.runtime()
        .resolve(Action::command_async(|_: Dispatch<Msg>| async {
            if true {
                panic!("kaboom");
            }
            Ok::<(), anyhow::Error>(())
        }))
        .unwrap();

    let errors = app.runtime().errors().clone();
    assert!(eventually(|| !errors.is_empty()).await);
    let record = &errors.recent()[0];
    assert_eq!(record.kind, "async_panic");
    assert!(record.message.contains("kaboom"));

    app.dispatch().send(Msg::Inc).unwrap();
    assert_eq!(app.model().count, 1);
}

/// Test that an async command finishing after teardown dispatches into nothing
#[tokio::test(flavor = "multi_thread")]
async fn test_async_command_after_teardown_is_noop() {
    let app = counter_app().run().unwrap();
    let outcome = Arc::new(Mutex::new(None));
    let out = Arc::clone(&outcome);

    app.runtime()
        .resolve(Action::command_async(move |dispatch: Dispatch<Msg>| async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            *out.lock() = Some(dispatch.send(Msg::Inc).is_ok());
            Ok::<(), anyhow::Error>(())
        }))
        .unwrap();
    drop(app);

    assert!(eventually(|| outcome.lock().is_some()).await);
    assert_eq!(*outcome.lock(), Some(true));
}

/// Test that an async command with no tokio runtime is an error
#[test]
fn test_async_command_without_runtime_fails() {
    let app = counter_app().run().unwrap();

    let result = app
        .runtime()
        .resolve(Action::command_async(|_: Dispatch<Msg>| async { Ok::<(), anyhow::Error>(()) }));

    assert!(matches!(result, Err(DispatchError::NoAsyncRuntime)));
}
