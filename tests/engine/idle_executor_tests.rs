use std::{cell::RefCell, thread};

use nodescheme::engine::{Engine, EngineConfig, IdleDispatcher, IdleError, idle};
use nodescheme::graph::{GraphNode, NodeId};

thread_local! {
    static ENGINE: RefCell<Option<(Engine, NodeId)>> = const { RefCell::new(None) };
}

/// Runs on the idle thread: an engine computing `20 + 22`.
fn install_engine() {
    let mut engine = Engine::new(EngineConfig::default());
    let home = engine.home_mut();
    let a = home.add_node(GraphNode::number(20.0));
    let b = home.add_node(GraphNode::number(22.0));
    let add = home.add_node(GraphNode::builtin("+").unwrap());
    home.connect(a, 0, add, 0).unwrap();
    home.connect(b, 0, add, 1).unwrap();
    ENGINE.with(|slot| *slot.borrow_mut() = Some((engine, add)));
}

fn run_installed() -> Option<(f64, bool)> {
    ENGINE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let (engine, root) = slot.as_mut()?;
        let outcome = engine.run(*root, 0).ok()?;
        let n = outcome.value()?.as_number("result").ok()?;
        Some((n, outcome.is_cached()))
    })
}

#[test]
fn engine_is_driven_from_other_threads() {
    let (handle, idle_thread) = idle::spawn("nodescheme-idle", install_engine).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || handle.execute_on_idle(run_installed).unwrap())
        })
        .collect();
    let mut results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    results.sort_by_key(|r| r.map(|(_, cached)| cached));

    assert_eq!(results[0], Some((42.0, false)));
    assert!(results[1..].iter().all(|r| *r == Some((42.0, true))));

    drop(handle);
    idle_thread.join().unwrap();
}

#[test]
fn work_runs_on_the_idle_thread() {
    let (handle, idle_thread) = idle::spawn("named-idle", || {}).unwrap();
    let name = handle
        .execute_on_idle(|| thread::current().name().map(str::to_string))
        .unwrap();
    assert_eq!(name.as_deref(), Some("named-idle"));
    assert!(!handle.is_idle_thread());
    drop(handle);
    idle_thread.join().unwrap();
}

#[test]
fn pump_drains_queued_work_on_the_owning_thread() {
    let dispatcher = IdleDispatcher::new();
    let handle = dispatcher.handle();
    let owner = thread::current().id();

    let worker = thread::spawn(move || handle.execute_on_idle(|| thread::current().id()).unwrap());
    let mut ran = 0;
    while !worker.is_finished() {
        ran += dispatcher.pump();
        thread::yield_now();
    }
    assert_eq!(worker.join().unwrap(), owner);
    assert_eq!(ran, 1);
}

#[test]
fn call_from_the_idle_thread_runs_inline() {
    let dispatcher = IdleDispatcher::new();
    let handle = dispatcher.handle();
    assert!(handle.is_idle_thread());
    assert_eq!(handle.execute_on_idle(|| 5).unwrap(), 5);
    assert_eq!(dispatcher.pump(), 0);
}

#[test]
fn dropped_dispatcher_disconnects_handles() {
    let dispatcher = IdleDispatcher::new();
    let handle = dispatcher.handle();
    drop(dispatcher);
    let result = thread::spawn(move || handle.execute_on_idle(|| 1)).join().unwrap();
    assert_eq!(result, Err(IdleError::Disconnected));
}

#[test]
fn panicking_work_is_reported() {
    let (handle, idle_thread) = idle::spawn("panicking-idle", || {}).unwrap();
    let result = handle.execute_on_idle::<(), _>(|| panic!("boom"));
    assert_eq!(result, Err(IdleError::Panicked));
    drop(handle);
    assert!(idle_thread.join().is_err());
}
