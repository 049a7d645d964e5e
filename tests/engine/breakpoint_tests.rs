use nodescheme::engine::{Engine, EngineConfig, EngineError, ResumeHandle, RunOutcome};
use nodescheme::graph::{GraphNode, NodeId};
use nodescheme::runtime::value::Value;

fn debugging() -> Engine {
    Engine::new(EngineConfig {
        debug_breakpoints: true,
        ..EngineConfig::default()
    })
}

/// `3 -> bp1 -> .. -> bpN -> (+ _ 4)`. Returns the breakpoints in order and
/// the adder.
fn chain(engine: &mut Engine, breakpoints: usize) -> (Vec<NodeId>, NodeId) {
    let home = engine.home_mut();
    let mut upstream = home.add_node(GraphNode::number(3.0));
    let mut bps = Vec::new();
    for _ in 0..breakpoints {
        let bp = home.add_node(GraphNode::breakpoint());
        home.connect(upstream, 0, bp, 0).unwrap();
        bps.push(bp);
        upstream = bp;
    }
    let four = home.add_node(GraphNode::number(4.0));
    let add = home.add_node(GraphNode::builtin("+").unwrap());
    home.connect(upstream, 0, add, 0).unwrap();
    home.connect(four, 0, add, 1).unwrap();
    (bps, add)
}

fn expect_pause(outcome: RunOutcome) -> (NodeId, Value, ResumeHandle) {
    match outcome {
        RunOutcome::Paused {
            breakpoint,
            inspected,
            handle,
        } => (breakpoint, inspected, handle),
        other => panic!("expected a paused run, got {:?}", other),
    }
}

#[test]
fn pause_then_resume() {
    let mut engine = debugging();
    let (bps, add) = chain(&mut engine, 1);

    let (breakpoint, inspected, handle) = expect_pause(engine.run(add, 0).unwrap());
    assert_eq!(breakpoint, bps[0]);
    assert_eq!(inspected, Value::Number(3.0));
    assert_eq!(engine.paused(), Some(handle));

    assert_eq!(engine.resume(handle).unwrap(), RunOutcome::Computed(Value::Number(7.0)));
    assert_eq!(engine.paused(), None);
    assert!(engine.run(add, 0).unwrap().is_cached());
}

#[test]
fn breakpoints_are_hit_in_evaluation_order() {
    let mut engine = debugging();
    let (bps, add) = chain(&mut engine, 2);

    let (first, _, handle) = expect_pause(engine.run(add, 0).unwrap());
    assert_eq!(first, bps[0]);
    let (second, inspected, handle) = expect_pause(engine.resume(handle).unwrap());
    assert_eq!(second, bps[1]);
    assert_eq!(inspected, Value::Number(3.0));
    assert_eq!(engine.resume(handle).unwrap(), RunOutcome::Computed(Value::Number(7.0)));
}

#[test]
fn breakpoints_rearm_after_a_completed_run() {
    let mut engine = debugging();
    let (bps, add) = chain(&mut engine, 1);

    let (_, _, handle) = expect_pause(engine.run(add, 0).unwrap());
    engine.resume(handle).unwrap();

    engine.home_mut().mark_dirty(bps[0]).unwrap();
    let (breakpoint, _, _) = expect_pause(engine.run(add, 0).unwrap());
    assert_eq!(breakpoint, bps[0]);
}

#[test]
fn a_fresh_run_abandons_the_pause() {
    let mut engine = debugging();
    let (bps, add) = chain(&mut engine, 1);

    let (_, _, stale_handle) = expect_pause(engine.run(add, 0).unwrap());
    let (breakpoint, _, handle) = expect_pause(engine.run(add, 0).unwrap());
    assert_eq!(breakpoint, bps[0]);
    assert_eq!(handle, stale_handle);
    assert_eq!(engine.resume(handle).unwrap(), RunOutcome::Computed(Value::Number(7.0)));
    assert!(matches!(engine.resume(handle), Err(EngineError::NotPaused(_))));
}

#[test]
fn breakpoints_pass_through_when_debugging_is_off() {
    let mut engine = Engine::new(EngineConfig::default());
    let (_, add) = chain(&mut engine, 2);
    assert_eq!(engine.run(add, 0).unwrap(), RunOutcome::Computed(Value::Number(7.0)));
}

#[test]
fn debugging_can_be_switched_on_later() {
    let mut engine = Engine::new(EngineConfig::default());
    let (bps, add) = chain(&mut engine, 1);
    engine.run(add, 0).unwrap();

    engine.set_debug_breakpoints(true);
    engine.home_mut().mark_dirty(bps[0]).unwrap();
    let (breakpoint, _, _) = expect_pause(engine.run(add, 0).unwrap());
    assert_eq!(breakpoint, bps[0]);
}

#[test]
fn breakpoint_inside_a_function_body_pauses_the_caller() {
    let mut body = nodescheme::graph::Workspace::new("inspect");
    let x = body.add_node(GraphNode::variable("x"));
    let bp = body.add_node(GraphNode::breakpoint());
    let out = body.add_node(GraphNode::output("y"));
    body.connect(x, 0, bp, 0).unwrap();
    body.connect(bp, 0, out, 0).unwrap();

    let mut engine = debugging();
    engine.define_function("inspect", body);
    let reference = engine.registry().reference("inspect").unwrap();
    let home = engine.home_mut();
    let ten = home.add_node(GraphNode::number(10.0));
    let call = home.add_node(reference);
    home.connect(ten, 0, call, 0).unwrap();

    let (breakpoint, inspected, handle) = expect_pause(engine.run(call, 0).unwrap());
    assert_eq!(breakpoint, bp);
    assert_eq!(inspected, Value::Number(10.0));
    assert_eq!(handle.root, call);
    assert_eq!(engine.resume(handle).unwrap(), RunOutcome::Computed(Value::Number(10.0)));
}
