use std::rc::Rc;

use insta::assert_snapshot;
use nodescheme::compiled::CompileError;
use nodescheme::expression::print_expression;
use nodescheme::graph::{
    Builder, FunctionRegistry, GraphNode, NativeOp, PortData, Workspace, compile_function,
    variable_symbol,
};
use nodescheme::runtime::{interpreter::Interpreter, value::Value};

fn eval_root(ws: &Workspace, registry: &FunctionRegistry, id: ulid::Ulid, port: usize) -> Value {
    let mut builder = Builder::new(ws, registry);
    let compiled = builder.build(id, port).unwrap();
    Interpreter::default().eval(&compiled.compile()).unwrap()
}

#[test]
fn two_plus_two() {
    let mut ws = Workspace::new("home");
    let a = ws.add_node(GraphNode::number(2.0));
    let add = ws.add_node(GraphNode::builtin("+").unwrap());
    ws.connect(a, 0, add, 0).unwrap();
    ws.connect(a, 0, add, 1).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(add, 0).unwrap();
    assert_snapshot!(print_expression(&compiled.compile()), @"(+ 2 2)");
    assert_eq!(eval_root(&ws, &registry, add, 0), Value::Number(4.0));
}

#[test]
fn fan_out_producer_is_compiled_once() {
    let mut ws = Workspace::new("home");
    let a = ws.add_node(GraphNode::number(3.0));
    let mul = ws.add_node(GraphNode::builtin("*").unwrap());
    ws.connect(a, 0, mul, 0).unwrap();
    ws.connect(a, 0, mul, 1).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    builder.build(mul, 0).unwrap();
    let first = Rc::clone(builder.memoized(a, 0).unwrap());
    let again = builder.build(a, 0).unwrap();
    assert!(Rc::ptr_eq(&first, &again));
    assert_eq!(builder.memo_len(), 2);
}

#[test]
fn unconnected_builtin_port_is_curried() {
    let mut ws = Workspace::new("home");
    let two = ws.add_node(GraphNode::number(2.0));
    let sub = ws.add_node(GraphNode::builtin("-").unwrap());
    ws.connect(two, 0, sub, 1).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(sub, 0).unwrap();
    assert_snapshot!(print_expression(&compiled.compile()), @"(lambda (x) (- x 2))");
}

#[test]
fn port_default_fills_an_unconnected_input() {
    let mut ws = Workspace::new("home");
    let mut add = GraphNode::builtin("+").unwrap();
    *add.input_mut(1).unwrap() = PortData::any("y").with_default(Value::Number(10.0)).unwrap();
    let add = ws.add_node(add);
    let five = ws.add_node(GraphNode::number(5.0));
    ws.connect(five, 0, add, 0).unwrap();

    assert_eq!(eval_root(&ws, &FunctionRegistry::new(), add, 0), Value::Number(15.0));
}

#[test]
fn missing_connection_leaves_no_memo_entry() {
    let mut ws = Workspace::new("home");
    let test = ws.add_node(GraphNode::boolean(true));
    let cond = ws.add_node(GraphNode::conditional());
    ws.connect(test, 0, cond, 0).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let err = builder.build(cond, 0).unwrap_err();
    assert!(matches!(err, CompileError::MissingConnection { ref port, .. } if port == "true"));
    assert!(builder.memoized(cond, 0).is_none());
    assert!(builder.memoized(test, 0).is_some());
}

#[test]
fn cycle_is_reported_not_followed() {
    let mut ws = Workspace::new("home");
    let a = ws.add_node(GraphNode::builtin("identity").unwrap());
    let b = ws.add_node(GraphNode::builtin("identity").unwrap());
    ws.connect(a, 0, b, 0).unwrap();
    ws.connect(b, 0, a, 0).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    assert!(matches!(builder.build(a, 0), Err(CompileError::CycleDetected(_))));
    assert_eq!(builder.memo_len(), 0);
}

#[test]
fn unknown_node_and_port() {
    let mut ws = Workspace::new("home");
    let a = ws.add_node(GraphNode::number(1.0));
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    assert!(matches!(builder.build(ulid::Ulid::new(), 0), Err(CompileError::NodeNotFound(_))));
    assert_eq!(
        builder.build(a, 1).unwrap_err(),
        CompileError::PortOutOfRange { node: a, port: 1 }
    );
}

#[test]
fn constants_compile_to_literals() {
    let mut ws = Workspace::new("home");
    let pi = ws.add_node(GraphNode::pi());
    let yes = ws.add_node(GraphNode::boolean(true));
    let empty = ws.add_node(GraphNode::empty());
    let registry = FunctionRegistry::new();

    assert_eq!(eval_root(&ws, &registry, pi, 0), Value::Number(std::f64::consts::PI));
    assert_eq!(eval_root(&ws, &registry, yes, 0), Value::Number(1.0));
    assert_eq!(eval_root(&ws, &registry, empty, 0), Value::empty_list());
}

#[test]
fn decons_outputs_project_their_element() {
    let mut ws = Workspace::new("home");
    let list = ws.add_node(GraphNode::list());
    ws.add_input(list).unwrap();
    let one = ws.add_node(GraphNode::number(1.0));
    let two = ws.add_node(GraphNode::number(2.0));
    ws.connect(one, 0, list, 0).unwrap();
    ws.connect(two, 0, list, 1).unwrap();
    let split = ws.add_node(GraphNode::native(NativeOp::DeCons));
    ws.connect(list, 0, split, 0).unwrap();

    let registry = FunctionRegistry::new();
    assert_eq!(eval_root(&ws, &registry, split, 0), Value::Number(1.0));
    assert_eq!(
        eval_root(&ws, &registry, split, 1),
        Value::list(vec![Value::Number(2.0)])
    );
}

#[test]
fn apply_node_calls_its_func_input() {
    let mut ws = Workspace::new("home");
    let apply = ws.add_node(GraphNode::apply());
    ws.add_input(apply).unwrap();
    ws.add_input(apply).unwrap();
    let add = ws.add_node(GraphNode::builtin("+").unwrap());
    let three = ws.add_node(GraphNode::number(3.0));
    let four = ws.add_node(GraphNode::number(4.0));
    ws.connect(add, 0, apply, 0).unwrap();
    ws.connect(three, 0, apply, 1).unwrap();
    ws.connect(four, 0, apply, 2).unwrap();

    let registry = FunctionRegistry::new();
    let names: Vec<&str> = ws.node(apply).unwrap().inputs().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["func", "arg1", "arg2"]);
    assert_eq!(eval_root(&ws, &registry, apply, 0), Value::Number(7.0));
}

#[test]
fn apply_without_func_is_a_missing_connection() {
    let mut ws = Workspace::new("home");
    let apply = ws.add_node(GraphNode::apply());
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    assert!(matches!(
        builder.build(apply, 0),
        Err(CompileError::MissingConnection { ref port, .. }) if port == "func"
    ));
}

#[test]
fn apply_with_an_unwired_argument_is_a_missing_connection() {
    let mut ws = Workspace::new("home");
    let apply = ws.add_node(GraphNode::apply());
    ws.add_input(apply).unwrap();
    ws.add_input(apply).unwrap();
    let add = ws.add_node(GraphNode::builtin("+").unwrap());
    let three = ws.add_node(GraphNode::number(3.0));
    ws.connect(add, 0, apply, 0).unwrap();
    ws.connect(three, 0, apply, 1).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    assert!(matches!(
        builder.build(apply, 0),
        Err(CompileError::MissingConnection { ref port, .. }) if port == "arg2"
    ));
}

#[test]
fn overly_deep_chain_is_rejected_before_evaluation() {
    let mut ws = Workspace::new("home");
    let mut tip = ws.add_node(GraphNode::number(1.0));
    for _ in 0..2000 {
        let next = ws.add_node(GraphNode::builtin("identity").unwrap());
        ws.connect(tip, 0, next, 0).unwrap();
        tip = next;
    }
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry).with_max_depth(64);
    assert!(matches!(
        builder.build(tip, 0),
        Err(CompileError::TooDeep { limit: 64, .. })
    ));
    assert_eq!(builder.memo_len(), 0);
}

#[test]
fn function_definition_binds_variable_symbols() {
    let mut body = Workspace::new("square");
    let x = body.add_node(GraphNode::variable("x"));
    let mul = body.add_node(GraphNode::builtin("*").unwrap());
    let out = body.add_node(GraphNode::output("result"));
    body.connect(x, 0, mul, 0).unwrap();
    body.connect(x, 0, mul, 1).unwrap();
    body.connect(mul, 0, out, 0).unwrap();

    let mut registry = FunctionRegistry::new();
    registry.define("square", body);
    let lambda = compile_function("square", &registry, None).unwrap();
    let param = variable_symbol(x);
    assert_eq!(
        print_expression(&lambda),
        format!("(lambda ({p}) (* {p} {p}))", p = param)
    );

    let interpreter = Interpreter::default();
    let closure = interpreter.eval(&lambda).unwrap();
    interpreter.define("square", closure);

    let mut home = Workspace::new("home");
    let seven = home.add_node(GraphNode::number(7.0));
    let call = home.add_node(registry.reference("square").unwrap());
    home.connect(seven, 0, call, 0).unwrap();
    let mut builder = Builder::new(&home, &registry);
    let compiled = builder.build(call, 0).unwrap();
    assert_eq!(print_expression(&compiled.compile()), "(square 7)");
    assert_eq!(interpreter.eval(&compiled.compile()).unwrap(), Value::Number(49.0));
}

#[test]
fn function_without_outputs_cannot_compile() {
    let mut registry = FunctionRegistry::new();
    let mut body = Workspace::new("nothing");
    body.add_node(GraphNode::variable("x"));
    registry.define("nothing", body);
    assert!(matches!(
        compile_function("nothing", &registry, None),
        Err(CompileError::MissingConnection { ref port, .. }) if port == "output"
    ));
    assert_eq!(
        compile_function("absent", &registry, None).unwrap_err(),
        CompileError::FunctionNotFound("absent".to_string())
    );
}

#[test]
fn list_default_is_quoted() {
    let mut ws = Workspace::new("home");
    let mut len = GraphNode::builtin("len").unwrap();
    let items = Value::list(vec![Value::Number(1.0), Value::Number(2.0)]);
    *len.input_mut(0).unwrap() = PortData::any("seq").with_default(items).unwrap();
    let len = ws.add_node(len);

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(len, 0).unwrap();
    assert_snapshot!(print_expression(&compiled.compile()), @"(len '(1 2))");
    assert_eq!(eval_root(&ws, &registry, len, 0), Value::Number(2.0));
}
