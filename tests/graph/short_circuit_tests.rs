use std::{cell::Cell, rc::Rc};

use nodescheme::expression::print_expression;
use nodescheme::graph::{Builder, FunctionRegistry, GraphNode, NodeId, Workspace};
use nodescheme::runtime::{
    interpreter::Interpreter,
    native_function::{Arity, NativeFunction},
    value::Value,
};

/// An interpreter with a zero-argument `tick` that counts its calls and
/// returns 1.
fn counting_interpreter() -> (Interpreter, Rc<Cell<usize>>) {
    let interpreter = Interpreter::default();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    interpreter.define(
        "tick",
        Value::Function(NativeFunction::new("tick", Arity::Exact(0), move |_| {
            counter.set(counter.get() + 1);
            Ok(Value::Number(1.0))
        })),
    );
    (interpreter, calls)
}

/// `logic(a, tick())` with `a` a boolean literal.
fn gate(logic: GraphNode, a: bool) -> (Workspace, NodeId) {
    let mut ws = Workspace::new("home");
    let lhs = ws.add_node(GraphNode::boolean(a));
    let rhs = ws.add_node(GraphNode::function("tick", &[], &["out".to_string()]));
    let op = ws.add_node(logic);
    ws.connect(lhs, 0, op, 0).unwrap();
    ws.connect(rhs, 0, op, 1).unwrap();
    (ws, op)
}

fn run(ws: &Workspace, root: NodeId, interpreter: &Interpreter) -> Value {
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(ws, &registry);
    let compiled = builder.build(root, 0).unwrap();
    interpreter.eval(&compiled.compile()).unwrap()
}

#[test]
fn false_and_skips_the_second_operand() {
    let (interpreter, calls) = counting_interpreter();
    let (ws, op) = gate(GraphNode::and(), false);
    assert_eq!(run(&ws, op, &interpreter), Value::Number(0.0));
    assert_eq!(calls.get(), 0);
}

#[test]
fn true_and_evaluates_the_second_operand() {
    let (interpreter, calls) = counting_interpreter();
    let (ws, op) = gate(GraphNode::and(), true);
    assert_eq!(run(&ws, op, &interpreter), Value::Number(1.0));
    assert_eq!(calls.get(), 1);
}

#[test]
fn true_or_skips_the_second_operand() {
    let (interpreter, calls) = counting_interpreter();
    let (ws, op) = gate(GraphNode::or(), true);
    assert_eq!(run(&ws, op, &interpreter), Value::Number(1.0));
    assert_eq!(calls.get(), 0);
}

#[test]
fn false_or_evaluates_the_second_operand() {
    let (interpreter, calls) = counting_interpreter();
    let (ws, op) = gate(GraphNode::or(), false);
    assert_eq!(run(&ws, op, &interpreter), Value::Number(1.0));
    assert_eq!(calls.get(), 1);
}

#[test]
fn fully_wired_and_is_a_conditional() {
    let (ws, op) = gate(GraphNode::and(), true);
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(op, 0).unwrap();
    assert_eq!(print_expression(&compiled.compile()), "(if 1 (tick) 0)");
}

#[test]
fn partially_wired_or_is_a_curried_lambda() {
    let mut ws = Workspace::new("home");
    let lhs = ws.add_node(GraphNode::boolean(false));
    let op = ws.add_node(GraphNode::or());
    ws.connect(lhs, 0, op, 0).unwrap();

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(op, 0).unwrap();
    assert_eq!(
        print_expression(&compiled.compile()),
        "(lambda (b) ((lambda (a b) (if a 1 b)) 0 b))"
    );

    let f = Interpreter::default().eval(&compiled.compile()).unwrap();
    let f = f.as_function("test").unwrap();
    assert_eq!(f.call(&[Value::Number(0.0)]).unwrap(), Value::Number(0.0));
    assert_eq!(f.call(&[Value::Number(5.0)]).unwrap(), Value::Number(5.0));
}
