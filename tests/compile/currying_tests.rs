use std::rc::Rc;

use insta::assert_snapshot;
use nodescheme::compiled::{CallNode, CompileError, CompiledNode, curry::CallShape};
use nodescheme::expression::print_expression;
use nodescheme::runtime::{interpreter::Interpreter, value::Value};

fn names(ns: &[&str]) -> Vec<Rc<str>> {
    ns.iter().map(|n| Rc::from(*n)).collect()
}

fn arg(name: &str, value: f64) -> (Rc<str>, Rc<CompiledNode>) {
    (Rc::from(name), CompiledNode::number(value))
}

fn printed(node: &CompiledNode) -> String {
    print_expression(&node.compile())
}

#[test]
fn saturated_call_applies_in_declared_order() {
    let call = CallNode::named("-", names(&["x", "y"]), [arg("y", 3.0), arg("x", 10.0)]).unwrap();
    assert_eq!(call.shape(), CallShape::Saturated);

    let node = CompiledNode::call(call);
    assert_eq!(printed(&node), "(- 10 3)");
    let value = Interpreter::default().eval(&node.compile()).unwrap();
    assert_eq!(value, Value::Number(7.0));
}

#[test]
fn partial_call_is_a_lambda_over_missing_params() {
    let call = CallNode::named("-", names(&["x", "y"]), [arg("y", 3.0)]).unwrap();
    let node = CompiledNode::call(call);
    assert_snapshot!(printed(&node), @"(lambda (x) (- x 3))");

    let interpreter = Interpreter::default();
    let f = interpreter.eval(&node.compile()).unwrap();
    let f = f.as_function("test").unwrap();
    assert_eq!(f.call(&[Value::Number(4.0)]).unwrap(), Value::Number(1.0));
}

#[test]
fn unapplied_call_is_the_callee_itself() {
    let node = CompiledNode::call(CallNode::named("+", names(&["x", "y"]), []).unwrap());
    assert_eq!(printed(&node), "+");

    let interpreter = Interpreter::default();
    let f = interpreter.eval(&node.compile()).unwrap();
    assert_eq!(
        f.as_function("test").unwrap().call(&[Value::Number(1.0), Value::Number(2.0)]).unwrap(),
        Value::Number(3.0)
    );
}

#[test]
fn supply_order_does_not_change_the_lowering() {
    let forward = CallNode::named(
        "f",
        names(&["a", "b", "c", "d"]),
        [arg("a", 1.0), arg("c", 3.0)],
    )
    .unwrap();
    let backward = CallNode::named(
        "f",
        names(&["a", "b", "c", "d"]),
        [arg("c", 3.0), arg("a", 1.0)],
    )
    .unwrap();
    let expected = "(lambda (b d) (f 1 b 3 d))";
    for _ in 0..8 {
        assert_eq!(printed(&CompiledNode::call(forward.clone())), expected);
        assert_eq!(printed(&CompiledNode::call(backward.clone())), expected);
    }
}

#[test]
fn anonymous_body_is_curried_like_a_named_one() {
    let entry = CompiledNode::call(
        CallNode::named(
            "*",
            names(&["x", "y"]),
            [
                (Rc::from("x"), CompiledNode::symbol("p")),
                (Rc::from("y"), CompiledNode::symbol("q")),
            ],
        )
        .unwrap(),
    );
    let node = CompiledNode::call(CallNode::anonymous(names(&["p", "q"]), entry, [arg("q", 5.0)]).unwrap());
    assert_snapshot!(printed(&node), @"(lambda (p) ((lambda (p q) (* p q)) p 5))");

    let interpreter = Interpreter::default();
    let f = interpreter.eval(&node.compile()).unwrap();
    assert_eq!(
        f.as_function("test").unwrap().call(&[Value::Number(2.0)]).unwrap(),
        Value::Number(10.0)
    );
}

#[test]
fn argument_for_an_undeclared_param_is_rejected() {
    let err = CallNode::named("+", names(&["x", "y"]), [arg("z", 1.0)]).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownParameter {
            name: "z".to_string()
        }
    );
}

#[test]
fn zero_param_call_is_invoked() {
    let node = CompiledNode::call(CallNode::named("list", Vec::new(), []).unwrap());
    assert_eq!(printed(&node), "(list)");
    assert_eq!(
        Interpreter::default().eval(&node.compile()).unwrap(),
        Value::empty_list()
    );
}
