use std::{collections::HashMap, rc::Rc};

use nodescheme::compiled::{CallNode, CompileError, CompiledKind, CompiledNode};
use nodescheme::expression::print_expression;
use nodescheme::runtime::{error::EvalError, interpreter::Interpreter, value::Value};

fn first_of_empty() -> Rc<CompiledNode> {
    CompiledNode::call(
        CallNode::named(
            "first",
            vec![Rc::from("seq")],
            [(Rc::from("seq"), CompiledNode::symbol("empty"))],
        )
        .unwrap(),
    )
}

#[test]
fn compile_is_computed_once() {
    let node = CompiledNode::call(
        CallNode::named(
            "+",
            vec![Rc::from("x"), Rc::from("y")],
            [
                (Rc::from("x"), CompiledNode::number(1.0)),
                (Rc::from("y"), CompiledNode::number(2.0)),
            ],
        )
        .unwrap(),
    );
    assert!(Rc::ptr_eq(&node.compile(), &node.compile()));
}

#[test]
fn shared_child_lowers_to_one_expression() {
    let shared = CompiledNode::number(4.0);
    let seq = CompiledNode::sequence(vec![Rc::clone(&shared), Rc::clone(&shared)]).unwrap();
    assert_eq!(print_expression(&seq.compile()), "(begin 4 4)");
    assert!(Rc::ptr_eq(&shared.compile(), &shared.compile()));
}

#[test]
fn conditional_only_evaluates_the_taken_branch() {
    let interpreter = Interpreter::default();

    let safe = CompiledNode::conditional(CompiledNode::number(1.0), CompiledNode::number(10.0), first_of_empty());
    assert_eq!(interpreter.eval(&safe.compile()).unwrap(), Value::Number(10.0));

    let failing =
        CompiledNode::conditional(CompiledNode::number(0.0), CompiledNode::number(10.0), first_of_empty());
    assert_eq!(
        interpreter.eval(&failing.compile()).unwrap_err(),
        EvalError::EmptyList("first".to_string())
    );
}

#[test]
fn conditional_test_must_be_a_number() {
    let node = CompiledNode::conditional(
        CompiledNode::string("yes"),
        CompiledNode::number(1.0),
        CompiledNode::number(2.0),
    );
    let err = Interpreter::default().eval(&node.compile()).unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
}

#[test]
fn conditional_from_arguments_reports_the_missing_port() {
    let mut args: HashMap<Rc<str>, Rc<CompiledNode>> = HashMap::new();
    args.insert(Rc::from("test"), CompiledNode::number(1.0));
    args.insert(Rc::from("false"), CompiledNode::number(2.0));
    let err = CompiledNode::conditional_from_arguments("If", &args).unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingConnection {
            node: "If".to_string(),
            port: "true".to_string()
        }
    );
}

#[test]
fn sequence_yields_its_last_value() {
    let seq = CompiledNode::sequence(vec![
        CompiledNode::number(1.0),
        CompiledNode::string("two"),
        CompiledNode::number(3.0),
    ])
    .unwrap();
    assert!(matches!(seq.kind(), CompiledKind::Sequence(body) if body.len() == 3));
    assert_eq!(
        Interpreter::default().eval(&seq.compile()).unwrap(),
        Value::Number(3.0)
    );
}

#[test]
fn empty_sequence_is_rejected() {
    assert_eq!(CompiledNode::sequence(Vec::new()).unwrap_err(), CompileError::EmptySequence);
}

#[test]
fn unbound_symbol_fails_at_evaluation() {
    let node = CompiledNode::symbol("nowhere");
    assert_eq!(
        Interpreter::default().eval(&node.compile()).unwrap_err(),
        EvalError::UnboundSymbol("nowhere".to_string())
    );
}
