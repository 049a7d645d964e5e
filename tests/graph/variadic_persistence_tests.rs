use nodescheme::compiled::CompileError;
use nodescheme::expression::print_expression;
use nodescheme::graph::{Builder, FunctionRegistry, GraphError, GraphNode, NodeId, Workspace};
use nodescheme::persist::{
    PersistError, fingerprint, load_workspace, save_workspace, workspace_from_json,
    workspace_to_json,
};
use nodescheme::runtime::{interpreter::Interpreter, value::Value};

fn numbers(ws: &mut Workspace, values: &[f64]) -> NodeId {
    let list = ws.add_node(GraphNode::list());
    for _ in 1..values.len() {
        ws.add_input(list).unwrap();
    }
    for (port, v) in values.iter().enumerate() {
        let n = ws.add_node(GraphNode::number(*v));
        ws.connect(n, 0, list, port).unwrap();
    }
    list
}

/// `map(+, [1 2], [10 20], [100 200])` with a third list port added by hand.
fn three_way_combine() -> (Workspace, NodeId) {
    let mut ws = Workspace::new("home");
    let combine = ws.add_node(GraphNode::combine());
    ws.add_input(combine).unwrap();
    let plus = ws.add_node(GraphNode::builtin("+").unwrap());
    let a = numbers(&mut ws, &[1.0, 2.0]);
    let b = numbers(&mut ws, &[10.0, 20.0]);
    let c = numbers(&mut ws, &[100.0, 200.0]);
    ws.connect(plus, 0, combine, 0).unwrap();
    ws.connect(a, 0, combine, 1).unwrap();
    ws.connect(b, 0, combine, 2).unwrap();
    ws.connect(c, 0, combine, 3).unwrap();
    (ws, combine)
}

fn port_names(ws: &Workspace, id: NodeId) -> Vec<String> {
    ws.node(id).unwrap().inputs().iter().map(|p| p.name.clone()).collect()
}

fn printed(ws: &Workspace, id: NodeId) -> String {
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(ws, &registry);
    print_expression(&builder.build(id, 0).unwrap().compile())
}

#[test]
fn combine_with_three_lists() {
    let (ws, combine) = three_way_combine();
    assert_eq!(port_names(&ws, combine), ["comb", "list1", "list2", "list3"]);

    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&ws, &registry);
    let compiled = builder.build(combine, 0).unwrap();
    let value = Interpreter::default().eval(&compiled.compile()).unwrap();
    assert_eq!(
        value,
        Value::list(vec![Value::Number(111.0), Value::Number(222.0)])
    );
}

#[test]
fn list_ports_are_renamed_as_they_grow_and_shrink() {
    let mut ws = Workspace::new("home");
    let list = ws.add_node(GraphNode::list());
    assert_eq!(port_names(&ws, list), ["item(s)"]);
    ws.add_input(list).unwrap();
    assert_eq!(port_names(&ws, list), ["index0", "index1"]);
    ws.remove_input(list).unwrap();
    assert_eq!(port_names(&ws, list), ["item(s)"]);
    assert!(matches!(
        ws.remove_input(list),
        Err(GraphError::CannotRemovePort { min: 1, .. })
    ));
}

#[test]
fn fixed_arity_nodes_are_not_variadic() {
    let mut ws = Workspace::new("home");
    let add = ws.add_node(GraphNode::builtin("+").unwrap());
    assert_eq!(ws.add_input(add), Err(GraphError::NotVariadic(add)));
}

#[test]
fn saved_and_reloaded_graph_compiles_identically() {
    let (ws, combine) = three_way_combine();
    let json = workspace_to_json(&ws).unwrap();
    let reloaded = workspace_from_json(&json).unwrap();

    assert_eq!(reloaded.len(), ws.len());
    assert_eq!(port_names(&reloaded, combine), ["comb", "list1", "list2", "list3"]);
    assert_eq!(printed(&reloaded, combine), printed(&ws, combine));
    assert_eq!(fingerprint(&reloaded).unwrap(), fingerprint(&ws).unwrap());
}

#[test]
fn reloaded_variadic_keeps_growing_from_its_saved_count() {
    let (ws, combine) = three_way_combine();
    let mut reloaded = load_workspace(&save_workspace(&ws).unwrap()).unwrap();
    reloaded.add_input(combine).unwrap();
    assert_eq!(
        port_names(&reloaded, combine),
        ["comb", "list1", "list2", "list3", "list4"]
    );
}

#[test]
fn port_count_change_makes_a_clean_node_stale() {
    let (mut ws, combine) = three_way_combine();
    ws.node_mut(combine).unwrap().mark_clean();
    assert!(!ws.node(combine).unwrap().is_stale());

    ws.add_input(combine).unwrap();
    assert!(ws.node(combine).unwrap().is_stale());
}

#[test]
fn wiring_to_a_missing_node_is_rejected() {
    let (ws, combine) = three_way_combine();
    let mut record = save_workspace(&ws).unwrap();
    record.nodes.retain(|n| n.id != combine);
    assert!(matches!(load_workspace(&record), Err(PersistError::UnknownNode(id)) if id == combine));
}

#[test]
fn malformed_json_is_a_persist_error() {
    assert!(matches!(
        workspace_from_json("{\"version\": 1"),
        Err(PersistError::Json(_))
    ));
}

#[test]
fn loaded_logic_node_with_a_missing_port_fails_to_build() {
    let mut ws = Workspace::new("home");
    let and = ws.add_node(GraphNode::and());
    let mut record = save_workspace(&ws).unwrap();
    record.nodes[0].inputs.truncate(1);

    let reloaded = load_workspace(&record).unwrap();
    let registry = FunctionRegistry::new();
    let mut builder = Builder::new(&reloaded, &registry);
    assert!(matches!(
        builder.build(and, 0),
        Err(CompileError::InputCount { expected: 2, found: 1, .. })
    ));
}
