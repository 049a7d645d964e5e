//! Saving and loading workspaces as versioned JSON records.
//!
//! Saving captures every node's kind, port names and defaults, and the wiring
//! as `(from, from_port, to, to_port)` triples. Loading rebuilds nodes with
//! their original ids, then replays the wiring.

use std::rc::Rc;

use thiserror::Error;
use ulid::Ulid;

use crate::{
    graph::{FunctionRegistry, GraphError, GraphNode, NodeKind, PortData, Workspace},
    runtime::value::Value,
};

pub mod fingerprint;
pub mod schema;

pub use fingerprint::{Fingerprint, fingerprint};
pub use schema::{
    ConnectionRecord, FORMAT_VERSION, FunctionRecord, KindRecord, NodeRecord, PortRecord,
    ProjectRecord, ValueRecord, WorkspaceRecord,
};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid workspace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported format version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("connection refers to unknown node {0}")]
    UnknownNode(Ulid),

    #[error("default of port `{port}` on node {node} is a {kind}, which cannot be saved")]
    NotPlainData {
        node: Ulid,
        port: String,
        kind: &'static str,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type PersistResult<T> = std::result::Result<T, PersistError>;

pub fn save_workspace(workspace: &Workspace) -> PersistResult<WorkspaceRecord> {
    let nodes = workspace
        .nodes()
        .map(save_node)
        .collect::<PersistResult<Vec<_>>>()?;
    let connections = workspace
        .nodes()
        .flat_map(|node| {
            node.connections().map(move |(to_port, conn)| ConnectionRecord {
                from: conn.node,
                from_port: conn.port,
                to: node.id(),
                to_port,
            })
        })
        .collect();
    Ok(WorkspaceRecord {
        version: FORMAT_VERSION,
        name: workspace.name().to_string(),
        nodes,
        connections,
    })
}

fn save_node(node: &GraphNode) -> PersistResult<NodeRecord> {
    let save_ports = |ports: &[PortData]| {
        ports
            .iter()
            .map(|port| save_port(node.id(), port))
            .collect::<PersistResult<Vec<_>>>()
    };
    Ok(NodeRecord {
        id: node.id(),
        kind: save_kind(node.kind()),
        variadic: node.variadic().map(|v| v.rule),
        inputs: save_ports(node.inputs())?,
        outputs: save_ports(node.outputs())?,
    })
}

fn save_kind(kind: &NodeKind) -> KindRecord {
    match kind {
        NodeKind::Number(value) => KindRecord::Number { value: *value },
        NodeKind::Text(value) => KindRecord::Text { value: value.clone() },
        NodeKind::Bool(value) => KindRecord::Bool { value: *value },
        NodeKind::Pi => KindRecord::Pi,
        NodeKind::Empty => KindRecord::Empty,
        NodeKind::Variable { name } => KindRecord::Variable { name: name.clone() },
        NodeKind::Output { name } => KindRecord::Output { name: name.clone() },
        NodeKind::Builtin { symbol } => KindRecord::Builtin { symbol: symbol.clone() },
        NodeKind::Native(op) => KindRecord::Native { op: *op },
        NodeKind::If => KindRecord::If,
        NodeKind::Begin => KindRecord::Begin,
        NodeKind::Apply => KindRecord::Apply,
        NodeKind::And => KindRecord::And,
        NodeKind::Or => KindRecord::Or,
        NodeKind::Function { symbol } => KindRecord::Function { symbol: symbol.clone() },
        NodeKind::Breakpoint => KindRecord::Breakpoint,
    }
}

fn save_port(node: Ulid, port: &PortData) -> PersistResult<PortRecord> {
    let default = port
        .default_value()
        .map(save_value)
        .transpose()
        .map_err(|kind| PersistError::NotPlainData {
            node,
            port: port.name.clone(),
            kind,
        })?;
    Ok(PortRecord {
        name: port.name.clone(),
        description: port.description.clone(),
        port_type: port.port_type,
        default,
    })
}

fn save_value(value: &Value) -> Result<ValueRecord, &'static str> {
    Ok(match value {
        Value::Number(n) => ValueRecord::Number(*n),
        Value::String(s) => ValueRecord::String(s.to_string()),
        Value::Symbol(s) => ValueRecord::Symbol(s.to_string()),
        Value::List(items) => ValueRecord::List(
            items
                .iter()
                .map(save_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Container(_) | Value::Function(_) => return Err(value.type_name()),
    })
}

fn load_value(record: &ValueRecord) -> Value {
    match record {
        ValueRecord::Number(n) => Value::Number(*n),
        ValueRecord::String(s) => Value::from(s.as_str()),
        ValueRecord::Symbol(s) => Value::Symbol(Rc::from(s.as_str())),
        ValueRecord::List(items) => Value::list(items.iter().map(load_value).collect()),
    }
}

fn load_kind(record: &KindRecord) -> NodeKind {
    match record {
        KindRecord::Number { value } => NodeKind::Number(*value),
        KindRecord::Text { value } => NodeKind::Text(value.clone()),
        KindRecord::Bool { value } => NodeKind::Bool(*value),
        KindRecord::Pi => NodeKind::Pi,
        KindRecord::Empty => NodeKind::Empty,
        KindRecord::Variable { name } => NodeKind::Variable { name: name.clone() },
        KindRecord::Output { name } => NodeKind::Output { name: name.clone() },
        KindRecord::Builtin { symbol } => NodeKind::Builtin { symbol: symbol.clone() },
        KindRecord::Native { op } => NodeKind::Native(*op),
        KindRecord::If => NodeKind::If,
        KindRecord::Begin => NodeKind::Begin,
        KindRecord::Apply => NodeKind::Apply,
        KindRecord::And => NodeKind::And,
        KindRecord::Or => NodeKind::Or,
        KindRecord::Function { symbol } => NodeKind::Function { symbol: symbol.clone() },
        KindRecord::Breakpoint => NodeKind::Breakpoint,
    }
}

fn load_port(node: Ulid, record: &PortRecord) -> PersistResult<PortData> {
    let port = PortData::new(record.name.clone(), record.description.clone(), record.port_type);
    let Some(default) = &record.default else {
        return Ok(port);
    };
    port.with_default(load_value(default))
        .map_err(|_| PersistError::NotPlainData {
            node,
            port: record.name.clone(),
            kind: "Function",
        })
}

fn check_version(found: u32) -> PersistResult<()> {
    if found != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(())
}

pub fn load_workspace(record: &WorkspaceRecord) -> PersistResult<Workspace> {
    check_version(record.version)?;
    let mut workspace = Workspace::new(record.name.clone());
    for node in &record.nodes {
        let load_ports = |ports: &[PortRecord]| {
            ports
                .iter()
                .map(|port| load_port(node.id, port))
                .collect::<PersistResult<Vec<_>>>()
        };
        let inputs = load_ports(&node.inputs)?;
        let outputs = load_ports(&node.outputs)?;
        workspace.add_node(GraphNode::restore(
            node.id,
            load_kind(&node.kind),
            inputs,
            outputs,
            node.variadic,
        ));
    }
    for conn in &record.connections {
        for id in [conn.from, conn.to] {
            if workspace.node(id).is_none() {
                return Err(PersistError::UnknownNode(id));
            }
        }
        workspace.connect(conn.from, conn.from_port, conn.to, conn.to_port)?;
    }
    Ok(workspace)
}

pub fn save_project(home: &Workspace, registry: &FunctionRegistry) -> PersistResult<ProjectRecord> {
    let functions = registry
        .iter()
        .map(|(symbol, workspace)| {
            Ok(FunctionRecord {
                symbol: symbol.to_string(),
                workspace: save_workspace(workspace)?,
            })
        })
        .collect::<PersistResult<Vec<_>>>()?;
    Ok(ProjectRecord {
        version: FORMAT_VERSION,
        home: save_workspace(home)?,
        functions,
    })
}

pub fn load_project(record: &ProjectRecord) -> PersistResult<(Workspace, FunctionRegistry)> {
    check_version(record.version)?;
    let home = load_workspace(&record.home)?;
    let mut registry = FunctionRegistry::new();
    for function in &record.functions {
        registry.define(function.symbol.clone(), load_workspace(&function.workspace)?);
    }
    Ok((home, registry))
}

pub fn workspace_to_json(workspace: &Workspace) -> PersistResult<String> {
    Ok(serde_json::to_string_pretty(&save_workspace(workspace)?)?)
}

pub fn workspace_from_json(text: &str) -> PersistResult<Workspace> {
    let record: WorkspaceRecord = serde_json::from_str(text)?;
    load_workspace(&record)
}

pub fn project_to_json(home: &Workspace, registry: &FunctionRegistry) -> PersistResult<String> {
    Ok(serde_json::to_string_pretty(&save_project(home, registry)?)?)
}

pub fn project_from_json(text: &str) -> PersistResult<(Workspace, FunctionRegistry)> {
    let record: ProjectRecord = serde_json::from_str(text)?;
    load_project(&record)
}
