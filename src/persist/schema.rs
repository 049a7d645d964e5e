//! On-disk records. These are versioned independently of the in-memory types
//! so renaming a Rust type never changes the format.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::graph::{NativeOp, PortType, VariadicRule};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub version: u32,
    pub name: String,
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

/// A home workspace together with every function definition it may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub version: u32,
    pub home: WorkspaceRecord,
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub symbol: String,
    pub workspace: WorkspaceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: Ulid,
    pub kind: KindRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variadic: Option<VariadicRule>,
    pub inputs: Vec<PortRecord>,
    pub outputs: Vec<PortRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KindRecord {
    Number { value: f64 },
    Text { value: String },
    Bool { value: bool },
    Pi,
    Empty,
    Variable { name: String },
    Output { name: String },
    Builtin { symbol: String },
    Native { op: NativeOp },
    If,
    Begin,
    Apply,
    And,
    Or,
    Function { symbol: String },
    Breakpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub port_type: PortType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ValueRecord>,
}

/// Plain data only: functions and host containers cannot be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ValueRecord {
    Number(f64),
    String(String),
    Symbol(String),
    List(Vec<ValueRecord>),
}

/// Output `from_port` of `from` wired into input `to_port` of `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: Ulid,
    pub from_port: usize,
    pub to: Ulid,
    pub to_port: usize,
}
