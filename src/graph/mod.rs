//! Editable node graphs and their lowering to compiled nodes.
//!
//! A [`GraphNode`] has named input and output ports; each input is either
//! unconnected or wired to one output of another node. Workspaces own nodes,
//! the [`FunctionRegistry`] maps user function symbols to their workspaces,
//! [`build`] compiles a requested output, and [`dirty`] answers whether a
//! cached result is still valid.

pub mod build;
pub mod dirty;
pub mod error;
pub mod kind;
pub mod natives;
pub mod node;
pub mod port;
pub mod registry;
pub mod variadic;
pub mod workspace;

pub use build::{Builder, compile_function, variable_symbol};
pub use error::{GraphError, GraphResult};
pub use kind::NodeKind;
pub use natives::NativeOp;
pub use node::{Connection, GraphNode, NodeId};
pub use port::{PortData, PortType};
pub use registry::FunctionRegistry;
pub use variadic::{Variadic, VariadicRule};
pub use workspace::Workspace;
