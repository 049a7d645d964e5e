use serde::{Deserialize, Serialize};

use crate::runtime::{error::EvalResult, value::Value};

/// Advisory type of the values a port carries. Never enforced at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    #[default]
    Any,
    Number,
    String,
    Bool,
    List,
    Function,
    Container,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortData {
    pub name: String,
    pub description: String,
    pub port_type: PortType,
    default: Option<Value>,
}

impl PortData {
    pub fn new(name: impl Into<String>, description: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            port_type,
            default: None,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, PortType::Any)
    }

    /// Attaches a value used when the port is left unconnected.
    ///
    /// Defaults end up in persisted graphs, so they must be plain data.
    pub fn with_default(mut self, value: Value) -> EvalResult<Self> {
        value.ensure_plain_data()?;
        self.default = Some(value);
        Ok(self)
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}
