//! Variable-arity input ports as a capability attached to a node.
//!
//! A node with a [`Variadic`] keeps a fixed prefix of ports (`comb` on a
//! Combine node, `func` on an Apply node) followed by a run of numbered ports.
//! Port names are a pure function of the rule and the current count, so adding,
//! removing, saving and reloading always yield the same names.

use serde::{Deserialize, Serialize};

use crate::graph::port::PortData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariadicRule {
    /// `item(s)` alone, otherwise `index0`, `index1`, ...
    List,
    /// `comb` then `lists` alone, otherwise `list1`, `list2`, ...
    Combine,
    /// `s1`, `s2`, ...
    Concat,
    /// `expr1`, `expr2`, ...
    Sequence,
    /// `func` then `arg1`, `arg2`, ...
    Apply,
}

struct Naming {
    prefix: usize,
    root: &'static str,
    first_index: usize,
    singular: Option<&'static str>,
    min_ports: usize,
    description: &'static str,
}

impl VariadicRule {
    fn naming(self) -> Naming {
        match self {
            VariadicRule::List => Naming {
                prefix: 0,
                root: "index",
                first_index: 0,
                singular: Some("item(s)"),
                min_ports: 1,
                description: "Item",
            },
            VariadicRule::Combine => Naming {
                prefix: 1,
                root: "list",
                first_index: 1,
                singular: Some("lists"),
                min_ports: 2,
                description: "List",
            },
            VariadicRule::Concat => Naming {
                prefix: 0,
                root: "s",
                first_index: 1,
                singular: None,
                min_ports: 2,
                description: "String",
            },
            VariadicRule::Sequence => Naming {
                prefix: 0,
                root: "expr",
                first_index: 1,
                singular: None,
                min_ports: 2,
                description: "Expression",
            },
            VariadicRule::Apply => Naming {
                prefix: 1,
                root: "arg",
                first_index: 1,
                singular: None,
                min_ports: 1,
                description: "Argument",
            },
        }
    }

    /// Fewest input ports the node may have, fixed prefix included.
    pub fn min_ports(self) -> usize {
        self.naming().min_ports
    }

    /// Name of the input port at `index` when the node has `total` inputs.
    pub fn port_name(self, index: usize, total: usize) -> String {
        let naming = self.naming();
        let variable = total.saturating_sub(naming.prefix);
        let position = index - naming.prefix;
        match naming.singular {
            Some(singular) if variable == 1 => singular.to_string(),
            _ => format!("{}{}", naming.root, naming.first_index + position),
        }
    }

    /// Rewrites the names of the numbered ports in place.
    pub fn rename(self, inputs: &mut [PortData]) {
        let naming = self.naming();
        let total = inputs.len();
        for (index, port) in inputs.iter_mut().enumerate().skip(naming.prefix) {
            port.name = self.port_name(index, total);
        }
    }

    pub fn new_port(self, index: usize, total: usize) -> PortData {
        let name = self.port_name(index, total);
        PortData::new(name, self.naming().description, Default::default())
    }
}

/// Attached to nodes whose input count can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variadic {
    pub rule: VariadicRule,
    /// Input count at the last successful evaluation.
    pub last_evaluated: Option<usize>,
}

impl Variadic {
    pub fn new(rule: VariadicRule) -> Self {
        Self {
            rule,
            last_evaluated: None,
        }
    }

    /// Dirty when ports were added or removed since the last evaluation.
    pub fn count_changed(&self, current: usize) -> bool {
        self.last_evaluated != Some(current)
    }
}
