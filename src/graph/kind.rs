use crate::graph::{
    natives::NativeOp,
    port::{PortData, PortType},
};

/// What a node is and therefore how it compiles.
///
/// Capabilities that cut across kinds (variable input count) live on the node
/// itself, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Number(f64),
    Text(String),
    Bool(bool),
    Pi,
    /// The empty list.
    Empty,
    /// A parameter of the function workspace it sits in.
    Variable { name: String },
    /// A result of the function workspace it sits in.
    Output { name: String },
    /// Curried call to a builtin bound in the global environment.
    Builtin { symbol: String },
    Native(NativeOp),
    If,
    /// Runs every input in order and yields the last.
    Begin,
    /// Calls the function on `func` with the remaining inputs.
    Apply,
    And,
    Or,
    /// Call to a user-defined function in the registry.
    Function { symbol: String },
    Breakpoint,
}

impl NodeKind {
    pub fn label(&self) -> String {
        match self {
            NodeKind::Number(_) => "Number".to_string(),
            NodeKind::Text(_) => "String".to_string(),
            NodeKind::Bool(_) => "Boolean".to_string(),
            NodeKind::Pi => "Pi".to_string(),
            NodeKind::Empty => "Empty".to_string(),
            NodeKind::Variable { name } => name.clone(),
            NodeKind::Output { name } => name.clone(),
            NodeKind::Builtin { symbol } => builtin_spec(symbol)
                .map(|spec| spec.label.to_string())
                .unwrap_or_else(|| symbol.clone()),
            NodeKind::Native(op) => op.label().to_string(),
            NodeKind::If => "If".to_string(),
            NodeKind::Begin => "Perform All".to_string(),
            NodeKind::Apply => "Apply".to_string(),
            NodeKind::And => "And".to_string(),
            NodeKind::Or => "Or".to_string(),
            NodeKind::Function { symbol } => symbol.clone(),
            NodeKind::Breakpoint => "Debug Breakpoint".to_string(),
        }
    }

    /// Kinds that fail to build unless every input is connected or defaulted.
    pub fn requires_all_inputs(&self) -> bool {
        matches!(
            self,
            NodeKind::If
                | NodeKind::Begin
                | NodeKind::Apply
                | NodeKind::Output { .. }
                | NodeKind::Breakpoint
        )
    }

    /// Constant and interface nodes whose own result never goes stale.
    pub fn is_never_dirty(&self) -> bool {
        matches!(
            self,
            NodeKind::Pi | NodeKind::Empty | NodeKind::Variable { .. } | NodeKind::Output { .. }
        )
    }

    pub fn is_always_dirty(&self) -> bool {
        matches!(self, NodeKind::Native(op) if op.is_volatile())
    }

    pub fn function_symbol(&self) -> Option<&str> {
        match self {
            NodeKind::Function { symbol } => Some(symbol),
            _ => None,
        }
    }
}

/// Catalogue entry for a builtin node: display label, input ports and output.
pub struct BuiltinSpec {
    pub symbol: &'static str,
    pub label: &'static str,
    pub inputs: &'static [(&'static str, &'static str, PortType)],
    pub output: (&'static str, PortType),
}

const fn spec(
    symbol: &'static str,
    label: &'static str,
    inputs: &'static [(&'static str, &'static str, PortType)],
    output: (&'static str, PortType),
) -> BuiltinSpec {
    BuiltinSpec {
        symbol,
        label,
        inputs,
        output,
    }
}

const XY: &[(&str, &str, PortType)] = &[
    ("x", "operand", PortType::Number),
    ("y", "operand", PortType::Number),
];
const AB: &[(&str, &str, PortType)] = &[
    ("a", "operand", PortType::Bool),
    ("b", "operand", PortType::Bool),
];
const SEQ: &[(&str, &str, PortType)] = &[("seq", "A list", PortType::List)];
const NUM: (&str, PortType) = ("n", PortType::Number);
const BOOL: (&str, PortType) = ("b", PortType::Bool);
const LIST: (&str, PortType) = ("seq", PortType::List);

// Port names never shadow a builtin: curried lambdas bind them as parameters.
pub static BUILTIN_NODES: &[BuiltinSpec] = &[
    spec("+", "Add", XY, NUM),
    spec("-", "Subtract", XY, NUM),
    spec("*", "Multiply", XY, NUM),
    spec("/", "Divide", XY, NUM),
    spec("%", "Modulo", XY, NUM),
    spec("pow", "Power", XY, NUM),
    spec("<", "Less Than", XY, BOOL),
    spec("<=", "Less Than Or Equal", XY, BOOL),
    spec(">", "Greater Than", XY, BOOL),
    spec(">=", "Greater Than Or Equal", XY, BOOL),
    spec("=", "Equal", &[("x", "operand", PortType::Any), ("y", "operand", PortType::Any)], BOOL),
    spec("xor", "Xor", AB, BOOL),
    spec("not", "Not", &[("a", "operand", PortType::Bool)], BOOL),
    spec("identity", "Identity", &[("x", "Any value", PortType::Any)], ("x", PortType::Any)),
    spec("list", "List", &[("item(s)", "Item", PortType::Any)], LIST),
    spec(
        "cons",
        "Cons",
        &[("item", "New head", PortType::Any), ("seq", "Tail", PortType::List)],
        LIST,
    ),
    spec("first", "First", SEQ, ("item", PortType::Any)),
    spec("rest", "Rest", SEQ, LIST),
    spec("empty?", "Is Empty?", SEQ, BOOL),
    spec("len", "Length", SEQ, NUM),
    spec(
        "append",
        "Append",
        &[("seq1", "First list", PortType::List), ("seq2", "Second list", PortType::List)],
        LIST,
    ),
    spec(
        "take",
        "Take",
        &[("amt", "Amount", PortType::Number), ("seq", "A list", PortType::List)],
        LIST,
    ),
    spec(
        "drop",
        "Drop",
        &[("amt", "Amount", PortType::Number), ("seq", "A list", PortType::List)],
        LIST,
    ),
    spec(
        "get",
        "Get",
        &[("index", "Position", PortType::Number), ("seq", "A list", PortType::List)],
        ("item", PortType::Any),
    ),
    spec("reverse", "Reverse", SEQ, LIST),
    spec("sort", "Sort", SEQ, LIST),
    spec(
        "sort-by",
        "Sort By",
        &[("seq", "A list", PortType::List), ("key(x)", "Key mapper", PortType::Function)],
        LIST,
    ),
    spec(
        "sort-with",
        "Sort With",
        &[("seq", "A list", PortType::List), ("c(x, y)", "Comparator", PortType::Function)],
        LIST,
    ),
    spec(
        "map",
        "Map",
        &[("f(x)", "Procedure", PortType::Function), ("seq", "A list", PortType::List)],
        LIST,
    ),
    spec(
        "foldl",
        "Reduce",
        &[
            ("f(x, a)", "Reductor", PortType::Function),
            ("a", "Accumulator", PortType::Any),
            ("seq", "A list", PortType::List),
        ],
        ("a", PortType::Any),
    ),
    spec(
        "filter",
        "Filter",
        &[("p(x)", "Predicate", PortType::Function), ("seq", "A list", PortType::List)],
        LIST,
    ),
    spec(
        "build-list",
        "Build Sequence",
        &[
            ("start", "Number to start at", PortType::Number),
            ("end", "Number to end at", PortType::Number),
            ("step", "Space between numbers", PortType::Number),
        ],
        LIST,
    ),
    spec(
        "cartesian-product",
        "Cartesian Product",
        &[
            ("comb", "Combinator", PortType::Function),
            ("list1", "List", PortType::List),
            ("list2", "List", PortType::List),
        ],
        LIST,
    ),
    spec(
        "concat-strings",
        "Concatenate Strings",
        &[("s1", "String", PortType::String), ("s2", "String", PortType::String)],
        ("str", PortType::String),
    ),
    spec(
        "string->num",
        "String to Number",
        &[("str", "A string", PortType::String)],
        NUM,
    ),
    spec(
        "num->string",
        "Number to String",
        &[("n", "A number", PortType::Number)],
        ("str", PortType::String),
    ),
];

pub fn builtin_spec(symbol: &str) -> Option<&'static BuiltinSpec> {
    BUILTIN_NODES.iter().find(|spec| spec.symbol == symbol)
}

impl BuiltinSpec {
    pub fn input_ports(&self) -> Vec<PortData> {
        self.inputs
            .iter()
            .map(|(name, desc, ty)| PortData::new(*name, *desc, *ty))
            .collect()
    }

    pub fn output_port(&self) -> PortData {
        PortData::new(self.output.0, self.label, self.output.1)
    }
}
