pub mod compiled;
pub mod engine;
pub mod expression;
pub mod graph;
pub mod persist;
pub mod runtime;
