//! Flow document model and parsing.

pub mod parser;
pub mod schema;

pub use parser::{parse_flow, parse_flow_value};
pub use schema::{BranchSchema, FlowSchema, NodeKind, NodeSchema, VariableDef};
