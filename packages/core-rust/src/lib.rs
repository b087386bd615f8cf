//! `RecordGate` Core: domain normalization, schema-driven validation, and message types.
//!
//! Everything here is pure and synchronous. Remote calls live in `recordgate-server`.

pub mod domain;
pub mod messages;
pub mod schema;
pub mod values;

pub use domain::{
    check, check_input, filter_elements, normalize, Condition, Domain, DomainElement,
    DomainReport, LogicalOp, Operator,
};
pub use messages::{Record, ToolResponse};
pub use schema::{FieldDef, FieldType, ModelSchema, SelectionOption};
pub use values::validate_values;

