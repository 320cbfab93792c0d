//! Variable declarations and schemas

mod schema;
mod spec;

pub use schema::{Schema, is_valid_variable_name};
pub use spec::{VariableSpec, VariableType};
