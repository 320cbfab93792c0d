//! Service catalog types

mod plan;
mod service;

pub use plan::Plan;
pub use service::ServiceDefinition;
