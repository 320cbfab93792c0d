//! Strata Domain - Core data types
//!
//! This crate defines the data model of the variable-context engine:
//! variable schemas, overlays, the resolved context and the service catalog.
//! All types here are pure Rust with no I/O dependencies.

pub mod catalog;
pub mod context;
pub mod error;
pub mod overlay;
pub mod settings;
pub mod variable;

pub use catalog::{Plan, ServiceDefinition};
pub use context::VariableContext;
pub use error::{DomainError, DomainResult};
pub use overlay::{Overlay, OverlayKind, OverlaySet, ValueMap, value_to_template_string};
pub use serde_json::Value;
pub use settings::{BrokerSettings, service_property};
pub use variable::{Schema, VariableSpec, VariableType, is_valid_variable_name};
