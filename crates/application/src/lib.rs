//! Strata Application - Resolution engine and catalog composition
//!
//! This crate turns the data model of `strata-domain` into behavior:
//!
//! - [`expression`]: the `${...}` template language and its built-in functions
//! - [`resolver`]: overlay merging and two-phase variable resolution
//! - [`catalog`]: service definition composition and plan validation
//! - [`broker`]: a per-service façade reading operator settings
//!
//! Every operation is a pure function of its inputs apart from `tracing`
//! output, so resolvers and services can be shared across threads.

pub mod broker;
pub mod catalog;
pub mod error;
pub mod expression;
pub mod resolver;

pub use broker::BrokerService;
pub use catalog::{compose, decode_user_plans, find_plan};
pub use error::{
    ApplicationError, ApplicationResult, ExpressionError, FieldViolation, SchemaError,
    ViolationKind,
};
pub use expression::{Evaluator, evaluate};
pub use resolver::{ContextResolver, merge_raw, resolve};
