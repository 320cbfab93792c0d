//! Catalog and plan composition

pub mod composer;

pub use composer::{compose, decode_definition, decode_user_plans, find_plan};
