//! Template expression language
//!
//! Templates are literal text with `${...}` spans. A span holds either a
//! bare variable reference or a dotted function call.
//!
//! # Usage
//!
//! ```
//! use strata_application::expression::evaluate;
//! use strata_domain::{ValueMap, Value};
//!
//! let mut ctx = ValueMap::new();
//! ctx.insert("location".to_string(), Value::from("averylonglocation"));
//!
//! let result = evaluate("name-${str.truncate(10, location)}", &ctx).unwrap();
//! assert_eq!(result, "name-averylongl");
//! ```

pub mod evaluator;
pub mod functions;
pub mod parser;

pub use evaluator::{Evaluator, evaluate};
pub use functions::{Builtin, lookup_builtin};
pub use parser::{Argument, Expr, Segment, parse_template};
