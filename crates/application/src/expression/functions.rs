//! Built-in functions callable from `${...}` spans
//!
//! Every function is pure and has a fixed arity.

use std::num::IntErrorKind;

use regex::Regex;
use strata_domain::{Value, value_to_template_string};

use crate::error::ExpressionError;

type BuiltinFn = fn(&[Value]) -> Result<Value, ExpressionError>;

/// A callable built-in.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Dotted name used in templates.
    pub name: &'static str,
    /// Number of arguments.
    pub arity: usize,
    call: BuiltinFn,
}

impl Builtin {
    /// Calls the function after checking the argument count.
    ///
    /// # Errors
    /// Returns `ExpressionError::Arity` on a count mismatch, or whatever the
    /// function itself reports.
    pub fn call(&self, args: &[Value]) -> Result<Value, ExpressionError> {
        if args.len() != self.arity {
            return Err(ExpressionError::Arity {
                function: self.name.to_string(),
                expected: self.arity,
                actual: args.len(),
            });
        }
        (self.call)(args)
    }
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "str.truncate",
        arity: 2,
        call: truncate,
    },
    Builtin {
        name: "str.queryEscape",
        arity: 1,
        call: query_escape,
    },
    Builtin {
        name: "str.lower",
        arity: 1,
        call: lower,
    },
    Builtin {
        name: "str.upper",
        arity: 1,
        call: upper,
    },
    Builtin {
        name: "regexp.matches",
        arity: 2,
        call: regexp_matches,
    },
    Builtin {
        name: "assert",
        arity: 2,
        call: assert,
    },
];

/// Finds a built-in by its dotted name.
#[must_use]
pub fn lookup_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn truncate(args: &[Value]) -> Result<Value, ExpressionError> {
    let limit = as_length("str.truncate", 1, &args[0])?;
    let value = value_to_template_string(&args[1]);
    Ok(Value::String(value.chars().take(limit).collect()))
}

fn query_escape(args: &[Value]) -> Result<Value, ExpressionError> {
    let value = value_to_template_string(&args[0]);
    Ok(Value::String(
        url::form_urlencoded::byte_serialize(value.as_bytes()).collect(),
    ))
}

fn lower(args: &[Value]) -> Result<Value, ExpressionError> {
    Ok(Value::String(value_to_template_string(&args[0]).to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value, ExpressionError> {
    Ok(Value::String(value_to_template_string(&args[0]).to_uppercase()))
}

fn regexp_matches(args: &[Value]) -> Result<Value, ExpressionError> {
    let pattern = value_to_template_string(&args[0]);
    let regex = Regex::new(&pattern).map_err(|e| ExpressionError::InvalidPattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;
    Ok(Value::Bool(
        regex.is_match(&value_to_template_string(&args[1])),
    ))
}

fn assert(args: &[Value]) -> Result<Value, ExpressionError> {
    if as_bool("assert", 1, &args[0])? {
        Ok(Value::Bool(true))
    } else {
        Err(ExpressionError::AssertionFailed(value_to_template_string(
            &args[1],
        )))
    }
}

/// Lengths beyond `usize::MAX` saturate, so an oversized limit keeps the whole string.
fn as_length(function: &str, position: usize, value: &Value) -> Result<usize, ExpressionError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().map_or_else(
            || n.as_f64().and_then(saturating_length),
            |n| Some(usize::try_from(n).unwrap_or(usize::MAX)),
        ),
        Value::String(s) => match s.trim().parse::<usize>() {
            Ok(n) => Some(n),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(usize::MAX),
            Err(_) => None,
        },
        _ => None,
    };

    parsed.ok_or_else(|| ExpressionError::ArgumentType {
        function: function.to_string(),
        position,
        reason: format!("must be a non-negative integer, got {value}"),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturating_length(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0).then(|| n as usize)
}

fn as_bool(function: &str, position: usize, value: &Value) -> Result<bool, ExpressionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(ExpressionError::ArgumentType {
            function: function.to_string(),
            position,
            reason: format!("must be a boolean, got {other}"),
        }),
    }
}
