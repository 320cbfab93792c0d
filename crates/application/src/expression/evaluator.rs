//! Expression evaluator
//!
//! Evaluates parsed templates against a variable mapping. Evaluation never
//! mutates the mapping.

use strata_domain::{Value, ValueMap, value_to_template_string};

use super::functions::lookup_builtin;
use super::parser::{Argument, Expr, Segment, parse_template};
use crate::error::ExpressionError;

/// Evaluates a template against a variable mapping.
///
/// # Errors
/// Returns an `ExpressionError` if the template is malformed, references an
/// unresolved variable or calls a function incorrectly.
pub fn evaluate(template: &str, variables: &ValueMap) -> Result<String, ExpressionError> {
    Evaluator::new(variables).evaluate(template)
}

/// Evaluates templates against borrowed variables and optional constants.
///
/// Variables shadow constants of the same name.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    variables: &'a ValueMap,
    constants: Option<&'a ValueMap>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over a variable mapping.
    #[must_use]
    pub const fn new(variables: &'a ValueMap) -> Self {
        Self {
            variables,
            constants: None,
        }
    }

    /// Adds evaluation-only constants.
    #[must_use]
    pub const fn with_constants(mut self, constants: &'a ValueMap) -> Self {
        self.constants = Some(constants);
        self
    }

    /// Evaluates a template to its string result.
    ///
    /// # Errors
    /// See [`evaluate`].
    pub fn evaluate(&self, template: &str) -> Result<String, ExpressionError> {
        let segments = parse_template(template)?;
        let mut result = String::with_capacity(template.len());

        for segment in &segments {
            match segment {
                Segment::Text(text) => result.push_str(text),
                Segment::Expr(expr) => {
                    result.push_str(&value_to_template_string(&self.evaluate_expr(expr)?));
                }
            }
        }

        Ok(result)
    }

    /// Evaluates one span expression to a value.
    ///
    /// # Errors
    /// See [`evaluate`].
    pub fn evaluate_expr(&self, expr: &Expr) -> Result<Value, ExpressionError> {
        match expr {
            Expr::Reference(name) => self
                .lookup(name)
                .cloned()
                .ok_or_else(|| ExpressionError::UndefinedVariable(name.clone())),
            Expr::Call { function, args } => {
                let builtin = lookup_builtin(function)
                    .ok_or_else(|| ExpressionError::UnknownFunction(function.clone()))?;
                let values = args
                    .iter()
                    .map(|arg| self.evaluate_argument(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                builtin.call(&values)
            }
        }
    }

    fn evaluate_argument(&self, arg: &Argument) -> Result<Value, ExpressionError> {
        match arg {
            Argument::Quoted(text) => Ok(Value::String(text.clone())),
            Argument::Nested(expr) => self.evaluate_expr(expr),
            Argument::Token(token) => Ok(self
                .lookup(token)
                .cloned()
                .unwrap_or_else(|| literal(token))),
        }
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.variables
            .get(name)
            .or_else(|| self.constants.and_then(|constants| constants.get(name)))
    }
}

/// Interprets an unresolved token as a number, boolean or string literal.
fn literal(token: &str) -> Value {
    if let Ok(int) = token.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(number) = token
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(number);
    }
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(token.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(pairs: &[(&str, Value)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_no_spans_is_verbatim() {
        assert_eq!(evaluate("us", &ValueMap::new()).unwrap(), "us");
    }

    #[test]
    fn test_reference() {
        let vars = ctx(&[("location", json!("eu"))]);
        assert_eq!(evaluate("name-${location}", &vars).unwrap(), "name-eu");
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let vars = ctx(&[("count", json!(3)), ("flag", json!(false))]);
        assert_eq!(evaluate("${count}/${flag}", &vars).unwrap(), "3/false");
    }

    #[test]
    fn test_undefined_reference_fails() {
        assert_eq!(
            evaluate("name-${location}", &ValueMap::new()).unwrap_err(),
            ExpressionError::UndefinedVariable("location".into())
        );
    }

    #[test]
    fn test_call_resolves_token_against_context() {
        let vars = ctx(&[("location", json!("averylonglocation"))]);
        assert_eq!(
            evaluate("${str.truncate(10, location)}", &vars).unwrap(),
            "averylongl"
        );
    }

    #[test]
    fn test_unknown_token_argument_is_literal() {
        assert_eq!(
            evaluate("${str.truncate(3, abcdef)}", &ValueMap::new()).unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_context_token_shadows_literal_number() {
        let vars = ctx(&[("limit", json!(2))]);
        assert_eq!(
            evaluate(r#"${str.truncate(limit, "xyz")}"#, &vars).unwrap(),
            "xy"
        );
    }

    #[test]
    fn test_oversized_literal_limit_keeps_value() {
        let vars = ctx(&[("location", json!("averylonglocation"))]);
        assert_eq!(
            evaluate("${str.truncate(99999999999999999999, location)}", &vars).unwrap(),
            "averylonglocation"
        );
    }

    #[test]
    fn test_nested_call() {
        let vars = ctx(&[("name", json!("My-Instance"))]);
        assert_eq!(
            evaluate("${str.truncate(4, str.lower(name))}", &vars).unwrap(),
            "my-i"
        );
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            evaluate("${str.reverse(x)}", &ValueMap::new()).unwrap_err(),
            ExpressionError::UnknownFunction("str.reverse".into())
        );
    }

    #[test]
    fn test_assert_guards_template() {
        let vars = ctx(&[("name", json!("toolong"))]);
        let template = r#"${assert(regexp.matches("^.{0,4}$", name), "name is too long")}"#;
        assert_eq!(
            evaluate(template, &vars).unwrap_err(),
            ExpressionError::AssertionFailed("name is too long".into())
        );
    }

    #[test]
    fn test_constants_are_visible_and_shadowed() {
        let vars = ctx(&[("shadowed", json!("variable"))]);
        let constants = ctx(&[
            ("request.instance_id", json!("instance-id-here")),
            ("shadowed", json!("constant")),
        ]);
        let evaluator = Evaluator::new(&vars).with_constants(&constants);

        assert_eq!(
            evaluator
                .evaluate("${request.instance_id}:${shadowed}")
                .unwrap(),
            "instance-id-here:variable"
        );
    }

    #[test]
    fn test_literal_tokens() {
        assert_eq!(literal("10"), json!(10));
        assert_eq!(literal("2.5"), json!(2.5));
        assert_eq!(literal("true"), json!(true));
        assert_eq!(literal("eu"), json!("eu"));
    }
}
