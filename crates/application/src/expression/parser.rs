//! Template parser for `${...}` syntax
//!
//! Splits a template into literal text and parsed expressions.

use crate::error::ExpressionError;

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim.
    Text(String),
    /// A `${...}` span.
    Expr(Expr),
}

/// The content of one `${...}` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A bare variable reference. It must resolve.
    Reference(String),
    /// A function call such as `str.truncate(10, location)`.
    Call {
        /// Dotted function name.
        function: String,
        /// Raw arguments.
        args: Vec<Argument>,
    },
}

/// One function call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// A double-quoted string literal.
    Quoted(String),
    /// A raw token: a variable name if one exists, a literal otherwise.
    Token(String),
    /// A nested call.
    Nested(Expr),
}

/// Parses a template into segments.
///
/// `$${` is an escape for a literal `${`.
///
/// # Errors
/// Returns `ExpressionError::Unterminated` for an unclosed span and
/// `ExpressionError::Syntax` for a malformed expression.
pub fn parse_template(template: &str) -> Result<Vec<Segment>, ExpressionError> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(idx) = rest.find("${") {
        // $${ escapes the span
        if idx > 0 && rest.as_bytes()[idx - 1] == b'$' {
            text.push_str(&rest[..idx - 1]);
            text.push_str("${");
            rest = &rest[idx + 2..];
            offset += idx + 2;
            continue;
        }

        text.push_str(&rest[..idx]);
        let body_start = idx + 2;
        let body_len = find_closing_brace(&rest[body_start..])
            .ok_or(ExpressionError::Unterminated(offset + idx))?;
        let body = &rest[body_start..body_start + body_len];

        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }
        segments.push(Segment::Expr(parse_expression(body)?));

        let consumed = body_start + body_len + 1;
        rest = &rest[consumed..];
        offset += consumed;
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    Ok(segments)
}

/// Returns the byte index of the `}` closing a span body, skipping quoted strings.
fn find_closing_brace(body: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;

    for (i, ch) in body.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '}' if !in_quote => return Some(i),
            _ => {}
        }
    }

    None
}

/// Parses the text between `${` and `}`.
///
/// # Errors
/// Returns `ExpressionError::Syntax` if the text is not a reference or call.
pub fn parse_expression(source: &str) -> Result<Expr, ExpressionError> {
    let mut parser = Parser { source, pos: 0 };
    let expr = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos < source.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, reason: &str) -> ExpressionError {
        ExpressionError::Syntax {
            expression: self.source.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn identifier(&mut self) -> &str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    fn expression(&mut self) -> Result<Expr, ExpressionError> {
        self.skip_whitespace();
        let name = self.identifier().to_string();
        if name.is_empty() {
            return Err(self.error("expected a variable or function name"));
        }

        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.bump();
            let args = self.arguments()?;
            return Ok(Expr::Call {
                function: name,
                args,
            });
        }

        Ok(Expr::Reference(name))
    }

    /// Parses arguments after `(` up to and including `)`.
    fn arguments(&mut self) -> Result<Vec<Argument>, ExpressionError> {
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(args);
        }

        loop {
            args.push(self.argument()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(')') => return Ok(args),
                Some(_) => return Err(self.error("expected ',' or ')'")),
                None => return Err(self.error("unclosed argument list")),
            }
        }
    }

    fn argument(&mut self) -> Result<Argument, ExpressionError> {
        self.skip_whitespace();
        if self.peek() == Some('"') {
            self.bump();
            return self.quoted().map(Argument::Quoted);
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, ',' | '(' | ')' | '"'))
        {
            self.bump();
        }
        let token = self.source[start..self.pos].to_string();
        if token.is_empty() {
            return Err(self.error("empty argument"));
        }

        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.bump();
            let args = self.arguments()?;
            return Ok(Argument::Nested(Expr::Call {
                function: token,
                args,
            }));
        }

        Ok(Argument::Token(token))
    }

    /// Reads a quoted string after the opening quote.
    fn quoted(&mut self) -> Result<String, ExpressionError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("unterminated string literal")),
                },
                Some(ch) => value.push(ch),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }
}
