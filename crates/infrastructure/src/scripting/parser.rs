//! Script parser for the Courier DSL.
//!
//! A script is a sequence of function calls separated by newlines or `;`:
//!
//! - `setHeader("Authorization", "Bearer " + getContext("token"))`
//! - `setUrl(url + "?page=2")`, `setBody("{}")`
//! - `setContext("userId", getResponseValue("data.id"))`
//! - `log(statusCode)` / `console.log(responseText)`
//!
//! Arguments are expressions built from string, number, boolean and null
//! literals, identifiers, property and index access, nested calls, and `+`.
//! Every name may carry a `ctx.` prefix. `//` and `#` start a comment that
//! runs to the end of the line.

use courier_domain::{Expr, Statement};
use serde_json::Value;
use thiserror::Error;

/// Error type for script parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptParseError {
    /// A string literal is missing its closing quote.
    #[error("Unterminated string at line {line}")]
    UnterminatedString {
        /// The line where the string starts.
        line: usize,
    },
    /// A character that is not part of the language.
    #[error("Unexpected character '{ch}' at line {line}")]
    UnexpectedCharacter {
        /// The line number where the error occurred.
        line: usize,
        /// The offending character.
        ch: char,
    },
    /// Invalid syntax.
    #[error("Invalid syntax at line {line}: {message}")]
    InvalidSyntax {
        /// The line number where the error occurred.
        line: usize,
        /// The error message.
        message: String,
    },
    /// A statement that is not a function call.
    #[error("Expected a function call at line {line}")]
    NotACall {
        /// The line number where the statement starts.
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Dot,
    Comma,
    Plus,
    Minus,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Separator,
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    line: usize,
}

/// Parse a script into a list of statements.
///
/// # Errors
///
/// Returns an error if the script contains invalid syntax.
pub fn parse_script(script: &str) -> Result<Vec<Statement>, ScriptParseError> {
    let tokens = tokenize(script)?;
    Parser { tokens, pos: 0, nesting: 0 }.statements()
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, ScriptParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        let token = match ch {
            '\n' => {
                let token = Token::Separator;
                tokens.push(Spanned { token, line });
                line += 1;
                continue;
            }
            c if c.is_whitespace() => continue,
            '#' => {
                while chars.next_if(|c| *c != '\n').is_some() {}
                continue;
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|c| *c != '\n').is_some() {}
                continue;
            }
            ';' => Token::Separator,
            '.' => Token::Dot,
            ',' => Token::Comma,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '"' | '\'' | '`' => {
                let start = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ScriptParseError::UnterminatedString { line: start }),
                        Some(c) if c == ch => break,
                        Some('\\') => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some('r') => text.push('\r'),
                            Some('0') => text.push('\0'),
                            Some(other) => text.push(other),
                            None => {
                                return Err(ScriptParseError::UnterminatedString { line: start });
                            }
                        },
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            text.push(c);
                        }
                    }
                }
                Token::Str(text)
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::from(c);
                while let Some(d) = chars.next_if(|d| d.is_ascii_digit() || *d == '.') {
                    digits.push(d);
                }
                let value = digits.parse::<f64>().map_err(|_| ScriptParseError::InvalidSyntax {
                    line,
                    message: format!("Invalid number '{digits}'"),
                })?;
                Token::Num(value)
            }
            c if is_ident_start(c) => {
                let mut name = String::from(c);
                while let Some(d) = chars.next_if(|d| is_ident_start(*d) || d.is_ascii_digit()) {
                    name.push(d);
                }
                Token::Ident(name)
            }
            other => return Err(ScriptParseError::UnexpectedCharacter { line, ch: other }),
        };
        tokens.push(Spanned { token, line });
    }

    Ok(tokens)
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

/// Converts a parsed number into a JSON value, keeping integers integral.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Depth of open parentheses and brackets; separators are ignored inside.
    nesting: usize,
}

impl Parser {
    fn statements(mut self) -> Result<Vec<Statement>, ScriptParseError> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&Token::Separator) {}
            let Some(line) = self.line() else {
                break;
            };

            let call = self.expression()?;
            if !matches!(call, Expr::Call { .. }) {
                return Err(ScriptParseError::NotACall { line });
            }
            statements.push(Statement { line, call });

            if let Some(found) = self.peek().filter(|t| **t != Token::Separator).map(describe) {
                return Err(self.syntax(format!("Unexpected {found} after statement")));
            }
        }
        Ok(statements)
    }

    fn expression(&mut self) -> Result<Expr, ScriptParseError> {
        let mut left = self.postfix()?;
        while self.eat(&Token::Plus) {
            self.skip_separators();
            let right = self.postfix()?;
            left = Expr::Add(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn postfix(&mut self) -> Result<Expr, ScriptParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let property = self.ident()?;
                expr = match expr {
                    Expr::Ident(object) if object == "ctx" => Expr::Ident(property),
                    object => Expr::Member {
                        object: Box::new(object),
                        property,
                    },
                };
            } else if self.eat(&Token::LBracket) {
                self.nesting += 1;
                let index = self.expression()?;
                self.expect(&Token::RBracket)?;
                self.nesting -= 1;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&Token::LParen) {
                let Some(name) = callee_name(&expr) else {
                    return Err(self.syntax("Only named functions can be called".to_string()));
                };
                self.nesting += 1;
                let args = self.arguments()?;
                self.nesting -= 1;
                expr = Expr::Call { name, args };
            } else {
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ScriptParseError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma)?;
        }
    }

    fn primary(&mut self) -> Result<Expr, ScriptParseError> {
        let Some(token) = self.advance() else {
            return Err(self.syntax("Unexpected end of script".to_string()));
        };
        match token {
            Token::Str(text) => Ok(Expr::Literal(Value::String(text))),
            Token::Num(value) => Ok(Expr::Literal(number(value))),
            Token::Minus => match self.advance() {
                Some(Token::Num(value)) => Ok(Expr::Literal(number(-value))),
                _ => Err(self.syntax("Expected a number after '-'".to_string())),
            },
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name),
            }),
            Token::LParen => {
                self.nesting += 1;
                let inner = self.expression()?;
                self.expect(&Token::RParen)?;
                self.nesting -= 1;
                Ok(inner)
            }
            other => Err(self.syntax(format!("Unexpected {}", describe(&other)))),
        }
    }

    fn ident(&mut self) -> Result<String, ScriptParseError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.syntax("Expected a property name after '.'".to_string())),
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ScriptParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            let found = self.peek().map_or("end of script", describe);
            Err(self.syntax(format!("Expected {} but found {found}", describe(token))))
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<Token> {
        self.peek()?;
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        self.pos += 1;
        token
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.nesting > 0 {
            self.skip_separators();
        }
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn skip_separators(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|s| s.token == Token::Separator)
        {
            self.pos += 1;
        }
    }

    fn line(&self) -> Option<usize> {
        self.tokens.get(self.pos).map(|s| s.line)
    }

    fn syntax(&self, message: String) -> ScriptParseError {
        let line = self
            .tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(1, |s| s.line);
        ScriptParseError::InvalidSyntax { line, message }
    }
}

fn callee_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Member { object, property } => Some(format!("{}.{property}", callee_name(object)?)),
        _ => None,
    }
}

const fn describe(token: &Token) -> &'static str {
    match token {
        Token::Ident(_) => "identifier",
        Token::Str(_) => "string",
        Token::Num(_) => "number",
        Token::Dot => "'.'",
        Token::Comma => "','",
        Token::Plus => "'+'",
        Token::Minus => "'-'",
        Token::LParen => "'('",
        Token::RParen => "')'",
        Token::LBracket => "'['",
        Token::RBracket => "']'",
        Token::Separator => "end of statement",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lit(value: Value) -> Expr {
        Expr::Literal(value)
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_parse_set_header() {
        let statements = parse_script(r#"setHeader("X-Custom", "value")"#).unwrap();
        assert_eq!(
            statements,
            vec![Statement {
                line: 1,
                call: call("setHeader", vec![lit(json!("X-Custom")), lit(json!("value"))]),
            }]
        );
    }

    #[test]
    fn test_parse_multiple_statements_with_comments() {
        let script = r#"
            // leading comment
            setContext("a", 1); setContext('b', true)
            # hash comment
            log("done")
        "#;
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0].line, 3);
        assert_eq!(statements[1].line, 3);
        assert_eq!(statements[2].line, 5);
        assert_eq!(statements[1].call, call("setContext", vec![lit(json!("b")), lit(json!(true))]));
    }

    #[test]
    fn test_parse_concatenation_and_nested_calls() {
        let statements =
            parse_script(r#"setHeader("Authorization", "Bearer " + getContext("token"))"#).unwrap();
        assert_eq!(
            statements[0].call,
            call(
                "setHeader",
                vec![
                    lit(json!("Authorization")),
                    Expr::Add(
                        Box::new(lit(json!("Bearer "))),
                        Box::new(call("getContext", vec![lit(json!("token"))])),
                    ),
                ],
            )
        );
    }

    #[test]
    fn test_ctx_prefix_is_stripped() {
        let statements = parse_script("ctx.setUrl(ctx.url + '/v2')").unwrap();
        assert_eq!(
            statements[0].call,
            call(
                "setUrl",
                vec![Expr::Add(
                    Box::new(Expr::Ident("url".to_string())),
                    Box::new(lit(json!("/v2"))),
                )],
            )
        );
    }

    #[test]
    fn test_console_log_keeps_dotted_name() {
        let statements = parse_script("console.log(response.data[0])").unwrap();
        let Expr::Call { name, args } = &statements[0].call else {
            panic!("expected a call");
        };
        assert_eq!(name, "console.log");
        assert_eq!(
            args[0],
            Expr::Index {
                object: Box::new(Expr::Member {
                    object: Box::new(Expr::Ident("response".to_string())),
                    property: "data".to_string(),
                }),
                index: Box::new(lit(json!(0))),
            }
        );
    }

    #[test]
    fn test_arguments_may_span_lines() {
        let script = "setContext(\n  \"id\",\n  getResponseValue(\"data.id\")\n)";
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_literals() {
        let statements = parse_script("log(-1.5, 42, null, undefined, false)").unwrap();
        assert_eq!(
            statements[0].call,
            call(
                "log",
                vec![
                    lit(json!(-1.5)),
                    lit(json!(42)),
                    lit(Value::Null),
                    lit(Value::Null),
                    lit(json!(false)),
                ],
            )
        );
    }

    #[test]
    fn test_escapes_in_strings() {
        let statements = parse_script(r#"setBody("{\"a\":\n1}")"#).unwrap();
        assert_eq!(statements[0].call, call("setBody", vec![lit(json!("{\"a\":\n1}"))]));
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("  \n // nothing\n").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            parse_script("log(\"oops)"),
            Err(ScriptParseError::UnterminatedString { line: 1 })
        );
    }

    #[test]
    fn test_statement_must_be_a_call() {
        assert_eq!(
            parse_script("log(1)\nurl"),
            Err(ScriptParseError::NotACall { line: 2 })
        );
    }

    #[test]
    fn test_missing_closing_paren() {
        assert!(matches!(
            parse_script("setHeader(\"a\", \"b\""),
            Err(ScriptParseError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            parse_script("let x = 1"),
            Err(ScriptParseError::UnexpectedCharacter { line: 1, ch: '=' })
        );
    }
}
