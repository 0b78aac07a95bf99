//! Recursive-descent parser for the restricted JSX grammar

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::ast::{JsxAttr, JsxElement, JsxNode, JsxValue};

/// Maximum nesting of elements and literals
pub const MAX_DEPTH: usize = 64;

/// JSX parse errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsxError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("unexpected `{found}` at {line}:{column}, expected {expected}")]
    Unexpected {
        found: char,
        line: usize,
        column: usize,
        expected: &'static str,
    },

    #[error("closing tag </{found}> does not match <{open}>")]
    MismatchedClose { open: String, found: String },

    #[error("invalid literal at {line}:{column}: {reason}")]
    InvalidLiteral {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Parse a JSX fragment into a list of top-level nodes
pub fn parse_jsx(source: &str) -> Result<Vec<JsxNode>, JsxError> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let nodes = parser.parse_children(None)?;
    if nodes.is_empty() {
        return Err(JsxError::UnexpectedEof {
            expected: "a JSX element",
        });
    }
    Ok(nodes)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char, what: &'static str) -> Result<(), JsxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, ch)| self.peek_at(offset) == Some(ch))
    }

    fn location(&self) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for ch in self.chars.iter().take(self.pos) {
            if *ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    fn unexpected(&self, expected: &'static str) -> JsxError {
        match self.peek() {
            None => JsxError::UnexpectedEof { expected },
            Some(found) => {
                let (line, column) = self.location();
                JsxError::Unexpected {
                    found,
                    line,
                    column,
                    expected,
                }
            }
        }
    }

    fn invalid_literal(&self, reason: impl Into<String>) -> JsxError {
        let (line, column) = self.location();
        JsxError::InvalidLiteral {
            line,
            column,
            reason: reason.into(),
        }
    }

    fn enter(&mut self) -> Result<(), JsxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(JsxError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Parse children until the matching closing tag (or end of input at top level)
    fn parse_children(&mut self, closing: Option<&str>) -> Result<Vec<JsxNode>, JsxError> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if closing.is_some() {
                        return Err(JsxError::UnexpectedEof {
                            expected: "a closing tag",
                        });
                    }
                    return Ok(children);
                }
                Some('<') if self.peek_at(1) == Some('/') => {
                    let Some(open) = closing else {
                        return Err(self.unexpected("an element"));
                    };
                    self.pos += 2;
                    self.skip_ws();
                    let found = if self.peek() == Some('>') {
                        String::new()
                    } else {
                        self.parse_name()?
                    };
                    self.skip_ws();
                    self.expect('>', "`>`")?;
                    if found != open {
                        return Err(JsxError::MismatchedClose {
                            open: open.to_string(),
                            found,
                        });
                    }
                    return Ok(children);
                }
                Some('<') => children.push(self.parse_element()?),
                Some('{') => {
                    if let Some(node) = self.parse_expression_child()? {
                        children.push(node);
                    }
                }
                Some(_) => {
                    let raw = self.take_text();
                    if let Some(text) = normalize_text(&raw, closing.is_none()) {
                        children.push(JsxNode::Text { text });
                    }
                }
            }
        }
    }

    fn parse_element(&mut self) -> Result<JsxNode, JsxError> {
        self.expect('<', "`<`")?;
        self.enter()?;

        if self.eat('>') {
            let children = self.parse_children(Some(""))?;
            self.leave();
            return Ok(JsxNode::Fragment { children });
        }

        let name = self.parse_name()?;
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('/') => {
                    self.pos += 1;
                    self.expect('>', "`>` after `/`")?;
                    self.leave();
                    return Ok(JsxNode::Element(JsxElement {
                        name,
                        attrs,
                        children: Vec::new(),
                    }));
                }
                Some('>') => {
                    self.pos += 1;
                    let children = self.parse_children(Some(name.as_str()))?;
                    self.leave();
                    return Ok(JsxNode::Element(JsxElement {
                        name,
                        attrs,
                        children,
                    }));
                }
                Some(_) => attrs.push(self.parse_attr()?),
                None => {
                    return Err(JsxError::UnexpectedEof {
                        expected: "`>` or an attribute",
                    })
                }
            }
        }
    }

    fn parse_attr(&mut self) -> Result<JsxAttr, JsxError> {
        let name = self.parse_name()?;
        self.skip_ws();
        if !self.eat('=') {
            return Ok(JsxAttr {
                name,
                value: JsxValue::Literal(Value::Bool(true)),
            });
        }
        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut text = String::new();
                loop {
                    match self.bump() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => text.push(ch),
                        None => {
                            return Err(JsxError::UnexpectedEof {
                                expected: "a closing quote",
                            })
                        }
                    }
                }
                JsxValue::Literal(Value::String(text))
            }
            Some('{') => {
                self.pos += 1;
                self.skip_ws();
                let value = self.parse_value()?;
                self.skip_ws();
                self.expect('}', "`}`")?;
                value
            }
            _ => return Err(self.unexpected("an attribute value")),
        };
        Ok(JsxAttr { name, value })
    }

    /// `{literal}`, `{Ident}` or `{/* comment */}`
    fn parse_expression_child(&mut self) -> Result<Option<JsxNode>, JsxError> {
        self.expect('{', "`{`")?;
        self.skip_ws();

        if self.starts_with("/*") {
            self.pos += 2;
            while !self.starts_with("*/") {
                if self.bump().is_none() {
                    return Err(JsxError::UnexpectedEof {
                        expected: "`*/`",
                    });
                }
            }
            self.pos += 2;
            self.skip_ws();
            self.expect('}', "`}` after comment")?;
            return Ok(None);
        }

        if self.eat('}') {
            return Ok(None);
        }

        let value = self.parse_value()?;
        self.skip_ws();
        self.expect('}', "`}`")?;
        Ok(Some(JsxNode::Expr { value }))
    }

    fn take_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '<' || ch == '{' {
                break;
            }
            text.push(ch);
            self.pos += 1;
        }
        text
    }

    fn parse_name(&mut self) -> Result<String, JsxError> {
        let mut name = String::new();
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
            _ => return Err(self.unexpected("a name")),
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ':' | '.') {
                name.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.ends_with('.') {
            return Err(self.unexpected("a name segment after `.`"));
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// A literal or a bare identifier
    fn parse_value(&mut self) -> Result<JsxValue, JsxError> {
        match self.peek() {
            Some(ch) if is_ident_start(ch) => {
                let ident = self.parse_ident_path()?;
                Ok(match ident.as_str() {
                    "true" => JsxValue::Literal(Value::Bool(true)),
                    "false" => JsxValue::Literal(Value::Bool(false)),
                    "null" => JsxValue::Literal(Value::Null),
                    _ => JsxValue::Ident(ident),
                })
            }
            _ => Ok(JsxValue::Literal(self.parse_literal()?)),
        }
    }

    fn parse_ident_path(&mut self) -> Result<String, JsxError> {
        let mut ident = String::new();
        loop {
            match self.peek() {
                Some(ch) if is_ident_start(ch) => {}
                _ => return Err(self.unexpected("an identifier")),
            }
            while let Some(ch) = self.peek() {
                if is_ident_start(ch) || ch.is_ascii_digit() {
                    ident.push(ch);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some('.') {
                ident.push('.');
                self.pos += 1;
            } else {
                return Ok(ident);
            }
        }
    }

    fn parse_literal(&mut self) -> Result<Value, JsxError> {
        match self.peek() {
            Some('"' | '\'') => self.parse_string().map(Value::String),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if is_ident_start(ch) => {
                let start = self.pos;
                let ident = self.parse_ident_path()?;
                match ident.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => {
                        self.pos = start;
                        Err(self.invalid_literal(format!(
                            "identifier `{}` is not allowed inside a literal",
                            ident
                        )))
                    }
                }
            }
            _ => Err(self.unexpected("a literal")),
        }
    }

    fn parse_string(&mut self) -> Result<String, JsxError> {
        let quote = self.bump().ok_or(JsxError::UnexpectedEof {
            expected: "a string",
        })?;
        let mut out = String::new();
        loop {
            let ch = self.bump().ok_or(JsxError::UnexpectedEof {
                expected: "a closing quote",
            })?;
            if ch == quote {
                return Ok(out);
            }
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            let escaped = self.bump().ok_or(JsxError::UnexpectedEof {
                expected: "an escape sequence",
            })?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        let digit = self
                            .bump()
                            .and_then(|d| d.to_digit(16))
                            .ok_or_else(|| self.invalid_literal("bad \\u escape"))?;
                        code = code * 16 + digit;
                    }
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                other => out.push(other),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, JsxError> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E') {
                text.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        match serde_json::from_str::<Number>(&text) {
            Ok(number) => Ok(Value::Number(number)),
            Err(_) => Err(self.invalid_literal(format!("`{}` is not a number", text))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, JsxError> {
        self.expect('[', "`[`")?;
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            items.push(self.parse_literal()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(']', "`,` or `]`")?;
            break;
        }
        self.leave();
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, JsxError> {
        self.expect('{', "`{`")?;
        self.enter()?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            let key = match self.peek() {
                Some('"' | '\'') => self.parse_string()?,
                Some(ch) if is_ident_start(ch) => self.parse_ident_path()?,
                _ => return Err(self.unexpected("an object key")),
            };
            self.skip_ws();
            self.expect(':', "`:`")?;
            self.skip_ws();
            let value = self.parse_literal()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}', "`,` or `}`")?;
            break;
        }
        self.leave();
        Ok(Value::Object(map))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Collapse JSX text the way JSX does: lines are trimmed and joined with a
/// single space, blank lines vanish. Text without a newline keeps its edges
/// but collapses inner runs of whitespace.
fn normalize_text(raw: &str, top_level: bool) -> Option<String> {
    if raw.contains('\n') {
        let joined = raw
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        return (!joined.is_empty()).then_some(joined);
    }

    if top_level && raw.trim().is_empty() {
        return None;
    }

    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    (!out.is_empty()).then_some(out)
}
