//! Lua literal-table reader.
//!
//! Documentation sources are Lua files whose interesting content is a set of
//! top-level `Name = { ... }` assignments built only from literals. The file
//! is parsed with the tree-sitter Lua grammar; every top-level table
//! assignment is converted into a [`LuaTable`] tree and everything else
//! (function calls, `return` statements, function bodies) is left alone.

use crate::error::{Error, Result};
use tree_sitter::{Language, Node, Parser};

// -- Values -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Bool(bool),
    /// Number written without a fraction or exponent.
    Integer(i64),
    Number(f64),
    Str(String),
    /// Dotted identifier such as `Enum.ChatChannelType.None`.
    Path(String),
    Table(LuaTable),
}

impl LuaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(n) => Some(*n as f64),
            LuaValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LuaKey {
    /// `Name = v` or `["Name"] = v`
    Name(String),
    /// `v` with no key
    Positional,
    /// `[expr] = v` for any non-string expression
    Expr(LuaValue),
}

/// A table constructor in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LuaTable {
    pub entries: Vec<(LuaKey, LuaValue)>,
}

impl LuaTable {
    /// Value of the last `key = ...` entry, as Lua would keep it.
    pub fn get(&self, key: &str) -> Option<&LuaValue> {
        self.entries.iter().rev().find_map(|(k, v)| match k {
            LuaKey::Name(name) if name == key => Some(v),
            _ => None,
        })
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(LuaValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(LuaValue::as_bool)
    }

    pub fn get_table(&self, key: &str) -> Option<&LuaTable> {
        self.get(key).and_then(LuaValue::as_table)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Positional (array part) values.
    pub fn items(&self) -> impl Iterator<Item = &LuaValue> {
        self.entries.iter().filter_map(|(k, v)| match k {
            LuaKey::Positional => Some(v),
            _ => None,
        })
    }
}

/// A top-level `name = { ... }` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub table: LuaTable,
}

// -- Syntax tree --------------------------------------------------------------

/// Parse every top-level `name = { ... }` table assignment in `input`.
pub fn parse_assignments(input: &str) -> Result<Vec<Assignment>> {
    let language: Language = tree_sitter_lua::LANGUAGE.into();
    let mut parser = Parser::new();
    parser.set_language(&language).map_err(|e| Error::Lua {
        line: 1,
        column: 1,
        message: format!("cannot load lua grammar: {e}"),
    })?;
    let tree = parser.parse(input, None).ok_or_else(|| Error::Lua {
        line: 1,
        column: 1,
        message: "parse was cancelled".to_string(),
    })?;

    let root = tree.root_node();
    let reader = Reader {
        source: input.as_bytes(),
    };
    if let Some(node) = first_error(root) {
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            format!("unexpected `{}`", reader.snippet(node))
        };
        return Err(reader.error(node, message));
    }

    let mut assignments = Vec::new();
    for statement in named(root) {
        let Some(statement) = assignment_of(statement) else {
            continue;
        };
        let (Some(targets), Some(values)) = (
            child_of_kind(statement, "variable_list"),
            child_of_kind(statement, "expression_list"),
        ) else {
            continue;
        };
        let targets = named(targets).into_iter().filter(|n| n.kind() != "attribute");
        for (target, value) in targets.zip(named(values)) {
            if target.kind() == "identifier" && value.kind() == "table_constructor" {
                assignments.push(Assignment {
                    name: reader.text(target).to_string(),
                    table: reader.table(value)?,
                });
            }
        }
    }
    Ok(assignments)
}

/// `x = ...` or `local x = ...`; anything else is not an assignment.
fn assignment_of(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "assignment_statement" => Some(node),
        "variable_declaration" => child_of_kind(node, "assignment_statement"),
        _ => None,
    }
}

/// Named children without comments.
fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    named(node).into_iter().find(|n| n.kind() == kind)
}

/// First error or missing node in source order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

struct Reader<'src> {
    source: &'src [u8],
}

impl<'src> Reader<'src> {
    fn text(&self, node: Node<'_>) -> &'src str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    fn snippet(&self, node: Node<'_>) -> String {
        let text = self.text(node);
        let first_line = text.lines().next().unwrap_or_default();
        first_line.chars().take(24).collect()
    }

    fn error(&self, node: Node<'_>, message: impl Into<String>) -> Error {
        let start = node.start_position();
        Error::Lua {
            line: start.row + 1,
            column: start.column + 1,
            message: message.into(),
        }
    }

    fn table(&self, node: Node<'_>) -> Result<LuaTable> {
        let mut table = LuaTable::default();
        for child in named(node) {
            match child.kind() {
                "field" => table.entries.push(self.field(child)?),
                "field_list" => {
                    for field in named(child) {
                        table.entries.push(self.field(field)?);
                    }
                }
                _ => {}
            }
        }
        Ok(table)
    }

    fn field(&self, node: Node<'_>) -> Result<(LuaKey, LuaValue)> {
        let value_node = node
            .child_by_field_name("value")
            .ok_or_else(|| self.error(node, "table field without a value"))?;
        let value = self.value(value_node)?;

        let Some(name) = node.child_by_field_name("name") else {
            return Ok((LuaKey::Positional, value));
        };
        let mut cursor = node.walk();
        let bracketed = node.children(&mut cursor).next().is_some_and(|c| c.kind() == "[");
        let key = if bracketed {
            match self.value(name)? {
                LuaValue::Str(s) => LuaKey::Name(s),
                other => LuaKey::Expr(other),
            }
        } else {
            LuaKey::Name(self.text(name).to_string())
        };
        Ok((key, value))
    }

    fn value(&self, node: Node<'_>) -> Result<LuaValue> {
        match node.kind() {
            "table_constructor" => Ok(LuaValue::Table(self.table(node)?)),
            "string" => Ok(LuaValue::Str(self.string(node))),
            "number" => self.number(node),
            "true" => Ok(LuaValue::Bool(true)),
            "false" => Ok(LuaValue::Bool(false)),
            "nil" => Ok(LuaValue::Nil),
            "identifier" | "dot_index_expression" => {
                Ok(LuaValue::Path(self.text(node).to_string()))
            }
            "parenthesized_expression" => match named(node).first() {
                Some(inner) => self.value(*inner),
                None => Ok(LuaValue::Nil),
            },
            "unary_expression" if self.text(node).starts_with('-') => {
                let operand = node
                    .child_by_field_name("operand")
                    .or_else(|| named(node).last().copied())
                    .ok_or_else(|| self.error(node, "expected number after '-'"))?;
                match self.value(operand)? {
                    LuaValue::Integer(n) => Ok(LuaValue::Integer(-n)),
                    LuaValue::Number(n) => Ok(LuaValue::Number(-n)),
                    _ => Err(self.error(node, "expected number after '-'")),
                }
            }
            kind => Err(self.error(node, format!("unsupported `{kind}` in table"))),
        }
    }

    fn number(&self, node: Node<'_>) -> Result<LuaValue> {
        let text = self.text(node);
        let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok().map(LuaValue::Integer)
        } else if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(LuaValue::Number)
        } else {
            // decimal integers too large for i64 read as floats, as in Lua
            text.parse::<i64>()
                .ok()
                .map(LuaValue::Integer)
                .or_else(|| text.parse::<f64>().ok().map(LuaValue::Number))
        };
        parsed.ok_or_else(|| self.error(node, format!("invalid number `{text}`")))
    }

    /// Decoded contents of a quoted or long-bracket string.
    fn string(&self, node: Node<'_>) -> String {
        let text = self.text(node);
        if let Some(rest) = text.strip_prefix('[') {
            // [==[ ... ]==]
            let level = rest.chars().take_while(|&c| c == '=').count();
            let inner = rest.get(level + 1..).unwrap_or_default();
            let inner = inner.strip_suffix(&format!("]{}]", "=".repeat(level))).unwrap_or(inner);
            return inner.strip_prefix('\n').unwrap_or(inner).to_string();
        }
        let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or_default();
        unescape(inner)
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('z') => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u8::from_str_radix(&hex, 16).ok().map(char::from) {
                    out.push(ch);
                }
            }
            Some(d) if d.is_ascii_digit() => {
                let mut code = d.to_digit(10).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(10)) {
                        Some(next) => {
                            code = code * 10 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(ch) = char::from_u32(code) {
                    out.push(ch);
                }
            }
            // \\ \" \' and an escaped newline keep the character itself
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
