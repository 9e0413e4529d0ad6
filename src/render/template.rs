//! Content template interpreter.
//!
//! A deliberately small language evaluated against the alert payload:
//!
//! - `{{.level}}`, `{{.detail.host}}`: field access, dotted for nesting
//! - `{{.}}`: the whole payload as compact JSON
//! - `{{index .detail "host"}}`, `{{index .items 0}}`: indexed lookup into
//!   objects (string keys) and arrays (integer positions), chainable
//! - `{{- ... -}}`: trim whitespace before / after the action
//! - `{{/* comment */}}`
//!
//! Templates are read-only over the payload and produce a string or a
//! [`TemplateError`]; nothing else is reachable from inside a template.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),

    #[error("template execution error: {0}")]
    Execute(String),
}

pub type TemplateResult<T> = Result<T, TemplateError>;

/// A parsed content template, reusable across requests
#[derive(Debug, Clone)]
pub struct ContentTemplate {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Action(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    /// Empty path is the payload itself
    Field(Vec<String>),
    Index { target: Vec<String>, keys: Vec<IndexKey> },
}

#[derive(Debug, Clone, PartialEq)]
enum IndexKey {
    Key(String),
    Position(i64),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Field(Vec<String>),
    Ident(String),
    Str(String),
    Int(i64),
}

impl ContentTemplate {
    pub fn parse(source: &str) -> TemplateResult<Self> {
        let mut nodes = Vec::new();
        let mut rest = source;
        let mut trim_next_text = false;

        while !rest.is_empty() {
            let Some(open) = rest.find("{{") else {
                push_text(&mut nodes, rest, trim_next_text);
                break;
            };

            let text = &rest[..open];
            let after_open = &rest[open + 2..];
            let close = find_action_end(after_open)
                .ok_or_else(|| TemplateError::Parse("unclosed action".to_string()))?;
            let mut inner = &after_open[..close];
            rest = &after_open[close + 2..];

            // `{{- ` / ` -}}` need whitespace next to the dash; `{{-3}}` is a number
            let trim_left = inner
                .strip_prefix('-')
                .is_some_and(|r| r.starts_with(char::is_whitespace));
            if trim_left {
                inner = &inner[1..];
            }
            let trim_right = inner
                .strip_suffix('-')
                .is_some_and(|r| r.ends_with(char::is_whitespace));
            if trim_right {
                inner = &inner[..inner.len() - 1];
            }

            let text = if trim_left { text.trim_end() } else { text };
            push_text(&mut nodes, text, trim_next_text);
            trim_next_text = trim_right;

            let inner = inner.trim();
            if inner.starts_with("/*") && inner.ends_with("*/") && inner.len() >= 4 {
                continue;
            }

            nodes.push(Node::Action(parse_action(inner)?));
        }

        Ok(Self { nodes })
    }

    /// Render against the payload.
    pub fn execute(&self, data: &Map<String, Value>) -> TemplateResult<String> {
        let mut out = String::new();

        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(Expr::Field(path)) => {
                    if path.is_empty() {
                        let json = serde_json::to_string(data)
                            .map_err(|e| TemplateError::Execute(e.to_string()))?;
                        out.push_str(&json);
                    } else if let Some(value) = lookup(data, path)? {
                        write_value(&mut out, value);
                    }
                }
                Node::Action(Expr::Index { target, keys }) => {
                    if let Some(value) = index(data, target, keys)? {
                        write_value(&mut out, value);
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Byte offset of the `}}` closing an action, skipping string literals and comments
fn find_action_end(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'`' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = input[i + 2..].find("*/").map(|end| i + 2 + end + 1)?;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }

    None
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn parse_action(inner: &str) -> TemplateResult<Expr> {
    let tokens = tokenize(inner)?;

    match tokens.as_slice() {
        [] => Err(TemplateError::Parse("missing value for action".to_string())),
        [Token::Field(path)] => Ok(Expr::Field(path.clone())),
        [Token::Ident(name), args @ ..] if name == "index" => {
            let [Token::Field(target), keys @ ..] = args else {
                return Err(TemplateError::Parse(
                    "index expects a field as its first argument".to_string(),
                ));
            };
            if keys.is_empty() {
                return Err(TemplateError::Parse(
                    "index expects at least one key".to_string(),
                ));
            }
            let keys = keys
                .iter()
                .map(|token| match token {
                    Token::Str(s) => Ok(IndexKey::Key(s.clone())),
                    Token::Int(n) => Ok(IndexKey::Position(*n)),
                    other => Err(TemplateError::Parse(format!(
                        "unsupported index key {other:?}"
                    ))),
                })
                .collect::<TemplateResult<Vec<_>>>()?;
            Ok(Expr::Index {
                target: target.clone(),
                keys,
            })
        }
        [Token::Ident(name), ..] => Err(TemplateError::Parse(format!(
            "function \"{name}\" not defined"
        ))),
        _ => Err(TemplateError::Parse(format!("unsupported action: {inner}"))),
    }
}

fn tokenize(input: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        match c {
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other @ ('"' | '\\')) => s.push(other),
                            _ => {
                                return Err(TemplateError::Parse(
                                    "invalid escape in string".to_string(),
                                ))
                            }
                        },
                        Some(other) => s.push(other),
                        None => {
                            return Err(TemplateError::Parse("unterminated string".to_string()))
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '`' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => s.push(other),
                        None => {
                            return Err(TemplateError::Parse(
                                "unterminated raw string".to_string(),
                            ))
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' || c == '`' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(classify(&word)?);
            }
        }
    }

    Ok(tokens)
}

fn classify(word: &str) -> TemplateResult<Token> {
    if word == "." {
        return Ok(Token::Field(Vec::new()));
    }

    if let Some(path) = word.strip_prefix('.') {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(TemplateError::Parse(format!("bad field path {word}")));
        }
        return Ok(Token::Field(segments));
    }

    if let Ok(n) = word.parse::<i64>() {
        return Ok(Token::Int(n));
    }

    if word.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Ok(Token::Ident(word.to_string()));
    }

    Err(TemplateError::Parse(format!("unexpected \"{word}\" in action")))
}

/// Walk a dotted path. Missing keys and nulls resolve to `None`; stepping
/// into a scalar or array is an error.
fn lookup<'a>(data: &'a Map<String, Value>, path: &[String]) -> TemplateResult<Option<&'a Value>> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(None);
    };

    let mut current = match data.get(first) {
        Some(value) => value,
        None => return Ok(None),
    };

    for segment in rest {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return Ok(None),
            },
            Value::Null => return Ok(None),
            other => {
                return Err(TemplateError::Execute(format!(
                    "can't evaluate field {segment} in {}",
                    type_name(other)
                )))
            }
        };
    }

    Ok(Some(current))
}

fn index<'a>(
    data: &'a Map<String, Value>,
    target: &[String],
    keys: &[IndexKey],
) -> TemplateResult<Option<&'a Value>> {
    let mut current = if target.is_empty() {
        None
    } else {
        match lookup(data, target)? {
            Some(value) => Some(value),
            None => return Err(TemplateError::Execute("index of untyped nil".to_string())),
        }
    };

    for key in keys {
        let next = match (current, key) {
            // Index applied to the payload root
            (None, IndexKey::Key(k)) => data.get(k),
            (None, IndexKey::Position(_)) => {
                return Err(TemplateError::Execute(
                    "cannot index object with an integer".to_string(),
                ))
            }
            (Some(Value::Object(map)), IndexKey::Key(k)) => map.get(k),
            (Some(Value::Array(items)), IndexKey::Position(n)) => {
                let item = usize::try_from(*n).ok().and_then(|i| items.get(i));
                match item {
                    Some(value) => Some(value),
                    None => {
                        return Err(TemplateError::Execute(format!(
                            "index out of range: {n}"
                        )))
                    }
                }
            }
            (Some(Value::Object(_)), IndexKey::Position(_)) => {
                return Err(TemplateError::Execute(
                    "cannot index object with an integer".to_string(),
                ))
            }
            (Some(Value::Array(_)), IndexKey::Key(k)) => {
                return Err(TemplateError::Execute(format!(
                    "cannot index array with \"{k}\""
                )))
            }
            (Some(other), _) => {
                return Err(TemplateError::Execute(format!(
                    "can't index item of type {}",
                    type_name(other)
                )))
            }
        };

        match next {
            Some(value) => current = Some(value),
            None => return Ok(None),
        }
    }

    Ok(current)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => {}
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        other => out.push_str(&other.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, data: Value) -> TemplateResult<String> {
        let Value::Object(map) = data else {
            panic!("fixture must be an object");
        };
        ContentTemplate::parse(source)?.execute(&map)
    }

    #[test]
    fn test_simple_fields() {
        let out = render(
            "[{{.level}}] {{.subject}} | {{.service}} - {{.msg}} ({{.ip}})",
            json!({"level": "critical", "subject": "Disk Full", "service": "db", "msg": "98%", "ip": "10.0.0.5"}),
        )
        .unwrap();
        assert_eq!(out, "[critical] Disk Full | db - 98% (10.0.0.5)");
    }

    #[test]
    fn test_dotted_access() {
        let out = render("{{.detail.host}}", json!({"detail": {"host": "node-1"}})).unwrap();
        assert_eq!(out, "node-1");
    }

    #[test]
    fn test_index_access() {
        let data = json!({
            "detail": {"host": "node-1", "disks": ["sda", "sdb"]},
            "tags": [{"k": "env"}]
        });
        let out = render(
            r#"{{index .detail "host"}} {{index .detail "disks" 1}} {{index .tags 0 "k"}}"#,
            data,
        )
        .unwrap();
        assert_eq!(out, "node-1 sdb env");
    }

    #[test]
    fn test_index_on_root() {
        let out = render(r#"{{index . "machine-id"}}"#, json!({"machine-id": "m-1"})).unwrap();
        assert_eq!(out, "m-1");
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let out = render("a{{.nope}}b{{.x.y}}c", json!({"x": null})).unwrap();
        assert_eq!(out, "abc");

        let out = render(r#"{{index .detail "nope"}}"#, json!({"detail": {}})).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_value_formatting() {
        let out = render(
            "{{.n}} {{.f}} {{.b}} {{.z}} {{.arr}} {{.obj}}",
            json!({"n": 42, "f": 1.5, "b": true, "z": null, "arr": [1, 2], "obj": {"a": 1}}),
        )
        .unwrap();
        assert_eq!(out, "42 1.5 true  [1,2] {\"a\":1}");
    }

    #[test]
    fn test_whole_payload() {
        let out = render("{{.}}", json!({"a": "b"})).unwrap();
        assert_eq!(out, r#"{"a":"b"}"#);
    }

    #[test]
    fn test_trim_markers_and_comments() {
        let out = render("a  {{- .x -}}  b{{/* ignored */}}", json!({"x": "X"})).unwrap();
        assert_eq!(out, "aXb");
    }

    #[test]
    fn test_braces_inside_strings_and_comments() {
        let out = render(
            r#"{{index .d "a}}b"}}|{{index .d `c}}`}}{{/* x }} y */}}"#,
            json!({"d": {"a}}b": "1", "c}}": "2"}}),
        )
        .unwrap();
        assert_eq!(out, "1|2");

        assert!(matches!(
            ContentTemplate::parse(r#"{{index .d "a}}"#),
            Err(TemplateError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ContentTemplate::parse("{{.level"),
            Err(TemplateError::Parse(_))
        ));
        assert!(matches!(
            ContentTemplate::parse("{{upper .level}}"),
            Err(TemplateError::Parse(_))
        ));
        assert!(matches!(
            ContentTemplate::parse("{{.a..b}}"),
            Err(TemplateError::Parse(_))
        ));
        assert!(matches!(
            ContentTemplate::parse("{{index .a}}"),
            Err(TemplateError::Parse(_))
        ));
        assert!(matches!(
            ContentTemplate::parse("{{.level | printf}}"),
            Err(TemplateError::Parse(_))
        ));
    }

    #[test]
    fn test_execution_errors() {
        assert!(matches!(
            render("{{.level.name}}", json!({"level": "critical"})),
            Err(TemplateError::Execute(_))
        ));
        assert!(matches!(
            render(r#"{{index .missing "k"}}"#, json!({})),
            Err(TemplateError::Execute(_))
        ));
        assert!(matches!(
            render("{{index .items 5}}", json!({"items": [1]})),
            Err(TemplateError::Execute(_))
        ));
        assert!(matches!(
            render(r#"{{index .items "k"}}"#, json!({"items": [1]})),
            Err(TemplateError::Execute(_))
        ));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let out = render("no actions here", json!({})).unwrap();
        assert_eq!(out, "no actions here");
    }
}
