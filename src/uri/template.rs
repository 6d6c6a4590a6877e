//! RFC 6570 URI templates with partial expansion.
//!
//! Link hrefs in route configuration are URI templates whose variables are
//! bound from the entity being rendered. Expansion here is *partial*: an
//! expression none of whose variables is bound is kept verbatim, so hrefs such
//! as `/people{?full}` survive expansion and are reported as still templated.
//!
//! Variable names may be dot-paths (`item.id`, `self.bossId`) which are looked
//! up in a JSON bindings object.
//!
//! ```rust
//! use halform::uri::template::UriTemplate;
//! use serde_json::json;
//!
//! let bindings = json!({"item": {"id": 100}});
//! let expansion = UriTemplate::parse("./{item.id}{?full}").expand(&bindings);
//! assert_eq!(expansion.href, "./100{?full}");
//! assert!(expansion.templated);
//! ```

use crate::uri::encode::{encode_reserved, encode_unreserved};
use serde_json::Value;
use tracing::trace;

const MAX_PREFIX: usize = 9999;

/// Expression operator (the character after `{`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `{var}`
    Simple,
    /// `{+var}`
    Reserved,
    /// `{#var}`
    Fragment,
    /// `{.var}`
    Label,
    /// `{/var}`
    Path,
    /// `{;var}`
    PathParam,
    /// `{?var}`
    Query,
    /// `{&var}`
    QueryContinuation,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::Path),
            ';' => Some(Self::PathParam),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn named(self) -> bool {
        matches!(self, Self::PathParam | Self::Query | Self::QueryContinuation)
    }

    fn if_empty(self) -> &'static str {
        match self {
            Self::Query | Self::QueryContinuation => "=",
            _ => "",
        }
    }

    fn encode(self, value: &str) -> String {
        match self {
            Self::Reserved | Self::Fragment => encode_reserved(value),
            _ => encode_unreserved(value),
        }
    }

    /// Whether the operator starts the query or fragment part of a URI.
    #[must_use]
    pub fn ends_path(self) -> bool {
        matches!(self, Self::Query | Self::QueryContinuation | Self::Fragment)
    }
}

/// One variable of an expression, e.g. `q*` or `name:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    /// Variable name, possibly a dot-path
    pub name: String,
    /// `*` modifier
    pub explode: bool,
    /// `:n` modifier
    pub prefix: Option<usize>,
}

impl VarSpec {
    fn parse(spec: &str) -> Option<Self> {
        let (name, explode, prefix) = if let Some(name) = spec.strip_suffix('*') {
            (name, true, None)
        } else if let Some((name, len)) = spec.split_once(':') {
            let len: usize = len.parse().ok().filter(|n| (1..=MAX_PREFIX).contains(n))?;
            (name, false, Some(len))
        } else {
            (spec, false, None)
        };

        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.ends_with('.')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '%'));
        valid.then(|| Self {
            name: name.to_string(),
            explode,
            prefix,
        })
    }
}

/// A parsed template component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Literal text, copied as-is
    Literal(String),
    /// A `{...}` expression
    Expression {
        /// Operator character
        operator: Operator,
        /// Variables in declaration order
        vars: Vec<VarSpec>,
        /// Original text including braces
        raw: String,
    },
}

/// Result of expanding a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Expanded text
    pub href: String,
    /// Whether any expression was left unexpanded
    pub templated: bool,
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template.
    ///
    /// Parsing is lenient: an unclosed brace or an expression with an invalid
    /// variable is kept as literal text.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open..];
            let Some(close) = after.find('}') else {
                literal.push_str(after);
                rest = "";
                break;
            };
            let raw = &after[..=close];
            match parse_expression(&raw[1..raw.len() - 1]) {
                Some((operator, vars)) => {
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Expression {
                        operator,
                        vars,
                        raw: raw.to_string(),
                    });
                }
                None => literal.push_str(raw),
            }
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self {
            parts,
        }
    }

    /// Template components in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether the template contains at least one expression.
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::Expression { .. }))
    }

    /// All variables of all expressions, in order.
    pub fn variables(&self) -> impl Iterator<Item = &VarSpec> {
        self.parts.iter().flat_map(|part| match part {
            Part::Expression { vars, .. } => vars.as_slice(),
            Part::Literal(_) => [].as_slice(),
        })
    }

    /// Expand with variables looked up as dot-paths in `bindings`.
    #[must_use]
    pub fn expand(&self, bindings: &Value) -> Expansion {
        self.expand_with(|name| lookup_path(bindings, name))
    }

    /// Expand with a custom variable lookup.
    ///
    /// Expressions with no bound variable are kept verbatim; in expressions
    /// with at least one bound variable the unbound ones are treated as
    /// undefined.
    pub fn expand_with<'v>(&self, lookup: impl Fn(&str) -> Option<&'v Value>) -> Expansion {
        let mut href = String::new();
        let mut templated = false;

        for part in &self.parts {
            match part {
                Part::Literal(text) => href.push_str(text),
                Part::Expression {
                    operator,
                    vars,
                    raw,
                } => {
                    let bound: Vec<(&VarSpec, TemplateValue)> = vars
                        .iter()
                        .filter_map(|var| {
                            lookup(&var.name).and_then(TemplateValue::from_json).map(|v| (var, v))
                        })
                        .collect();
                    if bound.is_empty() {
                        trace!("Keeping unbound expression {}", raw);
                        href.push_str(raw);
                        templated = true;
                    } else {
                        expand_expression(&mut href, *operator, &bound);
                    }
                }
            }
        }

        Expansion {
            href,
            templated,
        }
    }
}

/// Whether `text` contains at least one template expression.
///
/// ```rust
/// use halform::uri::template::is_templated;
///
/// assert!(is_templated("/people/1234{?full}"));
/// assert!(!is_templated("/people/1234"));
/// ```
#[must_use]
pub fn is_templated(text: &str) -> bool {
    text.contains('{') && UriTemplate::parse(text).is_templated()
}

/// Look up a dot-path (`a.b.c`) in a JSON value.
///
/// Array elements may be addressed by index (`items.0`).
#[must_use]
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

fn parse_expression(body: &str) -> Option<(Operator, Vec<VarSpec>)> {
    let mut chars = body.chars();
    let first = chars.next()?;
    let (operator, list) = match Operator::from_char(first) {
        Some(op) => (op, chars.as_str()),
        None => (Operator::Simple, body),
    };
    let vars = list.split(',').map(VarSpec::parse).collect::<Option<Vec<_>>>()?;
    Some((operator, vars))
}

enum TemplateValue {
    Scalar(String),
    List(Vec<String>),
    Assoc(Vec<(String, String)>),
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl TemplateValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => {
                let items: Vec<String> = items.iter().filter_map(scalar).collect();
                (!items.is_empty()).then_some(Self::List(items))
            }
            Value::Object(map) => {
                let pairs: Vec<(String, String)> = map
                    .iter()
                    .filter_map(|(k, v)| scalar(v).map(|v| (k.clone(), v)))
                    .collect();
                (!pairs.is_empty()).then_some(Self::Assoc(pairs))
            }
            other => scalar(other).map(Self::Scalar),
        }
    }
}

fn truncate_chars(value: &str, max: Option<usize>) -> &str {
    match max {
        Some(max) => value.char_indices().nth(max).map_or(value, |(idx, _)| &value[..idx]),
        None => value,
    }
}

fn push_named(out: &mut String, op: Operator, name: &str, value: &str) {
    out.push_str(name);
    if value.is_empty() {
        out.push_str(op.if_empty());
    } else {
        out.push('=');
    }
}

fn expand_expression(out: &mut String, op: Operator, bound: &[(&VarSpec, TemplateValue)]) {
    for (idx, (var, value)) in bound.iter().enumerate() {
        out.push_str(if idx == 0 { op.first() } else { op.separator() });
        match value {
            TemplateValue::Scalar(text) => {
                let text = truncate_chars(text, var.prefix);
                if op.named() {
                    push_named(out, op, &var.name, text);
                }
                out.push_str(&op.encode(text));
            }
            TemplateValue::List(items) if !var.explode => {
                if op.named() {
                    out.push_str(&var.name);
                    out.push('=');
                }
                let encoded: Vec<String> = items.iter().map(|item| op.encode(item)).collect();
                out.push_str(&encoded.join(","));
            }
            TemplateValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(op.separator());
                    }
                    if op.named() {
                        push_named(out, op, &var.name, item);
                    }
                    out.push_str(&op.encode(item));
                }
            }
            TemplateValue::Assoc(pairs) if !var.explode => {
                if op.named() {
                    out.push_str(&var.name);
                    out.push('=');
                }
                let encoded: Vec<String> = pairs
                    .iter()
                    .flat_map(|(k, v)| [op.encode(k), op.encode(v)])
                    .collect();
                out.push_str(&encoded.join(","));
            }
            TemplateValue::Assoc(pairs) => {
                for (i, (key, item)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(op.separator());
                    }
                    let key = op.encode(key);
                    if op.named() {
                        push_named(out, op, &key, item);
                    } else {
                        out.push_str(&key);
                        out.push('=');
                    }
                    out.push_str(&op.encode(item));
                }
            }
        }
    }
}
