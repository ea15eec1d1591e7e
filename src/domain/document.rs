//! Ordered key/value document backing the configuration file.
//!
//! A [`Document`] owns a tree of [`Node`]s. Mapping nodes keep their
//! entries in insertion order; lookups scan that order and resolve to the
//! first matching key. Parsing drives `serde_yaml` with a visitor that keeps
//! every entry in source order, repeated keys included. Serialization is our
//! own so that output is deterministic.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, EnumAccess, IgnoredAny, MapAccess, SeqAccess, VariantAccess, Visitor};

use crate::domain::DomainError;

const INDENT: &str = "    ";

/// A value in the document: either a scalar string or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Mapping(Mapping),
}

impl Node {
    /// Shorthand for a scalar node.
    pub fn scalar(value: impl Into<String>) -> Self {
        Node::Scalar(value.into())
    }

    /// The scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Mapping(_) => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            Node::Scalar(_) => None,
        }
    }
}

/// An ordered sequence of `(key, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up `key`. The first entry with that key wins.
    pub fn get(&self, key: &str) -> Result<&Node, DomainError> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| DomainError::NotFound(key.to_string()))
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Replace the value of `key` in place, or append it when absent.
    pub fn set(&mut self, key: &str, value: Node) {
        match self.get_mut(key) {
            Some(slot) => *slot = value,
            None => self.add(key, value),
        }
    }

    /// Append `(key, value)` at the tail. Does not check for an existing key.
    pub fn add(&mut self, key: &str, value: Node) {
        self.entries.push((key.to_string(), value));
    }

    /// Walk `path` through nested mappings.
    ///
    /// Fails with `NotFound` naming the dotted prefix that could not be
    /// resolved, including when a segment runs into a scalar.
    pub fn get_nested(&self, path: &[&str]) -> Result<&Node, DomainError> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| DomainError::NotFound(String::new()))?;

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            current = current
                .get(segment)
                .ok()
                .and_then(Node::as_mapping)
                .ok_or_else(|| DomainError::NotFound(path[..=depth].join(".")))?;
        }

        current
            .get(last)
            .map_err(|_| DomainError::NotFound(path.join(".")))
    }

    /// Set the value at `path`, creating missing intermediate mappings.
    ///
    /// A scalar found where an intermediate mapping is needed is replaced by
    /// an empty mapping at the same position.
    pub fn set_nested(&mut self, path: &[&str], value: Node) -> Result<(), DomainError> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| DomainError::InvalidFormat("empty key path".to_string()))?;

        let mut current = self;
        for segment in parents {
            if !matches!(current.get(segment), Ok(Node::Mapping(_))) {
                current.set(segment, Node::Mapping(Mapping::new()));
            }
            current = match current.get_mut(segment) {
                Some(Node::Mapping(m)) => m,
                _ => return Err(DomainError::NotFound(segment.to_string())),
            };
        }

        current.set(last, value);
        Ok(())
    }
}

/// The parsed configuration document. The root is always a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML text. Empty input yields an empty document.
    ///
    /// Repeated keys are kept in file order; lookups resolve to the first.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let root = match serde_yaml::from_str::<Parsed>(text)? {
            Parsed::Null => Mapping::new(),
            Parsed::Mapping(entries) => convert_mapping(entries)?,
            other => {
                return Err(DomainError::InvalidFormat(format!(
                    "document root must be a mapping, found {}",
                    other.kind()
                )))
            }
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn get(&self, key: &str) -> Result<&Node, DomainError> {
        self.root.get(key)
    }

    pub fn set(&mut self, key: &str, value: Node) {
        self.root.set(key, value);
    }

    pub fn add(&mut self, key: &str, value: Node) {
        self.root.add(key, value);
    }

    pub fn get_nested(&self, path: &[&str]) -> Result<&Node, DomainError> {
        self.root.get_nested(path)
    }

    pub fn set_nested(&mut self, path: &[&str], value: Node) -> Result<(), DomainError> {
        self.root.set_nested(path, value)
    }

    /// Render the document as YAML.
    ///
    /// Only the first entry for a repeated key is written, so the output
    /// always parses back.
    pub fn serialize(&self) -> String {
        if self.root.is_empty() {
            return "{}\n".to_string();
        }
        let mut out = String::new();
        write_mapping(&mut out, &self.root, 0);
        out
    }
}

/// Raw parse tree. Unlike `serde_yaml::Value` it keeps repeated keys.
enum Parsed {
    Null,
    Scalar(String),
    Mapping(Vec<(Parsed, Parsed)>),
    Unsupported(&'static str),
}

impl Parsed {
    fn kind(&self) -> &'static str {
        match self {
            Parsed::Null => "null",
            Parsed::Scalar(_) => "scalar",
            Parsed::Mapping(_) => "mapping",
            Parsed::Unsupported(kind) => kind,
        }
    }

    fn into_text(self) -> Result<String, Self> {
        match self {
            Parsed::Null => Ok(String::new()),
            Parsed::Scalar(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl<'de> Deserialize<'de> for Parsed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParsedVisitor)
    }
}

struct ParsedVisitor;

impl<'de> Visitor<'de> for ParsedVisitor {
    type Value = Parsed;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a YAML value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Parsed, E> {
        Ok(Parsed::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Parsed, E> {
        Ok(Parsed::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Parsed, E> {
        Ok(Parsed::Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Parsed, E> {
        Ok(Parsed::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Parsed, E> {
        Ok(Parsed::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Parsed, E> {
        Ok(Parsed::Scalar(serde_yaml::Number::from(v).to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Parsed, E> {
        Ok(Parsed::Scalar(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Parsed, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Parsed::Unsupported("sequence"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Parsed, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = map.next_entry::<Parsed, Parsed>()? {
            entries.push(entry);
        }
        Ok(Parsed::Mapping(entries))
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Parsed, A::Error> {
        let (IgnoredAny, variant) = data.variant::<IgnoredAny>()?;
        variant.newtype_variant::<IgnoredAny>()?;
        Ok(Parsed::Unsupported("tagged value"))
    }
}

fn convert_mapping(entries: Vec<(Parsed, Parsed)>) -> Result<Mapping, DomainError> {
    let mut out = Mapping::new();
    for (key, value) in entries {
        let key = key.into_text().map_err(|other| {
            DomainError::InvalidFormat(format!("mapping keys must be scalars, found {}", other.kind()))
        })?;
        let node = match value {
            Parsed::Mapping(m) => Node::Mapping(convert_mapping(m)?),
            other => Node::Scalar(other.into_text().map_err(|other| {
                DomainError::InvalidFormat(format!("unsupported {} under key {key:?}", other.kind()))
            })?),
        };
        out.add(&key, node);
    }
    Ok(out)
}

fn write_mapping(out: &mut String, mapping: &Mapping, depth: usize) {
    let indent = INDENT.repeat(depth);
    let mut written: Vec<&str> = Vec::with_capacity(mapping.len());
    for (key, value) in mapping.iter() {
        // Shadowed duplicates are unreachable through lookups; skip them.
        if written.contains(&key) {
            continue;
        }
        written.push(key);
        let key = render_scalar(key);
        match value {
            Node::Scalar(s) => out.push_str(&format!("{indent}{key}: {}\n", render_scalar(s))),
            Node::Mapping(m) if m.is_empty() => out.push_str(&format!("{indent}{key}: {{}}\n")),
            Node::Mapping(m) => {
                out.push_str(&format!("{indent}{key}:\n"));
                write_mapping(out, m, depth + 1);
            }
        }
    }
}

/// Plain style when the text reads back as the same string, double-quoted
/// otherwise.
fn render_scalar(text: &str) -> String {
    if is_plain_safe(text) {
        text.to_string()
    } else {
        double_quoted(text)
    }
}

fn is_plain_safe(text: &str) -> bool {
    if text.is_empty() || text.trim() != text || text.chars().any(|c| matches!(c, '\t' | '\n' | '\r') || needs_escape(c)) {
        return false;
    }
    matches!(serde_yaml::from_str::<serde_yaml::Value>(text), Ok(serde_yaml::Value::String(parsed)) if parsed == text)
}

/// Characters outside the YAML printable set, plus those a reader folds
/// into line breaks or strips as a byte order mark.
fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}'
            | '\u{b}'
            | '\u{c}'
            | '\u{e}'..='\u{1f}'
            | '\u{7f}'..='\u{9f}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{feff}'
            | '\u{fffe}'
            | '\u{ffff}'
    )
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
