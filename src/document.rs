//! Document sources
//!
//! The read side of the decoder: a key-indexed view over one level of a
//! semi-structured document. Missing keys (and nulls) read as `Ok(None)`;
//! a key holding the wrong kind of thing reads as `Err(WrongShape)`.
//!
//! Implemented for `serde_json::Value` and for the store's own [`Value`],
//! so values read from the store decode directly.

use crate::protocol::Value;

/// A key held a value of a different kind than requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongShape;

/// Result of a typed key lookup
pub type Lookup<T> = std::result::Result<Option<T>, WrongShape>;

/// A non-document leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Plain {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

/// One entry of a list
pub enum Element<'a> {
    Document(&'a dyn Document),
    List(Vec<Element<'a>>),
    Plain(Plain),
}

/// Key-indexed accessors over a document
pub trait Document {
    /// True for a null document or one with no keys
    fn is_empty(&self) -> bool;

    /// Text of `key`. Strings come back verbatim, other leaves rendered as
    /// text; documents and lists are `WrongShape`.
    fn get_string(&self, key: &str) -> Lookup<String>;

    fn get_int(&self, key: &str) -> Lookup<i64>;

    fn get_document(&self, key: &str) -> Lookup<&dyn Document>;

    fn get_list(&self, key: &str) -> Lookup<Vec<Element<'_>>>;
}

/// Conversion of a list entry that is taken as-is rather than decoded
pub trait FromElement: Sized + 'static {
    /// Name used in mismatch errors
    const KIND: &'static str;

    fn from_element(element: &Element<'_>) -> Option<Self>;
}

impl FromElement for Plain {
    const KIND: &'static str = "plain value";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::Plain(plain) => Some(plain.clone()),
            _ => None,
        }
    }
}

impl FromElement for String {
    const KIND: &'static str = "string";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::Plain(Plain::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromElement for i64 {
    const KIND: &'static str = "integer";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::Plain(Plain::Int(i)) => Some(*i),
            Element::Plain(Plain::UInt(u)) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

impl FromElement for f64 {
    const KIND: &'static str = "number";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::Plain(Plain::Float(f)) => Some(*f),
            Element::Plain(Plain::Int(i)) => Some(*i as f64),
            Element::Plain(Plain::UInt(u)) => Some(*u as f64),
            _ => None,
        }
    }
}

impl FromElement for bool {
    const KIND: &'static str = "boolean";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::Plain(Plain::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl<E: FromElement> FromElement for Vec<E> {
    const KIND: &'static str = "list";

    fn from_element(element: &Element<'_>) -> Option<Self> {
        match element {
            Element::List(items) => items.iter().map(E::from_element).collect(),
            _ => None,
        }
    }
}

fn parse_int(text: &str) -> Lookup<i64> {
    text.trim().parse().map(Some).map_err(|_| WrongShape)
}

// =============================================================================
// serde_json::Value
// =============================================================================

fn json_element(value: &serde_json::Value) -> Element<'_> {
    use serde_json::Value as Json;

    match value {
        Json::Object(_) => Element::Document(value),
        Json::Array(items) => Element::List(items.iter().map(json_element).collect()),
        Json::Null => Element::Plain(Plain::Null),
        Json::Bool(b) => Element::Plain(Plain::Bool(*b)),
        Json::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Element::Plain(Plain::Int(i)),
            (None, Some(u)) => Element::Plain(Plain::UInt(u)),
            (None, None) => Element::Plain(Plain::Float(n.as_f64().unwrap_or(f64::NAN))),
        },
        Json::String(s) => Element::Plain(Plain::String(s.clone())),
    }
}

impl Document for serde_json::Value {
    fn is_empty(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    fn get_string(&self, key: &str) -> Lookup<String> {
        use serde_json::Value as Json;

        match self.get(key) {
            None | Some(Json::Null) => Ok(None),
            Some(Json::String(s)) => Ok(Some(s.clone())),
            Some(Json::Bool(b)) => Ok(Some(b.to_string())),
            Some(Json::Number(n)) => Ok(Some(n.to_string())),
            Some(Json::Array(_) | Json::Object(_)) => Err(WrongShape),
        }
    }

    fn get_int(&self, key: &str) -> Lookup<i64> {
        use serde_json::Value as Json;

        match self.get(key) {
            None | Some(Json::Null) => Ok(None),
            Some(Json::Number(n)) => n.as_i64().map(Some).ok_or(WrongShape),
            Some(Json::String(s)) => parse_int(s),
            Some(_) => Err(WrongShape),
        }
    }

    fn get_document(&self, key: &str) -> Lookup<&dyn Document> {
        match self.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(doc @ serde_json::Value::Object(_)) => Ok(Some(doc)),
            Some(_) => Err(WrongShape),
        }
    }

    fn get_list(&self, key: &str) -> Lookup<Vec<Element<'_>>> {
        match self.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Array(items)) => {
                Ok(Some(items.iter().map(json_element).collect()))
            }
            Some(_) => Err(WrongShape),
        }
    }
}

// =============================================================================
// Store Value
// =============================================================================

fn value_element(value: &Value) -> Element<'_> {
    match value {
        Value::Map(_) => Element::Document(value),
        Value::List(items) => Element::List(items.iter().map(value_element).collect()),
        Value::Bytes(bytes) => Element::List(
            bytes
                .iter()
                .map(|b| Element::Plain(Plain::Int(i64::from(*b))))
                .collect(),
        ),
        Value::Null => Element::Plain(Plain::Null),
        Value::Bool(b) => Element::Plain(Plain::Bool(*b)),
        Value::Int(i) => Element::Plain(Plain::Int(*i)),
        Value::UInt(u) => Element::Plain(Plain::UInt(*u)),
        Value::Float(f) => Element::Plain(Plain::Float(*f)),
        Value::String(s) => Element::Plain(Plain::String(s.clone())),
    }
}

impl Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }
}

impl Document for Value {
    fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    fn get_string(&self, key: &str) -> Lookup<String> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Int(i)) => Ok(Some(i.to_string())),
            Some(Value::UInt(u)) => Ok(Some(u.to_string())),
            Some(Value::Float(f)) => Ok(Some(f.to_string())),
            Some(Value::Bytes(_) | Value::List(_) | Value::Map(_)) => Err(WrongShape),
        }
    }

    fn get_int(&self, key: &str) -> Lookup<i64> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(Value::UInt(u)) => i64::try_from(*u).map(Some).map_err(|_| WrongShape),
            Some(Value::String(s)) => parse_int(s),
            Some(_) => Err(WrongShape),
        }
    }

    fn get_document(&self, key: &str) -> Lookup<&dyn Document> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(doc @ Value::Map(_)) => Ok(Some(doc)),
            Some(_) => Err(WrongShape),
        }
    }

    fn get_list(&self, key: &str) -> Lookup<Vec<Element<'_>>> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(list @ (Value::List(_) | Value::Bytes(_))) => match value_element(list) {
                Element::List(items) => Ok(Some(items)),
                _ => Err(WrongShape),
            },
            Some(_) => Err(WrongShape),
        }
    }
}
