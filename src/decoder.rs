//! Tagged Decoder
//!
//! Turns a [`Document`] into a typed value by walking the target type's
//! field table. Each field carries exactly one tag saying which key to read
//! and how to convert it:
//!
//! | tag       | reads             | missing key        | bad value          |
//! |-----------|-------------------|--------------------|--------------------|
//! | `string`  | text, verbatim    | `None`             | `FieldTypeMismatch`|
//! | `integer` | integer           | `None`             | `FieldTypeMismatch`|
//! | `boolean` | text == "true"    | `false`            | `false`            |
//! | `uuid`    | text as UUID      | `None`             | `FieldTypeMismatch`|
//! | `nested`  | sub-document      | `None`             | propagated         |
//! | `list`    | plain entries     | left at default    | `FieldTypeMismatch`|
//! | `list_of` | sub-documents     | left at default    | propagated         |
//!
//! Text-reading tags accept any leaf (numbers and booleans read as their
//! text). For `string` and `uuid` a key holding a document or list is a
//! mismatch; `boolean` treats it as `false`.
//!
//! Any failing field aborts the whole decode; no partially filled value is
//! ever returned. Field tables are built fresh for every decode.
//!
//! Types opt in through [`Decodable`], usually via the [`decodable!`] macro
//! invoked next to the type so private fields can be filled:
//!
//! ```
//! use thot::decodable;
//!
//! #[derive(Debug, Default)]
//! struct Account {
//!     id: Option<uuid::Uuid>,
//!     owner: Option<String>,
//!     active: bool,
//! }
//!
//! decodable!(Account {
//!     id: uuid("id"),
//!     owner: string("owner"),
//!     active: boolean("active"),
//! });
//!
//! let doc = serde_json::json!({
//!     "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
//!     "owner": "Ann",
//!     "active": "TRUE",
//! });
//! let account: Account = thot::decoder::decode(Some(&doc)).unwrap().unwrap();
//! assert_eq!(account.owner.as_deref(), Some("Ann"));
//! assert!(account.active);
//! ```

use std::collections::HashSet;

use uuid::Uuid;

use crate::document::{Document, Element, FromElement};
use crate::error::DecodeError;

type Apply<T> = Box<dyn Fn(&mut T, &dyn Document) -> Result<(), DecodeError>>;

/// Decoding tag of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    String,
    Integer,
    Boolean,
    Uuid,
    Nested,
    List,
    ListOf,
}

/// One entry of a type's field table
pub struct Field<T> {
    name: &'static str,
    key: &'static str,
    tag: Tag,
    apply: Apply<T>,
}

/// A type that can be filled from a document.
///
/// Decoding starts from `Default::default()` and applies every entry of
/// `fields()` to it.
pub trait Decodable: Default + 'static {
    fn fields() -> Vec<Field<Self>>;
}

fn mismatch(field: &str, expected: &'static str) -> DecodeError {
    DecodeError::FieldTypeMismatch {
        field: field.to_string(),
        expected,
    }
}

impl<T: 'static> Field<T> {
    fn new<F>(name: &'static str, key: &'static str, tag: Tag, apply: F) -> Self
    where
        F: Fn(&mut T, &dyn Document) -> Result<(), DecodeError> + 'static,
    {
        Self {
            name,
            key,
            tag,
            apply: Box::new(apply),
        }
    }

    /// Field name on the Rust side
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Document key the field is read from
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn string(name: &'static str, key: &'static str, set: fn(&mut T, Option<String>)) -> Self {
        Self::new(name, key, Tag::String, move |target, doc| {
            let value = doc.get_string(key).map_err(|_| mismatch(name, "string"))?;
            set(target, value);
            Ok(())
        })
    }

    pub fn integer(name: &'static str, key: &'static str, set: fn(&mut T, Option<i64>)) -> Self {
        Self::new(name, key, Tag::Integer, move |target, doc| {
            let value = doc.get_int(key).map_err(|_| mismatch(name, "integer"))?;
            set(target, value);
            Ok(())
        })
    }

    /// Lenient: only a case-insensitive "true" is true
    pub fn boolean(name: &'static str, key: &'static str, set: fn(&mut T, bool)) -> Self {
        Self::new(name, key, Tag::Boolean, move |target, doc| {
            let value = doc
                .get_string(key)
                .ok()
                .flatten()
                .map_or(false, |text| text.eq_ignore_ascii_case("true"));
            set(target, value);
            Ok(())
        })
    }

    pub fn uuid(name: &'static str, key: &'static str, set: fn(&mut T, Option<Uuid>)) -> Self {
        Self::new(name, key, Tag::Uuid, move |target, doc| {
            let text = doc.get_string(key).map_err(|_| mismatch(name, "uuid"))?;
            let value = match text {
                Some(text) => Some(Uuid::parse_str(&text).map_err(|_| mismatch(name, "uuid"))?),
                None => None,
            };
            set(target, value);
            Ok(())
        })
    }

    pub fn nested<U: Decodable>(
        name: &'static str,
        key: &'static str,
        set: fn(&mut T, Option<U>),
    ) -> Self {
        Self::new(name, key, Tag::Nested, move |target, doc| {
            let sub = doc.get_document(key).map_err(|_| mismatch(name, "document"))?;
            set(target, decode::<U>(sub)?);
            Ok(())
        })
    }

    /// List whose entries are taken as-is
    pub fn list<E: FromElement + 'static>(
        name: &'static str,
        key: &'static str,
        set: fn(&mut T, Vec<E>),
    ) -> Self {
        Self::new(name, key, Tag::List, move |target, doc| {
            let Some(items) = doc.get_list(key).map_err(|_| mismatch(name, "list"))? else {
                return Ok(());
            };
            let values = items
                .iter()
                .map(|item| E::from_element(item).ok_or_else(|| mismatch(name, E::KIND)))
                .collect::<Result<Vec<E>, _>>()?;
            set(target, values);
            Ok(())
        })
    }

    /// List whose entries are sub-documents decoded into `U`
    pub fn list_of<U: Decodable>(
        name: &'static str,
        key: &'static str,
        set: fn(&mut T, Vec<U>),
    ) -> Self {
        Self::new(name, key, Tag::ListOf, move |target, doc| {
            let Some(items) = doc.get_list(key).map_err(|_| mismatch(name, "list"))? else {
                return Ok(());
            };
            let mut values = Vec::with_capacity(items.len());
            for item in &items {
                match item {
                    Element::Document(sub) => values.push(fill::<U>(*sub)?),
                    _ => return Err(mismatch(name, "document")),
                }
            }
            set(target, values);
            Ok(())
        })
    }
}

/// Check that a field table can drive a decode
fn validate<T: Decodable>(fields: &[Field<T>]) -> Result<(), DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidTarget {
        type_name: std::any::type_name::<T>(),
        reason,
    };

    if fields.is_empty() {
        return Err(invalid("no tagged fields".to_string()));
    }

    let mut names = HashSet::with_capacity(fields.len());
    let mut keys = HashSet::with_capacity(fields.len());
    for field in fields {
        if !names.insert(field.name) {
            return Err(invalid(format!("field '{}' is tagged more than once", field.name)));
        }
        if !keys.insert(field.key) {
            return Err(invalid(format!("key '{}' is read by more than one field", field.key)));
        }
    }

    Ok(())
}

/// Build a `T` from a present document, regardless of emptiness
fn fill<T: Decodable>(document: &dyn Document) -> Result<T, DecodeError> {
    let fields = T::fields();
    validate(&fields)?;

    let mut instance = T::default();
    for field in &fields {
        (field.apply)(&mut instance, document)?;
    }

    Ok(instance)
}

/// Decode `document` into a `T`.
///
/// An absent or empty document is `Ok(None)`, not an error.
pub fn decode<T: Decodable>(document: Option<&dyn Document>) -> Result<Option<T>, DecodeError> {
    match document {
        Some(doc) if !doc.is_empty() => fill(doc).map(Some),
        _ => Ok(None),
    }
}

/// Declare a [`Decodable`] impl from a table of `field: tag("key")` entries.
///
/// Tags are the constructors of [`Field`]: `string`, `integer`, `boolean`,
/// `uuid`, `nested`, `list` and `list_of`.
#[macro_export]
macro_rules! decodable {
    ($ty:ty { $($field:ident : $tag:ident ( $key:expr )),* $(,)? }) => {
        impl $crate::decoder::Decodable for $ty {
            fn fields() -> ::std::vec::Vec<$crate::decoder::Field<Self>> {
                ::std::vec![
                    $(
                        $crate::decoder::Field::<Self>::$tag(
                            ::std::stringify!($field),
                            $key,
                            |target: &mut Self, value| target.$field = value,
                        )
                    ),*
                ]
            }
        }
    };
}
