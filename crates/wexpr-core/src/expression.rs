//! The wexpr expression tree.
//!
//! An [`Expression`] is a tagged value: nothing (`Invalid`), an explicit
//! `Null`, a UTF-8 atom (`Value`), a byte buffer (`BinaryData`), an ordered
//! `Array`, or an insertion-ordered `Map` with unique keys.
//!
//! Children are owned by their parent: container inserts move the child in,
//! and dropping a parent drops the whole subtree. [`Expression`] is `Clone`,
//! and cloning is the deep copy — every node and buffer is duplicated, so a
//! clone can be inserted into another tree without aliasing.
//!
//! Accessors are forgiving: asking an array question of a map (or of `Null`)
//! answers with a type-appropriate empty (`None`, `0`) rather than panicking.

use std::collections::HashMap;

/// The variant tag of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Invalid,
    Null,
    Value,
    BinaryData,
    Array,
    Map,
}

/// A wexpr expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expression {
    /// Nothing: a parse of an empty document, or a freshly made blank slot.
    #[default]
    Invalid,
    /// The explicit `null` literal.
    Null,
    /// An atom: identifier, number, or quoted string. The distinction is not
    /// preserved after parse.
    Value(String),
    /// Arbitrary bytes. Base64 `<...>` in text, raw in binary form.
    BinaryData(Vec<u8>),
    /// An ordered sequence of child expressions.
    Array(Vec<Expression>),
    /// Insertion-ordered key/value pairs with unique keys.
    Map(Map),
}

impl Expression {
    /// The variant tag.
    pub fn ty(&self) -> ExpressionType {
        match self {
            Expression::Invalid => ExpressionType::Invalid,
            Expression::Null => ExpressionType::Null,
            Expression::Value(_) => ExpressionType::Value,
            Expression::BinaryData(_) => ExpressionType::BinaryData,
            Expression::Array(_) => ExpressionType::Array,
            Expression::Map(_) => ExpressionType::Map,
        }
    }

    /// Replace this expression with an empty payload of the given type,
    /// dropping whatever it held.
    pub fn change_type(&mut self, ty: ExpressionType) {
        *self = match ty {
            ExpressionType::Invalid => Expression::Invalid,
            ExpressionType::Null => Expression::Null,
            ExpressionType::Value => Expression::Value(String::new()),
            ExpressionType::BinaryData => Expression::BinaryData(Vec::new()),
            ExpressionType::Array => Expression::Array(Vec::new()),
            ExpressionType::Map => Expression::Map(Map::new()),
        };
    }

    /// The atom string, or `None` if this is not a `Value`.
    pub fn value(&self) -> Option<&str> {
        match self {
            Expression::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Set the atom string, converting this expression to a `Value` first
    /// if needed.
    pub fn set_value(&mut self, val: impl Into<String>) {
        *self = Expression::Value(val.into());
    }

    /// The binary payload, or `None` if this is not `BinaryData`.
    pub fn binary_data(&self) -> Option<&[u8]> {
        match self {
            Expression::BinaryData(data) => Some(data),
            _ => None,
        }
    }

    /// Set the binary payload (copied in), converting this expression to
    /// `BinaryData` first if needed.
    pub fn set_binary_data(&mut self, data: &[u8]) {
        *self = Expression::BinaryData(data.to_vec());
    }

    /// Number of array elements. 0 if this is not an array.
    pub fn array_len(&self) -> usize {
        match self {
            Expression::Array(children) => children.len(),
            _ => 0,
        }
    }

    /// The array element at `index`, or `None` if out of bounds or not an
    /// array.
    pub fn array_at(&self, index: usize) -> Option<&Expression> {
        match self {
            Expression::Array(children) => children.get(index),
            _ => None,
        }
    }

    /// Mutable access to the array element at `index`.
    pub fn array_at_mut(&mut self, index: usize) -> Option<&mut Expression> {
        match self {
            Expression::Array(children) => children.get_mut(index),
            _ => None,
        }
    }

    /// Append an element, taking ownership of it. Does nothing unless this
    /// expression is an array.
    pub fn array_push(&mut self, element: Expression) {
        if let Expression::Array(children) = self {
            children.push(element);
        }
    }

    /// Number of map pairs. 0 if this is not a map.
    pub fn map_len(&self) -> usize {
        match self {
            Expression::Map(map) => map.len(),
            _ => 0,
        }
    }

    /// The map key at `index` in insertion order.
    pub fn map_key_at(&self, index: usize) -> Option<&str> {
        match self {
            Expression::Map(map) => map.key_at(index),
            _ => None,
        }
    }

    /// The map value at `index` in insertion order.
    pub fn map_value_at(&self, index: usize) -> Option<&Expression> {
        match self {
            Expression::Map(map) => map.value_at(index),
            _ => None,
        }
    }

    /// The map value for `key`, or `None` if absent or not a map.
    pub fn map_get(&self, key: &str) -> Option<&Expression> {
        match self {
            Expression::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Set the value for `key`, taking ownership of the value. An existing
    /// key keeps its position and has its old value dropped; a new key is
    /// appended. Does nothing unless this expression is a map.
    pub fn map_insert(&mut self, key: impl Into<String>, value: Expression) {
        if let Expression::Map(map) = self {
            map.insert(key, value);
        }
    }
}

/// Insertion-ordered key/value pairs with a hash index for lookup.
///
/// The index is an implementation detail kept consistent with the entry
/// list on every mutation; equality and iteration see only the ordered
/// entries.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, Expression)>,
    index: HashMap<String, usize>,
}

impl Map {
    pub fn new() -> Map {
        Map::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The key at `index` in insertion order.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(key, _)| key.as_str())
    }

    /// The value at `index` in insertion order.
    pub fn value_at(&self, index: usize) -> Option<&Expression> {
        self.entries.get(index).map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The value for `key`, via the hash index.
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Set the value for `key`. An existing key keeps its position and has
    /// its old value dropped; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: Expression) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expression)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Map) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Map {}
