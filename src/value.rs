//! Variant data model
//!
//! Template data is a tree of [`Entity`] values: strings, ordered lists and
//! name-to-entity maps. Entities are shared through [`DataPtr`] handles so a
//! scope can be copied by duplicating its binding table only.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an entity
pub type DataPtr = Arc<Entity>;

/// Ordered sequence of shared entities
pub type DataVector = Vec<DataPtr>;

/// Name to entity bindings. Also used as the evaluation scope.
pub type DataMap = IndexMap<String, DataPtr>;

/// Discriminant of an [`Entity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    String,
    List,
    Map,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::String => "string",
            EntityKind::List => "list",
            EntityKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// A template data value
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    String(String),
    List(DataVector),
    Map(DataMap),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::String(_) => EntityKind::String,
            Entity::List(_) => EntityKind::List,
            Entity::Map(_) => EntityKind::Map,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Entity::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&DataVector> {
        match self {
            Entity::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DataMap> {
        match self {
            Entity::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Check if the entity holds no data
    pub fn is_empty(&self) -> bool {
        match self {
            Entity::String(s) => s.is_empty(),
            Entity::List(items) => items.is_empty(),
            Entity::Map(map) => map.is_empty(),
        }
    }

    /// Wrap the entity in a shared handle
    pub fn into_ptr(self) -> DataPtr {
        Arc::new(self)
    }

    /// Convert a JSON value into an entity
    ///
    /// Numbers and booleans become their textual form and `null` becomes an
    /// empty string, since the data model only knows strings, lists and maps.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Entity::String(s.clone()),
            Value::Number(n) => Entity::String(n.to_string()),
            Value::Bool(b) => Entity::String(b.to_string()),
            Value::Null => Entity::String(String::new()),
            Value::Array(items) => Entity::List(
                items
                    .iter()
                    .map(|item| Arc::new(Entity::from_json(item)))
                    .collect(),
            ),
            Value::Object(map) => Entity::Map(
                map.iter()
                    .map(|(key, item)| (key.clone(), Arc::new(Entity::from_json(item))))
                    .collect(),
            ),
        }
    }
}

/// Build a top-level scope from a JSON object
pub fn data_from_json(value: &Value) -> Result<DataMap> {
    match Entity::from_json(value) {
        Entity::Map(map) => Ok(map),
        other => Err(Error::invalid_tag(format!(
            "top-level data must be an object, got {}",
            other.kind()
        ))),
    }
}

impl From<&str> for Entity {
    fn from(value: &str) -> Self {
        Entity::String(value.to_string())
    }
}

impl From<String> for Entity {
    fn from(value: String) -> Self {
        Entity::String(value)
    }
}

impl From<Vec<String>> for Entity {
    fn from(values: Vec<String>) -> Self {
        Entity::List(values.into_iter().map(|v| Arc::new(Entity::String(v))).collect())
    }
}

impl From<Vec<&str>> for Entity {
    fn from(values: Vec<&str>) -> Self {
        Entity::List(values.into_iter().map(|v| Arc::new(Entity::from(v))).collect())
    }
}

impl From<Vec<Entity>> for Entity {
    fn from(values: Vec<Entity>) -> Self {
        Entity::List(values.into_iter().map(Arc::new).collect())
    }
}

impl From<DataVector> for Entity {
    fn from(values: DataVector) -> Self {
        Entity::List(values)
    }
}

impl From<DataMap> for Entity {
    fn from(map: DataMap) -> Self {
        Entity::Map(map)
    }
}
