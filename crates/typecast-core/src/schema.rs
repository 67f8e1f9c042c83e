//! Record schemas
//!
//! A schema is the ordered list of named, typed columns a record carries.

use crate::error::ConfigError;
use crate::value::Kind;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub name: String,
    pub kind: Kind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from `(name, kind)` pairs in record order
    pub fn new<I, S>(columns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, Kind)>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for (name, kind) in columns {
            let name = name.into();
            if schema.by_name.contains_key(&name) {
                return Err(ConfigError::DuplicateColumn { name });
            }
            let index = schema.columns.len();
            schema.by_name.insert(name.clone(), index);
            schema.columns.push(Column { index, name, kind });
        }
        Ok(schema)
    }

    pub fn lookup(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
