use std::collections::HashMap;

use super::{Result, Visibility};
use crate::value::Value;

/// Per-instance field storage, split into a public and a private partition.
///
/// The store itself does not enforce visibility, callers decide which
/// partition they are allowed to reach. A name lives in at most one
/// partition.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    /// Fields reachable by any holder of the instance.
    public: HashMap<String, Value>,

    /// Fields reachable only from the instance's own methods.
    private: HashMap<String, Value>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` in the given partition, replacing any earlier value.
    pub fn declare(&mut self, name: &str, visibility: Visibility, value: Value) {
        self.partition_mut(visibility).insert(name.to_owned(), value);
    }

    /// Returns the partition `name` lives in, if it is declared at all.
    pub fn visibility_of(&self, name: &str) -> Option<Visibility> {
        if self.public.contains_key(name) {
            Some(Visibility::Public)
        } else if self.private.contains_key(name) {
            Some(Visibility::Private)
        } else {
            None
        }
    }

    /// Looks up `name` in either partition.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.public.get(name).or_else(|| self.private.get(name))
    }

    /// Overwrites a declared field. Returns `false` and leaves the store
    /// untouched when `name` is not declared.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let slot = match self.public.get_mut(name) {
            Some(slot) => Some(slot),
            None => self.private.get_mut(name),
        };
        match slot {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn partition(&self, visibility: Visibility) -> &HashMap<String, Value> {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
        }
    }

    fn partition_mut(&mut self, visibility: Visibility) -> &mut HashMap<String, Value> {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
        }
    }

    /// Field names of one partition in sorted order.
    pub fn names(&self, visibility: Visibility) -> Vec<&str> {
        let mut names: Vec<&str> = self.partition(visibility).keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.public.len() + self.private.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a new store with every value passed through `f`, keeping
    /// each field in its partition.
    pub fn try_map<F>(&self, mut f: F) -> Result<FieldStore>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let mut mapped = FieldStore::new();
        for (name, value) in &self.public {
            mapped.public.insert(name.clone(), f(value)?);
        }
        for (name, value) in &self.private {
            mapped.private.insert(name.clone(), f(value)?);
        }
        Ok(mapped)
    }
}
