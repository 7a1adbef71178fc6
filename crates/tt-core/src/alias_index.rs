//! Case-insensitive alias → activity name index.

use std::collections::BTreeMap;

use thiserror::Error;

/// Alias index errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias cannot be empty")]
    EmptyKey,

    #[error("alias '{alias}' must point to an activity")]
    EmptyValue { alias: String },

    #[error("alias '{alias}' is already used by activity '{bound_to}'")]
    AliasTaken { alias: String, bound_to: String },

    #[error("alias '{alias}' is not indexed")]
    NotIndexed { alias: String },
}

/// Maps lowercase aliases to canonical activity names.
///
/// An alias, once bound, is never overwritten: rebinding requires an explicit
/// [`AliasIndex::delete`] first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasIndex {
    data: BTreeMap<String, String>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the index contents. Keys are lowercased on the way in.
    pub fn load<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.data = entries
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_lowercase(), value.into()))
            .collect();
    }

    pub fn is_indexed(&self, key: &str) -> bool {
        self.data.contains_key(&key.to_lowercase())
    }

    pub fn get(&self, key: &str) -> Result<&str, AliasError> {
        self.data
            .get(&key.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| AliasError::NotIndexed {
                alias: key.to_string(),
            })
    }

    /// Binds `key` to `value`.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), AliasError> {
        if key.is_empty() {
            return Err(AliasError::EmptyKey);
        }
        if value.is_empty() {
            return Err(AliasError::EmptyValue {
                alias: key.to_string(),
            });
        }
        let key = key.to_lowercase();
        if let Some(bound_to) = self.data.get(&key) {
            return Err(AliasError::AliasTaken {
                alias: key,
                bound_to: bound_to.clone(),
            });
        }
        self.data.insert(key, value.to_string());
        Ok(())
    }

    /// Removes `key` if present.
    pub fn delete(&mut self, key: &str) {
        self.data.remove(&key.to_lowercase());
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
