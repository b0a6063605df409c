//! Per-environment value selection (`by_env`).
//!
//! ```text
//! <<< by_env(staging='s.example.com', production='example.com', default='dev.example.com') >>>
//! ```
//!
//! The value named after the current environment wins, then `default`; with
//! neither present the render fails.

use crate::constants::DEFAULT_OPTION;
use crate::core::EnvrenderError;

/// Ordered mapping from environment name (or `default`) to a value.
///
/// Inserting a name twice replaces the earlier value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentOptions<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for EnvironmentOptions<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> EnvironmentOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Option names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for EnvironmentOptions<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

/// Pick the value for `current_environment`, falling back to `default`.
pub fn select<'a, V>(
    current_environment: &str,
    options: &'a EnvironmentOptions<V>,
) -> Result<&'a V, EnvrenderError> {
    options
        .get(current_environment)
        .or_else(|| options.get(DEFAULT_OPTION))
        .ok_or_else(|| EnvrenderError::EnvironmentSelection {
            environment: current_environment.to_string(),
        })
}
