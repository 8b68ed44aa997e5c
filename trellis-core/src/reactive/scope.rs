//! Named reactive variables.
//!
//! A [`VariableScope`] attaches reactive variables to a container under a
//! name, the way a router or session object exposes its state. Each variable
//! is a shared handle: the scope and every caller of
//! [`VariableScope::get`] see the same cell.

use std::hash::Hash;

use indexmap::IndexMap;

use super::variable::ReactiveVariable;

/// A container of named reactive variables of one value type.
pub struct VariableScope<V> {
    variables: IndexMap<String, ReactiveVariable<V>>,
}

impl<V> VariableScope<V>
where
    V: Clone + Eq + Hash + 'static,
{
    /// Create an empty scope.
    pub fn new() -> Self {
        Self {
            variables: IndexMap::new(),
        }
    }

    /// Create a variable named `name` holding `initial` and attach it to the
    /// scope.
    ///
    /// An existing variable with the same name is replaced; handles to the
    /// old variable keep working but are no longer reachable by name.
    pub fn add_reactive_variable(
        &mut self,
        name: impl Into<String>,
        initial: V,
    ) -> ReactiveVariable<V> {
        let name = name.into();
        let variable = ReactiveVariable::named(name.clone(), initial);
        self.variables.insert(name, variable.clone());
        variable
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&ReactiveVariable<V>> {
        self.variables.get(name)
    }

    /// Check whether a variable with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Names of all variables, in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Get the number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check whether the scope is empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<V> Default for VariableScope<V>
where
    V: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
